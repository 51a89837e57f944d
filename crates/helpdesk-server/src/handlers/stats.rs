use axum::{Json, extract::State};
use helpdesk_core::{store::HelpdeskStore, ticket::TicketStats};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /api/stats`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Authenticated(_): Authenticated,
) -> Result<Json<TicketStats>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.desk.stats().await?))
}
