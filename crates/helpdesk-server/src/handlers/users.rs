//! Handler for `GET /api/users` (admin only; feeds the assignment dropdown).

use axum::{Json, extract::State};
use helpdesk_core::{store::HelpdeskStore, user::User};

use crate::{AppState, auth::Authenticated, error::ApiError};

pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.desk.list_users(&caller).await?))
}
