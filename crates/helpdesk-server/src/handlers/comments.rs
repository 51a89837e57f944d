//! Handlers for `/api/tickets/:id/comments`.

use axum::{Json, extract::State};
use helpdesk_core::{comment::CommentView, store::HelpdeskStore, ticket::TicketId};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

/// `GET /api/tickets/:id/comments`, oldest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
  ApiPath(ticket_id): ApiPath<TicketId>,
) -> Result<Json<Vec<CommentView>>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.desk.list_comments(&caller, ticket_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(default)]
  pub comment: String,
}

/// `POST /api/tickets/:id/comments` with body `{"comment":"..."}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
  ApiPath(ticket_id): ApiPath<TicketId>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<Json<Value>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  let comment = state
    .desk
    .add_comment(&caller, ticket_id, &body.comment)
    .await?;
  Ok(Json(json!({
    "message":   "Comment added successfully",
    "commentId": comment.id,
  })))
}
