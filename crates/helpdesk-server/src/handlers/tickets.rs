//! Handlers for `/api/tickets` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/tickets` | Tickets visible to the caller, newest first |
//! | `POST`   | `/api/tickets` | Body: [`CreateBody`]; returns `{ticketId}` |
//! | `GET`    | `/api/tickets/:id` | Single ticket |
//! | `PUT`    | `/api/tickets/:id` | Body: `{status?,priority?,assigned_to?}` |
//! | `DELETE` | `/api/tickets/:id` | Admin only; removes comments too |

use axum::{Json, extract::State};
use helpdesk_core::{
  lifecycle::NewTicketInput,
  store::HelpdeskStore,
  ticket::{Priority, TicketId, TicketUpdate, TicketView},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  handlers::message,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/tickets`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<TicketView>>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.desk.list_tickets(&caller).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub priority:    Option<Priority>,
  pub category:    Option<String>,
}

/// `POST /api/tickets`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<Json<Value>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  let input = NewTicketInput {
    title:       body.title,
    description: body.description,
    priority:    body.priority,
    category:    body.category,
  };
  let view = state.desk.create_ticket(&caller, input).await?;
  Ok(Json(json!({
    "message":  "Ticket created successfully",
    "ticketId": view.ticket.id,
  })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/tickets/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
  ApiPath(id): ApiPath<TicketId>,
) -> Result<Json<TicketView>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.desk.get_ticket(&caller, id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /api/tickets/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
  ApiPath(id): ApiPath<TicketId>,
  ApiJson(body): ApiJson<TicketUpdate>,
) -> Result<Json<Value>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  state.desk.update_ticket(&caller, id, body).await?;
  Ok(message("Ticket updated successfully"))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/tickets/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Authenticated(caller): Authenticated,
  ApiPath(id): ApiPath<TicketId>,
) -> Result<Json<Value>, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  state.desk.delete_ticket(&caller, id).await?;
  Ok(message("Ticket deleted successfully"))
}
