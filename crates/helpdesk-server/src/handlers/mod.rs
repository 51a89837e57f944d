pub mod account;
pub mod comments;
pub mod stats;
pub mod tickets;
pub mod users;

use axum::Json;
use serde_json::{Value, json};

/// `{"message": ...}` body used by mutating endpoints.
pub(crate) fn message(text: &str) -> Json<Value> { Json(json!({ "message": text })) }
