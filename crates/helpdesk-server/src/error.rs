//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the server as `{"error": "<message>"}`. Internal
//! failures are logged in full and reported to the client generically.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use helpdesk_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  /// The request could not be decoded (bad JSON, non-numeric id, …).
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::Core(e) => match e {
        CoreError::Validation(_)
        | CoreError::Conflict(_)
        | CoreError::InvalidCredentials => StatusCode::BAD_REQUEST,
        CoreError::Unauthenticated
        | CoreError::InvalidToken
        | CoreError::ExpiredToken => StatusCode::UNAUTHORIZED,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::PasswordHash(_)
        | CoreError::Token(_)
        | CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      _ if status.is_server_error() => {
        tracing::error!(error = %self, "request failed");
        "internal server error".to_owned()
      }
      ApiError::Core(CoreError::Unauthenticated) => {
        "Access denied - Please log in again".to_owned()
      }
      ApiError::Core(CoreError::InvalidToken | CoreError::ExpiredToken) => {
        format!("{self} - Please log in again")
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}
