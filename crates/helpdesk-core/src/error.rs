//! Error types for `helpdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Conflict(String),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("authentication required")]
  Unauthenticated,

  #[error("invalid token")]
  InvalidToken,

  #[error("token expired")]
  ExpiredToken,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("token signing failed: {0}")]
  Token(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
