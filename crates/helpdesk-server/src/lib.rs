//! JSON HTTP API for the helpdesk.
//!
//! Exposes an axum [`Router`] backed by any [`HelpdeskStore`]. TLS, CORS and
//! static file serving are left to whatever sits in front of it.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use helpdesk_core::{
  Helpdesk,
  credentials::{AdminSeed, DEFAULT_ADMIN_PASSWORD, MIN_ITERATIONS, MIN_MEMORY_KIB},
  policy::AccessPolicy,
  session::TokenIssuer,
  store::HelpdeskStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{account, comments, stats, tickets, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `helpdesk.toml` and
/// `HELPDESK_*` environment variables. Every field has a default.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub policy:            AccessPolicy,
  /// HMAC key for session tokens. A random key is generated when unset.
  pub token_secret:      Option<String>,
  /// Accept `?token=` as a last-resort token source. Development only.
  pub allow_query_token: bool,
  /// Mark the session cookie `Secure`.
  pub cookie_secure:     bool,
  pub admin_username:    String,
  pub admin_email:       String,
  pub admin_password:    String,
  pub hash_memory_kib:   u32,
  pub hash_iterations:   u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "0.0.0.0".to_string(),
      port:              3000,
      store_path:        PathBuf::from("ticketing.db"),
      policy:            AccessPolicy::default(),
      token_secret:      None,
      allow_query_token: false,
      cookie_secure:     true,
      admin_username:    "admin".to_string(),
      admin_email:       "admin@company.com".to_string(),
      admin_password:    DEFAULT_ADMIN_PASSWORD.to_string(),
      hash_memory_kib:   MIN_MEMORY_KIB,
      hash_iterations:   MIN_ITERATIONS,
    }
  }
}

impl ServerConfig {
  pub fn admin_seed(&self) -> AdminSeed {
    AdminSeed {
      username: self.admin_username.clone(),
      email:    self.admin_email.clone(),
      password: self.admin_password.clone(),
    }
  }

  /// The token issuer for this configuration.
  pub fn token_issuer(&self) -> TokenIssuer {
    match self.token_secret.as_deref().filter(|s| !s.is_empty()) {
      Some(secret) => TokenIssuer::new(secret),
      None => {
        tracing::warn!("no token_secret configured; sessions will not survive a restart");
        TokenIssuer::random()
      }
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: HelpdeskStore> {
  pub desk:   Arc<Helpdesk<S>>,
  pub tokens: Arc<TokenIssuer>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] serving `/api/*`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/api/register", post(account::register::<S>))
    .route("/api/login", post(account::login::<S>))
    .route("/api/logout", post(account::logout::<S>))
    .route("/api/me", get(account::me))
    .route("/api/tickets", get(tickets::list::<S>).post(tickets::create::<S>))
    .route(
      "/api/tickets/{id}",
      get(tickets::get_one::<S>)
        .put(tickets::update::<S>)
        .delete(tickets::delete::<S>),
    )
    .route(
      "/api/tickets/{id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route("/api/users", get(users::list::<S>))
    .route("/api/stats", get(stats::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
