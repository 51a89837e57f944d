//! Handlers for account and session endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/register` | Body: `{username,email,password}`; sets the session cookie |
//! | `POST` | `/api/login` | Body: `{username,password}`; sets the session cookie |
//! | `POST` | `/api/logout` | Clears the session cookie; no token needed |
//! | `GET`  | `/api/me` | The caller's identity claims |

use axum::{
  Json,
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use helpdesk_core::{session::Caller, store::HelpdeskStore, user::User};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  auth::{Authenticated, clear_cookie, session_cookie},
  error::ApiError,
  extract::ApiJson,
  handlers::message,
};

/// Issue a token for `user` and deliver it both as a cookie and in the body.
fn start_session<S>(
  state: &AppState<S>,
  user: &User,
  msg: &str,
) -> Result<Response, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  let token  = state.tokens.issue(user)?;
  let cookie = session_cookie(&token, state.config.cookie_secure)?;
  let body   = Json(json!({
    "message": msg,
    "user":    Caller::from(user),
    "token":   token,
  }));
  Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
}

/// `POST /api/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<RegisterBody>,
) -> Result<Response, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  let user = state
    .desk
    .register(&body.username, &body.email, &body.password)
    .await?;
  start_session(&state, &user, "Registration successful")
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /api/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<Response, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  let user = state
    .desk
    .verify_credentials(&body.username, &body.password)
    .await?;
  tracing::info!(user_id = user.id, "login");
  start_session(&state, &user, "Login successful")
}

// ─── Logout / me ──────────────────────────────────────────────────────────────

/// `POST /api/logout`
///
/// Needs no valid token, so a client holding an expired one can still drop
/// its cookie. Tokens are not revocable; this only clears the cookie.
pub async fn logout<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  let cookie = clear_cookie(state.config.cookie_secure)?;
  Ok(([(header::SET_COOKIE, cookie)], message("Logout successful")).into_response())
}

/// `GET /api/me`
pub async fn me(Authenticated(caller): Authenticated) -> impl IntoResponse {
  Json(json!({ "user": caller }))
}
