//! Session-token extractor and cookie helpers.
//!
//! The token is looked for, in order, in the `token` cookie, an
//! `Authorization: Bearer` header, and finally a `?token=` query parameter when
//! `allow_query_token` is configured.

use axum::{
  extract::{FromRequestParts, Query},
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use helpdesk_core::{
  Error as CoreError,
  session::{Caller, TOKEN_TTL_SECS},
  store::HelpdeskStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// The verified caller of the current request.
pub struct Authenticated(pub Caller);

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
  Cookie,
  Bearer,
  Query,
}

#[derive(Deserialize)]
struct TokenQuery {
  token: Option<String>,
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
    .map(|(_, value)| value.to_owned())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
}

/// Locate the session token in a request.
pub fn find_token(parts: &Parts, allow_query: bool) -> Option<(String, TokenSource)> {
  if let Some(t) = cookie_token(&parts.headers) {
    return Some((t, TokenSource::Cookie));
  }
  if let Some(t) = bearer_token(&parts.headers) {
    return Some((t, TokenSource::Bearer));
  }
  if allow_query {
    return Query::<TokenQuery>::try_from_uri(&parts.uri)
      .ok()
      .and_then(|Query(q)| q.token)
      .filter(|t| !t.is_empty())
      .map(|t| (t, TokenSource::Query));
  }
  None
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: HelpdeskStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (token, source) = find_token(parts, state.config.allow_query_token)
      .ok_or(CoreError::Unauthenticated)?;

    let claims = state.tokens.verify(&token).inspect_err(|e| {
      tracing::debug!(error = %e, ?source, "token verification failed");
    })?;
    Ok(Authenticated(claims.caller()))
  }
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

fn cookie(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, ApiError> {
  let mut cookie =
    format!("{TOKEN_COOKIE}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=None");
  if secure {
    cookie.push_str("; Secure");
  }
  HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.to_string()))
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, ApiError> {
  cookie(token, TOKEN_TTL_SECS, secure)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(secure: bool) -> Result<HeaderValue, ApiError> { cookie("", 0, secure) }
