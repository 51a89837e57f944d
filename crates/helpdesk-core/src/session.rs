//! Signed session tokens.
//!
//! Tokens are HS256 JWTs. Nothing is persisted server-side; possession of a
//! valid, unexpired token is the whole proof of identity.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  user::{Role, User, UserId},
};

/// How long an issued token stays valid, in seconds.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

// ─── Claims ──────────────────────────────────────────────────────────────────

/// The identity payload embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub id:       UserId,
  pub username: String,
  pub role:     Role,
  /// Issued-at, Unix seconds.
  pub iat:      i64,
  /// Expiry, Unix seconds.
  pub exp:      i64,
}

impl Claims {
  pub fn caller(&self) -> Caller {
    Caller {
      id:       self.id,
      username: self.username.clone(),
      role:     self.role,
    }
  }
}

/// The verified identity of whoever is making the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
  pub id:       UserId,
  pub username: String,
  pub role:     Role,
}

impl Caller {
  pub fn is_admin(&self) -> bool { self.role.is_admin() }
}

impl From<&User> for Caller {
  fn from(user: &User) -> Self {
    Self {
      id:       user.id,
      username: user.username.clone(),
      role:     user.role,
    }
  }
}

// ─── Issuer ──────────────────────────────────────────────────────────────────

/// Issues and verifies session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
  key: Vec<u8>,
}

impl fmt::Debug for TokenIssuer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenIssuer").finish_non_exhaustive()
  }
}

impl TokenIssuer {
  pub fn new(secret: impl Into<Vec<u8>>) -> Self { Self { key: secret.into() } }

  /// An issuer with a fresh random 32-byte key. Tokens it signs do not
  /// survive a restart.
  pub fn random() -> Self {
    let mut key = vec![0u8; 32];
    OsRng.fill_bytes(&mut key);
    Self { key }
  }

  pub fn issue(&self, user: &User) -> Result<String> {
    self.issue_at(user, Utc::now())
  }

  pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String> {
    let claims = Claims {
      id:       user.id,
      username: user.username.clone(),
      role:     user.role,
      iat:      now.timestamp(),
      exp:      now.timestamp() + TOKEN_TTL_SECS,
    };
    jsonwebtoken::encode(
      &Header::new(Algorithm::HS256),
      &claims,
      &EncodingKey::from_secret(&self.key),
    )
    .map_err(|e| Error::Token(e.to_string()))
  }

  pub fn verify(&self, token: &str) -> Result<Claims> {
    self.verify_at(token, Utc::now())
  }

  /// Check the signature and algorithm, then expiry against `now`.
  pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
    // Expiry is compared with `now` below, not with the system clock.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = jsonwebtoken::decode::<Claims>(
      token,
      &DecodingKey::from_secret(&self.key),
      &validation,
    )
    .map_err(|e| match e.kind() {
      ErrorKind::ExpiredSignature => Error::ExpiredToken,
      _ => Error::InvalidToken,
    })?
    .claims;

    if now.timestamp() >= claims.exp {
      return Err(Error::ExpiredToken);
    }
    Ok(claims)
  }
}
