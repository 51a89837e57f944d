//! User accounts and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Privilege level carried by every account and every session token.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

impl Role {
  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }
}

/// A registered account as exposed to callers. The password hash never
/// leaves the store through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         UserId,
  pub username:   String,
  pub email:      String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

/// A user row together with its PHC password hash, for credential checks.
#[derive(Debug, Clone)]
pub struct StoredUser {
  pub user:          User,
  pub password_hash: String,
}

/// Input to [`crate::store::HelpdeskStore::create_user`].
/// `created_at` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}
