//! Credential store: registration, login checks, and admin bootstrap.
//!
//! Passwords are hashed with argon2id into PHC strings; the plaintext never
//! reaches the store.

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  Version, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{
  Error, Helpdesk, Result,
  store::HelpdeskStore,
  user::{NewUser, Role, User},
};

// ─── Hashing ─────────────────────────────────────────────────────────────────

/// Lowest accepted argon2 memory cost, in KiB.
pub const MIN_MEMORY_KIB: u32 = 19_456;
/// Lowest accepted argon2 iteration count.
pub const MIN_ITERATIONS: u32 = 2;

/// argon2id hasher with a tunable cost.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
  params: Params,
}

impl Default for CredentialHasher {
  fn default() -> Self { Self { params: Params::default() } }
}

impl CredentialHasher {
  /// Cost values below [`MIN_MEMORY_KIB`] / [`MIN_ITERATIONS`] are raised to
  /// the floor.
  pub fn new(memory_kib: u32, iterations: u32) -> Result<Self> {
    if memory_kib < MIN_MEMORY_KIB || iterations < MIN_ITERATIONS {
      tracing::warn!(
        memory_kib,
        iterations,
        "password hash cost below the minimum; raising it"
      );
    }
    let params = Params::new(
      memory_kib.max(MIN_MEMORY_KIB),
      iterations.max(MIN_ITERATIONS),
      Params::DEFAULT_P_COST,
      None,
    )
    .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(Self { params })
  }

  fn argon2(&self) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
  }

  pub fn hash(&self, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(
      self
        .argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?
        .to_string(),
    )
  }

  /// Check `password` against a PHC string. The cost recorded in the hash is
  /// used, so raising the configured cost does not lock out existing users.
  pub fn verify(&self, password: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
      return false;
    };
    self.argon2().verify_password(password.as_bytes(), &parsed).is_ok()
  }
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

/// Password of the bootstrap admin when none is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Verified against when a login names an unknown user, so that both failure
/// paths pay for one argon2 run. Matches no password.
const UNKNOWN_USER_HASH: &str = concat!(
  "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$",
  "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
);

/// The account inserted on first start.
#[derive(Debug, Clone)]
pub struct AdminSeed {
  pub username: String,
  pub email:    String,
  pub password: String,
}

impl Default for AdminSeed {
  fn default() -> Self {
    Self {
      username: "admin".to_owned(),
      email:    "admin@company.com".to_owned(),
      password: DEFAULT_ADMIN_PASSWORD.to_owned(),
    }
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

impl<S: HelpdeskStore> Helpdesk<S> {
  /// Create a `user`-role account.
  pub async fn register(
    &self,
    username: &str,
    email: &str,
    password: &str,
  ) -> Result<User> {
    let username = username.trim();
    let email    = email.trim();
    if username.is_empty() || email.is_empty() || password.is_empty() {
      return Err(Error::Validation("All fields are required".into()));
    }
    if !email.contains('@') {
      return Err(Error::Validation("Email address is not valid".into()));
    }

    let input = NewUser {
      username:      username.to_owned(),
      email:         email.to_owned(),
      password_hash: self.hasher.hash(password)?,
      role:          Role::User,
    };

    let user = self
      .store
      .create_user(input)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::Conflict("Username or email already exists".into()))?;

    tracing::info!(user_id = user.id, username = %user.username, "registered user");
    Ok(user)
  }

  /// Resolve a username/password pair to its user. Unknown usernames and
  /// wrong passwords are indistinguishable to the caller.
  pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<User> {
    let stored = self
      .store
      .find_user_by_username(username.trim())
      .await
      .map_err(Error::store)?;

    let (user, phc) = match stored {
      Some(s) => (Some(s.user), s.password_hash),
      None => (None, UNKNOWN_USER_HASH.to_owned()),
    };
    match user {
      Some(user) if self.hasher.verify(password, &phc) => Ok(user),
      _ => {
        tracing::warn!(username, "failed login attempt");
        Err(Error::InvalidCredentials)
      }
    }
  }

  /// Insert the bootstrap admin unless it already exists. Returns `true` if it
  /// was created by this call.
  pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<bool> {
    let input = NewUser {
      username:      seed.username.clone(),
      email:         seed.email.clone(),
      password_hash: self.hasher.hash(&seed.password)?,
      role:          Role::Admin,
    };
    let created = self.store.seed_user(input).await.map_err(Error::store)?;
    if created {
      tracing::info!(username = %seed.username, "seeded bootstrap admin");
    }
    Ok(created)
  }
}
