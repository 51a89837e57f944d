//! The [`Helpdesk`] service every request goes through.
//!
//! Account operations live in [`crate::credentials`]; ticket and comment
//! operations in [`crate::lifecycle`].

use std::sync::Arc;

use crate::{credentials::CredentialHasher, policy::AccessPolicy, store::HelpdeskStore};

/// Validates input, applies the [`AccessPolicy`], and delegates persistence to
/// a [`HelpdeskStore`].
///
/// Cloning is cheap; the store is reference-counted.
pub struct Helpdesk<S> {
  pub(crate) store:  Arc<S>,
  pub(crate) policy: AccessPolicy,
  pub(crate) hasher: CredentialHasher,
}

impl<S> Clone for Helpdesk<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      policy: self.policy,
      hasher: self.hasher.clone(),
    }
  }
}

impl<S: HelpdeskStore> Helpdesk<S> {
  pub fn new(store: Arc<S>, policy: AccessPolicy, hasher: CredentialHasher) -> Self {
    Self { store, policy, hasher }
  }
}
