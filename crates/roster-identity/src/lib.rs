//! Identity and access control for Roster.
//!
//! Issues and validates bearer tokens, decides who may act on whose account,
//! and applies the rules that govern account state transitions. Persistence
//! goes through any [`AccountStore`].

pub mod access;
pub mod bootstrap;
pub mod error;
pub mod hasher;
pub mod self_service;
pub mod sign_in;
pub mod token;

use std::sync::Arc;

use roster_core::store::AccountStore;

pub use access::AccessControl;
pub use error::ConfigError;
pub use hasher::{Argon2Hasher, CredentialHasher, PasswordScheme, Sha256Hasher};
pub use self_service::SelfService;
pub use sign_in::SignIn;
pub use token::{Principal, SigningKey, TokenAuthority};

/// The three services wired to one store, token authority, and hasher.
pub struct Services<S> {
  pub admin:   AccessControl<S>,
  pub own:     SelfService<S>,
  pub sign_in: SignIn<S>,
}

impl<S> Clone for Services<S> {
  fn clone(&self) -> Self {
    Self {
      admin:   self.admin.clone(),
      own:     self.own.clone(),
      sign_in: self.sign_in.clone(),
    }
  }
}

impl<S: AccountStore> Services<S> {
  pub fn new(
    store:  Arc<S>,
    tokens: Arc<TokenAuthority>,
    hasher: Arc<dyn CredentialHasher>,
  ) -> Self {
    Self {
      admin:   AccessControl::new(store.clone(), tokens.clone(), hasher.clone()),
      own:     SelfService::new(store.clone(), tokens.clone(), hasher.clone()),
      sign_in: SignIn::new(store, tokens, hasher),
    }
  }
}

#[cfg(test)]
mod tests;
