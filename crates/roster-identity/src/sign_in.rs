//! Sign-In Service: exchanges a login and password for a token.

use std::sync::Arc;

use roster_core::{Error, Result, store::AccountStore};
use tracing::{info, warn};

use crate::{hasher::CredentialHasher, token::TokenAuthority};

pub struct SignIn<S> {
  store:  Arc<S>,
  tokens: Arc<TokenAuthority>,
  hasher: Arc<dyn CredentialHasher>,
}

impl<S> Clone for SignIn<S> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      tokens: self.tokens.clone(),
      hasher: self.hasher.clone(),
    }
  }
}

impl<S: AccountStore> SignIn<S> {
  pub fn new(
    store:  Arc<S>,
    tokens: Arc<TokenAuthority>,
    hasher: Arc<dyn CredentialHasher>,
  ) -> Self {
    Self { store, tokens, hasher }
  }

  /// Every rejection is [`Error::InvalidCredentials`]; the actual reason is
  /// only logged.
  pub async fn sign_in(&self, login: &str, password: &str) -> Result<String> {
    let account = self
      .store
      .find_by_login(login)
      .await
      .map_err(Error::from_store)?;

    let Some(account) = account else {
      warn!(login, reason = "unknown login", "sign-in rejected");
      return Err(Error::InvalidCredentials);
    };
    if !account.is_active() {
      warn!(login, reason = "account revoked", "sign-in rejected");
      return Err(Error::InvalidCredentials);
    }
    if !self.hasher.verify(password, &account.password_digest) {
      warn!(login, reason = "wrong password", "sign-in rejected");
      return Err(Error::InvalidCredentials);
    }

    let token = self
      .tokens
      .issue(account.account_id, &account.login, account.is_admin)?;
    info!(login, is_admin = account.is_admin, "signed in");
    Ok(token)
  }
}
