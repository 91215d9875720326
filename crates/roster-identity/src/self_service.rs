//! Self-Service Account Service: operations a subject performs on their own
//! account.
//!
//! Any authenticated subject may call these, administrator or not. The acting
//! account is resolved from the subject id in the token, and every mutation is
//! refused once that account has been revoked.

use std::sync::Arc;

use chrono::Utc;
use roster_core::{
  Error, Result,
  account::{Account, OwnProfile, ProfileChanges},
  rules,
  store::AccountStore,
};
use tracing::{debug, info, warn};

use crate::{
  hasher::CredentialHasher,
  token::{Principal, TokenAuthority},
};

pub struct SelfService<S> {
  store:  Arc<S>,
  tokens: Arc<TokenAuthority>,
  hasher: Arc<dyn CredentialHasher>,
}

impl<S> Clone for SelfService<S> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      tokens: self.tokens.clone(),
      hasher: self.hasher.clone(),
    }
  }
}

fn ensure_active(account: &Account) -> Result<()> {
  if account.is_active() {
    Ok(())
  } else {
    warn!(login = %account.login, "revoked account attempted self-service");
    Err(Error::AccountRevoked(account.login.clone()))
  }
}

impl<S: AccountStore> SelfService<S> {
  pub fn new(
    store:  Arc<S>,
    tokens: Arc<TokenAuthority>,
    hasher: Arc<dyn CredentialHasher>,
  ) -> Self {
    Self { store, tokens, hasher }
  }

  fn principal(&self, token: &str) -> Result<Principal> {
    self
      .tokens
      .authenticate(token)
      .inspect_err(|e| debug!(error = %e, "rejected self-service token"))
  }

  /// The acting subject's own account.
  async fn own_account(&self, principal: &Principal) -> Result<Account> {
    self
      .store
      .find_by_id(principal.subject_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("no account with id {}", principal.subject_id)))
  }

  /// Stamp the audit fields with the acting principal and write it back.
  async fn save_own(&self, principal: &Principal, account: &mut Account) -> Result<()> {
    account.touch(&principal.login, Utc::now());
    self.store.persist(account).await.map_err(Error::from_store)
  }

  pub async fn update_profile(&self, token: &str, changes: ProfileChanges) -> Result<()> {
    let principal = self.principal(token)?;
    let mut account = self.own_account(&principal).await?;
    ensure_active(&account)?;
    rules::check_profile_changes(&changes)?;

    if !account.apply_profile(&changes) {
      debug!(login = %account.login, "profile update changed nothing");
      return Ok(());
    }
    self.save_own(&principal, &mut account).await?;
    info!(login = %account.login, "own profile updated");
    Ok(())
  }

  /// Change the subject's password after checking the old one. The new
  /// password's format is checked before anything else is looked at.
  pub async fn change_password(
    &self,
    token:        &str,
    old_password: &str,
    new_password: &str,
  ) -> Result<()> {
    let principal = self.principal(token)?;
    rules::check_password(new_password)?;
    let mut account = self.own_account(&principal).await?;
    ensure_active(&account)?;

    if !self.hasher.verify(old_password, &account.password_digest) {
      warn!(login = %account.login, "password change with wrong old password");
      return Err(Error::WrongPassword);
    }

    account.password_digest = self.hasher.hash(new_password)?;
    self.save_own(&principal, &mut account).await?;
    info!(login = %account.login, "own password changed");
    Ok(())
  }

  /// Change the subject's login. Changing to the current login is a no-op.
  pub async fn change_login(&self, token: &str, new_login: &str) -> Result<()> {
    let principal = self.principal(token)?;
    let mut account = self.own_account(&principal).await?;
    ensure_active(&account)?;
    rules::check_login(new_login)?;

    if account.login == new_login {
      return Ok(());
    }
    if self
      .store
      .find_by_login(new_login)
      .await
      .map_err(Error::from_store)?
      .is_some()
    {
      return Err(Error::AlreadyExists(new_login.to_owned()));
    }

    let old_login = std::mem::replace(&mut account.login, new_login.to_owned());
    self.save_own(&principal, &mut account).await?;
    info!(from = %old_login, to = new_login, "own login changed");
    Ok(())
  }

  /// Re-authenticate by login and password and return that account's
  /// profile. The token only proves that *some* subject is calling.
  pub async fn get_own_data(&self, token: &str, login: &str, password: &str) -> Result<OwnProfile> {
    let principal = self.principal(token)?;
    let account = self
      .store
      .find_by_login(login)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("no account with login {login:?}")))?;
    ensure_active(&account)?;

    if !self.hasher.verify(password, &account.password_digest) {
      warn!(login, caller = %principal.login, "own-data lookup with wrong password");
      return Err(Error::WrongPassword);
    }
    Ok(account.own_profile())
  }
}
