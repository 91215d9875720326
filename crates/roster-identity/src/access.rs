//! Access-Control Service: administrator operations.
//!
//! Every operation authenticates the token and requires the administrator
//! role before touching the store. Unlike self-service, these operations do
//! not care whether the target account is revoked.

use std::sync::Arc;

use chrono::{Datelike as _, Utc};
use roster_core::{
  Error, Result,
  account::{Account, AccountView, NewAccount, ProfileChanges},
  rules,
  store::AccountStore,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  hasher::CredentialHasher,
  token::{Principal, TokenAuthority},
};

pub struct AccessControl<S> {
  store:  Arc<S>,
  tokens: Arc<TokenAuthority>,
  hasher: Arc<dyn CredentialHasher>,
}

impl<S> Clone for AccessControl<S> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      tokens: self.tokens.clone(),
      hasher: self.hasher.clone(),
    }
  }
}

impl<S: AccountStore> AccessControl<S> {
  pub fn new(
    store:  Arc<S>,
    tokens: Arc<TokenAuthority>,
    hasher: Arc<dyn CredentialHasher>,
  ) -> Self {
    Self { store, tokens, hasher }
  }

  fn admin(&self, token: &str, operation: &'static str) -> Result<Principal> {
    let principal = self.tokens.authenticate(token).inspect_err(|e| {
      warn!(operation, error = %e, "rejected unauthenticated admin request");
    })?;
    if !principal.is_admin {
      warn!(
        operation,
        subject = %principal.subject_id,
        login = %principal.login,
        "non-administrator attempted privileged operation"
      );
      return Err(Error::Forbidden);
    }
    debug!(operation, admin = %principal.login, "admin request authorized");
    Ok(principal)
  }

  async fn by_login(&self, login: &str) -> Result<Account> {
    self
      .store
      .find_by_login(login)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("no account with login {login:?}")))
  }

  async fn save(&self, account: &Account) -> Result<()> {
    self.store.persist(account).await.map_err(Error::from_store)
  }

  pub async fn get_by_id(&self, token: &str, id: Uuid) -> Result<AccountView> {
    self.admin(token, "get_by_id")?;
    let account = self
      .store
      .find_by_id(id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("no account with id {id}")))?;
    Ok(account.view())
  }

  pub async fn get_by_login(&self, token: &str, login: &str) -> Result<AccountView> {
    self.admin(token, "get_by_login")?;
    Ok(self.by_login(login).await?.view())
  }

  /// Create a new active account. A login collision is reported by the store
  /// as [`Error::AlreadyExists`].
  pub async fn create(&self, token: &str, new: NewAccount) -> Result<AccountView> {
    let principal = self.admin(token, "create")?;

    rules::check_login(&new.login)?;
    rules::check_password(&new.password)?;
    rules::check_name(&new.name)?;
    rules::check_gender(new.gender)?;
    if let Some(birthday) = new.birthday {
      rules::check_birthday(birthday)?;
    }

    let now = Utc::now();
    let account = Account {
      account_id:      Uuid::new_v4(),
      login:           new.login,
      password_digest: self.hasher.hash(&new.password)?,
      name:            new.name,
      gender:          new.gender,
      birthday:        new.birthday,
      is_admin:        new.is_admin,
      created_on:      now,
      created_by:      principal.login.clone(),
      modified_on:     now,
      modified_by:     principal.login.clone(),
      revoked_on:      None,
      revoked_by:      None,
    };

    self.store.insert(&account).await.map_err(Error::from_store)?;
    info!(
      login = %account.login,
      account_id = %account.account_id,
      is_admin = account.is_admin,
      by = %principal.login,
      "account created"
    );
    Ok(account.view())
  }

  /// Change an account's login. Renaming to the current login is a no-op.
  pub async fn rename(&self, token: &str, old_login: &str, new_login: &str) -> Result<()> {
    let principal = self.admin(token, "rename")?;
    let mut account = self.by_login(old_login).await?;
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

    account.login = new_login.to_owned();
    account.touch(&principal.login, Utc::now());
    self.save(&account).await?;
    info!(from = old_login, to = new_login, by = %principal.login, "account renamed");
    Ok(())
  }

  /// Overwrite an account's password without checking the old one.
  pub async fn reset_password(&self, token: &str, login: &str, new_password: &str) -> Result<()> {
    let principal = self.admin(token, "reset_password")?;
    rules::check_password(new_password)?;
    let mut account = self.by_login(login).await?;

    account.password_digest = self.hasher.hash(new_password)?;
    account.touch(&principal.login, Utc::now());
    self.save(&account).await?;
    info!(login, by = %principal.login, "password reset");
    Ok(())
  }

  pub async fn update_profile(
    &self,
    token:   &str,
    login:   &str,
    changes: ProfileChanges,
  ) -> Result<()> {
    let principal = self.admin(token, "update_profile")?;
    let mut account = self.by_login(login).await?;
    rules::check_profile_changes(&changes)?;

    if !account.apply_profile(&changes) {
      debug!(login, "profile update changed nothing");
      return Ok(());
    }
    account.touch(&principal.login, Utc::now());
    self.save(&account).await?;
    info!(login, by = %principal.login, "profile updated");
    Ok(())
  }

  /// Non-revoked accounts, oldest first.
  pub async fn list_active(&self, token: &str) -> Result<Vec<AccountView>> {
    self.admin(token, "list_active")?;
    let accounts = self.store.list_active().await.map_err(Error::from_store)?;
    Ok(accounts.iter().map(Account::view).collect())
  }

  /// Accounts whose age in whole calendar years (current year minus birth
  /// year) is strictly greater than `years`. Accounts without a birthday are
  /// never included.
  pub async fn list_older_than(&self, token: &str, years: i64) -> Result<Vec<AccountView>> {
    self.admin(token, "list_older_than")?;
    let years = rules::check_age_threshold(years)?;
    let accounts = self
      .store
      .list_by_min_age(years, Utc::now().year())
      .await
      .map_err(Error::from_store)?;
    Ok(accounts.iter().map(Account::view).collect())
  }

  /// Revoke an account. Revoking an already-revoked account overwrites the
  /// revocation time and actor.
  pub async fn soft_delete(&self, token: &str, login: &str) -> Result<()> {
    let principal = self.admin(token, "soft_delete")?;
    let mut account = self.by_login(login).await?;

    account.revoke(&principal.login, Utc::now());
    self.save(&account).await?;
    info!(login, by = %principal.login, "account revoked");
    Ok(())
  }

  /// Clear the revocation fields, whether or not they were set.
  pub async fn restore(&self, token: &str, login: &str) -> Result<()> {
    let principal = self.admin(token, "restore")?;
    let mut account = self.by_login(login).await?;

    account.restore();
    self.save(&account).await?;
    info!(login, by = %principal.login, "account restored");
    Ok(())
  }
}
