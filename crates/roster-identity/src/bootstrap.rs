//! First-run seeding of an administrator account.

use chrono::Utc;
use roster_core::{Error, Result, account::Account, rules, store::AccountStore};
use tracing::info;
use uuid::Uuid;

use crate::hasher::CredentialHasher;

/// Insert an active administrator with the given credentials unless an
/// account with that login already exists. Returns `true` if one was created.
///
/// The seeded account is its own creator and last modifier.
pub async fn ensure_admin<S: AccountStore>(
  store:    &S,
  hasher:   &dyn CredentialHasher,
  login:    &str,
  password: &str,
) -> Result<bool> {
  rules::check_login(login)?;
  rules::check_password(password)?;

  if store.find_by_login(login).await.map_err(Error::from_store)?.is_some() {
    return Ok(false);
  }

  let now = Utc::now();
  let admin = Account {
    account_id:      Uuid::new_v4(),
    login:           login.to_owned(),
    password_digest: hasher.hash(password)?,
    name:            "Administrator".to_owned(),
    gender:          0,
    birthday:        None,
    is_admin:        true,
    created_on:      now,
    created_by:      login.to_owned(),
    modified_on:     now,
    modified_by:     login.to_owned(),
    revoked_on:      None,
    revoked_by:      None,
  };

  match store.insert(&admin).await.map_err(Error::from_store) {
    Ok(()) => {
      info!(login, "bootstrap administrator created");
      Ok(true)
    }
    // Lost a race with another instance seeding the same login.
    Err(Error::AlreadyExists(_)) => Ok(false),
    Err(e) => Err(e),
  }
}
