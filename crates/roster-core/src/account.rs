//! Account, the sole persistent entity, and the views derived from it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored account.
///
/// `password_digest` is the output of a credential hasher, never plaintext.
/// This type is not `Serialize`; callers receive an [`AccountView`] or an
/// [`OwnProfile`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
  pub account_id:      Uuid,
  pub login:           String,
  pub password_digest: String,
  pub name:            String,
  pub gender:          i32,
  pub birthday:        Option<NaiveDate>,
  pub is_admin:        bool,
  pub created_on:      DateTime<Utc>,
  pub created_by:      String,
  pub modified_on:     DateTime<Utc>,
  pub modified_by:     String,
  pub revoked_on:      Option<DateTime<Utc>>,
  pub revoked_by:      Option<String>,
}

impl Account {
  /// An account is active until it is soft-deleted.
  pub fn is_active(&self) -> bool { self.revoked_on.is_none() }

  /// Stamp the modification audit fields.
  pub fn touch(&mut self, actor: &str, at: DateTime<Utc>) {
    self.modified_on = at;
    self.modified_by = actor.to_owned();
  }

  pub fn revoke(&mut self, actor: &str, at: DateTime<Utc>) {
    self.revoked_on = Some(at);
    self.revoked_by = Some(actor.to_owned());
  }

  pub fn restore(&mut self) {
    self.revoked_on = None;
    self.revoked_by = None;
  }

  /// Apply a set of already-validated profile changes.
  ///
  /// Only fields that are present *and* differ from the current value are
  /// written. Returns `true` if anything changed; the caller decides whether
  /// to bump the audit fields.
  pub fn apply_profile(&mut self, changes: &ProfileChanges) -> bool {
    let mut changed = false;

    if let Some(name) = changes.name.as_deref()
      && !name.is_empty()
      && self.name != name
    {
      self.name = name.to_owned();
      changed = true;
    }
    if let Some(gender) = changes.gender
      && self.gender != gender
    {
      self.gender = gender;
      changed = true;
    }
    if let Some(birthday) = changes.birthday
      && self.birthday != Some(birthday)
    {
      self.birthday = Some(birthday);
      changed = true;
    }

    changed
  }

  pub fn view(&self) -> AccountView {
    AccountView {
      account_id:  self.account_id,
      login:       self.login.clone(),
      name:        self.name.clone(),
      gender:      self.gender,
      birthday:    self.birthday,
      is_admin:    self.is_admin,
      is_active:   self.is_active(),
      created_on:  self.created_on,
      created_by:  self.created_by.clone(),
      modified_on: self.modified_on,
      modified_by: self.modified_by.clone(),
      revoked_on:  self.revoked_on,
      revoked_by:  self.revoked_by.clone(),
    }
  }

  pub fn own_profile(&self) -> OwnProfile {
    OwnProfile {
      login:      self.login.clone(),
      name:       self.name.clone(),
      gender:     self.gender,
      birthday:   self.birthday,
      created_on: self.created_on,
    }
  }
}

/// Fields supplied by an administrator when creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
  pub login:    String,
  pub password: String,
  pub name:     String,
  pub gender:   i32,
  #[serde(default)]
  pub birthday: Option<NaiveDate>,
  #[serde(default)]
  pub is_admin: bool,
}

/// A partial profile update. Absent fields are left alone; an empty name is
/// treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
  pub name:     Option<String>,
  pub gender:   Option<i32>,
  pub birthday: Option<NaiveDate>,
}

/// What an administrator sees of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
  pub account_id:  Uuid,
  pub login:       String,
  pub name:        String,
  pub gender:      i32,
  pub birthday:    Option<NaiveDate>,
  pub is_admin:    bool,
  /// Derived: `true` iff the account has not been revoked.
  pub is_active:   bool,
  pub created_on:  DateTime<Utc>,
  pub created_by:  String,
  pub modified_on: DateTime<Utc>,
  pub modified_by: String,
  pub revoked_on:  Option<DateTime<Utc>>,
  pub revoked_by:  Option<String>,
}

/// What a subject sees of their own account after re-authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnProfile {
  pub login:      String,
  pub name:       String,
  pub gender:     i32,
  pub birthday:   Option<NaiveDate>,
  pub created_on: DateTime<Utc>,
}
