//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision so that lexical order matches chronological order. Birthdays are
//! stored as `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use roster_core::account::Account;
use uuid::Uuid;

use crate::{Error, Result};

/// Column list shared by every `SELECT` so [`RawAccount::from_row`] can rely
/// on positions.
pub const ACCOUNT_COLUMNS: &str = "account_id, login, password_digest, name, gender, \
   birthday, is_admin, created_on, created_by, modified_on, modified_by, \
   revoked_on, revoked_by";

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

/// Owned parameter tuple for writing an [`Account`] row.
///
/// Built on the async side so the closure handed to `tokio_rusqlite` owns
/// plain strings.
pub struct AccountRow {
  pub account_id:      String,
  pub login:           String,
  pub password_digest: String,
  pub name:            String,
  pub gender:          i32,
  pub birthday:        Option<String>,
  pub is_admin:        bool,
  pub created_on:      String,
  pub created_by:      String,
  pub modified_on:     String,
  pub modified_by:     String,
  pub revoked_on:      Option<String>,
  pub revoked_by:      Option<String>,
}

impl From<&Account> for AccountRow {
  fn from(a: &Account) -> Self {
    Self {
      account_id:      encode_uuid(a.account_id),
      login:           a.login.clone(),
      password_digest: a.password_digest.clone(),
      name:            a.name.clone(),
      gender:          a.gender,
      birthday:        a.birthday.map(encode_date),
      is_admin:        a.is_admin,
      created_on:      encode_dt(a.created_on),
      created_by:      a.created_by.clone(),
      modified_on:     encode_dt(a.modified_on),
      modified_by:     a.modified_by.clone(),
      revoked_on:      a.revoked_on.map(encode_dt),
      revoked_by:      a.revoked_by.clone(),
    }
  }
}

/// An `accounts` row as read from SQLite, before decoding.
pub struct RawAccount {
  pub account_id:      String,
  pub login:           String,
  pub password_digest: String,
  pub name:            String,
  pub gender:          i32,
  pub birthday:        Option<String>,
  pub is_admin:        bool,
  pub created_on:      String,
  pub created_by:      String,
  pub modified_on:     String,
  pub modified_by:     String,
  pub revoked_on:      Option<String>,
  pub revoked_by:      Option<String>,
}

impl RawAccount {
  /// Read a row selected with [`ACCOUNT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:      row.get(0)?,
      login:           row.get(1)?,
      password_digest: row.get(2)?,
      name:            row.get(3)?,
      gender:          row.get(4)?,
      birthday:        row.get(5)?,
      is_admin:        row.get(6)?,
      created_on:      row.get(7)?,
      created_by:      row.get(8)?,
      modified_on:     row.get(9)?,
      modified_by:     row.get(10)?,
      revoked_on:      row.get(11)?,
      revoked_by:      row.get(12)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:      decode_uuid(&self.account_id)?,
      login:           self.login,
      password_digest: self.password_digest,
      name:            self.name,
      gender:          self.gender,
      birthday:        self.birthday.as_deref().map(decode_date).transpose()?,
      is_admin:        self.is_admin,
      created_on:      decode_dt(&self.created_on)?,
      created_by:      self.created_by,
      modified_on:     decode_dt(&self.modified_on)?,
      modified_by:     self.modified_by,
      revoked_on:      self.revoked_on.as_deref().map(decode_dt).transpose()?,
      revoked_by:      self.revoked_by,
    })
  }
}
