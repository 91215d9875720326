//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The UNIQUE(login) constraint rejected a write.
  #[error("login already in use: {0}")]
  LoginTaken(String),

  /// `persist` targeted an account id with no row.
  #[error("account not found: {0}")]
  AccountNotFound(uuid::Uuid),
}

impl From<Error> for roster_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::LoginTaken(login) => roster_core::Error::AlreadyExists(login),
      Error::AccountNotFound(id) => roster_core::Error::NotFound(id.to_string()),
      other => roster_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
