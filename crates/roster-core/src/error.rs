//! Error taxonomy shared by every Roster operation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Token missing, malformed, expired, or signed by someone else.
  #[error("not authenticated")]
  NotAuthenticated,

  /// Valid token, but the principal is not an administrator.
  #[error("administrator role required")]
  Forbidden,

  #[error("account not found: {0}")]
  NotFound(String),

  #[error("login already in use: {0}")]
  AlreadyExists(String),

  #[error("account is revoked: {0}")]
  AccountRevoked(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("wrong password")]
  WrongPassword,

  /// Sign-in rejection. Unknown login, revoked account and bad password all
  /// collapse into this one variant.
  #[error("invalid login or password")]
  InvalidCredentials,

  /// Claims could not be read from a token that already passed validation.
  #[error("malformed token: {0}")]
  MalformedToken(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  /// Convert a backend error through its `Into<Error>` mapping.
  ///
  /// Lets call sites write `.map_err(Error::from_store)?` against any
  /// [`AccountStore`](crate::store::AccountStore) without naming its error type.
  pub fn from_store<E: Into<Error>>(e: E) -> Self { e.into() }

  /// `true` for failures that indicate a fault on our side rather than a
  /// rejected request.
  pub fn is_internal(&self) -> bool {
    matches!(
      self,
      Self::MalformedToken(_) | Self::Store(_) | Self::Internal(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
