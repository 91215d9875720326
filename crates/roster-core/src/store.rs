//! The `AccountStore` trait.
//!
//! Implemented by storage backends (e.g. `roster-store-sqlite`). The identity
//! services depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::account::Account;

/// Durable record of accounts.
///
/// Login uniqueness is a storage-level constraint: [`insert`](Self::insert)
/// and [`persist`](Self::persist) must fail with an error that converts into
/// [`crate::Error::AlreadyExists`] on a login collision, whatever the
/// lifecycle state of the colliding account.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn find_by_login<'a>(
    &'a self,
    login: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Insert a new account.
  fn insert<'a>(
    &'a self,
    account: &'a Account,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Overwrite an existing account in place, keyed by `account_id`.
  fn persist<'a>(
    &'a self,
    account: &'a Account,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All non-revoked accounts, oldest first.
  fn list_active(
    &self,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Accounts with a birthday for which `current_year - birth_year > years`.
  fn list_by_min_age(
    &self,
    years: u32,
    current_year: i32,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;
}
