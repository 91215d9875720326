//! [`SqliteStore`]: the SQLite implementation of [`AccountStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, ffi};
use uuid::Uuid;

use roster_core::{account::Account, store::AccountStore};

use crate::{
  Error, Result,
  encode::{ACCOUNT_COLUMNS, AccountRow, RawAccount, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An account store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of a write that may trip the UNIQUE(login) constraint.
enum Write {
  Done(usize),
  LoginTaken,
}

fn classify(result: rusqlite::Result<usize>) -> tokio_rusqlite::Result<Write> {
  match result {
    Ok(n) => Ok(Write::Done(n)),
    Err(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      Ok(Write::LoginTaken)
    }
    Err(e) => Err(e.into()),
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row `SELECT … WHERE <column> = ?1`.
  async fn find_one(&self, column: &'static str, key: String) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], RawAccount::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_many(
    &self,
    sql: String,
    params: Vec<i64>,
  ) -> Result<Vec<Account>> {
    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawAccount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
    self.find_one("account_id", encode_uuid(id)).await
  }

  async fn find_by_login(&self, login: &str) -> Result<Option<Account>> {
    self.find_one("login", login.to_owned()).await
  }

  async fn insert(&self, account: &Account) -> Result<()> {
    let row   = AccountRow::from(account);
    let login = account.login.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        classify(conn.execute(
          "INSERT INTO accounts (
             account_id, login, password_digest, name, gender, birthday,
             is_admin, created_on, created_by, modified_on, modified_by,
             revoked_on, revoked_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            row.account_id,
            row.login,
            row.password_digest,
            row.name,
            row.gender,
            row.birthday,
            row.is_admin,
            row.created_on,
            row.created_by,
            row.modified_on,
            row.modified_by,
            row.revoked_on,
            row.revoked_by,
          ],
        ))
      })
      .await?;

    match outcome {
      Write::Done(_) => Ok(()),
      Write::LoginTaken => Err(Error::LoginTaken(login)),
    }
  }

  async fn persist(&self, account: &Account) -> Result<()> {
    let row   = AccountRow::from(account);
    let login = account.login.clone();
    let id    = account.account_id;

    // Identity and creation fields are immutable and never rewritten.
    let outcome = self
      .conn
      .call(move |conn| {
        classify(conn.execute(
          "UPDATE accounts SET
             login = ?2, password_digest = ?3, name = ?4, gender = ?5,
             birthday = ?6, modified_on = ?7, modified_by = ?8,
             revoked_on = ?9, revoked_by = ?10
           WHERE account_id = ?1",
          rusqlite::params![
            row.account_id,
            row.login,
            row.password_digest,
            row.name,
            row.gender,
            row.birthday,
            row.modified_on,
            row.modified_by,
            row.revoked_on,
            row.revoked_by,
          ],
        ))
      })
      .await?;

    match outcome {
      Write::Done(0) => Err(Error::AccountNotFound(id)),
      Write::Done(_) => Ok(()),
      Write::LoginTaken => Err(Error::LoginTaken(login)),
    }
  }

  async fn list_active(&self) -> Result<Vec<Account>> {
    self
      .find_many(
        format!(
          "SELECT {ACCOUNT_COLUMNS} FROM accounts
           WHERE revoked_on IS NULL
           ORDER BY created_on ASC, rowid ASC"
        ),
        vec![],
      )
      .await
  }

  async fn list_by_min_age(&self, years: u32, current_year: i32) -> Result<Vec<Account>> {
    self
      .find_many(
        format!(
          "SELECT {ACCOUNT_COLUMNS} FROM accounts
           WHERE birthday IS NOT NULL
             AND (?1 - CAST(substr(birthday, 1, 4) AS INTEGER)) > ?2
           ORDER BY created_on ASC, rowid ASC"
        ),
        vec![i64::from(current_year), i64::from(years)],
      )
      .await
  }
}
