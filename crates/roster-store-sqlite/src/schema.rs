//! SQL schema for the Roster SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS accounts (
    account_id      TEXT PRIMARY KEY,
    login           TEXT NOT NULL UNIQUE,  -- unique across all lifecycle states
    password_digest TEXT NOT NULL,
    name            TEXT NOT NULL,
    gender          INTEGER NOT NULL CHECK (gender BETWEEN 0 AND 2),
    birthday        TEXT,                  -- YYYY-MM-DD or NULL
    is_admin        INTEGER NOT NULL DEFAULT 0,
    created_on      TEXT NOT NULL,         -- RFC 3339 UTC, fixed precision
    created_by      TEXT NOT NULL,
    modified_on     TEXT NOT NULL,
    modified_by     TEXT NOT NULL,
    revoked_on      TEXT,                  -- NULL while active
    revoked_by      TEXT
);

CREATE INDEX IF NOT EXISTS accounts_created_idx ON accounts(created_on);
CREATE INDEX IF NOT EXISTS accounts_revoked_idx ON accounts(revoked_on);

PRAGMA user_version = 1;
";
