//! Configuration errors for `roster-identity`.
//!
//! Per-operation failures use [`roster_core::Error`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("signing key is missing or empty")]
  MissingSigningKey,
}
