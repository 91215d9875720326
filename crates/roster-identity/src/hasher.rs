//! Credential hashing.
//!
//! Callers store the output of [`CredentialHasher::hash`] and later check a
//! candidate secret with [`CredentialHasher::verify`]. Plaintext is never
//! retained.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use rand_core::OsRng;
use roster_core::{Error, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// One-way transform of a plaintext secret into a storable digest.
pub trait CredentialHasher: Send + Sync {
  fn hash(&self, secret: &str) -> Result<String>;

  /// Check `secret` against a digest previously produced by [`hash`](Self::hash).
  ///
  /// The default compares digests, which is only correct for deterministic
  /// hashers. Salted schemes override it.
  fn verify(&self, secret: &str, digest: &str) -> bool {
    self.hash(secret).is_ok_and(|d| d == digest)
  }
}

/// Deterministic SHA-256, rendered as 64 uppercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl CredentialHasher for Sha256Hasher {
  fn hash(&self, secret: &str) -> Result<String> {
    Ok(hex::encode_upper(Sha256::digest(secret.as_bytes())))
  }
}

/// Salted argon2id, stored as a PHC string (`$argon2id$v=19$…`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
  fn hash(&self, secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(secret.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
  }

  fn verify(&self, secret: &str, digest: &str) -> bool {
    PasswordHash::new(digest)
      .is_ok_and(|parsed| Argon2::default().verify_password(secret.as_bytes(), &parsed).is_ok())
  }
}

/// Which hasher a deployment uses; selected from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
  #[default]
  Sha256,
  Argon2,
}

impl PasswordScheme {
  pub fn hasher(self) -> Arc<dyn CredentialHasher> {
    match self {
      Self::Sha256 => Arc::new(Sha256Hasher),
      Self::Argon2 => Arc::new(Argon2Hasher),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sha256_is_deterministic_uppercase_hex() {
    let h = Sha256Hasher;
    let a = h.hash("abcdef12").unwrap();
    let b = h.hash("abcdef12").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert_ne!(a, h.hash("abcdef13").unwrap());
  }

  #[test]
  fn sha256_verify_compares_digests() {
    let h = Sha256Hasher;
    let digest = h.hash("secret99").unwrap();
    assert!(h.verify("secret99", &digest));
    assert!(!h.verify("secret98", &digest));
  }

  #[test]
  fn argon2_salts_but_verifies() {
    let h = Argon2Hasher;
    let a = h.hash("secret99").unwrap();
    let b = h.hash("secret99").unwrap();
    assert_ne!(a, b);
    assert!(a.starts_with("$argon2"));
    assert!(h.verify("secret99", &a));
    assert!(h.verify("secret99", &b));
    assert!(!h.verify("secret98", &a));
    assert!(!h.verify("secret99", "not-a-phc-string"));
  }

  #[test]
  fn scheme_picks_hasher() {
    let digest = PasswordScheme::default().hasher().hash("x").unwrap();
    assert_eq!(digest.len(), 64);
    let phc = PasswordScheme::Argon2.hasher().hash("x").unwrap();
    assert!(phc.starts_with("$argon2"));
  }
}
