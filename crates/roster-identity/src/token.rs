//! Token Authority: mints and verifies HS256 bearer tokens.
//!
//! [`TokenAuthority::validate`] answers "can this token be trusted right
//! now"; [`TokenAuthority::extract_claims`] only parses. Callers that need the
//! payload go through [`TokenAuthority::authenticate`], which does both in
//! order.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use roster_core::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

pub const ISSUER: &str = "roster-auth";
pub const AUDIENCE: &str = "roster-client";

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME: Duration = Duration::hours(2);

const ROLE_ADMIN: &str = "admin";
const ROLE_USER: &str = "user";

// ─── Signing key ─────────────────────────────────────────────────────────────

/// The symmetric secret tokens are signed with.
///
/// Construction is the only place the "key must be present" precondition is
/// checked; a `SigningKey` that exists is always usable.
#[derive(Clone)]
pub struct SigningKey(String);

impl SigningKey {
  pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
    let secret = secret.into();
    if secret.trim().is_empty() {
      return Err(ConfigError::MissingSigningKey);
    }
    Ok(Self(secret))
  }
}

impl fmt::Debug for SigningKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SigningKey(..)")
  }
}

// ─── Claims ──────────────────────────────────────────────────────────────────

/// The identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub subject_id: Uuid,
  pub login:      String,
  pub is_admin:   bool,
}

/// Registered and private claims as written to the wire.
#[derive(Debug, Serialize)]
struct WireClaims<'a> {
  sub:  String,
  name: &'a str,
  role: &'static str,
  iss:  &'static str,
  aud:  &'static str,
  iat:  i64,
  exp:  i64,
}

/// Claims as read back. Everything is optional so that a missing field is
/// reported as [`Error::MalformedToken`] rather than a serde failure.
#[derive(Debug, Deserialize)]
struct LooseClaims {
  sub:  Option<String>,
  name: Option<String>,
  role: Option<String>,
}

// ─── Authority ───────────────────────────────────────────────────────────────

pub struct TokenAuthority {
  encoding: EncodingKey,
  decoding: DecodingKey,
  trusted:  Validation,
  parsing:  Validation,
}

impl fmt::Debug for TokenAuthority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenAuthority")
      .field("issuer", &ISSUER)
      .field("audience", &AUDIENCE)
      .finish_non_exhaustive()
  }
}

impl TokenAuthority {
  pub fn new(key: &SigningKey) -> Self {
    let mut trusted = Validation::new(Algorithm::HS256);
    trusted.set_issuer(&[ISSUER]);
    trusted.set_audience(&[AUDIENCE]);
    trusted.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
    trusted.leeway = 0;

    let mut parsing = Validation::new(Algorithm::HS256);
    parsing.insecure_disable_signature_validation();
    parsing.validate_exp = false;
    parsing.validate_aud = false;
    parsing.required_spec_claims.clear();

    Self {
      encoding: EncodingKey::from_secret(key.0.as_bytes()),
      decoding: DecodingKey::from_secret(key.0.as_bytes()),
      trusted,
      parsing,
    }
  }

  /// Mint a token valid for [`TOKEN_LIFETIME`] from now.
  pub fn issue(&self, subject_id: Uuid, login: &str, is_admin: bool) -> Result<String> {
    self.issue_at(subject_id, login, is_admin, Utc::now())
  }

  pub(crate) fn issue_at(
    &self,
    subject_id: Uuid,
    login:      &str,
    is_admin:   bool,
    issued_at:  DateTime<Utc>,
  ) -> Result<String> {
    let claims = WireClaims {
      sub:  subject_id.to_string(),
      name: login,
      role: if is_admin { ROLE_ADMIN } else { ROLE_USER },
      iss:  ISSUER,
      aud:  AUDIENCE,
      iat:  issued_at.timestamp(),
      exp:  (issued_at + TOKEN_LIFETIME).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| Error::Internal(format!("token encoding failed: {e}")))
  }

  /// `true` iff signature, issuer, audience, and expiry all check out now.
  pub fn validate(&self, token: &str) -> bool {
    decode::<LooseClaims>(token, &self.decoding, &self.trusted).is_ok()
  }

  /// Parse the claims without checking trust. Call [`validate`](Self::validate)
  /// first.
  pub fn extract_claims(&self, token: &str) -> Result<Principal> {
    let data = decode::<LooseClaims>(token, &self.decoding, &self.parsing)
      .map_err(|e| Error::MalformedToken(e.to_string()))?;
    let claims = data.claims;

    let subject = claims
      .sub
      .ok_or_else(|| Error::MalformedToken("missing subject".into()))?;
    let subject_id = Uuid::parse_str(&subject)
      .map_err(|_| Error::MalformedToken(format!("subject is not an id: {subject:?}")))?;
    let login = claims
      .name
      .ok_or_else(|| Error::MalformedToken("missing login".into()))?;

    Ok(Principal {
      subject_id,
      login,
      is_admin: claims.role.as_deref() == Some(ROLE_ADMIN),
    })
  }

  /// Validate, then extract. An untrusted token is
  /// [`Error::NotAuthenticated`]; a trusted one that cannot be parsed is
  /// [`Error::MalformedToken`].
  pub fn authenticate(&self, token: &str) -> Result<Principal> {
    if !self.validate(token) {
      return Err(Error::NotAuthenticated);
    }
    self.extract_claims(token)
  }
}
