//! Bearer-token extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use roster_core::Error;

use crate::error::ApiError;

/// The raw token presented by the caller. Its validity is checked by the
/// identity services, not here.
#[derive(Debug)]
pub struct Bearer(pub String);

/// Pull the token out of the `Authorization` header. A `Bearer ` prefix is
/// stripped if present; otherwise the whole value is taken as the token.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or(Error::NotAuthenticated)?;

  Ok(value.strip_prefix("Bearer ").unwrap_or(value).trim().to_owned())
}

impl<S> FromRequestParts<S> for Bearer
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    bearer_token(&parts.headers).map(Bearer)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: Option<&'static str>) -> HeaderMap {
    let mut h = HeaderMap::new();
    if let Some(v) = value {
      h.insert(header::AUTHORIZATION, HeaderValue::from_static(v));
    }
    h
  }

  #[test]
  fn strips_bearer_prefix() {
    assert_eq!(bearer_token(&headers(Some("Bearer abc.def.ghi"))).unwrap(), "abc.def.ghi");
  }

  #[test]
  fn accepts_bare_token() {
    assert_eq!(bearer_token(&headers(Some("abc.def.ghi"))).unwrap(), "abc.def.ghi");
  }

  #[test]
  fn missing_or_blank_header_is_not_authenticated() {
    for h in [headers(None), headers(Some("   "))] {
      assert!(matches!(
        bearer_token(&h),
        Err(ApiError::Core(Error::NotAuthenticated))
      ));
    }
  }
}
