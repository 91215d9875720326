//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    let ApiError::Core(e) = self;
    match e {
      Error::NotAuthenticated | Error::InvalidCredentials | Error::AccountRevoked(_) => {
        StatusCode::UNAUTHORIZED
      }
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::AlreadyExists(_) => StatusCode::CONFLICT,
      Error::InvalidInput(_) | Error::WrongPassword => StatusCode::BAD_REQUEST,
      Error::MalformedToken(_) | Error::Store(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let ApiError::Core(e) = &self;
    let message = if e.is_internal() {
      tracing::error!(error = %e, "internal error while handling request");
      "internal server error".to_owned()
    } else {
      e.to_string()
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
