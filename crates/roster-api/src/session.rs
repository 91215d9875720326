//! Handler for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/sign-in` | Body: `{"login":"…","password":"…"}`; 401 on any rejection |

use axum::{Json, extract::State};
use roster_core::store::AccountStore;
use roster_identity::Services;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignInBody {
  pub login:    String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
  pub access_token: String,
}

/// `POST /auth/sign-in`
pub async fn sign_in<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Json(body): Json<SignInBody>,
) -> Result<Json<SignInResponse>, ApiError> {
  let access_token = svc.sign_in.sign_in(&body.login, &body.password).await?;
  Ok(Json(SignInResponse { access_token }))
}
