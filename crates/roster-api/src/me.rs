//! Handlers for `/me` endpoints: the caller acting on their own account.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/me/profile` | Body: `{"name"?, "gender"?, "birthday"?}` |
//! | `PUT`  | `/me/password` | Body: `{"old_password","new_password"}` |
//! | `PUT`  | `/me/login` | Body: `{"new_login"}` |
//! | `POST` | `/me/data` | Body: `{"login","password"}`; returns the profile |

use axum::{Json, extract::State, http::StatusCode};
use roster_core::{
  account::{OwnProfile, ProfileChanges},
  store::AccountStore,
};
use roster_identity::Services;
use serde::Deserialize;

use crate::{auth::Bearer, error::ApiError};

/// `PUT /me/profile`
pub async fn update_profile<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(changes): Json<ProfileChanges>,
) -> Result<StatusCode, ApiError> {
  svc.own.update_profile(&token, changes).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
  pub old_password: String,
  pub new_password: String,
}

/// `PUT /me/password`
pub async fn change_password<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(body): Json<ChangePasswordBody>,
) -> Result<StatusCode, ApiError> {
  svc
    .own
    .change_password(&token, &body.old_password, &body.new_password)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ChangeLoginBody {
  pub new_login: String,
}

/// `PUT /me/login`
pub async fn change_login<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(body): Json<ChangeLoginBody>,
) -> Result<StatusCode, ApiError> {
  svc.own.change_login(&token, &body.new_login).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct OwnDataBody {
  pub login:    String,
  pub password: String,
}

/// `POST /me/data`
pub async fn get_own_data<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(body): Json<OwnDataBody>,
) -> Result<Json<OwnProfile>, ApiError> {
  Ok(Json(svc.own.get_own_data(&token, &body.login, &body.password).await?))
}
