//! Handlers for `/admin/users` endpoints. All require an administrator token.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/users/by-id?id=` | |
//! | `GET`    | `/admin/users/by-login?login=` | |
//! | `POST`   | `/admin/users` | Body: [`NewAccount`]; returns 201 + view |
//! | `PUT`    | `/admin/users/password` | Body: `{"login","new_password"}` |
//! | `PUT`    | `/admin/users/profile` | Body: `{"login", "name"?, "gender"?, "birthday"?}` |
//! | `PUT`    | `/admin/users/login` | Body: `{"old_login","new_login"}` |
//! | `GET`    | `/admin/users/active` | Oldest first |
//! | `GET`    | `/admin/users/older-than?years=` | |
//! | `DELETE` | `/admin/users/by-login/{login}` | Soft delete |
//! | `POST`   | `/admin/users/by-login/{login}/restore` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  account::{AccountView, NewAccount, ProfileChanges},
  store::AccountStore,
};
use roster_identity::Services;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Bearer, error::ApiError};

// ─── Lookups ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ByIdParams {
  pub id: Uuid,
}

/// `GET /admin/users/by-id?id=<uuid>`
pub async fn get_by_id<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Query(params): Query<ByIdParams>,
) -> Result<Json<AccountView>, ApiError> {
  Ok(Json(svc.admin.get_by_id(&token, params.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ByLoginParams {
  pub login: String,
}

/// `GET /admin/users/by-login?login=<login>`
pub async fn get_by_login<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Query(params): Query<ByLoginParams>,
) -> Result<Json<AccountView>, ApiError> {
  Ok(Json(svc.admin.get_by_login(&token, &params.login).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /admin/users`
pub async fn create<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(body): Json<NewAccount>,
) -> Result<impl IntoResponse, ApiError> {
  let view = svc.admin.create(&token, body).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Mutations ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
  pub login:        String,
  pub new_password: String,
}

/// `PUT /admin/users/password`
pub async fn reset_password<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(body): Json<ResetPasswordBody>,
) -> Result<StatusCode, ApiError> {
  svc.admin.reset_password(&token, &body.login, &body.new_password).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
  pub login:   String,
  #[serde(flatten)]
  pub changes: ProfileChanges,
}

/// `PUT /admin/users/profile`
pub async fn update_profile<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(body): Json<ProfileBody>,
) -> Result<StatusCode, ApiError> {
  svc.admin.update_profile(&token, &body.login, body.changes).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
  pub old_login: String,
  pub new_login: String,
}

/// `PUT /admin/users/login`
pub async fn rename<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Json(body): Json<RenameBody>,
) -> Result<StatusCode, ApiError> {
  svc.admin.rename(&token, &body.old_login, &body.new_login).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Lists ────────────────────────────────────────────────────────────────────

/// `GET /admin/users/active`
pub async fn list_active<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
) -> Result<Json<Vec<AccountView>>, ApiError> {
  Ok(Json(svc.admin.list_active(&token).await?))
}

#[derive(Debug, Deserialize)]
pub struct OlderThanParams {
  pub years: i64,
}

/// `GET /admin/users/older-than?years=<n>`
pub async fn list_older_than<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Query(params): Query<OlderThanParams>,
) -> Result<Json<Vec<AccountView>>, ApiError> {
  Ok(Json(svc.admin.list_older_than(&token, params.years).await?))
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `DELETE /admin/users/by-login/{login}`
pub async fn soft_delete<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Path(login): Path<String>,
) -> Result<StatusCode, ApiError> {
  svc.admin.soft_delete(&token, &login).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/users/by-login/{login}/restore`
pub async fn restore<S: AccountStore + 'static>(
  State(svc): State<Services<S>>,
  Bearer(token): Bearer,
  Path(login): Path<String>,
) -> Result<StatusCode, ApiError> {
  svc.admin.restore(&token, &login).await?;
  Ok(StatusCode::NO_CONTENT)
}
