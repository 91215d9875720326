//! JSON HTTP surface for Roster.
//!
//! Exposes an axum [`Router`] that maps each identity operation onto one
//! route. Handlers only extract the bearer token and typed parameters; every
//! decision is made by [`roster_identity::Services`].

pub mod admin;
pub mod auth;
pub mod error;
pub mod me;
pub mod session;

pub use error::ApiError;

use std::path::PathBuf;

use axum::{
  Router,
  extract::Request,
  routing::{delete, get, post, put},
};
use roster_core::store::AccountStore;
use roster_identity::{PasswordScheme, Services};
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `ROSTER_*` environment variables.
///
/// Deliberately not `Debug`: it carries the signing secret.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  /// SQLite database path; `:memory:` is accepted.
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Token signing secret. Startup fails if this is empty.
  #[serde(default)]
  pub secret_key:      String,
  #[serde(default)]
  pub password_scheme: PasswordScheme,
  /// Administrator to create on first start, if any.
  #[serde(default)]
  pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Deserialize, Clone)]
pub struct BootstrapAdmin {
  pub login:    String,
  pub password: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("roster.db") }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the account service.
///
/// Every request gets an `x-request-id` (kept if the caller sent one), which
/// is recorded on the request span and echoed on the response.
pub fn router<S>(services: Services<S>) -> Router
where
  S: AccountStore + 'static,
{
  Router::new()
    // Sign-in
    .route("/auth/sign-in", post(session::sign_in::<S>))
    // Administration
    .route("/admin/users", post(admin::create::<S>))
    .route("/admin/users/by-id", get(admin::get_by_id::<S>))
    .route("/admin/users/by-login", get(admin::get_by_login::<S>))
    .route("/admin/users/password", put(admin::reset_password::<S>))
    .route("/admin/users/profile", put(admin::update_profile::<S>))
    .route("/admin/users/login", put(admin::rename::<S>))
    .route("/admin/users/active", get(admin::list_active::<S>))
    .route("/admin/users/older-than", get(admin::list_older_than::<S>))
    .route("/admin/users/by-login/{login}", delete(admin::soft_delete::<S>))
    .route("/admin/users/by-login/{login}/restore", post(admin::restore::<S>))
    // Self-service
    .route("/me/profile", put(me::update_profile::<S>))
    .route("/me/password", put(me::change_password::<S>))
    .route("/me/login", put(me::change_login::<S>))
    .route("/me/data", post(me::get_own_data::<S>))
    .layer(PropagateRequestIdLayer::x_request_id())
    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
      let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
      tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id,
      )
    }))
    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    .layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any),
    )
    .with_state(services)
}

// ─── Integration tests ────────────────────────────────────────────────────────
