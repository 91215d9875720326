//! Roster account server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layers
//! `ROSTER_*` environment variables on top, opens the SQLite store, seeds the
//! bootstrap administrator if configured, and serves the JSON API over HTTP.
//!
//! The signing secret is required; set `secret_key` in the config file or
//! `ROSTER_SECRET_KEY` in the environment.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use roster_api::ServerConfig;
use roster_identity::{Services, SigningKey, TokenAuthority, bootstrap};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster account server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("ROSTER")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let signing_key = SigningKey::new(server_cfg.secret_key.clone())
    .context("no token signing secret configured (set secret_key or ROSTER_SECRET_KEY)")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  let hasher = server_cfg.password_scheme.hasher();

  if let Some(admin) = &server_cfg.bootstrap_admin {
    let created =
      bootstrap::ensure_admin(&*store, &*hasher, &admin.login, &admin.password)
        .await
        .context("failed to seed bootstrap administrator")?;
    if !created {
      tracing::debug!(login = %admin.login, "bootstrap administrator already present");
    }
  }

  let tokens = Arc::new(TokenAuthority::new(&signing_key));
  let app = roster_api::router(Services::new(store, tokens, hasher));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
