//! helpdesk server binary.
//!
//! Reads `helpdesk.toml` (or the path given with `--config`) plus any
//! `HELPDESK_*` environment variables, opens the SQLite store, seeds the
//! administrator account, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use helpdesk_core::{
  Helpdesk,
  credentials::{CredentialHasher, DEFAULT_ADMIN_PASSWORD},
};
use helpdesk_server::{AppState, ServerConfig};
use helpdesk_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "IT helpdesk ticketing server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "helpdesk.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HELPDESK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let hasher = CredentialHasher::new(server_cfg.hash_memory_kib, server_cfg.hash_iterations)
    .context("invalid password hashing parameters")?;
  let desk = Helpdesk::new(Arc::new(store), server_cfg.policy, hasher);

  let seed = server_cfg.admin_seed();
  desk
    .seed_admin(&seed)
    .await
    .context("failed to seed administrator account")?;
  if seed.password == DEFAULT_ADMIN_PASSWORD {
    tracing::warn!("administrator is using the default password; set admin_password");
  }

  let state = AppState {
    desk:   Arc::new(desk),
    tokens: Arc::new(server_cfg.token_issuer()),
    config: Arc::new(server_cfg.clone()),
  };

  let app = helpdesk_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(policy = ?server_cfg.policy, "Listening on http://{address}");
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
