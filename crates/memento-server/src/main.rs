//! memento-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves TimeGates and TimeMaps over HTTP.
//!
//! # Importing histories
//!
//! A JSON array of `{"resource": ..., "timestamp": ...}` records can be
//! loaded into the store before serving:
//!
//! ```
//! cargo run -p memento-server -- --import history.json
//! ```
//!
//! Timestamps may be given as `YYYYMMDDHHMMSS` or as any HTTP-date form.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::Parser;
use memento_core::{
  datetime::{parse_http_date, parse_store_timestamp},
  store::HistoryStore,
  version::ResourceId,
};
use memento_server::{AppState, ServerConfig};
use memento_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Memento TimeGate and TimeMap server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load version records from a JSON file into the store and exit.
  #[arg(long, value_name = "FILE")]
  import: Option<PathBuf>,
}

/// One line of an import file.
#[derive(Deserialize)]
struct ImportRecord {
  resource:  String,
  timestamp: String,
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
    .add_source(config::Environment::with_prefix("MEMENTO"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  anyhow::ensure!(
    server_cfg.mementos_per_page >= 1,
    "mementos_per_page must be at least 1"
  );

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: import histories and exit.
  if let Some(file) = cli.import {
    let count = import(&store, &file).await?;
    println!("imported {count} versions from {}", file.display());
    return Ok(());
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = memento_server::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Record every version listed in `file`, registering resources as needed.
async fn import(store: &SqliteStore, file: &Path) -> anyhow::Result<usize> {
  let raw = std::fs::read_to_string(file)
    .with_context(|| format!("failed to read {}", file.display()))?;
  let records: Vec<ImportRecord> =
    serde_json::from_str(&raw).context("failed to parse import file")?;

  for record in &records {
    let resource = ResourceId::parse(&record.resource)
      .with_context(|| format!("bad resource in import file: {:?}", record.resource))?;
    let timestamp = parse_import_timestamp(&record.timestamp)
      .with_context(|| format!("bad timestamp for {resource}: {:?}", record.timestamp))?;

    if !store.resource_exists(&resource).await? {
      store.add_resource(&resource).await?;
    }
    let version = store.record_version(&resource, timestamp).await?;
    tracing::debug!(%resource, version = %version.id, "imported version");
  }

  Ok(records.len())
}

fn parse_import_timestamp(raw: &str) -> memento_core::Result<DateTime<Utc>> {
  parse_store_timestamp(raw).or_else(|_| parse_http_date(raw))
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
