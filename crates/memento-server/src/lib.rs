//! HTTP layer for the Memento server.
//!
//! Exposes an axum [`Router`] serving TimeGates and TimeMaps (RFC 7089)
//! backed by any [`HistoryStore`].

pub mod error;
pub mod etag;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::{Path, State},
  http::{HeaderMap, HeaderValue, Method, header},
  response::Response,
  routing::any,
};
use memento_core::{negotiate::BeforeFirst, store::HistoryStore, uri::UriScheme};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use error::Endpoint;
use handlers::{VARY_TIMEGATE, timegate, timemap};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_mementos_per_page() -> usize { 500 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// Prefix of every URI the server generates, e.g. `http://example.com/wiki`.
  pub base_url:          String,
  pub store_path:        PathBuf,
  /// Upper bound on the mementos listed by one TimeMap page.
  #[serde(default = "default_mementos_per_page")]
  pub mementos_per_page: usize,
  #[serde(default)]
  pub before_first:      BeforeFirst,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: HistoryStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub uris:   Arc<UriScheme>,
}

impl<S: HistoryStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let uris = UriScheme::new(config.base_url.clone());
    Self { store: Arc::new(store), config: Arc::new(config), uris: Arc::new(uris) }
  }
}

impl<S: HistoryStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
      uris:   Arc::clone(&self.uris),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the Memento server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: HistoryStore + 'static,
{
  Router::new()
    .route("/TimeGate/{*resource}", any(timegate_handler::<S>))
    .route("/TimeMap/{*path}",      any(timemap_handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Route handlers ──────────────────────────────────────────────────────────

async fn timegate_handler<S>(
  State(state): State<AppState<S>>,
  Path(resource): Path<String>,
  method: Method,
  headers: HeaderMap,
) -> Response
where
  S: HistoryStore + 'static,
{
  let mut res = match method.as_str() {
    "GET" | "HEAD" => timegate::handler(&state, &method, &headers, &resource).await,
    _ => Err(Error::MethodNotAllowed),
  }
  .into_response_or_err(Endpoint::TimeGate);

  res
    .headers_mut()
    .insert(header::VARY, HeaderValue::from_static(VARY_TIMEGATE));
  res
}

async fn timemap_handler<S>(
  State(state): State<AppState<S>>,
  Path(path): Path<String>,
  method: Method,
  headers: HeaderMap,
) -> Response
where
  S: HistoryStore + 'static,
{
  match method.as_str() {
    "GET" | "HEAD" => timemap::handler(&state, &method, &headers, &path).await,
    _ => Err(Error::MethodNotAllowed),
  }
  .into_response_or_err(Endpoint::TimeMap)
}

// ─── Helper trait ────────────────────────────────────────────────────────────

trait IntoResponseOrErr {
  fn into_response_or_err(self, endpoint: Endpoint) -> Response;
}

impl IntoResponseOrErr for Result<Response, Error> {
  fn into_response_or_err(self, endpoint: Endpoint) -> Response {
    match self {
      Ok(r)  => r,
      Err(e) => e.into_response_at(endpoint),
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
