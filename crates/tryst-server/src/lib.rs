//! HTTP front end for Tryst.
//!
//! Wires the SQLite store, the system clock and the matchmaking engine into
//! the JSON API, mounted under `/api/v1`.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tryst_core::{Engine, engine::DEFAULT_SCORING_DEADLINE, store::MatchmakingStore};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TRYST_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Budget for a single candidate scan.
  #[serde(default = "default_scoring_deadline_secs")]
  pub scoring_deadline_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_scoring_deadline_secs() -> u64 { DEFAULT_SCORING_DEADLINE.as_secs() }

impl ServerConfig {
  pub fn scoring_deadline(&self) -> Duration {
    Duration::from_secs(self.scoring_deadline_secs)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level [`Router`]: the API under `/api/v1` with request
/// tracing.
pub fn router<S>(engine: Arc<Engine<S>>) -> Router
where
  S: MatchmakingStore + 'static,
{
  Router::new()
    .nest("/api/v1", tryst_api::api_router(engine))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
