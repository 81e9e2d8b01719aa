//! Error type for `tryst-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tryst_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("campaign not found: {0}")]
  CampaignNotFound(uuid::Uuid),

  /// A replacement match set that would break the per-user rank invariants.
  #[error("invalid match set: {0}")]
  InvalidMatchSet(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
