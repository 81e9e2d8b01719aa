//! Error types for `tryst-core`.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::phase::CampaignPhase;

#[derive(Debug, Error)]
pub enum Error {
  /// No campaign is currently active.
  #[error("no active campaign")]
  NoCampaign,

  #[error("campaign not found: {0}")]
  CampaignNotFound(Uuid),

  /// The user cannot take part yet, e.g. their survey is missing or
  /// incomplete. Actionable by the user.
  #[error("not eligible: {0}")]
  NotEligible(String),

  /// Another regeneration for the same user is already in flight.
  #[error("match regeneration already in progress for user {0}")]
  Conflict(Uuid),

  /// The requested operation is gated on a phase that is not active.
  #[error("operation not permitted during phase {0:?}")]
  PhaseClosed(CampaignPhase),

  #[error("invalid campaign config: {0}")]
  InvalidConfig(String),

  #[error("invalid request: {0}")]
  InvalidRequest(String),

  #[error("scoring exceeded deadline of {0:?}")]
  Timeout(Duration),

  /// A collaborator failed. Retryable from the caller's point of view.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error as [`Error::StoreUnavailable`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
