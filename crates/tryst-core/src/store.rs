//! The `MatchmakingStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tryst-store-sqlite`).
//! The engine and the API depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  campaign::{Campaign, CampaignStats, NewCampaign},
  ranking::Match,
  survey::SurveyProfile,
};

/// Persistence for campaigns, surveys and matches.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MatchmakingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Campaigns ─────────────────────────────────────────────────────────

  /// Validate and persist a new, inactive campaign.
  fn create_campaign(
    &self,
    input: NewCampaign,
  ) -> impl Future<Output = Result<Campaign, Self::Error>> + Send + '_;

  fn get_campaign(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Campaign>, Self::Error>> + Send + '_;

  /// All campaigns, newest first.
  fn list_campaigns(
    &self,
  ) -> impl Future<Output = Result<Vec<Campaign>, Self::Error>> + Send + '_;

  /// Make `id` the only active campaign. Its schedule and config are
  /// re-validated first.
  fn activate_campaign(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Campaign, Self::Error>> + Send + '_;

  /// The currently active campaign, if any.
  fn get_active_campaign(
    &self,
  ) -> impl Future<Output = Result<Option<Campaign>, Self::Error>> + Send + '_;

  // ── Surveys ───────────────────────────────────────────────────────────

  /// Insert or replace the survey owned by `profile.user_id`.
  fn upsert_survey(
    &self,
    profile: SurveyProfile,
  ) -> impl Future<Output = Result<SurveyProfile, Self::Error>> + Send + '_;

  fn get_survey(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<SurveyProfile>, Self::Error>> + Send + '_;

  /// Every completed survey submitted under `campaign_id`.
  fn get_completed_surveys(
    &self,
    campaign_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SurveyProfile>, Self::Error>> + Send + '_;

  // ── Matches ───────────────────────────────────────────────────────────

  /// Atomically swap the user's whole match set for `matches`.
  fn replace_matches(
    &self,
    user_id: Uuid,
    matches: Vec<Match>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The user's persisted matches, ordered by rank.
  fn get_matches(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  fn campaign_stats(
    &self,
    campaign_id: Uuid,
  ) -> impl Future<Output = Result<CampaignStats, Self::Error>> + Send + '_;
}
