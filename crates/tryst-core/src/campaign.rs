//! Campaigns: the time-boxed matchmaking rounds that every other subsystem is
//! gated on.
//!
//! A campaign carries its schedule (survey window, optional profile-update
//! window, results release) and the scoring configuration used by the
//! matcher. At most one campaign is active at a time; the store enforces it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Attributes ──────────────────────────────────────────────────────────────

/// A survey attribute the scorer knows how to compare. Weight maps are keyed
/// by this enum, so an unrecognised key fails deserialisation outright.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
  Personality,
  Interests,
  Values,
  Lifestyle,
  Demographics,
}

impl Attribute {
  pub const ALL: [Attribute; 5] = [
    Attribute::Personality,
    Attribute::Interests,
    Attribute::Values,
    Attribute::Lifestyle,
    Attribute::Demographics,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Personality => "personality",
      Self::Interests => "interests",
      Self::Values => "values",
      Self::Lifestyle => "lifestyle",
      Self::Demographics => "demographics",
    }
  }
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Scoring parameters for a campaign.
///
/// Weights are summed raw; they need not add up to 1, so the achievable score
/// range differs between campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
  pub weights:                     BTreeMap<Attribute, f64>,
  /// How many matches a user receives by default.
  pub num_matches:                 u32,
  pub mutual_crush_bonus:          f64,
  pub one_way_crush_bonus:         f64,
  /// Candidates scoring strictly below this are never ranked.
  pub minimum_compatibility_score: f64,
}

impl CampaignConfig {
  /// Reject configurations the scorer cannot use meaningfully.
  ///
  /// Every attribute must carry an explicit weight; `0.0` switches one off.
  pub fn validate(&self) -> Result<()> {
    if let Some(missing) = Attribute::ALL
      .iter()
      .find(|attr| !self.weights.contains_key(*attr))
    {
      return Err(Error::InvalidConfig(format!(
        "weights must include {}",
        missing.as_str()
      )));
    }
    for (attr, weight) in &self.weights {
      if !weight.is_finite() || *weight < 0.0 {
        return Err(Error::InvalidConfig(format!(
          "weight for {} must be a finite non-negative number, got {weight}",
          attr.as_str()
        )));
      }
    }
    if self.num_matches == 0 {
      return Err(Error::InvalidConfig("num_matches must be at least 1".into()));
    }
    for (name, value) in [
      ("mutual_crush_bonus", self.mutual_crush_bonus),
      ("one_way_crush_bonus", self.one_way_crush_bonus),
    ] {
      if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidConfig(format!(
          "{name} must be a finite non-negative number, got {value}"
        )));
      }
    }
    if !self.minimum_compatibility_score.is_finite() {
      return Err(Error::InvalidConfig(
        "minimum_compatibility_score must be finite".into(),
      ));
    }
    Ok(())
  }

  pub fn weight(&self, attr: Attribute) -> Option<f64> {
    self.weights.get(&attr).copied()
  }
}

// ─── Schedule ────────────────────────────────────────────────────────────────

/// The dated windows of a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
  pub survey_open:          DateTime<Utc>,
  pub survey_close:         DateTime<Utc>,
  pub profile_update_start: Option<DateTime<Utc>>,
  pub profile_update_end:   Option<DateTime<Utc>>,
  pub results_release:      DateTime<Utc>,
}

impl Schedule {
  pub fn validate(&self) -> Result<()> {
    if self.survey_close < self.survey_open {
      return Err(Error::InvalidConfig(
        "survey_close must not precede survey_open".into(),
      ));
    }
    match (self.profile_update_start, self.profile_update_end) {
      (Some(start), Some(end)) if end < start => Err(Error::InvalidConfig(
        "profile_update_end must not precede profile_update_start".into(),
      )),
      (Some(_), None) | (None, Some(_)) => Err(Error::InvalidConfig(
        "profile update window needs both a start and an end".into(),
      )),
      _ => Ok(()),
    }
  }

  /// The configured profile-update window, if any.
  pub fn profile_update_window(
    &self,
  ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    self.profile_update_start.zip(self.profile_update_end)
  }
}

// ─── Campaign ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
  pub campaign_id:       Uuid,
  pub name:              String,
  #[serde(flatten)]
  pub schedule:          Schedule,
  pub is_active:         bool,
  pub algorithm_version: String,
  pub config:            CampaignConfig,
  pub created_at:        DateTime<Utc>,
}

impl Campaign {
  /// Checks run before a campaign may become active.
  pub fn validate(&self) -> Result<()> {
    self.schedule.validate()?;
    self.config.validate()
  }
}

/// Input to [`crate::store::MatchmakingStore::create_campaign`].
/// Identifier, activity flag and `created_at` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
  pub name:              String,
  #[serde(flatten)]
  pub schedule:          Schedule,
  #[serde(default = "default_algorithm_version")]
  pub algorithm_version: String,
  pub config:            CampaignConfig,
}

impl NewCampaign {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidConfig("campaign name must not be empty".into()));
    }
    self.schedule.validate()?;
    self.config.validate()
  }
}

fn default_algorithm_version() -> String { "2.0".to_owned() }

/// Participation counters for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStats {
  pub campaign_id:        Uuid,
  /// Users with a completed survey.
  pub participants:       u64,
  pub users_with_matches: u64,
  pub total_matches:      u64,
}
