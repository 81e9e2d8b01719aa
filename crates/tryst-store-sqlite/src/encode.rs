//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Sets and the campaign
//! config are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings, so their text order equals their byte order.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tryst_core::{
  campaign::{Campaign, CampaignConfig, Schedule},
  ranking::Match,
  survey::SurveyProfile,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_config(config: &CampaignConfig) -> Result<String> {
  Ok(serde_json::to_string(config)?)
}

pub fn encode_set<T: serde::Serialize>(set: &BTreeSet<T>) -> Result<String> {
  Ok(serde_json::to_string(set)?)
}

fn decode_set<T>(s: &str) -> Result<BTreeSet<T>>
where
  T: serde::de::DeserializeOwned + Ord,
{
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawCampaign`]'s field order.
pub const CAMPAIGN_COLUMNS: &str = "campaign_id, name, survey_open, survey_close,
  profile_update_start, profile_update_end, results_release, is_active,
  algorithm_version, config_json, created_at";

/// Raw values read directly from a `campaigns` row.
pub struct RawCampaign {
  pub campaign_id:          String,
  pub name:                 String,
  pub survey_open:          String,
  pub survey_close:         String,
  pub profile_update_start: Option<String>,
  pub profile_update_end:   Option<String>,
  pub results_release:      String,
  pub is_active:            bool,
  pub algorithm_version:    String,
  pub config_json:          String,
  pub created_at:           String,
}

impl RawCampaign {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      campaign_id:          row.get(0)?,
      name:                 row.get(1)?,
      survey_open:          row.get(2)?,
      survey_close:         row.get(3)?,
      profile_update_start: row.get(4)?,
      profile_update_end:   row.get(5)?,
      results_release:      row.get(6)?,
      is_active:            row.get(7)?,
      algorithm_version:    row.get(8)?,
      config_json:          row.get(9)?,
      created_at:           row.get(10)?,
    })
  }

  pub fn into_campaign(self) -> Result<Campaign> {
    Ok(Campaign {
      campaign_id:       decode_uuid(&self.campaign_id)?,
      name:              self.name,
      schedule:          Schedule {
        survey_open:          decode_dt(&self.survey_open)?,
        survey_close:         decode_dt(&self.survey_close)?,
        profile_update_start: decode_opt_dt(self.profile_update_start)?,
        profile_update_end:   decode_opt_dt(self.profile_update_end)?,
        results_release:      decode_dt(&self.results_release)?,
      },
      is_active:         self.is_active,
      algorithm_version: self.algorithm_version,
      config:            serde_json::from_str(&self.config_json)?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawSurvey`]'s field order.
pub const SURVEY_COLUMNS: &str = "user_id, campaign_id, is_complete,
  personality_type, lifestyle, demographics, interests_json, values_json,
  crushes_json, completed_at, updated_at";

/// Raw values read directly from a `surveys` row.
pub struct RawSurvey {
  pub user_id:          String,
  pub campaign_id:      String,
  pub is_complete:      bool,
  pub personality_type: Option<String>,
  pub lifestyle:        Option<String>,
  pub demographics:     Option<String>,
  pub interests_json:   String,
  pub values_json:      String,
  pub crushes_json:     String,
  pub completed_at:     Option<String>,
  pub updated_at:       String,
}

impl RawSurvey {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:          row.get(0)?,
      campaign_id:      row.get(1)?,
      is_complete:      row.get(2)?,
      personality_type: row.get(3)?,
      lifestyle:        row.get(4)?,
      demographics:     row.get(5)?,
      interests_json:   row.get(6)?,
      values_json:      row.get(7)?,
      crushes_json:     row.get(8)?,
      completed_at:     row.get(9)?,
      updated_at:       row.get(10)?,
    })
  }

  pub fn into_profile(self) -> Result<SurveyProfile> {
    Ok(SurveyProfile {
      user_id:          decode_uuid(&self.user_id)?,
      campaign_id:      decode_uuid(&self.campaign_id)?,
      is_complete:      self.is_complete,
      personality_type: self.personality_type,
      lifestyle:        self.lifestyle,
      demographics:     self.demographics,
      interests:        decode_set(&self.interests_json)?,
      values:           decode_set(&self.values_json)?,
      crushes:          decode_set(&self.crushes_json)?,
      completed_at:     decode_opt_dt(self.completed_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawMatch`]'s field order.
pub const MATCH_COLUMNS: &str = "match_id, campaign_id, user_id,
  matched_user_id, compatibility_score, match_rank, is_mutual_crush,
  created_at";

/// Raw values read directly from a `matches` row.
pub struct RawMatch {
  pub match_id:            String,
  pub campaign_id:         String,
  pub user_id:             String,
  pub matched_user_id:     String,
  pub compatibility_score: f64,
  pub rank:                u32,
  pub is_mutual_crush:     bool,
  pub created_at:          String,
}

impl RawMatch {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      match_id:            row.get(0)?,
      campaign_id:         row.get(1)?,
      user_id:             row.get(2)?,
      matched_user_id:     row.get(3)?,
      compatibility_score: row.get(4)?,
      rank:                row.get(5)?,
      is_mutual_crush:     row.get(6)?,
      created_at:          row.get(7)?,
    })
  }

  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      match_id:            decode_uuid(&self.match_id)?,
      campaign_id:         decode_uuid(&self.campaign_id)?,
      user_id:             decode_uuid(&self.user_id)?,
      matched_user_id:     decode_uuid(&self.matched_user_id)?,
      compatibility_score: self.compatibility_score,
      rank:                self.rank,
      is_mutual_crush:     self.is_mutual_crush,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}
