//! Survey profiles: the per-user answers the scorer compares.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::campaign::Attribute;

/// A value of one attribute, borrowed from a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
  Categorical(Option<&'a str>),
  Set(&'a BTreeSet<String>),
}

/// A user's survey for the campaign it was submitted under. One per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyProfile {
  pub user_id:          Uuid,
  pub campaign_id:      Uuid,
  pub is_complete:      bool,
  pub personality_type: Option<String>,
  pub lifestyle:        Option<String>,
  /// Coarse demographic bucket (e.g. class year).
  pub demographics:     Option<String>,
  pub interests:        BTreeSet<String>,
  pub values:           BTreeSet<String>,
  /// Users this profile's owner has flagged interest in.
  pub crushes:          BTreeSet<Uuid>,
  pub completed_at:     Option<DateTime<Utc>>,
  pub updated_at:       DateTime<Utc>,
}

impl SurveyProfile {
  pub fn attribute(&self, attr: Attribute) -> AttributeValue<'_> {
    match attr {
      Attribute::Personality => {
        AttributeValue::Categorical(self.personality_type.as_deref())
      }
      Attribute::Lifestyle => AttributeValue::Categorical(self.lifestyle.as_deref()),
      Attribute::Demographics => {
        AttributeValue::Categorical(self.demographics.as_deref())
      }
      Attribute::Interests => AttributeValue::Set(&self.interests),
      Attribute::Values => AttributeValue::Set(&self.values),
    }
  }

  pub fn has_crush_on(&self, other: Uuid) -> bool {
    self.crushes.contains(&other)
  }
}

/// The body a user submits for their survey. `campaign_id`, `completed_at`
/// and `updated_at` are filled in by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveySubmission {
  #[serde(default)]
  pub is_complete:      bool,
  pub personality_type: Option<String>,
  pub lifestyle:        Option<String>,
  pub demographics:     Option<String>,
  #[serde(default)]
  pub interests:        BTreeSet<String>,
  #[serde(default)]
  pub values:           BTreeSet<String>,
  #[serde(default)]
  pub crushes:          BTreeSet<Uuid>,
}

impl SurveySubmission {
  /// Build the stored profile for `user_id` under `campaign_id`.
  ///
  /// `previous` is the user's existing survey, if any; its completion time is
  /// kept when the survey was already complete.
  pub fn into_profile(
    self,
    user_id: Uuid,
    campaign_id: Uuid,
    previous: Option<&SurveyProfile>,
    now: DateTime<Utc>,
  ) -> SurveyProfile {
    let completed_at = if self.is_complete {
      previous
        .filter(|p| p.campaign_id == campaign_id)
        .and_then(|p| p.completed_at)
        .or(Some(now))
    } else {
      None
    };

    SurveyProfile {
      user_id,
      campaign_id,
      is_complete: self.is_complete,
      personality_type: self.personality_type,
      lifestyle: self.lifestyle,
      demographics: self.demographics,
      interests: self.interests,
      values: self.values,
      crushes: self.crushes,
      completed_at,
      updated_at: now,
    }
  }
}
