//! The phase engine: derives what the service currently allows from the
//! active campaign and the current time.
//!
//! Phase flags are computed independently because a campaign's windows may
//! overlap. All windows are half-open: a start instant is inside, an end
//! instant is outside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::campaign::Campaign;

/// A single composite label for the current phase.
///
/// Picked from the independent flags of [`PhaseStatus`] in the order survey,
/// profile update, results released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignPhase {
  Closed,
  SurveyOpen,
  ProfileUpdate,
  ResultsReleased,
}

/// Everything a caller needs to gate a feature on the campaign schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStatus {
  pub survey_active:         bool,
  pub profile_update_active: bool,
  /// Always equal to `profile_update_active`.
  pub messaging_active:      bool,
  pub results_released:      bool,
  pub campaign_id:           Option<Uuid>,
  pub campaign_name:         Option<String>,
  pub survey_close:          Option<DateTime<Utc>>,
  pub results_release:       Option<DateTime<Utc>>,
  pub server_time:           DateTime<Utc>,
}

fn within(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
  start <= now && now < end
}

impl PhaseStatus {
  /// All flags off. Reported when there is no active campaign and when the
  /// campaign store cannot be read.
  pub fn closed(now: DateTime<Utc>) -> Self {
    Self {
      survey_active:         false,
      profile_update_active: false,
      messaging_active:      false,
      results_released:      false,
      campaign_id:           None,
      campaign_name:         None,
      survey_close:          None,
      results_release:       None,
      server_time:           now,
    }
  }

  /// Evaluate `campaign` at `now`.
  pub fn evaluate(campaign: Option<&Campaign>, now: DateTime<Utc>) -> Self {
    let Some(campaign) = campaign else {
      return Self::closed(now);
    };
    let schedule = &campaign.schedule;

    let survey_active =
      within(now, schedule.survey_open, schedule.survey_close);
    let profile_update_active = schedule
      .profile_update_window()
      .is_some_and(|(start, end)| within(now, start, end));
    let results_released = now >= schedule.results_release;

    Self {
      survey_active,
      profile_update_active,
      messaging_active: profile_update_active,
      results_released,
      campaign_id: Some(campaign.campaign_id),
      campaign_name: Some(campaign.name.clone()),
      survey_close: Some(schedule.survey_close),
      results_release: Some(schedule.results_release),
      server_time: now,
    }
  }

  pub fn phase(&self) -> CampaignPhase {
    if self.survey_active {
      CampaignPhase::SurveyOpen
    } else if self.profile_update_active {
      CampaignPhase::ProfileUpdate
    } else if self.results_released {
      CampaignPhase::ResultsReleased
    } else {
      CampaignPhase::Closed
    }
  }

  /// Matching runs once the survey window has closed for good.
  pub fn matching_permitted(&self) -> bool {
    self
      .survey_close
      .is_some_and(|close| self.server_time >= close)
  }

  /// Crush lists may be edited while either the survey or the
  /// profile-update window is open.
  pub fn crush_edits_permitted(&self) -> bool {
    self.survey_active || self.profile_update_active
  }
}

/// The composite phase of `campaign` at `now`.
pub fn phase(campaign: Option<&Campaign>, now: DateTime<Utc>) -> CampaignPhase {
  PhaseStatus::evaluate(campaign, now).phase()
}
