//! In-process stores for unit tests.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  campaign::{Campaign, CampaignStats, NewCampaign},
  ranking::Match,
  store::MatchmakingStore,
  survey::SurveyProfile,
};

#[derive(Default)]
struct Tables {
  campaigns: Vec<Campaign>,
  surveys:   HashMap<Uuid, SurveyProfile>,
  matches:   HashMap<Uuid, Vec<Match>>,
}

/// A [`MatchmakingStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  fn tables(&self) -> MutexGuard<'_, Tables> {
    self.tables.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl MatchmakingStore for MemoryStore {
  type Error = Error;

  async fn create_campaign(&self, input: NewCampaign) -> Result<Campaign> {
    input.validate()?;
    let campaign = Campaign {
      campaign_id:       Uuid::new_v4(),
      name:              input.name,
      schedule:          input.schedule,
      is_active:         false,
      algorithm_version: input.algorithm_version,
      config:            input.config,
      created_at:        Utc::now(),
    };
    self.tables().campaigns.push(campaign.clone());
    Ok(campaign)
  }

  async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
    Ok(self.tables().campaigns.iter().find(|c| c.campaign_id == id).cloned())
  }

  async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
    let mut all = self.tables().campaigns.clone();
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(all)
  }

  async fn activate_campaign(&self, id: Uuid) -> Result<Campaign> {
    let mut tables = self.tables();
    let target = tables
      .campaigns
      .iter()
      .find(|c| c.campaign_id == id)
      .ok_or(Error::CampaignNotFound(id))?;
    target.validate()?;
    for c in &mut tables.campaigns {
      c.is_active = c.campaign_id == id;
    }
    tables
      .campaigns
      .iter()
      .find(|c| c.campaign_id == id)
      .cloned()
      .ok_or(Error::CampaignNotFound(id))
  }

  async fn get_active_campaign(&self) -> Result<Option<Campaign>> {
    Ok(self.tables().campaigns.iter().find(|c| c.is_active).cloned())
  }

  async fn upsert_survey(&self, profile: SurveyProfile) -> Result<SurveyProfile> {
    self.tables().surveys.insert(profile.user_id, profile.clone());
    Ok(profile)
  }

  async fn get_survey(&self, user_id: Uuid) -> Result<Option<SurveyProfile>> {
    Ok(self.tables().surveys.get(&user_id).cloned())
  }

  async fn get_completed_surveys(&self, campaign_id: Uuid) -> Result<Vec<SurveyProfile>> {
    Ok(
      self
        .tables()
        .surveys
        .values()
        .filter(|s| s.campaign_id == campaign_id && s.is_complete)
        .cloned()
        .collect(),
    )
  }

  async fn replace_matches(&self, user_id: Uuid, matches: Vec<Match>) -> Result<()> {
    self.tables().matches.insert(user_id, matches);
    Ok(())
  }

  async fn get_matches(&self, user_id: Uuid) -> Result<Vec<Match>> {
    let mut matches = self.tables().matches.get(&user_id).cloned().unwrap_or_default();
    matches.sort_by_key(|m| m.rank);
    Ok(matches)
  }

  async fn campaign_stats(&self, campaign_id: Uuid) -> Result<CampaignStats> {
    let tables = self.tables();
    let participants = tables
      .surveys
      .values()
      .filter(|s| s.campaign_id == campaign_id && s.is_complete)
      .count() as u64;
    let per_user: Vec<usize> = tables
      .matches
      .values()
      .map(|ms| ms.iter().filter(|m| m.campaign_id == campaign_id).count())
      .filter(|n| *n > 0)
      .collect();
    Ok(CampaignStats {
      campaign_id,
      participants,
      users_with_matches: per_user.len() as u64,
      total_matches: per_user.iter().sum::<usize>() as u64,
    })
  }
}

/// A store whose every call fails, for exercising outage paths.
pub struct FailingStore;

#[derive(Debug, thiserror::Error)]
#[error("store offline")]
pub struct Offline;

impl MatchmakingStore for FailingStore {
  type Error = Offline;

  async fn create_campaign(&self, _: NewCampaign) -> Result<Campaign, Offline> { Err(Offline) }

  async fn get_campaign(&self, _: Uuid) -> Result<Option<Campaign>, Offline> { Err(Offline) }

  async fn list_campaigns(&self) -> Result<Vec<Campaign>, Offline> { Err(Offline) }

  async fn activate_campaign(&self, _: Uuid) -> Result<Campaign, Offline> { Err(Offline) }

  async fn get_active_campaign(&self) -> Result<Option<Campaign>, Offline> { Err(Offline) }

  async fn upsert_survey(&self, _: SurveyProfile) -> Result<SurveyProfile, Offline> {
    Err(Offline)
  }

  async fn get_survey(&self, _: Uuid) -> Result<Option<SurveyProfile>, Offline> { Err(Offline) }

  async fn get_completed_surveys(&self, _: Uuid) -> Result<Vec<SurveyProfile>, Offline> {
    Err(Offline)
  }

  async fn replace_matches(&self, _: Uuid, _: Vec<Match>) -> Result<(), Offline> { Err(Offline) }

  async fn get_matches(&self, _: Uuid) -> Result<Vec<Match>, Offline> { Err(Offline) }

  async fn campaign_stats(&self, _: Uuid) -> Result<CampaignStats, Offline> { Err(Offline) }
}
