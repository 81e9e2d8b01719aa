//! [`SqliteStore`], the SQLite implementation of [`MatchmakingStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tryst_core::{
  campaign::{Campaign, CampaignStats, NewCampaign},
  ranking::Match,
  store::MatchmakingStore,
  survey::SurveyProfile,
};

use crate::{
  Error, Result,
  encode::{
    CAMPAIGN_COLUMNS, MATCH_COLUMNS, RawCampaign, RawMatch, RawSurvey,
    SURVEY_COLUMNS, encode_config, encode_dt, encode_set, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tryst store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_campaign(&self, campaign: &Campaign) -> Result<()> {
    let id_str        = encode_uuid(campaign.campaign_id);
    let name          = campaign.name.clone();
    let open_str      = encode_dt(campaign.schedule.survey_open);
    let close_str     = encode_dt(campaign.schedule.survey_close);
    let pu_start_str  = campaign.schedule.profile_update_start.map(encode_dt);
    let pu_end_str    = campaign.schedule.profile_update_end.map(encode_dt);
    let release_str   = encode_dt(campaign.schedule.results_release);
    let is_active     = campaign.is_active;
    let version       = campaign.algorithm_version.clone();
    let config_str    = encode_config(&campaign.config)?;
    let created_str   = encode_dt(campaign.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO campaigns (
             campaign_id, name, survey_open, survey_close,
             profile_update_start, profile_update_end, results_release,
             is_active, algorithm_version, config_json, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            name,
            open_str,
            close_str,
            pu_start_str,
            pu_end_str,
            release_str,
            is_active,
            version,
            config_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Ranks must run 1..N in order and every match must belong to `user_id`.
/// Repeated or self matches are rejected by the table constraints.
fn check_match_set(user_id: Uuid, matches: &[Match]) -> Result<()> {
  for (expected, m) in (1u32..).zip(matches) {
    if m.user_id != user_id {
      return Err(Error::InvalidMatchSet(format!(
        "match {} belongs to user {}, not {user_id}",
        m.match_id, m.user_id
      )));
    }
    if m.rank != expected {
      return Err(Error::InvalidMatchSet(format!(
        "expected rank {expected}, got {}",
        m.rank
      )));
    }
  }
  Ok(())
}

// ─── MatchmakingStore impl ───────────────────────────────────────────────────

impl MatchmakingStore for SqliteStore {
  type Error = Error;

  // ── Campaigns ─────────────────────────────────────────────────────────────

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

    self.insert_campaign(&campaign).await?;
    Ok(campaign)
  }

  async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCampaign> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE campaign_id = ?1"),
            rusqlite::params![id_str],
            RawCampaign::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCampaign::into_campaign).transpose()
  }

  async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
    let raws: Vec<RawCampaign> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns"))?;
        let rows = stmt
          .query_map([], RawCampaign::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut campaigns = raws
      .into_iter()
      .map(RawCampaign::into_campaign)
      .collect::<Result<Vec<_>>>()?;
    campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(campaigns)
  }

  async fn activate_campaign(&self, id: Uuid) -> Result<Campaign> {
    let mut campaign = self
      .get_campaign(id)
      .await?
      .ok_or(Error::CampaignNotFound(id))?;
    campaign.validate()?;

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("UPDATE campaigns SET is_active = 0 WHERE is_active = 1", [])?;
        tx.execute(
          "UPDATE campaigns SET is_active = 1 WHERE campaign_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    campaign.is_active = true;
    Ok(campaign)
  }

  async fn get_active_campaign(&self) -> Result<Option<Campaign>> {
    let raw: Option<RawCampaign> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
               WHERE is_active = 1
               ORDER BY created_at DESC
               LIMIT 1"
            ),
            [],
            RawCampaign::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCampaign::into_campaign).transpose()
  }

  // ── Surveys ───────────────────────────────────────────────────────────────

  async fn upsert_survey(&self, profile: SurveyProfile) -> Result<SurveyProfile> {
    let user_str      = encode_uuid(profile.user_id);
    let campaign_str  = encode_uuid(profile.campaign_id);
    let is_complete   = profile.is_complete;
    let personality   = profile.personality_type.clone();
    let lifestyle     = profile.lifestyle.clone();
    let demographics  = profile.demographics.clone();
    let interests_str = encode_set(&profile.interests)?;
    let values_str    = encode_set(&profile.values)?;
    let crushes_str   = encode_set(&profile.crushes)?;
    let completed_str = profile.completed_at.map(encode_dt);
    let updated_str   = encode_dt(profile.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO surveys (
             user_id, campaign_id, is_complete, personality_type, lifestyle,
             demographics, interests_json, values_json, crushes_json,
             completed_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
           ON CONFLICT (user_id) DO UPDATE SET
             campaign_id      = excluded.campaign_id,
             is_complete      = excluded.is_complete,
             personality_type = excluded.personality_type,
             lifestyle        = excluded.lifestyle,
             demographics     = excluded.demographics,
             interests_json   = excluded.interests_json,
             values_json      = excluded.values_json,
             crushes_json     = excluded.crushes_json,
             completed_at     = excluded.completed_at,
             updated_at       = excluded.updated_at",
          rusqlite::params![
            user_str,
            campaign_str,
            is_complete,
            personality,
            lifestyle,
            demographics,
            interests_str,
            values_str,
            crushes_str,
            completed_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn get_survey(&self, user_id: Uuid) -> Result<Option<SurveyProfile>> {
    let user_str = encode_uuid(user_id);

    let raw: Option<RawSurvey> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SURVEY_COLUMNS} FROM surveys WHERE user_id = ?1"),
            rusqlite::params![user_str],
            RawSurvey::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSurvey::into_profile).transpose()
  }

  async fn get_completed_surveys(&self, campaign_id: Uuid) -> Result<Vec<SurveyProfile>> {
    let campaign_str = encode_uuid(campaign_id);

    let raws: Vec<RawSurvey> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SURVEY_COLUMNS} FROM surveys
           WHERE campaign_id = ?1 AND is_complete = 1
           ORDER BY user_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![campaign_str], RawSurvey::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSurvey::into_profile).collect()
  }

  // ── Matches ───────────────────────────────────────────────────────────────

  async fn replace_matches(&self, user_id: Uuid, matches: Vec<Match>) -> Result<()> {
    check_match_set(user_id, &matches)?;

    let user_str = encode_uuid(user_id);
    let rows: Vec<_> = matches
      .into_iter()
      .map(|m| {
        (
          encode_uuid(m.match_id),
          encode_uuid(m.campaign_id),
          encode_uuid(m.matched_user_id),
          m.compatibility_score,
          m.rank,
          m.is_mutual_crush,
          encode_dt(m.created_at),
        )
      })
      .collect();

    // Delete and insert in one transaction so readers never see a partial
    // set.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM matches WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO matches (
               match_id, campaign_id, user_id, matched_user_id,
               compatibility_score, match_rank, is_mutual_crush, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;
          for (match_id, campaign_id, matched, score, rank, mutual, created) in rows {
            stmt.execute(rusqlite::params![
              match_id, campaign_id, user_str, matched, score, rank, mutual, created,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn get_matches(&self, user_id: Uuid) -> Result<Vec<Match>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MATCH_COLUMNS} FROM matches
           WHERE user_id = ?1
           ORDER BY match_rank"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn campaign_stats(&self, campaign_id: Uuid) -> Result<CampaignStats> {
    let campaign_str = encode_uuid(campaign_id);

    let (participants, users_with_matches, total_matches): (i64, i64, i64) = self
      .conn
      .call(move |conn| {
        let participants: i64 = conn.query_row(
          "SELECT COUNT(*) FROM surveys WHERE campaign_id = ?1 AND is_complete = 1",
          rusqlite::params![campaign_str],
          |r| r.get(0),
        )?;
        let (users, total): (i64, i64) = conn.query_row(
          "SELECT COUNT(DISTINCT user_id), COUNT(*) FROM matches WHERE campaign_id = ?1",
          rusqlite::params![campaign_str],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok((participants, users, total))
      })
      .await?;

    Ok(CampaignStats {
      campaign_id,
      participants: participants as u64,
      users_with_matches: users_with_matches as u64,
      total_matches: total_matches as u64,
    })
  }
}
