//! [`Engine`] ties the phase engine, scorer and ranker to a store and a
//! clock.
//!
//! The engine holds no per-request state beyond the registry of users whose
//! matches are being regenerated right now. Everything else is computed from
//! the store on each call.

use std::{
  collections::{BTreeSet, HashSet},
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  campaign::Campaign,
  clock::Clock,
  phase::PhaseStatus,
  ranking::{self, Match},
  store::MatchmakingStore,
  survey::{SurveyProfile, SurveySubmission},
};

/// Default budget for one candidate scan.
pub const DEFAULT_SCORING_DEADLINE: Duration = Duration::from_secs(10);

// ─── In-flight registry ──────────────────────────────────────────────────────

/// Users whose match sets are currently being regenerated.
#[derive(Debug, Default)]
struct InFlight(Mutex<HashSet<Uuid>>);

impl InFlight {
  fn acquire(&self, user_id: Uuid) -> Result<InFlightGuard<'_>> {
    let mut users = self.0.lock().unwrap_or_else(|e| e.into_inner());
    if !users.insert(user_id) {
      return Err(Error::Conflict(user_id));
    }
    Ok(InFlightGuard { registry: self, user_id })
  }
}

/// Releases the user's slot on drop, including on error paths.
struct InFlightGuard<'a> {
  registry: &'a InFlight,
  user_id:  Uuid,
}

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    let mut users = self.registry.0.lock().unwrap_or_else(|e| e.into_inner());
    users.remove(&self.user_id);
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine<S> {
  store:     Arc<S>,
  clock:     Arc<dyn Clock>,
  in_flight: InFlight,
  deadline:  Duration,
}

impl<S: MatchmakingStore> Engine<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
    Self {
      store,
      clock,
      in_flight: InFlight::default(),
      deadline: DEFAULT_SCORING_DEADLINE,
    }
  }

  /// Override the budget for a single candidate scan.
  pub fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn now(&self) -> DateTime<Utc> { self.clock.now() }

  // ── Phase ─────────────────────────────────────────────────────────────

  /// The current phase flags.
  ///
  /// Never fails: if the campaign store cannot be read every flag is
  /// reported inactive.
  pub async fn phase_status(&self) -> PhaseStatus {
    let now = self.clock.now();
    match self.store.get_active_campaign().await {
      Ok(campaign) => PhaseStatus::evaluate(campaign.as_ref(), now),
      Err(e) => {
        tracing::warn!(error = %e, "campaign store unavailable; reporting all phases closed");
        PhaseStatus::closed(now)
      }
    }
  }

  /// The active campaign and its phase flags at the current time.
  pub async fn active_campaign(&self) -> Result<(Campaign, PhaseStatus)> {
    let campaign = self
      .store
      .get_active_campaign()
      .await
      .map_err(Error::store)?
      .ok_or(Error::NoCampaign)?;
    let status = PhaseStatus::evaluate(Some(&campaign), self.clock.now());
    Ok((campaign, status))
  }

  // ── Surveys ───────────────────────────────────────────────────────────

  /// Store a user's survey answers. Only allowed while the survey is open.
  pub async fn submit_survey(
    &self,
    user_id: Uuid,
    submission: SurveySubmission,
  ) -> Result<SurveyProfile> {
    let (campaign, status) = self.active_campaign().await?;
    if !status.survey_active {
      return Err(Error::PhaseClosed(status.phase()));
    }
    if submission.crushes.contains(&user_id) {
      return Err(Error::InvalidRequest("a user cannot flag themself".into()));
    }

    let previous = self.store.get_survey(user_id).await.map_err(Error::store)?;
    let profile = submission.into_profile(
      user_id,
      campaign.campaign_id,
      previous.as_ref(),
      status.server_time,
    );

    let saved = self.store.upsert_survey(profile).await.map_err(Error::store)?;
    tracing::debug!(%user_id, complete = saved.is_complete, "survey saved");
    Ok(saved)
  }

  /// Replace the user's crush list. Allowed while either the survey or the
  /// profile-update window is open.
  pub async fn update_crushes(
    &self,
    user_id: Uuid,
    crushes: BTreeSet<Uuid>,
  ) -> Result<SurveyProfile> {
    let (campaign, status) = self.active_campaign().await?;
    if !status.crush_edits_permitted() {
      return Err(Error::PhaseClosed(status.phase()));
    }
    if crushes.contains(&user_id) {
      return Err(Error::InvalidRequest("a user cannot flag themself".into()));
    }

    let mut survey = self
      .store
      .get_survey(user_id)
      .await
      .map_err(Error::store)?
      .filter(|s| s.campaign_id == campaign.campaign_id)
      .ok_or_else(|| {
        Error::NotEligible("submit a survey for this campaign first".into())
      })?;

    survey.crushes = crushes;
    survey.updated_at = status.server_time;
    self.store.upsert_survey(survey).await.map_err(Error::store)
  }

  // ── Matches ───────────────────────────────────────────────────────────

  /// Compute a fresh, ordered match list for `user_id` without persisting
  /// it.
  ///
  /// `requested` defaults to the campaign's `num_matches`. Returning fewer
  /// matches than requested is not an error.
  pub async fn generate_matches(
    &self,
    user_id: Uuid,
    requested: Option<u32>,
  ) -> Result<Vec<Match>> {
    let (campaign, status) = self.active_campaign().await?;
    if !status.matching_permitted() {
      return Err(Error::PhaseClosed(status.phase()));
    }

    let requested = match requested {
      Some(0) => {
        return Err(Error::InvalidRequest(
          "requested match count must be at least 1".into(),
        ));
      }
      Some(n) => n,
      None => campaign.config.num_matches,
    };

    let user = self
      .store
      .get_survey(user_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotEligible("complete the survey first".into()))?;
    if !user.is_complete {
      return Err(Error::NotEligible("complete the survey first".into()));
    }
    if user.campaign_id != campaign.campaign_id {
      return Err(Error::NotEligible(
        "survey was submitted for a different campaign".into(),
      ));
    }

    let started = Instant::now();
    let deadline = self.deadline;
    let candidates = self
      .store
      .get_completed_surveys(campaign.campaign_id)
      .await
      .map_err(Error::store)?;

    let ranked = ranking::rank_with(
      &user,
      &candidates,
      &campaign.config,
      requested as usize,
      || {
        if started.elapsed() >= deadline {
          Err(Error::Timeout(deadline))
        } else {
          Ok(())
        }
      },
    )?;

    tracing::debug!(
      %user_id,
      candidates = candidates.len(),
      selected = ranked.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "ranked candidates"
    );

    let created_at = status.server_time;
    Ok(
      ranked
        .into_iter()
        .map(|r| r.into_match(campaign.campaign_id, created_at))
        .collect(),
    )
  }

  /// Generate and persist a replacement match set for `user_id`.
  ///
  /// At most one regeneration per user runs at a time; a concurrent request
  /// fails with [`Error::Conflict`].
  pub async fn regenerate_matches(
    &self,
    user_id: Uuid,
    requested: Option<u32>,
  ) -> Result<Vec<Match>> {
    let _guard = self.in_flight.acquire(user_id)?;

    let matches = self.generate_matches(user_id, requested).await?;
    self
      .store
      .replace_matches(user_id, matches.clone())
      .await
      .map_err(Error::store)?;

    tracing::info!(%user_id, count = matches.len(), "matches regenerated");
    Ok(matches)
  }

  /// The user's persisted matches for the active campaign, once results are
  /// released.
  pub async fn visible_matches(&self, user_id: Uuid) -> Result<Vec<Match>> {
    let (campaign, status) = self.active_campaign().await?;
    if !status.results_released {
      return Err(Error::PhaseClosed(status.phase()));
    }
    let mut matches = self.store.get_matches(user_id).await.map_err(Error::store)?;
    matches.retain(|m| m.campaign_id == campaign.campaign_id);
    Ok(matches)
  }
}
