//! Ranking candidates into an ordered match list, and the persisted
//! [`Match`] record.

use std::{cmp::Ordering, collections::HashSet, convert::Infallible};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  campaign::CampaignConfig,
  scoring::{self, CompatibilityResult, CrushBonus},
  survey::SurveyProfile,
};

// ─── Match ───────────────────────────────────────────────────────────────────

/// A persisted match. A user's matches are always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
  pub match_id:            Uuid,
  pub campaign_id:         Uuid,
  pub user_id:             Uuid,
  pub matched_user_id:     Uuid,
  pub compatibility_score: f64,
  /// 1-based position in the user's list.
  pub rank:                u32,
  pub is_mutual_crush:     bool,
  pub created_at:          DateTime<Utc>,
}

// ─── Ranked candidates ───────────────────────────────────────────────────────

/// A candidate that survived filtering, with its final position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
  pub rank:          u32,
  pub compatibility: CompatibilityResult,
}

impl RankedMatch {
  pub fn candidate_id(&self) -> Uuid { self.compatibility.candidate_id }

  pub fn is_mutual_crush(&self) -> bool {
    self.compatibility.bonus_kind == CrushBonus::Mutual
  }

  /// Turn into a [`Match`] owned by the scored user.
  pub fn into_match(self, campaign_id: Uuid, created_at: DateTime<Utc>) -> Match {
    Match {
      match_id: Uuid::new_v4(),
      campaign_id,
      user_id: self.compatibility.user_id,
      matched_user_id: self.compatibility.candidate_id,
      compatibility_score: self.compatibility.score,
      rank: self.rank,
      is_mutual_crush: self.is_mutual_crush(),
      created_at,
    }
  }
}

/// Higher score first; equal scores by candidate id ascending.
fn by_score_then_id(a: &CompatibilityResult, b: &CompatibilityResult) -> Ordering {
  b.score
    .total_cmp(&a.score)
    .then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

/// Score every candidate against `user`, drop those below the minimum, and
/// keep the best `requested`.
///
/// `checkpoint` runs before each candidate is scored; returning an error
/// aborts the pass. Self-pairs are skipped, and a candidate listed more than
/// once keeps only its best-scoring entry.
pub fn rank_with<E>(
  user: &SurveyProfile,
  candidates: &[SurveyProfile],
  config: &CampaignConfig,
  requested: usize,
  mut checkpoint: impl FnMut() -> Result<(), E>,
) -> Result<Vec<RankedMatch>, E> {
  let mut eligible: Vec<CompatibilityResult> = Vec::with_capacity(candidates.len());

  for candidate in candidates {
    checkpoint()?;
    if candidate.user_id == user.user_id {
      continue;
    }
    let result = scoring::score(user, candidate, config);
    if result.is_eligible(config) {
      eligible.push(result);
    }
  }

  eligible.sort_by(by_score_then_id);
  let mut seen = HashSet::with_capacity(eligible.len());
  eligible.retain(|r| seen.insert(r.candidate_id));

  Ok(
    eligible
      .into_iter()
      .take(requested)
      .zip(1u32..)
      .map(|(compatibility, rank)| RankedMatch { rank, compatibility })
      .collect(),
  )
}

/// [`rank_with`] without a checkpoint.
pub fn rank(
  user: &SurveyProfile,
  candidates: &[SurveyProfile],
  config: &CampaignConfig,
  requested: usize,
) -> Vec<RankedMatch> {
  let Ok(ranked) =
    rank_with(user, candidates, config, requested, || Ok::<(), Infallible>(()));
  ranked
}
