//! Compatibility scoring between two survey profiles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  campaign::{Attribute, CampaignConfig},
  survey::{AttributeValue, SurveyProfile},
};

/// Which reciprocal-interest bonus applied to a pair.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CrushBonus {
  #[default]
  None,
  OneWay,
  Mutual,
}

impl CrushBonus {
  /// Classify the pair. Symmetric in its arguments.
  pub fn between(a: &SurveyProfile, b: &SurveyProfile) -> Self {
    match (a.has_crush_on(b.user_id), b.has_crush_on(a.user_id)) {
      (true, true) => Self::Mutual,
      (true, false) | (false, true) => Self::OneWay,
      (false, false) => Self::None,
    }
  }

  pub fn value(self, config: &CampaignConfig) -> f64 {
    match self {
      Self::None => 0.0,
      Self::OneWay => config.one_way_crush_bonus,
      Self::Mutual => config.mutual_crush_bonus,
    }
  }
}

/// One attribute's share of the base score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
  pub attribute:  Attribute,
  pub similarity: f64,
  pub weight:     f64,
}

impl Contribution {
  pub fn weighted(&self) -> f64 { self.weight * self.similarity }
}

/// The score of `candidate_id` from the point of view of `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResult {
  pub user_id:       Uuid,
  pub candidate_id:  Uuid,
  /// Weighted sum over configured attributes, before any bonus.
  pub base:          f64,
  pub contributions: Vec<Contribution>,
  pub bonus_kind:    CrushBonus,
  pub bonus:         f64,
  /// `base + bonus`.
  pub score:         f64,
}

impl CompatibilityResult {
  /// Whether this result clears the campaign's hard eligibility gate.
  pub fn is_eligible(&self, config: &CampaignConfig) -> bool {
    self.score >= config.minimum_compatibility_score
  }
}

/// Overlap ratio of two sets. Two empty sets share nothing.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
  let union = a.union(b).count();
  if union == 0 {
    return 0.0;
  }
  let intersection = a.intersection(b).count();
  intersection as f64 / union as f64
}

/// Similarity of one attribute in `[0, 1]`.
pub fn similarity(a: AttributeValue<'_>, b: AttributeValue<'_>) -> f64 {
  match (a, b) {
    (AttributeValue::Categorical(Some(x)), AttributeValue::Categorical(Some(y))) => {
      if x == y { 1.0 } else { 0.0 }
    }
    (AttributeValue::Set(x), AttributeValue::Set(y)) => jaccard(x, y),
    _ => 0.0,
  }
}

/// Score `b` as a candidate for `a` under `config`.
///
/// Only attributes named in the weight map contribute. The result is a raw
/// weighted sum; it is not normalised against the total weight.
pub fn score(
  a: &SurveyProfile,
  b: &SurveyProfile,
  config: &CampaignConfig,
) -> CompatibilityResult {
  let contributions: Vec<Contribution> = config
    .weights
    .iter()
    .map(|(&attribute, &weight)| Contribution {
      attribute,
      similarity: similarity(a.attribute(attribute), b.attribute(attribute)),
      weight,
    })
    .collect();

  let base = contributions.iter().map(Contribution::weighted).sum::<f64>();
  let bonus_kind = CrushBonus::between(a, b);
  let bonus = bonus_kind.value(config);

  CompatibilityResult {
    user_id: a.user_id,
    candidate_id: b.user_id,
    base,
    contributions,
    bonus_kind,
    bonus,
    score: base + bonus,
  }
}
