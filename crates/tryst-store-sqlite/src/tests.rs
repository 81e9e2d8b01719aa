//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tryst_core::{
  campaign::{Attribute, CampaignConfig, NewCampaign, Schedule},
  ranking::Match,
  store::MatchmakingStore,
  survey::SurveyProfile,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ts(s: &str) -> DateTime<Utc> { s.parse().unwrap() }

fn new_campaign(name: &str) -> NewCampaign {
  NewCampaign {
    name:              name.into(),
    schedule:          Schedule {
      survey_open:          ts("2024-01-01T00:00:00Z"),
      survey_close:         ts("2024-01-08T00:00:00Z"),
      profile_update_start: Some(ts("2024-01-09T00:00:00Z")),
      profile_update_end:   Some(ts("2024-01-12T00:00:00Z")),
      results_release:      ts("2024-01-15T00:00:00Z"),
    },
    algorithm_version: "2.0".into(),
    config:            CampaignConfig {
      weights:                     BTreeMap::from([
        (Attribute::Personality, 0.3),
        (Attribute::Values, 0.25),
        (Attribute::Interests, 0.15),
        (Attribute::Lifestyle, 0.0),
        (Attribute::Demographics, 0.0),
      ]),
      num_matches:                 7,
      mutual_crush_bonus:          0.2,
      one_way_crush_bonus:         0.1,
      minimum_compatibility_score: 0.3,
    },
  }
}

fn survey(user_id: Uuid, campaign_id: Uuid, complete: bool) -> SurveyProfile {
  SurveyProfile {
    user_id,
    campaign_id,
    is_complete: complete,
    personality_type: Some("INFJ".into()),
    lifestyle: Some("early bird".into()),
    demographics: None,
    interests: BTreeSet::from(["books".to_owned(), "hiking".to_owned()]),
    values: BTreeSet::from(["honesty".to_owned()]),
    crushes: BTreeSet::new(),
    completed_at: complete.then(|| ts("2024-01-03T10:00:00Z")),
    updated_at: ts("2024-01-03T10:00:00Z"),
  }
}

fn match_row(user: Uuid, matched: Uuid, campaign: Uuid, rank: u32) -> Match {
  Match {
    match_id:            Uuid::new_v4(),
    campaign_id:         campaign,
    user_id:             user,
    matched_user_id:     matched,
    compatibility_score: 1.0 / rank as f64,
    rank,
    is_mutual_crush:     rank == 1,
    created_at:          ts("2024-01-10T00:00:00Z"),
  }
}

// ─── Campaigns ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_campaign() {
  let s = store().await;
  let created = s.create_campaign(new_campaign("Valentine")).await.unwrap();
  assert!(!created.is_active);

  let fetched = s.get_campaign(created.campaign_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.config.weight(Attribute::Values), Some(0.25));
  assert_eq!(
    fetched.schedule.profile_update_window(),
    Some((ts("2024-01-09T00:00:00Z"), ts("2024-01-12T00:00:00Z")))
  );
}

#[tokio::test]
async fn get_campaign_missing_returns_none() {
  let s = store().await;
  assert!(s.get_campaign(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn create_rejects_invalid_config() {
  let s = store().await;
  let mut input = new_campaign("Broken");
  input.config.weights.clear();
  let err = s.create_campaign(input).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(tryst_core::Error::InvalidConfig(_))
  ));
  assert!(s.list_campaigns().await.unwrap().is_empty());
}

#[tokio::test]
async fn no_active_campaign_initially() {
  let s = store().await;
  s.create_campaign(new_campaign("Draft")).await.unwrap();
  assert!(s.get_active_campaign().await.unwrap().is_none());
}

#[tokio::test]
async fn activation_is_exclusive() {
  let s = store().await;
  let first = s.create_campaign(new_campaign("First")).await.unwrap();
  let second = s.create_campaign(new_campaign("Second")).await.unwrap();

  s.activate_campaign(first.campaign_id).await.unwrap();
  let active = s.get_active_campaign().await.unwrap().unwrap();
  assert_eq!(active.campaign_id, first.campaign_id);

  let activated = s.activate_campaign(second.campaign_id).await.unwrap();
  assert!(activated.is_active);
  let active = s.get_active_campaign().await.unwrap().unwrap();
  assert_eq!(active.campaign_id, second.campaign_id);

  let all = s.list_campaigns().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all.iter().filter(|c| c.is_active).count(), 1);
}

#[tokio::test]
async fn activate_missing_campaign_errors() {
  let s = store().await;
  let err = s.activate_campaign(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::CampaignNotFound(_)));
}

// ─── Surveys ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn survey_roundtrip_and_upsert() {
  let s = store().await;
  let campaign = s.create_campaign(new_campaign("C")).await.unwrap();
  let user = Uuid::new_v4();
  let crush = Uuid::new_v4();

  let mut profile = survey(user, campaign.campaign_id, false);
  s.upsert_survey(profile.clone()).await.unwrap();
  assert_eq!(s.get_survey(user).await.unwrap(), Some(profile.clone()));

  profile.is_complete = true;
  profile.completed_at = Some(ts("2024-01-04T00:00:00Z"));
  profile.crushes.insert(crush);
  s.upsert_survey(profile.clone()).await.unwrap();

  let fetched = s.get_survey(user).await.unwrap().unwrap();
  assert!(fetched.is_complete);
  assert!(fetched.has_crush_on(crush));
  assert_eq!(fetched, profile);
}

#[tokio::test]
async fn get_survey_missing_returns_none() {
  let s = store().await;
  assert!(s.get_survey(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn completed_surveys_filter_by_campaign_and_completion() {
  let s = store().await;
  let current = s.create_campaign(new_campaign("Current")).await.unwrap();
  let old = s.create_campaign(new_campaign("Old")).await.unwrap();

  let done = Uuid::new_v4();
  let pending = Uuid::new_v4();
  let elsewhere = Uuid::new_v4();
  s.upsert_survey(survey(done, current.campaign_id, true)).await.unwrap();
  s.upsert_survey(survey(pending, current.campaign_id, false)).await.unwrap();
  s.upsert_survey(survey(elsewhere, old.campaign_id, true)).await.unwrap();

  let completed = s.get_completed_surveys(current.campaign_id).await.unwrap();
  assert_eq!(completed.len(), 1);
  assert_eq!(completed[0].user_id, done);
}

// ─── Matches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn replace_matches_swaps_whole_set() {
  let s = store().await;
  let campaign = s.create_campaign(new_campaign("C")).await.unwrap();
  let cid = campaign.campaign_id;
  let user = Uuid::new_v4();

  let first: Vec<Match> = (1..=3)
    .map(|r| match_row(user, Uuid::new_v4(), cid, r))
    .collect();
  s.replace_matches(user, first).await.unwrap();
  assert_eq!(s.get_matches(user).await.unwrap().len(), 3);

  let second: Vec<Match> = (1..=2)
    .map(|r| match_row(user, Uuid::new_v4(), cid, r))
    .collect();
  s.replace_matches(user, second.clone()).await.unwrap();

  let stored = s.get_matches(user).await.unwrap();
  assert_eq!(stored, second);
  assert_eq!(stored.iter().map(|m| m.rank).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn replace_with_empty_set_clears() {
  let s = store().await;
  let campaign = s.create_campaign(new_campaign("C")).await.unwrap();
  let user = Uuid::new_v4();
  s.replace_matches(user, vec![match_row(user, Uuid::new_v4(), campaign.campaign_id, 1)])
    .await
    .unwrap();
  s.replace_matches(user, vec![]).await.unwrap();
  assert!(s.get_matches(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn replace_rejects_gapped_ranks() {
  let s = store().await;
  let campaign = s.create_campaign(new_campaign("C")).await.unwrap();
  let user = Uuid::new_v4();
  let bad = vec![
    match_row(user, Uuid::new_v4(), campaign.campaign_id, 1),
    match_row(user, Uuid::new_v4(), campaign.campaign_id, 3),
  ];
  let err = s.replace_matches(user, bad).await.unwrap_err();
  assert!(matches!(err, crate::Error::InvalidMatchSet(_)));
}

#[tokio::test]
async fn failed_replace_keeps_previous_set() {
  let s = store().await;
  let campaign = s.create_campaign(new_campaign("C")).await.unwrap();
  let cid = campaign.campaign_id;
  let user = Uuid::new_v4();
  let original = vec![match_row(user, Uuid::new_v4(), cid, 1)];
  s.replace_matches(user, original.clone()).await.unwrap();

  // Same matched user twice violates the uniqueness constraint mid-insert.
  let dup = Uuid::new_v4();
  let bad = vec![match_row(user, dup, cid, 1), match_row(user, dup, cid, 2)];
  assert!(s.replace_matches(user, bad).await.is_err());

  assert_eq!(s.get_matches(user).await.unwrap(), original);
}

#[tokio::test]
async fn matches_are_per_user() {
  let s = store().await;
  let campaign = s.create_campaign(new_campaign("C")).await.unwrap();
  let cid = campaign.campaign_id;
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();

  s.replace_matches(alice, vec![match_row(alice, bob, cid, 1)]).await.unwrap();
  s.replace_matches(bob, vec![match_row(bob, alice, cid, 1)]).await.unwrap();
  s.replace_matches(alice, vec![]).await.unwrap();

  assert!(s.get_matches(alice).await.unwrap().is_empty());
  assert_eq!(s.get_matches(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn campaign_stats_counts_participants_and_matches() {
  let s = store().await;
  let campaign = s.create_campaign(new_campaign("C")).await.unwrap();
  let cid = campaign.campaign_id;
  let a = Uuid::new_v4();
  let b = Uuid::new_v4();
  let c = Uuid::new_v4();
  s.upsert_survey(survey(a, cid, true)).await.unwrap();
  s.upsert_survey(survey(b, cid, true)).await.unwrap();
  s.upsert_survey(survey(c, cid, false)).await.unwrap();
  s.replace_matches(a, vec![match_row(a, b, cid, 1)]).await.unwrap();

  let stats = s.campaign_stats(cid).await.unwrap();
  assert_eq!(stats.participants, 2);
  assert_eq!(stats.users_with_matches, 1);
  assert_eq!(stats.total_matches, 1);
}

// ─── Engine over SQLite ──────────────────────────────────────────────────────

#[tokio::test]
async fn engine_full_campaign_cycle() {
  use std::sync::Arc;

  use tryst_core::{
    Engine, clock::FixedClock, phase::CampaignPhase, survey::SurveySubmission,
  };

  let s = Arc::new(store().await);
  let campaign = s.create_campaign(new_campaign("Cycle")).await.unwrap();
  s.activate_campaign(campaign.campaign_id).await.unwrap();

  let clock = Arc::new(FixedClock::new(ts("2024-01-03T12:00:00Z")));
  let engine = Engine::new(s.clone(), clock.clone());

  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let carol = Uuid::new_v4();
  let answers = |personality: &str, interests: &[&str], crushes: &[Uuid]| {
    SurveySubmission {
      is_complete: true,
      personality_type: Some(personality.into()),
      interests: interests.iter().map(|s| s.to_string()).collect(),
      values: BTreeSet::from(["honesty".to_owned()]),
      crushes: crushes.iter().copied().collect(),
      ..Default::default()
    }
  };

  engine
    .submit_survey(alice, answers("INFJ", &["books", "hiking"], &[bob]))
    .await
    .unwrap();
  engine
    .submit_survey(bob, answers("INFJ", &["books"], &[alice]))
    .await
    .unwrap();
  engine
    .submit_survey(carol, answers("ESTP", &["racing"], &[]))
    .await
    .unwrap();

  // Matching waits for the survey to close.
  let err = engine.regenerate_matches(alice, None).await.unwrap_err();
  assert!(matches!(
    err,
    tryst_core::Error::PhaseClosed(CampaignPhase::SurveyOpen)
  ));

  clock.set(ts("2024-01-10T00:00:00Z"));
  let generated = engine.regenerate_matches(alice, None).await.unwrap();
  assert_eq!(generated[0].matched_user_id, bob);
  assert!(generated[0].is_mutual_crush);
  assert_eq!(s.get_matches(alice).await.unwrap(), generated);

  // Not visible before release.
  assert!(engine.visible_matches(alice).await.is_err());

  clock.set(ts("2024-01-15T00:00:00Z"));
  let visible = engine.visible_matches(alice).await.unwrap();
  assert_eq!(visible, generated);

  let stats = s.campaign_stats(campaign.campaign_id).await.unwrap();
  assert_eq!(stats.participants, 3);
  assert_eq!(stats.users_with_matches, 1);
}
