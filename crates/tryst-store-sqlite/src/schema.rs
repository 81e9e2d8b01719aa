//! SQL schema for the Tryst SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS campaigns (
    campaign_id          TEXT PRIMARY KEY,
    name                 TEXT NOT NULL,
    survey_open          TEXT NOT NULL,   -- RFC 3339 UTC
    survey_close         TEXT NOT NULL,
    profile_update_start TEXT,
    profile_update_end   TEXT,
    results_release      TEXT NOT NULL,
    is_active            INTEGER NOT NULL DEFAULT 0,
    algorithm_version    TEXT NOT NULL,
    config_json          TEXT NOT NULL,   -- JSON-encoded CampaignConfig
    created_at           TEXT NOT NULL,
    CHECK ((profile_update_start IS NULL) = (profile_update_end IS NULL))
);

-- At most one active campaign.
CREATE UNIQUE INDEX IF NOT EXISTS campaigns_single_active_idx
    ON campaigns(is_active) WHERE is_active = 1;

-- One survey per user, tagged with the campaign it was submitted under.
CREATE TABLE IF NOT EXISTS surveys (
    user_id          TEXT PRIMARY KEY,
    campaign_id      TEXT NOT NULL REFERENCES campaigns(campaign_id),
    is_complete      INTEGER NOT NULL DEFAULT 0,
    personality_type TEXT,
    lifestyle        TEXT,
    demographics     TEXT,
    interests_json   TEXT NOT NULL DEFAULT '[]',
    values_json      TEXT NOT NULL DEFAULT '[]',
    crushes_json     TEXT NOT NULL DEFAULT '[]',
    completed_at     TEXT,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS surveys_campaign_idx ON surveys(campaign_id, is_complete);

-- A user's match set is replaced as a whole; never patched row by row.
CREATE TABLE IF NOT EXISTS matches (
    match_id            TEXT PRIMARY KEY,
    campaign_id         TEXT NOT NULL REFERENCES campaigns(campaign_id),
    user_id             TEXT NOT NULL,
    matched_user_id     TEXT NOT NULL,
    compatibility_score REAL NOT NULL,
    match_rank          INTEGER NOT NULL,
    is_mutual_crush     INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,
    UNIQUE (user_id, match_rank),
    UNIQUE (user_id, matched_user_id),
    CHECK  (user_id != matched_user_id),
    CHECK  (match_rank >= 1)
);

CREATE INDEX IF NOT EXISTS matches_campaign_idx ON matches(campaign_id);

PRAGMA user_version = 1;
";
