//! Handlers for `/matches` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/matches/:user_id/generate` | Optional `?count=N`; replaces the stored set |
//! | `GET`  | `/matches/:user_id` | Once results are released |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use tryst_core::{Engine, ranking::Match, store::MatchmakingStore};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
  pub count: Option<u32>,
}

/// `POST /matches/:user_id/generate[?count=N]`
pub async fn generate<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
  Query(params): Query<GenerateParams>,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: MatchmakingStore,
{
  Ok(Json(engine.regenerate_matches(user_id, params.count).await?))
}

/// `GET /matches/:user_id`
pub async fn list<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: MatchmakingStore,
{
  Ok(Json(engine.visible_matches(user_id).await?))
}
