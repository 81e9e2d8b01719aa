//! Handlers for `/surveys` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/surveys/:user_id` | 404 if the user has no survey |
//! | `PUT`  | `/surveys/:user_id` | Body: `SurveySubmission`; survey phase only |
//! | `PUT`  | `/surveys/:user_id/crushes` | Body: `{"crushes":[..]}`; survey or profile-update phase |

use std::{collections::BTreeSet, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use tryst_core::{
  Engine, Error as CoreError,
  store::MatchmakingStore,
  survey::{SurveyProfile, SurveySubmission},
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /surveys/:user_id`
pub async fn get_one<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<SurveyProfile>, ApiError>
where
  S: MatchmakingStore,
{
  let survey = engine
    .store()
    .get_survey(user_id)
    .await
    .map_err(CoreError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no survey for user {user_id}")))?;
  Ok(Json(survey))
}

/// `PUT /surveys/:user_id`
pub async fn submit<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<SurveySubmission>,
) -> Result<Json<SurveyProfile>, ApiError>
where
  S: MatchmakingStore,
{
  Ok(Json(engine.submit_survey(user_id, body).await?))
}

#[derive(Debug, Deserialize)]
pub struct CrushesBody {
  pub crushes: BTreeSet<Uuid>,
}

/// `PUT /surveys/:user_id/crushes`
pub async fn update_crushes<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<CrushesBody>,
) -> Result<Json<SurveyProfile>, ApiError>
where
  S: MatchmakingStore,
{
  Ok(Json(engine.update_crushes(user_id, body.crushes).await?))
}
