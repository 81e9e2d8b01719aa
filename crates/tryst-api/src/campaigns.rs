//! Handlers for `/campaigns` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/campaigns/status` | Phase flags; never fails |
//! | `GET`  | `/campaigns` | Newest first |
//! | `POST` | `/campaigns` | Body: `NewCampaign`; created inactive |
//! | `GET`  | `/campaigns/:id` | 404 if not found |
//! | `POST` | `/campaigns/:id/activate` | Deactivates every other campaign |
//! | `GET`  | `/campaigns/:id/stats` | Participant and match counts |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use tryst_core::{
  Engine, Error as CoreError,
  campaign::{Campaign, CampaignStats, NewCampaign},
  phase::{CampaignPhase, PhaseStatus},
  store::MatchmakingStore,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatusBody {
  pub phase:  CampaignPhase,
  #[serde(flatten)]
  pub status: PhaseStatus,
}

/// `GET /campaigns/status`
pub async fn status<S>(State(engine): State<Arc<Engine<S>>>) -> Json<StatusBody>
where
  S: MatchmakingStore,
{
  let status = engine.phase_status().await;
  Json(StatusBody { phase: status.phase(), status })
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /campaigns`
pub async fn list<S>(
  State(engine): State<Arc<Engine<S>>>,
) -> Result<Json<Vec<Campaign>>, ApiError>
where
  S: MatchmakingStore,
{
  let campaigns = engine
    .store()
    .list_campaigns()
    .await
    .map_err(CoreError::store)?;
  Ok(Json(campaigns))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /campaigns`
pub async fn create<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<NewCampaign>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MatchmakingStore,
{
  body.validate()?;
  let campaign = engine
    .store()
    .create_campaign(body)
    .await
    .map_err(CoreError::store)?;
  tracing::info!(campaign_id = %campaign.campaign_id, name = %campaign.name, "campaign created");
  Ok((StatusCode::CREATED, Json(campaign)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

async fn find<S>(engine: &Engine<S>, id: Uuid) -> Result<Campaign, ApiError>
where
  S: MatchmakingStore,
{
  engine
    .store()
    .get_campaign(id)
    .await
    .map_err(CoreError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("campaign {id} not found")))
}

/// `GET /campaigns/:id`
pub async fn get_one<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError>
where
  S: MatchmakingStore,
{
  Ok(Json(find(&engine, id).await?))
}

// ─── Activate ─────────────────────────────────────────────────────────────────

/// `POST /campaigns/:id/activate`
pub async fn activate<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError>
where
  S: MatchmakingStore,
{
  find(&engine, id).await?.validate()?;
  let campaign = engine
    .store()
    .activate_campaign(id)
    .await
    .map_err(CoreError::store)?;
  tracing::info!(campaign_id = %id, "campaign activated");
  Ok(Json(campaign))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /campaigns/:id/stats`
pub async fn stats<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CampaignStats>, ApiError>
where
  S: MatchmakingStore,
{
  find(&engine, id).await?;
  let stats = engine
    .store()
    .campaign_stats(id)
    .await
    .map_err(CoreError::store)?;
  Ok(Json(stats))
}
