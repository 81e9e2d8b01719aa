//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tryst_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  /// HTTP status and machine-readable code for this error.
  pub fn classify(&self) -> (StatusCode, &'static str) {
    match self {
      ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
      ApiError::Core(e) => match e {
        CoreError::NoCampaign => (StatusCode::NOT_FOUND, "no_campaign"),
        CoreError::CampaignNotFound(_) => {
          (StatusCode::NOT_FOUND, "campaign_not_found")
        }
        CoreError::NotEligible(_) => {
          (StatusCode::UNPROCESSABLE_ENTITY, "not_eligible")
        }
        CoreError::InvalidConfig(_) => {
          (StatusCode::UNPROCESSABLE_ENTITY, "invalid_config")
        }
        CoreError::InvalidRequest(_) => {
          (StatusCode::BAD_REQUEST, "invalid_request")
        }
        CoreError::PhaseClosed(_) => (StatusCode::FORBIDDEN, "phase_closed"),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        CoreError::StoreUnavailable(_) => {
          (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
        }
        CoreError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        CoreError::Serialization(_) => {
          (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code) = self.classify();
    if status.is_server_error() {
      tracing::error!(error = %self, code, "request failed");
    }
    let message = match &self {
      ApiError::Core(e) => e.to_string(),
      ApiError::NotFound(m) => m.clone(),
    };
    (status, Json(json!({ "error": message, "code": code }))).into_response()
  }
}
