//! JSON REST API for Tryst.
//!
//! Exposes an axum [`Router`] backed by a [`tryst_core::Engine`] over any
//! [`tryst_core::store::MatchmakingStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", tryst_api::api_router(engine.clone()))
//! ```

pub mod campaigns;
pub mod error;
pub mod matches;
pub mod surveys;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use tryst_core::{Engine, store::MatchmakingStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<Engine<S>>) -> Router<()>
where
  S: MatchmakingStore + 'static,
{
  Router::new()
    // Campaigns
    .route("/campaigns/status", get(campaigns::status::<S>))
    .route(
      "/campaigns",
      get(campaigns::list::<S>).post(campaigns::create::<S>),
    )
    .route("/campaigns/{id}", get(campaigns::get_one::<S>))
    .route("/campaigns/{id}/activate", post(campaigns::activate::<S>))
    .route("/campaigns/{id}/stats", get(campaigns::stats::<S>))
    // Surveys
    .route(
      "/surveys/{user_id}",
      get(surveys::get_one::<S>).put(surveys::submit::<S>),
    )
    .route("/surveys/{user_id}/crushes", put(surveys::update_crushes::<S>))
    // Matches
    .route("/matches/{user_id}", get(matches::list::<S>))
    .route("/matches/{user_id}/generate", post(matches::generate::<S>))
    .with_state(engine)
}
