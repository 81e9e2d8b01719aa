//! Core types, the phase engine and the matcher for the Tryst matchmaking
//! service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::MatchmakingStore`]; the clock is
//! injected through [`clock::Clock`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod campaign;
pub mod clock;
pub mod engine;
pub mod error;
pub mod phase;
pub mod ranking;
pub mod scoring;
pub mod store;
pub mod survey;

#[cfg(test)]
mod testing;

pub use engine::Engine;
pub use error::{Error, Result};
