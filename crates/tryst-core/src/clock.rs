//! Time sources.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Supplies the current wall-clock time.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock pinned to a settable instant. Used by tests and by tooling that
/// needs to evaluate phases at an arbitrary point in time.
#[derive(Debug)]
pub struct FixedClock {
  at: Mutex<DateTime<Utc>>,
}

impl FixedClock {
  pub fn new(at: DateTime<Utc>) -> Self { Self { at: Mutex::new(at) } }

  pub fn set(&self, at: DateTime<Utc>) {
    *self.at.lock().unwrap_or_else(|e| e.into_inner()) = at;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    *self.at.lock().unwrap_or_else(|e| e.into_inner())
  }
}
