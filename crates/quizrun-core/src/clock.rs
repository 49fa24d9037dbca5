//! Wall-clock abstraction used to timestamp session events.
//!
//! Countdown ticking does not read the clock; ticks are delivered explicitly
//! so that expiry is reproducible in tests.

use chrono::{DateTime, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Whole seconds elapsed since `earlier`, saturating at zero if the clock
    /// has moved backwards.
    fn seconds_since(&self, earlier: DateTime<Utc>) -> u64 {
        u64::try_from((self.now() - earlier).num_seconds()).unwrap_or(0)
    }
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
