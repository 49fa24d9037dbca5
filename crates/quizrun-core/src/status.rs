//! Session lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a single quiz session.
///
/// `Finished` is terminal: only a restart brings a session back to
/// `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created or restarted, waiting for `start`.
    NotStarted,
    /// Accepting answers.
    Active,
    /// No further answers are accepted.
    Finished,
}

impl SessionStatus {
    /// Returns the snake-case name used in logs, events and views.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
