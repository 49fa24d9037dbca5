//! Engine configuration.

use quizrun_core::error::QuizError;
use serde::{Deserialize, Serialize};

use crate::domain::countdown::clamp_duration;
use crate::domain::round::{MAX_PLAYERS, MIN_PLAYERS};

/// Environment variable holding the countdown length in seconds.
pub const DURATION_ENV: &str = "QUIZRUN_DURATION_SECONDS";

/// Environment variable holding the number of competitors.
pub const PLAYER_COUNT_ENV: &str = "QUIZRUN_PLAYER_COUNT";

const DEFAULT_DURATION_SECONDS: u32 = 120;
const DEFAULT_PLAYER_COUNT: usize = 2;

/// Tunables shared by solo and competitive play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Countdown length for timed challenges. Raised to the 30 second
    /// minimum by [`EngineConfig::validated`].
    pub duration_seconds: u32,
    /// Competitors in a round, 2 to 4.
    pub player_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            duration_seconds: DEFAULT_DURATION_SECONDS,
            player_count: DEFAULT_PLAYER_COUNT,
        }
    }
}

impl EngineConfig {
    /// Reads overrides from `QUIZRUN_DURATION_SECONDS` and
    /// `QUIZRUN_PLAYER_COUNT`, falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` if a variable is set but does not
    /// parse, or the player count is out of range.
    pub fn from_env() -> Result<Self, QuizError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EngineConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, QuizError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(DURATION_ENV) {
            config.duration_seconds = raw.trim().parse().map_err(|e| {
                QuizError::Validation(format!("{DURATION_ENV} must be a whole number of seconds: {e}"))
            })?;
        }
        if let Some(raw) = lookup(PLAYER_COUNT_ENV) {
            config.player_count = raw.trim().parse().map_err(|e| {
                QuizError::Validation(format!("{PLAYER_COUNT_ENV} must be a whole number: {e}"))
            })?;
        }
        config.validated()
    }

    /// Clamps the duration and checks the player count.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` if `player_count` is outside 2..=4.
    pub fn validated(self) -> Result<Self, QuizError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(QuizError::Validation(format!(
                "player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                self.player_count
            )));
        }
        Ok(Self {
            duration_seconds: clamp_duration(self.duration_seconds),
            ..self
        })
    }
}
