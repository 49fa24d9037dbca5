//! Cooperative countdown that forces a session to expire.
//!
//! The controller never reads the wall clock. Something outside it calls
//! [`CountdownController::tick`] once per second; the runtime does this from
//! a `tokio` interval, tests do it by hand.

use std::fmt;

use serde::Serialize;

/// Shortest countdown a timed challenge may run, in seconds.
pub const MIN_DURATION_SECONDS: u32 = 30;

/// At or below this many seconds the countdown is [`Urgency::Critical`].
pub const CRITICAL_THRESHOLD_SECONDS: u32 = 15;

/// At or below this many seconds the countdown is [`Urgency::Warning`].
pub const WARNING_THRESHOLD_SECONDS: u32 = 60;

/// How close the countdown is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// More than a minute left.
    Calm,
    /// A minute or less left.
    Warning,
    /// Fifteen seconds or less left.
    Critical,
}

impl Urgency {
    /// Classifies a remaining time.
    #[must_use]
    pub fn for_remaining(remaining_seconds: u32) -> Self {
        if remaining_seconds <= CRITICAL_THRESHOLD_SECONDS {
            Self::Critical
        } else if remaining_seconds <= WARNING_THRESHOLD_SECONDS {
            Self::Warning
        } else {
            Self::Calm
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// One second elapsed and time remains.
    Running {
        /// Seconds left after this tick.
        remaining: u32,
    },
    /// The countdown reached zero on this tick. Reported once.
    Expired,
    /// The countdown is not running; the tick was ignored.
    Stopped,
    /// The tick belongs to an earlier generation and was ignored.
    Stale,
}

/// Counts a session's remaining time down to zero.
#[derive(Debug, Clone)]
pub struct CountdownController {
    duration: u32,
    remaining: u32,
    running: bool,
    generation: u64,
}

impl CountdownController {
    /// Creates a stopped countdown. Durations below
    /// [`MIN_DURATION_SECONDS`] are raised to it.
    #[must_use]
    pub fn new(duration_seconds: u32) -> Self {
        let duration = clamp_duration(duration_seconds);
        Self {
            duration,
            remaining: duration,
            running: false,
            generation: 0,
        }
    }

    /// Restores the full duration and starts counting for `generation`.
    pub fn arm(&mut self, generation: u64) {
        self.remaining = self.duration;
        self.running = true;
        self.generation = generation;
    }

    /// Advances the countdown by one second for the armed generation.
    pub fn tick(&mut self) -> Tick {
        self.tick_for(self.generation)
    }

    /// Advances the countdown by one second if `generation` is the armed one.
    pub fn tick_for(&mut self, generation: u64) -> Tick {
        if generation != self.generation {
            return Tick::Stale;
        }
        if !self.running {
            return Tick::Stopped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Expired
        } else {
            Tick::Running {
                remaining: self.remaining,
            }
        }
    }

    /// Cancels the countdown; later ticks report [`Tick::Stopped`].
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Restores the full duration and stops.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.running = false;
    }

    /// The clamped duration in seconds.
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether ticks currently count down.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The generation the countdown was last armed for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Urgency of the remaining time.
    #[must_use]
    pub fn urgency(&self) -> Urgency {
        Urgency::for_remaining(self.remaining)
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn display(&self) -> Remaining {
        Remaining(self.remaining)
    }
}

/// Raises `duration_seconds` to at least [`MIN_DURATION_SECONDS`].
#[must_use]
pub fn clamp_duration(duration_seconds: u32) -> u32 {
    duration_seconds.max(MIN_DURATION_SECONDS)
}

/// Seconds formatted as zero-padded `MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining(pub u32);

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_short_durations() {
        assert_eq!(CountdownController::new(0).duration(), 30);
        assert_eq!(CountdownController::new(29).duration(), 30);
        assert_eq!(CountdownController::new(90).duration(), 90);
    }

    #[test]
    fn test_unarmed_countdown_ignores_ticks() {
        let mut countdown = CountdownController::new(30);

        assert_eq!(countdown.tick(), Tick::Stopped);
        assert_eq!(countdown.remaining(), 30);
    }

    #[test]
    fn test_thirty_ticks_expire_exactly_once() {
        // Arrange
        let mut countdown = CountdownController::new(30);
        countdown.arm(0);

        // Act
        let ticks: Vec<Tick> = (0..32).map(|_| countdown.tick()).collect();

        // Assert
        assert_eq!(ticks[0], Tick::Running { remaining: 29 });
        assert_eq!(ticks[28], Tick::Running { remaining: 1 });
        assert_eq!(ticks[29], Tick::Expired);
        assert_eq!(ticks[30], Tick::Stopped);
        assert_eq!(ticks[31], Tick::Stopped);
        assert!(!countdown.is_running());
    }

    #[test]
    fn test_stop_cancels() {
        let mut countdown = CountdownController::new(30);
        countdown.arm(0);
        countdown.tick();

        countdown.stop();

        assert_eq!(countdown.tick(), Tick::Stopped);
        assert_eq!(countdown.remaining(), 29);
    }

    #[test]
    fn test_reset_restores_duration() {
        let mut countdown = CountdownController::new(45);
        countdown.arm(0);
        for _ in 0..10 {
            countdown.tick();
        }

        countdown.reset();

        assert_eq!(countdown.remaining(), 45);
        assert!(!countdown.is_running());
    }

    #[test]
    fn test_ticks_from_old_generation_are_stale() {
        let mut countdown = CountdownController::new(30);
        countdown.arm(0);
        countdown.tick();
        countdown.arm(1);

        assert_eq!(countdown.tick_for(0), Tick::Stale);
        assert_eq!(countdown.remaining(), 30);
        assert_eq!(countdown.tick_for(1), Tick::Running { remaining: 29 });
    }

    #[test]
    fn test_urgency_thresholds() {
        assert_eq!(Urgency::for_remaining(61), Urgency::Calm);
        assert_eq!(Urgency::for_remaining(60), Urgency::Warning);
        assert_eq!(Urgency::for_remaining(16), Urgency::Warning);
        assert_eq!(Urgency::for_remaining(15), Urgency::Critical);
        assert_eq!(Urgency::for_remaining(0), Urgency::Critical);
    }

    #[test]
    fn test_display_is_zero_padded_minutes_and_seconds() {
        assert_eq!(Remaining(0).to_string(), "00:00");
        assert_eq!(Remaining(59).to_string(), "00:59");
        assert_eq!(Remaining(90).to_string(), "01:30");
        assert_eq!(Remaining(3600).to_string(), "60:00");
        assert_eq!(CountdownController::new(120).display().to_string(), "02:00");
    }
}
