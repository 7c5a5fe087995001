//! Time management utilities
//!
//! Game time and frame time are carried around as raw `i64` tick counts. The
//! [`TimingMode`] says what one tick means, so operations can convert deltas to
//! milliseconds or seconds without caring how the host loop measures time.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Unit of the game-time and frame-time values handed to scheduled operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingMode {
    /// One tick is a nanosecond
    Nanoseconds,
    /// One tick is a microsecond
    Microseconds,
    /// One tick is a millisecond
    #[default]
    Milliseconds,
}

impl TimingMode {
    /// Number of ticks in one second
    pub const fn ticks_per_second(self) -> i64 {
        match self {
            Self::Nanoseconds => 1_000_000_000,
            Self::Microseconds => 1_000_000,
            Self::Milliseconds => 1_000,
        }
    }

    /// Convert a tick count to milliseconds
    #[allow(clippy::cast_precision_loss)]
    pub fn to_millis(self, ticks: i64) -> f64 {
        ticks as f64 * 1_000.0 / self.ticks_per_second() as f64
    }

    /// Convert a tick count to seconds
    #[allow(clippy::cast_precision_loss)]
    pub fn to_seconds(self, ticks: i64) -> f64 {
        ticks as f64 / self.ticks_per_second() as f64
    }

    /// Convert milliseconds to a tick count (truncating)
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_millis(self, millis: f64) -> i64 {
        (millis * self.ticks_per_second() as f64 / 1_000.0) as i64
    }

    /// Convert a duration to a tick count, saturating at `i64::MAX`
    pub fn from_duration(self, duration: Duration) -> i64 {
        let ticks = match self {
            Self::Nanoseconds => duration.as_nanos(),
            Self::Microseconds => duration.as_micros(),
            Self::Milliseconds => duration.as_millis(),
        };
        i64::try_from(ticks).unwrap_or(i64::MAX)
    }
}

/// High-precision timer for frame timing
///
/// Produces monotonically increasing game time and per-frame deltas in the
/// units of its [`TimingMode`].
pub struct Timer {
    start: Instant,
    timing_mode: TimingMode,
    game_time: i64,
    frame_time: i64,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(TimingMode::default())
    }
}

impl Timer {
    /// Create a new timer
    pub fn new(timing_mode: TimingMode) -> Self {
        Self {
            start: Instant::now(),
            timing_mode,
            game_time: 0,
            frame_time: 0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    ///
    /// Returns the new `(game_time, frame_time)` pair.
    pub fn tick(&mut self) -> (i64, i64) {
        let now = Instant::now();
        let game_time = self.timing_mode.from_duration(now.duration_since(self.start));
        self.frame_time = game_time - self.game_time;
        self.game_time = game_time;
        self.frame_count += 1;
        (self.game_time, self.frame_time)
    }

    /// Game time at the last tick
    pub fn game_time(&self) -> i64 {
        self.game_time
    }

    /// Time between the last two ticks
    pub fn frame_time(&self) -> i64 {
        self.frame_time
    }

    /// Unit of the values this timer produces
    pub fn timing_mode(&self) -> TimingMode {
        self.timing_mode
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
