//! Game clock
//!
//! Time is accumulated from the deltas the engine feeds in, never read from
//! the wall clock, so every timer in the game (damage cooldowns, lifetimes,
//! message auto-hide) is deterministic under a scripted frame sequence.

use std::time::Duration;

/// Longest frame the clock accepts; longer deltas are clamped
pub const MAX_FRAME_DELTA: f32 = 1.0;

/// Monotonic game time tracking
#[derive(Debug, Clone, Default)]
pub struct Time {
    /// Seconds elapsed since the engine started
    elapsed: f64,
    /// Seconds covered by the last frame
    delta: f32,
    /// Number of frames advanced so far
    frame_count: u64,
    /// Fixed timestep used by physics callbacks
    fixed_delta: f32,
}

impl Time {
    /// Create a new clock at zero
    pub fn new() -> Self {
        Self::with_fixed_delta(1.0 / 50.0)
    }

    /// Create a clock with a specific fixed timestep
    pub fn with_fixed_delta(fixed_delta: f32) -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            frame_count: 0,
            fixed_delta,
        }
    }

    /// Advance the clock by one frame. Negative and non-finite deltas count
    /// as zero; anything above [`MAX_FRAME_DELTA`] is clamped.
    pub fn advance(&mut self, delta_seconds: f32) {
        let delta_seconds = if delta_seconds.is_finite() {
            delta_seconds.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.delta = delta_seconds;
        self.elapsed += f64::from(delta_seconds);
        self.frame_count += 1;
    }

    /// Frame delta as a `Duration`
    pub fn delta(&self) -> Duration {
        Duration::from_secs_f32(self.delta)
    }

    /// Frame delta in seconds
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Fixed timestep in seconds
    pub fn fixed_delta_seconds(&self) -> f32 {
        self.fixed_delta
    }

    /// Seconds since start
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
