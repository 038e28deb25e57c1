//! Global animation clock shared by every animated tile.
//!
//! Elapsed time is accumulated as integer microseconds so the derived frame
//! phase is identical across runs and platforms under the fixed-timestep loop.
//! Float seconds are only accepted at the boundary (`advance`) and rounded once
//! per tick.
//!
//! The phase is `floor(elapsed_seconds * rate_hz) mod frames`. With the default
//! 8 Hz / 4 frames this is a four-step cycle repeating every 0.5 seconds.

const MICROS_PER_SECOND: u64 = 1_000_000;

pub const DEFAULT_RATE_HZ: u32 = 8;
pub const DEFAULT_FRAME_COUNT: u32 = 4;

/// Read-only view of the current animation phase.
///
/// Tile views and other animated content only ever need the phase, never the
/// clock itself, so they depend on this capability instead of a concrete clock.
pub trait AnimationPhase {
    fn tile_frame_phase(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationClock {
    elapsed_us: u64,
    rate_hz: u32,
    frame_count: u32,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_RATE_HZ, DEFAULT_FRAME_COUNT)
    }

    /// Zero values are bumped to 1 so the phase computation never divides by zero.
    pub fn with_rate(rate_hz: u32, frame_count: u32) -> Self {
        Self {
            elapsed_us: 0,
            rate_hz: rate_hz.max(1),
            frame_count: frame_count.max(1),
        }
    }

    /// Advance by `dt` seconds. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            if dt != 0.0 {
                log::warn!("Ignoring invalid animation clock delta {dt}");
            }
            return;
        }
        let dt_us = (dt * MICROS_PER_SECOND as f64).round() as u64;
        self.advance_us(dt_us);
    }

    pub fn advance_us(&mut self, dt_us: u64) {
        self.elapsed_us = self.elapsed_us.saturating_add(dt_us);
    }

    pub fn reset(&mut self) {
        self.elapsed_us = 0;
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_us as f64 / MICROS_PER_SECOND as f64
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Length of one full phase cycle in microseconds.
    pub fn cycle_us(&self) -> u64 {
        MICROS_PER_SECOND * self.frame_count as u64 / self.rate_hz as u64
    }

    pub fn phase(&self) -> u32 {
        let steps = self.elapsed_us as u128 * self.rate_hz as u128 / MICROS_PER_SECOND as u128;
        (steps % self.frame_count as u128) as u32
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationPhase for AnimationClock {
    fn tile_frame_phase(&self) -> u32 {
        self.phase()
    }
}
