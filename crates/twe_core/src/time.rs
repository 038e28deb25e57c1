//! Fixed-timestep driver for the level tick.
//!
//! Frame time (measured or simulated) is fed into an accumulator and drained in
//! `fixed_dt` slices. Every level tick sees the same delta, which keeps the
//! camera filter and the animation clock reproducible between runs.

use std::time::Instant;

pub const DEFAULT_FIXED_DT: f64 = 1.0 / 60.0;
const DEFAULT_MAX_FRAME: f64 = 0.25;

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_frame: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    last_instant: Instant,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt(DEFAULT_FIXED_DT)
    }

    pub fn with_fixed_dt(fixed_dt: f64) -> Self {
        Self {
            fixed_dt,
            max_frame: DEFAULT_MAX_FRAME,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            last_instant: Instant::now(),
        }
    }

    /// Start a frame using wall-clock time since the previous frame.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.feed(real_dt);
    }

    /// Start a frame with an explicit delta (headless or replayed runs).
    pub fn feed(&mut self, frame_dt: f64) {
        let mut frame_dt = frame_dt.max(0.0);
        // Spiral-of-death cap
        if frame_dt > self.max_frame {
            log::warn!(
                "Frame took {:.1}ms, capping to {:.1}ms",
                frame_dt * 1000.0,
                self.max_frame * 1000.0
            );
            frame_dt = self.max_frame;
        }
        self.accumulator += frame_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Fraction of a fixed step left in the accumulator, for render interpolation.
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_dt
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
