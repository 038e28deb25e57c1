//! Camera that follows a target through the level.
//!
//! Horizontal tracking is direct. Vertical tracking is a first-order low-pass
//! filter: each tick the camera closes `1/divisor` of the gap to the target,
//! which hides the jitter of fast vertical motion such as jumps. After the
//! filter the position is clamped into `CameraBounds`.
//!
//! Bounds are the world rectangle inset by the margin and then shrunk by half
//! the viewport on each side, so the visible rectangle never leaves the world.
//! On an axis where the world is narrower than the viewport the range is
//! inverted and the clamp pins the camera to the world's centre instead.

use glam::Vec2;

use crate::query::CameraQuery;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl CameraBounds {
    pub fn from_world(world_size: Vec2, viewport_half_extent: Vec2, margin: f32) -> Self {
        Self {
            min: Vec2::splat(margin) + viewport_half_extent,
            max: world_size - Vec2::splat(margin) - viewport_half_extent,
        }
    }

    /// True when the world is smaller than the viewport on that axis.
    pub fn is_degenerate_x(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn is_degenerate_y(&self) -> bool {
        self.min.y > self.max.y
    }

    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            clamp_axis(position.x, self.min.x, self.max.x),
            clamp_axis(position.y, self.min.y, self.max.y),
        )
    }

    pub fn contains(&self, position: Vec2) -> bool {
        self.clamp(position) == position
    }
}

fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    if min > max {
        (min + max) / 2.0
    } else {
        value.clamp(min, max)
    }
}

#[derive(Debug, Clone)]
pub struct CameraController {
    true_position: Vec2,
    bounds: CameraBounds,
    viewport_half_extent: Vec2,
    smoothing_divisor: f32,
    override_pending: bool,
}

impl CameraController {
    pub fn new(bounds: CameraBounds, viewport_half_extent: Vec2, smoothing_divisor: f32) -> Self {
        Self {
            true_position: bounds.clamp(Vec2::ZERO),
            bounds,
            viewport_half_extent,
            smoothing_divisor: smoothing_divisor.max(1.0),
            override_pending: false,
        }
    }

    pub fn bounds(&self) -> CameraBounds {
        self.bounds
    }

    /// Install new bounds after the grid changed. The position is left alone
    /// until the next `place` or `update`.
    pub fn set_bounds(&mut self, bounds: CameraBounds) {
        self.bounds = bounds;
    }

    /// Jump straight to `position`, clamped. Used when a level is (re)loaded.
    pub fn place(&mut self, position: Vec2) {
        self.true_position = self.bounds.clamp(position);
        self.override_pending = false;
    }

    pub fn position(&self) -> Vec2 {
        self.true_position
    }

    /// External override. The value is stored verbatim; the next `update`
    /// skips tracking and only clamps, then filtering resumes.
    pub fn set_position(&mut self, position: Vec2) {
        self.true_position = position;
        self.override_pending = true;
    }

    /// Unclamped result of one filter step toward `target`.
    pub fn filtered_toward(&self, target: Vec2) -> Vec2 {
        Vec2::new(
            target.x,
            self.true_position.y + (target.y - self.true_position.y) / self.smoothing_divisor,
        )
    }

    pub fn update(&mut self, target: Vec2) -> Vec2 {
        let next = if self.override_pending {
            self.override_pending = false;
            self.true_position
        } else {
            self.filtered_toward(target)
        };
        self.true_position = self.bounds.clamp(next);
        self.true_position
    }
}

impl CameraQuery for CameraController {
    fn true_position(&self) -> Vec2 {
        self.true_position
    }

    fn viewport_half_extent(&self) -> Vec2 {
        self.viewport_half_extent
    }
}
