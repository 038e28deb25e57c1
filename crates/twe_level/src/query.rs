//! Narrow read-only capabilities handed to tile views and other collaborators
//! instead of a reference to the whole level.

use glam::{IVec2, Vec2};

/// Read access to the tile-code grid.
pub trait GridQuery {
    /// Grid size in cells.
    fn dimensions(&self) -> IVec2;

    /// Code at `cell`, or 0 (empty) when `cell` lies outside the grid.
    fn cell_at(&self, cell: IVec2) -> u32;
}

/// Read access to the camera.
pub trait CameraQuery {
    fn true_position(&self) -> Vec2;
    fn viewport_half_extent(&self) -> Vec2;

    /// World-space pixel at the top-left corner of the visible rectangle.
    fn view_origin(&self) -> Vec2 {
        self.true_position() - self.viewport_half_extent()
    }
}

/// Continuous position of whatever the camera follows.
pub trait TargetProvider {
    fn target_position(&self) -> Vec2;
}

impl TargetProvider for Vec2 {
    fn target_position(&self) -> Vec2 {
        *self
    }
}
