//! The tile window: one lightweight view per grid cell that can be on screen.
//!
//! The window is anchored at the cell under the top-left corner of the
//! viewport and spans `viewport_cells + 1` cells per axis, so a camera sitting
//! between grid lines still has its trailing edge covered. Views are rebuilt
//! wholesale; nothing is shifted or recycled when the camera moves.
//!
//! A `TileView` stores only its absolute grid coordinate. Its appearance is
//! pulled from the grid and the animation phase whenever it is asked for, and
//! coordinates outside the grid read as empty.

use glam::{IVec2, Vec2};
use twe_core::AnimationPhase;

use crate::entities::{EntityBudget, EntityGroup};
use crate::map_grid::EMPTY_CODE;
use crate::query::{CameraQuery, GridQuery};
use crate::tile_types::TileTypeTable;

/// Grid cell containing the top-left corner of the visible rectangle.
pub fn top_left_cell(camera_position: Vec2, viewport_half_extent: Vec2, cell_size: f32) -> IVec2 {
    ((camera_position - viewport_half_extent) / cell_size)
        .floor()
        .as_ivec2()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLayout {
    pub top_left: IVec2,
    /// Window size in cells (viewport plus one).
    pub cells: IVec2,
}

impl WindowLayout {
    pub fn around(camera: &impl CameraQuery, cell_size: f32, cells: IVec2) -> Self {
        Self {
            top_left: top_left_cell(
                camera.true_position(),
                camera.viewport_half_extent(),
                cell_size,
            ),
            cells,
        }
    }

    pub fn tile_count(&self) -> usize {
        (self.cells.x.max(0) * self.cells.y.max(0)) as usize
    }

    /// Absolute coordinates covered by the window, row by row.
    pub fn coordinates(&self) -> impl Iterator<Item = IVec2> {
        let WindowLayout { top_left, cells } = *self;
        (0..cells.y).flat_map(move |j| (0..cells.x).map(move |i| top_left + IVec2::new(i, j)))
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        let offset = cell - self.top_left;
        offset.x >= 0 && offset.y >= 0 && offset.x < self.cells.x && offset.y < self.cells.y
    }
}

/// Resolved look of one visible cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileAppearance<'a> {
    pub code: u32,
    pub asset_id: &'a str,
    pub solid: bool,
    /// Animation phase the asset was chosen for.
    pub frame: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileView {
    grid_coordinate: IVec2,
}

impl TileView {
    pub fn new(grid_coordinate: IVec2) -> Self {
        Self { grid_coordinate }
    }

    pub fn grid_coordinate(&self) -> IVec2 {
        self.grid_coordinate
    }

    pub fn code(&self, grid: &impl GridQuery) -> u32 {
        grid.cell_at(self.grid_coordinate)
    }

    /// `None` for empty cells and for codes the table does not know.
    pub fn appearance<'t>(
        &self,
        grid: &impl GridQuery,
        phase: &impl AnimationPhase,
        table: &'t TileTypeTable,
    ) -> Option<TileAppearance<'t>> {
        let code = self.code(grid);
        if code == EMPTY_CODE {
            return None;
        }
        let Some(tile) = table.resolve(code) else {
            log::trace!(
                "No tile type for code {code} at ({}, {})",
                self.grid_coordinate.x,
                self.grid_coordinate.y
            );
            return None;
        };
        let frame = phase.tile_frame_phase();
        Some(TileAppearance {
            code,
            asset_id: tile.frame_asset(frame),
            solid: tile.solid,
            frame,
        })
    }

    /// Top-left corner of the cell in world pixels.
    pub fn world_position(&self, cell_size: f32) -> Vec2 {
        self.grid_coordinate.as_vec2() * cell_size
    }

    /// Top-left corner on screen. The view origin is snapped to whole pixels
    /// so every tile in the window shifts by the same integer amount.
    pub fn screen_position(&self, camera: &impl CameraQuery, cell_size: f32) -> Vec2 {
        self.world_position(cell_size) - camera.view_origin().floor()
    }
}

/// Destroy every view in `tiles` and spawn a full window for `layout`.
pub fn rebuild_window(
    tiles: &mut EntityGroup<TileView>,
    budget: &mut EntityBudget,
    layout: &WindowLayout,
) {
    tiles.clear(budget);
    for coordinate in layout.coordinates() {
        tiles.spawn(budget, TileView::new(coordinate));
    }
    log::debug!(
        "Tile window rebuilt at ({}, {}) with {} views",
        layout.top_left.x,
        layout.top_left.y,
        tiles.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_grid::MapGrid;
    use std::collections::HashSet;
    use twe_core::AnimationClock;

    struct FixedCamera(Vec2);

    impl CameraQuery for FixedCamera {
        fn true_position(&self) -> Vec2 {
            self.0
        }

        fn viewport_half_extent(&self) -> Vec2 {
            Vec2::new(120.0, 96.0)
        }
    }

    struct FixedPhase(u32);

    impl AnimationPhase for FixedPhase {
        fn tile_frame_phase(&self) -> u32 {
            self.0
        }
    }

    fn sample_grid() -> MapGrid {
        let mut grid = MapGrid::new(20, 15, IVec2::new(2, 3)).expect("valid grid");
        grid.set_cell(IVec2::new(0, 5), 1).expect("in bounds");
        grid.set_cell(IVec2::new(4, 4), 19).expect("in bounds");
        grid.set_cell(IVec2::new(5, 4), 77).expect("in bounds");
        grid
    }

    #[test]
    fn top_left_floors_toward_negative_infinity() {
        let half = Vec2::new(120.0, 96.0);
        assert_eq!(top_left_cell(Vec2::new(120.0, 96.0), half, 16.0), IVec2::ZERO);
        assert_eq!(
            top_left_cell(Vec2::new(135.9, 111.9), half, 16.0),
            IVec2::ZERO
        );
        assert_eq!(
            top_left_cell(Vec2::new(136.0, 112.0), half, 16.0),
            IVec2::new(1, 1)
        );
        assert_eq!(
            top_left_cell(Vec2::new(110.0, 96.0), half, 16.0),
            IVec2::new(-1, 0)
        );
    }

    #[test]
    fn layout_covers_viewport_plus_one() {
        let camera = FixedCamera(Vec2::new(200.0, 140.0));
        let layout = WindowLayout::around(&camera, 16.0, IVec2::new(16, 13));
        assert_eq!(layout.top_left, IVec2::new(5, 2));
        assert_eq!(layout.tile_count(), 208);

        let coords: Vec<IVec2> = layout.coordinates().collect();
        assert_eq!(coords.len(), 208);
        assert_eq!(coords[0], IVec2::new(5, 2));
        assert_eq!(coords[1], IVec2::new(6, 2));
        assert_eq!(coords[207], IVec2::new(20, 14));
        let unique: HashSet<(i32, i32)> = coords.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(unique.len(), 208);
        assert!(coords.iter().all(|&c| layout.contains(c)));
        assert!(!layout.contains(IVec2::new(21, 2)));
    }

    #[test]
    fn rebuild_replaces_previous_views() {
        let mut budget = EntityBudget::new(1000);
        let mut tiles = EntityGroup::new("tiles");
        let layout = WindowLayout {
            top_left: IVec2::new(-1, -1),
            cells: IVec2::new(4, 3),
        };
        rebuild_window(&mut tiles, &mut budget, &layout);
        assert_eq!(tiles.len(), 12);

        let moved = WindowLayout {
            top_left: IVec2::new(3, 0),
            ..layout
        };
        rebuild_window(&mut tiles, &mut budget, &moved);
        assert_eq!(tiles.len(), 12);
        assert_eq!(budget.live(), 12);
        assert_eq!(tiles.as_slice()[0].grid_coordinate(), IVec2::new(3, 0));
    }

    #[test]
    fn out_of_grid_view_is_empty() {
        let grid = sample_grid();
        let table = TileTypeTable::builtin();
        let clock = AnimationClock::new();

        let view = TileView::new(IVec2::new(-1, 5));
        assert_eq!(view.code(&grid), EMPTY_CODE);
        assert!(view.appearance(&grid, &clock, &table).is_none());

        let inside = TileView::new(IVec2::new(0, 5));
        let look = inside.appearance(&grid, &clock, &table).expect("blue tile");
        assert_eq!(look.asset_id, "Blue-1");
        assert!(look.solid);
    }

    #[test]
    fn animated_view_follows_phase() {
        let grid = sample_grid();
        let table = TileTypeTable::builtin();
        let view = TileView::new(IVec2::new(4, 4));

        for phase in 0..4 {
            let look = view
                .appearance(&grid, &FixedPhase(phase), &table)
                .expect("question block");
            assert_eq!(look.asset_id, format!("Question{}", phase + 1));
            assert_eq!(look.frame, phase);
        }
    }

    #[test]
    fn unknown_code_has_no_appearance() {
        let grid = sample_grid();
        let table = TileTypeTable::builtin();
        let view = TileView::new(IVec2::new(5, 4));
        assert_eq!(view.code(&grid), 77);
        assert!(view.appearance(&grid, &FixedPhase(0), &table).is_none());
    }

    #[test]
    fn screen_position_is_pixel_aligned() {
        let camera = FixedCamera(Vec2::new(150.6, 100.25));
        let view = TileView::new(IVec2::new(3, 1));
        assert_eq!(view.world_position(16.0), Vec2::new(48.0, 16.0));
        // origin (30.6, 4.25) snaps to (30, 4)
        assert_eq!(view.screen_position(&camera, 16.0), Vec2::new(18.0, 12.0));
    }
}
