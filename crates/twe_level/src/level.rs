//! Level orchestration: owns the grid, the camera, the animation clock and the
//! per-level containers, and sequences load, reload, import and export.
//!
//! Load order on `open`/`load_level`:
//!
//!   0. (`open` only) validate the injected `LevelConfig`
//!   1. read and validate the map file into a fresh `MapGrid`
//!   2. on failure return the error; the current level is untouched
//!   3. destroy the old containers and tile window
//!   4. recompute camera bounds from the new grid
//!   5. spawn the player at the start cell, place the camera on it (clamped)
//!   6. build the full tile window around the clamped camera
//!
//! Reload is therefore transactional: a bad path or a bad file never leaves
//! the level without a grid or a window.

use std::path::{Path, PathBuf};

use glam::{IVec2, Vec2};
use twe_core::{AnimationClock, AnimationPhase};

use crate::camera::{CameraBounds, CameraController};
use crate::config::LevelConfig;
use crate::entities::{EntityBudget, LevelContainers, PlayerProxy};
use crate::error::{LevelError, MapError};
use crate::map_grid::{load_map_from_path, save_map_to_path, MapGrid};
use crate::query::{CameraQuery, GridQuery, TargetProvider};
use crate::tile_types::TileTypeTable;
use crate::window::{rebuild_window, TileAppearance, TileView, WindowLayout};

pub struct Level {
    config: LevelConfig,
    tile_types: TileTypeTable,
    map: MapGrid,
    map_path: PathBuf,
    camera: CameraController,
    clock: AnimationClock,
    budget: EntityBudget,
    containers: LevelContainers,
    window: WindowLayout,
    start_marker: IVec2,
}

impl Level {
    /// Check the config, load the first map and build everything around it.
    pub fn open(
        config: LevelConfig,
        tile_types: TileTypeTable,
        path: &Path,
    ) -> Result<Self, LevelError> {
        config
            .validate()
            .inspect_err(|err| log::error!("Level config rejected: {err}"))?;
        let map = load_map(path)?;
        let bounds = bounds_for(&config, &map);
        let camera = CameraController::new(
            bounds,
            config.viewport_half_extent(),
            config.vertical_smoothing_divisor,
        );
        let mut budget = EntityBudget::new(config.entity_capacity);
        let containers = LevelContainers::spawn(0, &mut budget, Vec2::ZERO);
        let clock = AnimationClock::with_rate(config.animation_rate_hz, config.animation_frames);
        let window = WindowLayout {
            top_left: IVec2::ZERO,
            cells: config.window_cells(),
        };

        let mut level = Self {
            config,
            tile_types,
            start_marker: map.start_pos(),
            map,
            map_path: path.to_path_buf(),
            camera,
            clock,
            budget,
            containers,
            window,
        };
        level.rebuild();
        Ok(level)
    }

    /// Replace the current level with the map at `path`.
    pub fn load_level(&mut self, path: &Path) -> Result<(), MapError> {
        let map = load_map(path)?;
        self.map = map;
        self.map_path = path.to_path_buf();
        self.start_marker = self.map.start_pos();
        self.recompute_bounds();
        self.rebuild();
        Ok(())
    }

    /// Swap in the map at `path` and refresh the camera bounds, leaving the
    /// containers, the tile window and the camera position as they are.
    pub fn import_in_place(&mut self, path: &Path) -> Result<(), MapError> {
        let map = load_map(path)?;
        self.map = map;
        self.map_path = path.to_path_buf();
        self.recompute_bounds();
        log::info!(
            "Imported map '{}' in place ({}x{})",
            path.display(),
            self.map.width(),
            self.map.height()
        );
        Ok(())
    }

    pub fn export_current_map(&self, path: &Path) -> Result<(), MapError> {
        match save_map_to_path(&self.map, path) {
            Ok(()) => {
                log::info!("Exported map to '{}'", path.display());
                Ok(())
            }
            Err(err) => {
                log::error!("Map export failed: {err}");
                Err(err)
            }
        }
    }

    /// Advance one tick, following the player proxy.
    pub fn tick(&mut self, dt: f64) {
        let target = self.containers.player;
        self.tick_with_target(dt, &target);
    }

    pub fn tick_with_target(&mut self, dt: f64, target: &dyn TargetProvider) {
        self.clock.advance(dt);
        self.camera.update(target.target_position());
    }

    pub fn tile_frame_phase(&self) -> u32 {
        self.clock.phase()
    }

    pub fn get_camera_pos(&self) -> Vec2 {
        self.camera.position()
    }

    pub fn set_camera_pos(&mut self, position: Vec2) {
        self.camera.set_position(position);
    }

    pub fn camera_bounds(&self) -> CameraBounds {
        self.camera.bounds()
    }

    /// Where the player appears: the start cell's horizontal centre, offset
    /// down to the feet.
    pub fn spawn_position(&self) -> Vec2 {
        let cell_size = self.config.cell_size_f32();
        self.map.start_pos().as_vec2() * cell_size
            + Vec2::new(cell_size / 2.0, self.config.spawn_foot_offset)
    }

    pub fn tile_appearance(&self, view: &TileView) -> Option<TileAppearance<'_>> {
        view.appearance(&self.map, &self.clock, &self.tile_types)
    }

    pub fn tile_views(&self) -> &[TileView] {
        self.containers.tiles.as_slice()
    }

    pub fn window(&self) -> &WindowLayout {
        &self.window
    }

    pub fn map(&self) -> &MapGrid {
        &self.map
    }

    /// Editing tools change cells through this and then call
    /// `export_current_map`. The tile window picks edits up on its next read.
    pub fn map_mut(&mut self) -> &mut MapGrid {
        &mut self.map
    }

    pub fn map_path(&self) -> &Path {
        &self.map_path
    }

    pub fn start_marker(&self) -> IVec2 {
        self.start_marker
    }

    pub fn player(&self) -> &PlayerProxy {
        &self.containers.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerProxy {
        &mut self.containers.player
    }

    pub fn containers(&self) -> &LevelContainers {
        &self.containers
    }

    /// Containers plus the budget they spawn against.
    pub fn containers_mut(&mut self) -> (&mut LevelContainers, &mut EntityBudget) {
        (&mut self.containers, &mut self.budget)
    }

    pub fn live_entities(&self) -> usize {
        self.budget.live()
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn tile_types(&self) -> &TileTypeTable {
        &self.tile_types
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    fn recompute_bounds(&mut self) {
        self.camera.set_bounds(bounds_for(&self.config, &self.map));
    }

    fn rebuild(&mut self) {
        let generation = self.containers.generation.wrapping_add(1);
        self.containers.destroy(&mut self.budget);

        let spawn = self.spawn_position();
        self.containers = LevelContainers::spawn(generation, &mut self.budget, spawn);
        self.camera.place(spawn);

        self.window = WindowLayout::around(
            &self.camera,
            self.config.cell_size_f32(),
            self.config.window_cells(),
        );
        rebuild_window(&mut self.containers.tiles, &mut self.budget, &self.window);

        log::info!(
            "Level '{}' loaded: {}x{} cells, start ({}, {}), {} tile views",
            self.map_path.display(),
            self.map.width(),
            self.map.height(),
            self.map.start_pos().x,
            self.map.start_pos().y,
            self.containers.tiles.len()
        );
    }
}

fn load_map(path: &Path) -> Result<MapGrid, MapError> {
    load_map_from_path(path).inspect_err(|err| log::error!("Map load failed: {err}"))
}

fn bounds_for(config: &LevelConfig, map: &MapGrid) -> CameraBounds {
    CameraBounds::from_world(
        map.world_size(config.cell_size_f32()),
        config.viewport_half_extent(),
        config.bounds_margin,
    )
}

impl GridQuery for Level {
    fn dimensions(&self) -> IVec2 {
        self.map.dimensions()
    }

    fn cell_at(&self, cell: IVec2) -> u32 {
        self.map.cell_at(cell)
    }
}

impl CameraQuery for Level {
    fn true_position(&self) -> Vec2 {
        self.camera.position()
    }

    fn viewport_half_extent(&self) -> Vec2 {
        self.config.viewport_half_extent()
    }
}

impl AnimationPhase for Level {
    fn tile_frame_phase(&self) -> u32 {
        self.clock.phase()
    }
}
