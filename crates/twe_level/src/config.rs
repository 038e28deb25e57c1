//! Startup configuration for a level: grid metrics, viewport size, camera
//! filter and animation rate.
//!
//! Every field has a default so a config file only needs to name what it
//! overrides. The defaults describe a 15x12-cell viewport of 16px tiles.

use std::fs;
use std::path::Path;

use glam::{IVec2, Vec2};
use serde::Deserialize;

use crate::error::ConfigError;

/// Largest viewport extent whose window still has an `i32` cell count.
pub const MAX_VIEWPORT_CELLS: u32 = i32::MAX as u32 - 1;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelConfig {
    /// Side length of one grid cell in world pixels.
    pub cell_size: u32,
    /// Visible cells along x and y.
    pub viewport_cells: [u32; 2],
    /// Inset applied to the world rectangle before the camera bounds are derived.
    pub bounds_margin: f32,
    /// Vertical distance from the top of the start cell to the spawn point.
    pub spawn_foot_offset: f32,
    /// The camera closes `1/divisor` of the vertical gap to its target per tick.
    pub vertical_smoothing_divisor: f32,
    pub animation_rate_hz: u32,
    pub animation_frames: u32,
    /// Upper bound on live entities across all level containers.
    pub entity_capacity: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            cell_size: 16,
            viewport_cells: [15, 12],
            bounds_margin: 0.0,
            spawn_foot_offset: 16.0,
            vertical_smoothing_divisor: 4.0,
            animation_rate_hz: twe_core::clock::DEFAULT_RATE_HZ,
            animation_frames: twe_core::clock::DEFAULT_FRAME_COUNT,
            entity_capacity: 4096,
        }
    }
}

impl LevelConfig {
    pub fn cell_size_f32(&self) -> f32 {
        self.cell_size as f32
    }

    pub fn viewport_size(&self) -> Vec2 {
        Vec2::new(
            self.viewport_cells[0] as f32,
            self.viewport_cells[1] as f32,
        ) * self.cell_size_f32()
    }

    pub fn viewport_half_extent(&self) -> Vec2 {
        self.viewport_size() / 2.0
    }

    /// Cells in the live window: the viewport plus one trailing cell per axis.
    pub fn window_cells(&self) -> IVec2 {
        IVec2::new(
            window_axis(self.viewport_cells[0]),
            window_axis(self.viewport_cells[1]),
        )
    }

    /// Saturates instead of overflowing; `validate` rejects such sizes.
    pub fn window_tile_count(&self) -> usize {
        let [x, y] = self.viewport_cells.map(|cells| (cells as usize).saturating_add(1));
        x.saturating_mul(y)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::Invalid("cell_size must be > 0".to_string()));
        }
        if self.viewport_cells[0] == 0 || self.viewport_cells[1] == 0 {
            return Err(ConfigError::Invalid(
                "viewport_cells must be > 0 on both axes".to_string(),
            ));
        }
        if self.viewport_cells.iter().any(|&cells| cells > MAX_VIEWPORT_CELLS) {
            return Err(ConfigError::Invalid(format!(
                "viewport_cells must be <= {MAX_VIEWPORT_CELLS} on both axes"
            )));
        }
        if self
            .viewport_cells
            .iter()
            .any(|&cells| cells.checked_mul(self.cell_size).is_none())
        {
            return Err(ConfigError::Invalid(
                "viewport_cells * cell_size overflows".to_string(),
            ));
        }
        if !self.bounds_margin.is_finite() || self.bounds_margin < 0.0 {
            return Err(ConfigError::Invalid(
                "bounds_margin must be >= 0".to_string(),
            ));
        }
        if !self.spawn_foot_offset.is_finite() {
            return Err(ConfigError::Invalid(
                "spawn_foot_offset must be finite".to_string(),
            ));
        }
        if !self.vertical_smoothing_divisor.is_finite() || self.vertical_smoothing_divisor < 1.0 {
            return Err(ConfigError::Invalid(
                "vertical_smoothing_divisor must be >= 1".to_string(),
            ));
        }
        if self.animation_rate_hz == 0 || self.animation_frames == 0 {
            return Err(ConfigError::Invalid(
                "animation_rate_hz and animation_frames must be > 0".to_string(),
            ));
        }
        // The window plus the player proxy must fit.
        let window_tiles = (u64::from(self.viewport_cells[0]) + 1)
            .checked_mul(u64::from(self.viewport_cells[1]) + 1);
        if window_tiles.map_or(true, |tiles| self.entity_capacity as u64 <= tiles) {
            return Err(ConfigError::Invalid(format!(
                "entity_capacity {} cannot hold a {}-tile window and the player",
                self.entity_capacity,
                self.window_tile_count()
            )));
        }
        Ok(())
    }
}

fn window_axis(viewport_cells: u32) -> i32 {
    i32::try_from(viewport_cells)
        .unwrap_or(i32::MAX)
        .saturating_add(1)
}

pub fn load_config_from_path(path: &Path) -> Result<LevelConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: LevelConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
