//! Incrementally rendered tile world: the persistent map grid and its codec,
//! the camera that follows a target through it, and the window of tile views
//! materialized around the camera.

pub mod camera;
pub mod config;
pub mod entities;
pub mod error;
pub mod level;
pub mod map_grid;
pub mod query;
pub mod tile_types;
pub mod window;

pub use camera::{CameraBounds, CameraController};
pub use config::{load_config_from_path, LevelConfig};
pub use entities::{EntityBudget, EntityGroup, LevelContainers, PlayerProxy, WorldEntity};
pub use error::{
    ConfigError, LevelError, MapError, MapErrorKind, SchemaViolation, TileTableError,
};
pub use level::Level;
pub use map_grid::{load_map_from_path, save_map_to_path, MapGrid, EMPTY_CODE};
pub use query::{CameraQuery, GridQuery, TargetProvider};
pub use tile_types::{load_tile_table_from_path, TileType, TileTypeTable};
pub use window::{top_left_cell, TileAppearance, TileView, WindowLayout};
