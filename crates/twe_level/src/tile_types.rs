//! Tile-type lookup: what a cell code looks like and whether it is solid.
//!
//! The table is static data handed to the level at startup. Codes that cycle
//! through several frames (coins, question blocks) carry an animation group;
//! the frame shown is picked by the global animation phase so every animated
//! tile on screen stays in step.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::TileTableError;
use crate::map_grid::EMPTY_CODE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileType {
    pub visual_asset_id: String,
    pub solid: bool,
    /// Frame asset ids cycled by the animation phase.
    pub animation_group: Option<Vec<String>>,
}

impl TileType {
    fn fixed(asset: &str, solid: bool) -> Self {
        Self {
            visual_asset_id: asset.to_string(),
            solid,
            animation_group: None,
        }
    }

    fn animated(asset: &str, solid: bool, frames: &[&str]) -> Self {
        Self {
            visual_asset_id: asset.to_string(),
            solid,
            animation_group: Some(frames.iter().map(|f| f.to_string()).collect()),
        }
    }

    /// Asset to draw for `phase`.
    pub fn frame_asset(&self, phase: u32) -> &str {
        match &self.animation_group {
            Some(frames) if !frames.is_empty() => &frames[phase as usize % frames.len()],
            _ => &self.visual_asset_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TileTypeTable {
    types: HashMap<u32, TileType>,
}

impl TileTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: u32, tile: TileType) -> Result<(), TileTableError> {
        if code == EMPTY_CODE {
            return Err(TileTableError::ReservedCode);
        }
        if tile.visual_asset_id.is_empty() {
            return Err(TileTableError::EmptyAsset(code));
        }
        if self.types.insert(code, tile).is_some() {
            return Err(TileTableError::DuplicateCode(code));
        }
        Ok(())
    }

    pub fn resolve(&self, code: u32) -> Option<&TileType> {
        self.types.get(&code)
    }

    pub fn is_solid(&self, code: u32) -> bool {
        self.resolve(code).is_some_and(|tile| tile.solid)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The stock tile set: blue ground pieces, gold and wood blocks, wood
    /// scenery, spinning coins and flashing question blocks.
    pub fn builtin() -> Self {
        let mut types = HashMap::new();
        for n in 1..=9u32 {
            types.insert(n, TileType::fixed(&format!("Blue-{n}"), true));
        }
        types.insert(10, TileType::fixed("Block-Gold", true));
        types.insert(11, TileType::fixed("Block-Wood", true));
        for n in 0..=5u32 {
            types.insert(12 + n, TileType::fixed(&format!("Wood-{n}"), false));
        }
        types.insert(
            18,
            TileType::animated("Coin1", false, &["Coin1", "Coin2", "Coin3", "Coin4"]),
        );
        types.insert(
            19,
            TileType::animated(
                "Question1",
                true,
                &["Question1", "Question2", "Question3", "Question4"],
            ),
        );
        Self { types }
    }
}

#[derive(Debug, Deserialize)]
struct TileTableJson {
    tiles: Vec<TileEntryJson>,
}

#[derive(Debug, Deserialize)]
struct TileEntryJson {
    code: u32,
    asset: String,
    #[serde(default)]
    solid: bool,
    #[serde(default)]
    frames: Vec<String>,
}

pub fn load_tile_table_from_path(path: &Path) -> Result<TileTypeTable, TileTableError> {
    let raw = fs::read_to_string(path).map_err(|source| TileTableError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let json: TileTableJson =
        serde_json::from_str(&raw).map_err(|source| TileTableError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut table = TileTypeTable::new();
    for entry in json.tiles {
        let animation_group = (!entry.frames.is_empty()).then_some(entry.frames);
        table.insert(
            entry.code,
            TileType {
                visual_asset_id: entry.asset,
                solid: entry.solid,
                animation_group,
            },
        )?;
    }
    if table.is_empty() {
        log::warn!("Tile table '{}' defines no tiles", path.display());
    }
    Ok(table)
}
