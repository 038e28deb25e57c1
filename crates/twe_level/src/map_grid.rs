//! Authoritative tile-code grid and its JSON codec.
//!
//! The same file shape is read by the game and written by editing tools:
//!
//! ```json
//! {
//!   "dimensions": [width, height],
//!   "start_pos": [x, y],
//!   "tiles": [[code, ...width...], ...height rows...]
//! }
//! ```
//!
//! Loading is all-or-nothing: the file is parsed and fully validated into a
//! fresh `MapGrid` before anything is returned, so a caller that only adopts
//! the result on `Ok` never ends up holding a half-checked grid.
//!
//! Cells live in one row-major buffer; `index_of` is the single place where a
//! cell coordinate becomes a buffer index.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::{MapError, SchemaViolation};
use crate::query::GridQuery;

/// Code stored in cells that hold nothing.
pub const EMPTY_CODE: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGrid {
    width: u32,
    height: u32,
    start_pos: IVec2,
    cells: Vec<u32>,
}

impl MapGrid {
    /// An all-empty grid.
    pub fn new(width: u32, height: u32, start_pos: IVec2) -> Result<Self, SchemaViolation> {
        check_dimensions(width as i64, height as i64)?;
        check_start(start_pos.x as i64, start_pos.y as i64, width, height)?;
        Ok(Self {
            width,
            height,
            start_pos,
            cells: vec![EMPTY_CODE; width as usize * height as usize],
        })
    }

    /// Build a grid from explicit rows, applying the same checks as the loader.
    pub fn from_rows(rows: &[Vec<u32>], start_pos: IVec2) -> Result<Self, SchemaViolation> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        check_dimensions(width as i64, height as i64)?;
        let (width, height) = (width as u32, height as u32);

        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width as usize {
                return Err(SchemaViolation::RowLengthMismatch {
                    row: y,
                    expected: width as usize,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }
        check_start(start_pos.x as i64, start_pos.y as i64, width, height)?;

        Ok(Self {
            width,
            height,
            start_pos,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn start_pos(&self) -> IVec2 {
        self.start_pos
    }

    /// Row-major cell buffer, `width * height` long.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks_exact(self.width as usize)
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    pub fn index_of(&self, cell: IVec2) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.y as usize * self.width as usize + cell.x as usize)
    }

    pub fn get(&self, cell: IVec2) -> Option<u32> {
        self.index_of(cell).map(|index| self.cells[index])
    }

    /// Size of the whole world in pixels.
    pub fn world_size(&self, cell_size: f32) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * cell_size
    }

    /// Editor mutation; the level itself never writes cells.
    pub fn set_cell(&mut self, cell: IVec2, code: u32) -> Result<(), SchemaViolation> {
        let index = self.index_of(cell).ok_or(SchemaViolation::CellOutOfBounds {
            x: cell.x as i64,
            y: cell.y as i64,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = code;
        Ok(())
    }

    pub fn set_start_pos(&mut self, start_pos: IVec2) -> Result<(), SchemaViolation> {
        check_start(
            start_pos.x as i64,
            start_pos.y as i64,
            self.width,
            self.height,
        )?;
        self.start_pos = start_pos;
        Ok(())
    }

    /// Number of non-empty cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&code| code != EMPTY_CODE).count()
    }
}

impl GridQuery for MapGrid {
    fn dimensions(&self) -> IVec2 {
        IVec2::new(self.width as i32, self.height as i32)
    }

    fn cell_at(&self, cell: IVec2) -> u32 {
        self.get(cell).unwrap_or(EMPTY_CODE)
    }
}

// --- JSON codec ---

// Codes are read as raw JSON numbers so that negative and fractional codes
// surface as schema violations rather than parse failures.
#[derive(Debug, Serialize, Deserialize)]
struct MapFileJson {
    dimensions: [i64; 2],
    start_pos: [i64; 2],
    tiles: Vec<Vec<serde_json::Number>>,
}

impl MapFileJson {
    fn from_grid(grid: &MapGrid) -> Self {
        Self {
            dimensions: [grid.width as i64, grid.height as i64],
            start_pos: [grid.start_pos.x as i64, grid.start_pos.y as i64],
            tiles: grid
                .rows()
                .map(|row| row.iter().map(|&code| serde_json::Number::from(code)).collect())
                .collect(),
        }
    }
}

pub fn load_map_from_path(path: &Path) -> Result<MapGrid, MapError> {
    let raw = fs::read_to_string(path).map_err(|source| MapError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_map(&raw, path)
}

/// Parse and validate map JSON. `path` is only used for error context.
pub fn decode_map(raw: &str, path: &Path) -> Result<MapGrid, MapError> {
    let file: MapFileJson = serde_json::from_str(raw).map_err(|source| MapError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    grid_from_file(file).map_err(|violation| MapError::Schema {
        path: path.to_path_buf(),
        violation,
    })
}

fn grid_from_file(file: MapFileJson) -> Result<MapGrid, SchemaViolation> {
    let [width, height] = file.dimensions;
    check_dimensions(width, height)?;
    let (width, height) = (width as u32, height as u32);

    if file.tiles.len() != height as usize {
        return Err(SchemaViolation::RowCountMismatch {
            expected: height as usize,
            found: file.tiles.len(),
        });
    }

    // Shape is checked in full before the buffer is sized from the declared
    // dimensions.
    for (y, row) in file.tiles.iter().enumerate() {
        if row.len() != width as usize {
            return Err(SchemaViolation::RowLengthMismatch {
                row: y,
                expected: width as usize,
                found: row.len(),
            });
        }
    }

    let mut cells = Vec::with_capacity(width as usize * height as usize);
    for (y, row) in file.tiles.iter().enumerate() {
        for (x, number) in row.iter().enumerate() {
            let code = number
                .as_u64()
                .and_then(|value| u32::try_from(value).ok())
                .ok_or_else(|| SchemaViolation::InvalidCode {
                    x,
                    y,
                    value: number.to_string(),
                })?;
            cells.push(code);
        }
    }

    let [start_x, start_y] = file.start_pos;
    check_start(start_x, start_y, width, height)?;

    Ok(MapGrid {
        width,
        height,
        start_pos: IVec2::new(start_x as i32, start_y as i32),
        cells,
    })
}

/// Serialize the grid as pretty-printed JSON.
pub fn encode_map(grid: &MapGrid) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(&MapFileJson::from_grid(grid))?;
    json.push('\n');
    Ok(json)
}

/// Write the grid to `path`, replacing any existing file.
///
/// The document goes to a sibling `.tmp` file first and is renamed over the
/// target, so a failed write never truncates the previous map.
pub fn save_map_to_path(grid: &MapGrid, path: &Path) -> Result<(), MapError> {
    let write_error = |source: io::Error| MapError::Write {
        path: path.to_path_buf(),
        source,
    };
    let json = encode_map(grid).map_err(|e| write_error(e.into()))?;
    write_atomic(path, json.as_bytes()).map_err(write_error)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = sibling_tmp_path(path);
    fs::write(&tmp_path, bytes)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("map.json");
    path.with_file_name(format!("{file_name}.tmp"))
}

fn check_dimensions(width: i64, height: i64) -> Result<(), SchemaViolation> {
    if width < 1 || height < 1 || width > i32::MAX as i64 || height > i32::MAX as i64 {
        return Err(SchemaViolation::InvalidDimensions { width, height });
    }
    Ok(())
}

fn check_start(x: i64, y: i64, width: u32, height: u32) -> Result<(), SchemaViolation> {
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return Err(SchemaViolation::StartOutOfBounds {
            x,
            y,
            width,
            height,
        });
    }
    Ok(())
}
