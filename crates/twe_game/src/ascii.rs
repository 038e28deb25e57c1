//! Text rendering of the tile window for headless runs.

use twe_level::{CameraQuery, Level};

/// One character per window cell: `#` solid, `+` passable, `.` empty,
/// `@` the cell under the player.
pub fn render_window(level: &Level) -> String {
    let layout = *level.window();
    let cell = level.config().cell_size_f32();
    let player_cell = (level.player().true_position / cell).floor().as_ivec2();

    let mut rows = vec![vec!['.'; layout.cells.x.max(0) as usize]; layout.cells.y.max(0) as usize];
    for view in level.tile_views() {
        let offset = view.grid_coordinate() - layout.top_left;
        let glyph = if view.grid_coordinate() == player_cell {
            '@'
        } else {
            match level.tile_appearance(view) {
                Some(look) if look.solid => '#',
                Some(_) => '+',
                None => '.',
            }
        };
        if let Some(slot) = rows
            .get_mut(offset.y as usize)
            .and_then(|row| row.get_mut(offset.x as usize))
        {
            *slot = glyph;
        }
    }

    let origin = level.view_origin().floor();
    let mut out = format!(
        "window ({}, {}) origin ({}, {})\n",
        layout.top_left.x, layout.top_left.y, origin.x, origin.y
    );
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use twe_level::{save_map_to_path, LevelConfig, MapGrid, TileTypeTable};

    #[test]
    fn renders_floor_and_player() {
        let dir = std::env::temp_dir().join(format!("twe_ascii_test_{}", std::process::id()));
        let path = dir.join("ascii.json");
        let mut grid = MapGrid::new(20, 15, IVec2::new(2, 3)).expect("valid grid");
        for x in 0..20 {
            grid.set_cell(IVec2::new(x, 14), 3).expect("floor");
        }
        grid.set_cell(IVec2::new(5, 12), 12).expect("wood");
        save_map_to_path(&grid, &path).expect("save");

        let level = Level::open(LevelConfig::default(), TileTypeTable::builtin(), &path)
            .expect("level opens");
        let text = render_window(&level);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 14);
        assert!(lines[0].starts_with("window (0, 0)"));
        // Spawn (40, 64) lies in cell (2, 4).
        assert_eq!(lines[1 + 4].chars().nth(2), Some('@'));
        assert_eq!(lines[1 + 12].chars().nth(5), Some('+'));
        // Window rows 0..=12 stop short of the floor at row 14.
        assert!(!text.contains('#'));

        let _ = std::fs::remove_dir_all(dir);
    }
}
