use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glam::{IVec2, Vec2};
use twe_level::{
    load_map_from_path, save_map_to_path, CameraQuery, GridQuery, Level, LevelConfig, MapErrorKind,
    MapGrid, SchemaViolation, TileTypeTable, TileView,
};

fn write_text(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

fn platform_grid(width: u32, height: u32, start: IVec2) -> MapGrid {
    let mut grid = MapGrid::new(width, height, start).expect("valid grid");
    for x in 0..width as i32 {
        grid.set_cell(IVec2::new(x, height as i32 - 1), 3)
            .expect("floor in bounds");
    }
    grid.set_cell(IVec2::new(4, height as i32 - 4), 19)
        .expect("question block in bounds");
    grid
}

fn open(path: &Path) -> Level {
    Level::open(LevelConfig::default(), TileTypeTable::builtin(), path).expect("level opens")
}

#[test]
fn twenty_by_fifteen_spawn_scenario() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scenario.json");
    save_map_to_path(&platform_grid(20, 15, IVec2::new(2, 3)), &path).expect("save");

    let level = open(&path);
    let foot_offset = level.config().spawn_foot_offset;
    assert_eq!(level.player().true_position, Vec2::new(2.0 * 16.0 + 8.0, 3.0 * 16.0 + foot_offset));
    assert_eq!(level.get_camera_pos().x, 120.0);
}

#[test]
fn window_has_one_view_per_offset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("window.json");
    save_map_to_path(&platform_grid(64, 30, IVec2::new(31, 17)), &path).expect("save");

    let level = open(&path);
    let config = level.config();
    let expected = (config.viewport_cells[0] as usize + 1) * (config.viewport_cells[1] as usize + 1);
    assert_eq!(level.tile_views().len(), expected);

    let top_left = level.window().top_left;
    let offsets: HashSet<(i32, i32)> = level
        .tile_views()
        .iter()
        .map(|view| {
            let offset = view.grid_coordinate() - top_left;
            (offset.x, offset.y)
        })
        .collect();
    assert_eq!(offsets.len(), expected);
    for j in 0..=config.viewport_cells[1] as i32 {
        for i in 0..=config.viewport_cells[0] as i32 {
            assert!(offsets.contains(&(i, j)), "missing offset ({i}, {j})");
        }
    }
}

#[test]
fn short_file_is_rejected_and_level_survives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = dir.path().join("good.json");
    save_map_to_path(&platform_grid(20, 15, IVec2::new(2, 3)), &good).expect("save");
    let mut level = open(&good);
    let before = level.map().clone();

    let rows: Vec<String> = (0..14).map(|_| format!("[{}]", vec!["0"; 20].join(","))).collect();
    let short = write_text(
        dir.path(),
        "short.json",
        &format!(
            r#"{{ "dimensions": [20, 15], "start_pos": [2, 3], "tiles": [{}] }}"#,
            rows.join(",")
        ),
    );

    let err = level.load_level(&short).expect_err("14 rows for height 15");
    assert_eq!(err.kind(), MapErrorKind::Schema);
    assert_eq!(
        err.violation(),
        Some(&SchemaViolation::RowCountMismatch {
            expected: 15,
            found: 14
        })
    );
    assert_eq!(level.map(), &before);

    let err = level.import_in_place(&short).expect_err("import rejects too");
    assert_eq!(err.kind(), MapErrorKind::Schema);
    assert_eq!(level.map(), &before);
}

#[test]
fn margin_cells_resolve_to_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("margin.json");
    save_map_to_path(&platform_grid(20, 15, IVec2::new(2, 3)), &path).expect("save");
    let level = open(&path);

    let view = TileView::new(IVec2::new(-1, 5));
    assert_eq!(view.code(&level), 0);
    assert!(level.tile_appearance(&view).is_none());

    // The window anchored at the right edge reaches one column past the world.
    let right = dir.path().join("right.json");
    save_map_to_path(&platform_grid(20, 15, IVec2::new(19, 3)), &right).expect("save");
    let mut level = level;
    level.load_level(&right).expect("reload");
    let beyond: Vec<&TileView> = level
        .tile_views()
        .iter()
        .filter(|view| view.grid_coordinate().x >= 20)
        .collect();
    assert!(!beyond.is_empty());
    assert!(beyond.iter().all(|view| level.tile_appearance(view).is_none()));
}

#[test]
fn camera_stays_in_bounds_over_a_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("run.json");
    save_map_to_path(&platform_grid(80, 20, IVec2::new(1, 10)), &path).expect("save");
    let mut level = open(&path);

    let mut target = level.player().true_position;
    for step in 0..600 {
        target += Vec2::new(3.0, if step % 40 < 20 { -6.0 } else { 6.0 });
        let previous_y = level.get_camera_pos().y;
        level.tick_with_target(1.0 / 60.0, &target);
        let pos = level.get_camera_pos();
        assert!(level.camera_bounds().contains(pos), "step {step}: {pos:?}");

        let unclamped = previous_y + (target.y - previous_y) / 4.0;
        let bounds = level.camera_bounds();
        assert_eq!(pos.y, unclamped.clamp(bounds.min.y, bounds.max.y));
    }
}

#[test]
fn world_smaller_than_viewport_pins_camera_to_centre() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tiny.json");
    save_map_to_path(&platform_grid(8, 6, IVec2::new(1, 1)), &path).expect("save");
    let mut level = open(&path);

    assert_eq!(level.get_camera_pos(), Vec2::new(64.0, 48.0));
    for target in [Vec2::new(-100.0, -100.0), Vec2::new(900.0, 900.0)] {
        level.tick_with_target(1.0 / 60.0, &target);
        assert_eq!(level.get_camera_pos(), Vec2::new(64.0, 48.0));
    }
    assert_eq!(level.tile_views().len(), 208);
}

#[test]
fn phase_cycles_every_half_second() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("phase.json");
    save_map_to_path(&platform_grid(20, 15, IVec2::new(2, 3)), &path).expect("save");
    let mut level = open(&path);

    let mut seen = Vec::new();
    for _ in 0..8 {
        seen.push(level.tile_frame_phase());
        level.tick(0.125);
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 0, 1, 2, 3]);

    let question = TileView::new(IVec2::new(4, 11));
    let look = level.tile_appearance(&question).expect("question block");
    assert_eq!(look.asset_id, "Question1");
}

#[test]
fn editor_round_trip_through_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("edit.json");
    save_map_to_path(&platform_grid(30, 12, IVec2::new(0, 0)), &path).expect("save");
    let mut level = open(&path);

    level.map_mut().set_cell(IVec2::new(10, 5), 11).expect("edit");
    level.map_mut().set_start_pos(IVec2::new(5, 9)).expect("move start");
    let out = dir.path().join("nested").join("edited.json");
    level.export_current_map(&out).expect("export");

    let saved = load_map_from_path(&out).expect("reload exported");
    assert_eq!(&saved, level.map());
    assert_eq!(saved.cell_at(IVec2::new(10, 5)), 11);

    level.load_level(&out).expect("load edited map");
    assert_eq!(level.start_marker(), IVec2::new(5, 9));
    assert_eq!(level.dimensions(), IVec2::new(30, 12));
    assert_eq!(level.viewport_half_extent(), Vec2::new(120.0, 96.0));
}

#[test]
fn unreadable_path_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Level::open(
        LevelConfig::default(),
        TileTypeTable::builtin(),
        &dir.path().join("absent.json"),
    )
    .err()
    .expect("missing map should fail");
    let err = err.map_error().expect("config is valid, the map is not");
    assert_eq!(err.kind(), MapErrorKind::Io);
}

#[test]
fn bundled_demo_level_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/levels/demo.json");
    let level = open(&path);
    assert_eq!(level.dimensions(), IVec2::new(64, 15));
    assert_eq!(level.start_marker(), IVec2::new(2, 12));
    assert_eq!(level.tile_views().len(), 208);
    assert!(level.camera_bounds().contains(level.get_camera_pos()));
}
