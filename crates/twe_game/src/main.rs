mod ascii;
mod track;
mod watcher;

use std::path::{Path, PathBuf};
use std::time::Duration;

use twe_core::TimeState;
use twe_level::{load_config_from_path, load_tile_table_from_path, Level, LevelConfig, TileTypeTable};

use crate::track::{load_track_from_path, TargetTrack};
use crate::watcher::FileWatcher;

/// Ticks between periodic status lines.
const REPORT_EVERY: u64 = 60;

#[derive(Debug)]
struct RunArgs {
    level_path: PathBuf,
    track_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    tiles_path: Option<PathBuf>,
    export_path: Option<PathBuf>,
    tick_limit: Option<u64>,
    realtime: bool,
    show_window: bool,
}

fn usage() -> String {
    "Usage: cargo run -p twe_game -- <level.json> [--track track.json] [--config level_config.json] [--tiles tiles.json] [--ticks N] [--realtime] [--show-window] [--export out.json]\nExample: cargo run -p twe_game -- assets/levels/demo.json --track assets/tracks/walk.json --show-window".to_string()
}

fn parse_args(args: &[String]) -> Result<RunArgs, String> {
    let mut rest = args.iter().skip(1);
    let level_path = match rest.next() {
        Some(first) if !first.starts_with("--") => PathBuf::from(first),
        _ => return Err(usage()),
    };

    let mut parsed = RunArgs {
        level_path,
        track_path: None,
        config_path: None,
        tiles_path: None,
        export_path: None,
        tick_limit: None,
        realtime: false,
        show_window: false,
    };

    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value\n{}", usage()))
        };
        match flag.as_str() {
            "--track" => parsed.track_path = Some(PathBuf::from(value()?)),
            "--config" => parsed.config_path = Some(PathBuf::from(value()?)),
            "--tiles" => parsed.tiles_path = Some(PathBuf::from(value()?)),
            "--export" => parsed.export_path = Some(PathBuf::from(value()?)),
            "--ticks" => {
                let raw = value()?;
                let ticks = raw
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid --ticks value '{raw}': {e}"))?;
                parsed.tick_limit = Some(ticks);
            }
            "--realtime" => parsed.realtime = true,
            "--show-window" => parsed.show_window = true,
            other => return Err(format!("Unknown argument '{other}'\n{}", usage())),
        }
    }
    Ok(parsed)
}

fn load_config(path: Option<&Path>) -> Result<LevelConfig, String> {
    match path {
        Some(path) => load_config_from_path(path).map_err(|e| e.to_string()),
        None => Ok(LevelConfig::default()),
    }
}

fn load_tiles(path: Option<&Path>) -> Result<TileTypeTable, String> {
    match path {
        Some(path) => load_tile_table_from_path(path).map_err(|e| e.to_string()),
        None => Ok(TileTypeTable::builtin()),
    }
}

fn report(level: &Level, tick: u64) {
    let camera = level.get_camera_pos();
    let player = level.player().true_position;
    log::info!(
        "tick {tick}: player ({:.1}, {:.1}) camera ({:.1}, {:.1}) window ({}, {}) phase {} live {}",
        player.x,
        player.y,
        camera.x,
        camera.y,
        level.window().top_left.x,
        level.window().top_left.y,
        level.tile_frame_phase(),
        level.live_entities()
    );
}

/// Reload the level if its map file changed. `None` when nothing changed,
/// otherwise whether the new map was adopted.
fn poll_reload(level: &mut Level, watcher: &mut FileWatcher) -> Option<bool> {
    if !watcher.changed() {
        return None;
    }
    let path = watcher.path().to_path_buf();
    log::info!("Map file changed, reloading {}", path.display());
    match level.load_level(&path) {
        Ok(()) => {
            log::info!("Hot reload of {} applied", path.display());
            Some(true)
        }
        Err(err) => {
            log::warn!(
                "Hot reload of {} rejected, keeping the current level: {err}",
                path.display()
            );
            Some(false)
        }
    }
}

/// Drive the level through `track` on a fixed timestep, reloading the map
/// whenever the file on disk changes.
fn run(level: &mut Level, track: &TargetTrack, args: &RunArgs) -> u64 {
    let steps = track.expanded_steps();
    let track_ticks = track.tick_count() as u64;
    let total = args.tick_limit.unwrap_or(track_ticks).min(track_ticks);
    let fixed_dt = f64::from(track.fixed_dt);

    let mut time = TimeState::with_fixed_dt(fixed_dt);
    let mut watcher = FileWatcher::new(level.map_path().to_path_buf());

    while time.fixed_step_count < total {
        if args.realtime {
            std::thread::sleep(Duration::from_secs_f64(fixed_dt / 2.0));
            time.begin_frame();
        } else {
            time.feed(fixed_dt);
        }

        while time.fixed_step_count < total && time.should_step() {
            let tick = time.fixed_step_count;
            let index = (tick - 1) as usize;
            if let Some(step) = steps.get(index) {
                level.player_mut().true_position += *step;
            }
            level.tick(fixed_dt);
            if tick % REPORT_EVERY == 0 {
                report(level, tick);
            }
        }

        poll_reload(level, &mut watcher);
    }
    time.fixed_step_count
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;

    let config = load_config(args.config_path.as_deref())?;
    let tiles = load_tiles(args.tiles_path.as_deref())?;
    let track = match args.track_path.as_deref() {
        Some(path) => load_track_from_path(path)?,
        None => {
            log::info!("No --track given, using the built-in demo walk");
            TargetTrack::demo()
        }
    };

    let mut level = Level::open(config, tiles, &args.level_path).map_err(|e| e.to_string())?;
    if args.show_window {
        println!("{}", ascii::render_window(&level));
    }

    let ticks = run(&mut level, &track, &args);
    report(&level, ticks);
    if args.show_window {
        println!("{}", ascii::render_window(&level));
    }

    if let Some(export_path) = args.export_path.as_deref() {
        level
            .export_current_map(export_path)
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}
