mod palette;

use glam::IVec2;
use image::RgbaImage;
use std::path::{Path, PathBuf};

use twe_level::{load_map_from_path, save_map_to_path, MapGrid};

use crate::palette::{load_palette_from_path, to_hex, Palette, START_MARKER};

fn usage() -> String {
    "Usage: cargo run -p twe_mapconv -- from-png <level.png> <level.json> <palette.json>\n       cargo run -p twe_mapconv -- to-png <level.json> <level.png> <palette.json>\nOne pixel per cell; a single #ff00ff pixel marks the start position.\nExample: cargo run -p twe_mapconv -- to-png assets/levels/demo.json demo.png assets/palette.json".to_string()
}

/// Convert a painted image into a grid. Every pixel must be in the palette,
/// transparent, or the start marker.
fn image_to_grid(image: &RgbaImage, palette: &Palette) -> Result<MapGrid, String> {
    let mut start: Option<IVec2> = None;
    let mut grid = MapGrid::new(image.width(), image.height(), IVec2::ZERO)
        .map_err(|e| format!("Image cannot be a level: {e}"))?;

    for (x, y, pixel) in image.enumerate_pixels() {
        let cell = IVec2::new(x as i32, y as i32);
        if *pixel == START_MARKER {
            if let Some(previous) = start {
                return Err(format!(
                    "Start marker appears twice, at ({}, {}) and ({x}, {y})",
                    previous.x, previous.y
                ));
            }
            start = Some(cell);
            continue;
        }
        let code = palette
            .code_for(*pixel)
            .ok_or_else(|| format!("Pixel ({x}, {y}) has colour {} not in palette", to_hex(*pixel)))?;
        grid.set_cell(cell, code).map_err(|e| e.to_string())?;
    }

    match start {
        Some(start) => grid.set_start_pos(start).map_err(|e| e.to_string())?,
        None => log::warn!("No start marker found, start_pos defaults to (0, 0)"),
    }
    Ok(grid)
}

fn grid_to_image(grid: &MapGrid, palette: &Palette) -> Result<RgbaImage, String> {
    let mut image = RgbaImage::new(grid.width(), grid.height());
    for (y, row) in grid.rows().enumerate() {
        for (x, &code) in row.iter().enumerate() {
            let color = palette
                .color_for(code)
                .ok_or_else(|| format!("Tile code {code} at ({x}, {y}) has no palette colour"))?;
            image.put_pixel(x as u32, y as u32, color);
        }
    }
    let start = grid.start_pos();
    image.put_pixel(start.x as u32, start.y as u32, START_MARKER);
    Ok(image)
}

fn from_png(input: &Path, output: &Path, palette: &Palette) -> Result<(), String> {
    let image = image::open(input)
        .map_err(|e| format!("Failed to open '{}': {e}", input.display()))?
        .to_rgba8();
    let grid = image_to_grid(&image, palette)?;
    save_map_to_path(&grid, output).map_err(|e| e.to_string())?;
    log::info!(
        "Wrote {}x{} level with {} tiles to {}",
        grid.width(),
        grid.height(),
        grid.occupied_count(),
        output.display()
    );
    Ok(())
}

fn to_png(input: &Path, output: &Path, palette: &Palette) -> Result<(), String> {
    let grid = load_map_from_path(input).map_err(|e| e.to_string())?;
    let image = grid_to_image(&grid, palette)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create output dir '{}': {e}", parent.display()))?;
    }
    image
        .save_with_format(output, image::ImageFormat::Png)
        .map_err(|e| format!("Failed to write '{}': {e}", output.display()))?;
    log::info!("Wrote level image {}", output.display());
    Ok(())
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        return Err(usage());
    }
    let input = PathBuf::from(&args[2]);
    let output = PathBuf::from(&args[3]);
    let palette = load_palette_from_path(Path::new(&args[4]))?;

    match args[1].as_str() {
        "from-png" => from_png(&input, &output, &palette),
        "to-png" => to_png(&input, &output, &palette),
        other => Err(format!("Unknown command '{other}'\n{}", usage())),
    }
}
