//! Colour ↔ tile code mapping for painted level images.
//!
//! Palette files look like
//! `{ "entries": [ { "color": "#5c94fc", "code": 0 }, { "color": "c84c0c", "code": 3 } ] }`.
//! Colours are `rrggbb` or `rrggbbaa` hex with an optional `#`. Fully
//! transparent pixels always read as empty. Pure magenta is reserved for the
//! start marker and may not appear in a palette.

use image::Rgba;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use twe_level::EMPTY_CODE;

pub const START_MARKER: Rgba<u8> = Rgba([255, 0, 255, 255]);

#[derive(Debug, Deserialize)]
struct PaletteFile {
    entries: Vec<PaletteEntry>,
}

#[derive(Debug, Deserialize)]
struct PaletteEntry {
    color: String,
    code: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Palette {
    by_color: HashMap<[u8; 4], u32>,
    by_code: HashMap<u32, [u8; 4]>,
}

impl Palette {
    pub fn insert(&mut self, color: Rgba<u8>, code: u32) -> Result<(), String> {
        if color == START_MARKER {
            return Err(format!(
                "Palette colour {} is reserved for the start marker",
                to_hex(color)
            ));
        }
        if let Some(existing) = self.by_color.insert(color.0, code) {
            return Err(format!(
                "Palette colour {} is mapped twice (codes {existing} and {code})",
                to_hex(color)
            ));
        }
        // The first colour listed for a code is the one written back out.
        self.by_code.entry(code).or_insert(color.0);
        Ok(())
    }

    pub fn code_for(&self, color: Rgba<u8>) -> Option<u32> {
        if color.0[3] == 0 {
            return Some(EMPTY_CODE);
        }
        self.by_color.get(&color.0).copied()
    }

    pub fn color_for(&self, code: u32) -> Option<Rgba<u8>> {
        match self.by_code.get(&code) {
            Some(rgba) => Some(Rgba(*rgba)),
            None if code == EMPTY_CODE => Some(Rgba([0, 0, 0, 0])),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.by_color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_color.is_empty()
    }
}

pub fn parse_hex_color(raw: &str) -> Result<Rgba<u8>, String> {
    let hex = raw.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(format!("Invalid colour '{raw}': expected rrggbb or rrggbbaa"));
    }
    let mut rgba = [0u8, 0, 0, 255];
    for (i, slot) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| format!("Invalid colour '{raw}': {e}"))?;
    }
    Ok(Rgba(rgba))
}

pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
}

pub fn load_palette_from_path(path: &Path) -> Result<Palette, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let file: PaletteFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse palette JSON {}: {e}", path.display()))?;

    let mut palette = Palette::default();
    for entry in file.entries {
        let color = parse_hex_color(&entry.color)?;
        palette.insert(color, entry.code)?;
    }
    if palette.is_empty() {
        log::warn!("Palette {} has no entries", path.display());
    }
    Ok(palette)
}
