//! Scripted target motion for headless runs.
//!
//! A track moves the player's stand-in by a fixed displacement per tick so the
//! camera has something to follow without a physics collaborator.

use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct TargetTrack {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<TrackFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackFrame {
    #[serde(default)]
    pub dx: f32,
    #[serde(default)]
    pub dy: f32,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl TargetTrack {
    /// A short rightward walk with one hop, used when no track file is given.
    pub fn demo() -> Self {
        let frame = |dx, dy, repeat| TrackFrame { dx, dy, repeat };
        Self {
            fixed_dt: default_dt(),
            frames: vec![
                frame(2.0, 0.0, 90),
                frame(2.0, -4.0, 15),
                frame(2.0, 4.0, 15),
                frame(2.0, 0.0, 120),
            ],
        }
    }

    /// One displacement per tick.
    pub fn expanded_steps(&self) -> Vec<Vec2> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(Vec2::new(frame.dx, frame.dy));
            }
        }
        out
    }

    pub fn tick_count(&self) -> usize {
        self.frames.iter().map(|f| f.repeat.max(1) as usize).sum()
    }
}

pub fn load_track_from_path(path: &Path) -> Result<TargetTrack, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let track: TargetTrack = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse track JSON {}: {e}", path.display()))?;
    validate_track(&track)?;
    Ok(track)
}

fn validate_track(track: &TargetTrack) -> Result<(), String> {
    if !track.fixed_dt.is_finite() || track.fixed_dt <= 0.0 {
        return Err("Track validation failed: fixed_dt must be > 0".to_string());
    }
    if track.frames.is_empty() {
        return Err("Track validation failed: frames list is empty".to_string());
    }
    if let Some(index) = track
        .frames
        .iter()
        .position(|f| !f.dx.is_finite() || !f.dy.is_finite())
    {
        return Err(format!(
            "Track validation failed: frame {index} has a non-finite displacement"
        ));
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "twe_track_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn track_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.0625,
              "frames": [
                { "dx": 1.5, "repeat": 3 },
                { "dy": -8.0 }
              ]
            }"#,
        )
        .expect("write track file");

        let track = load_track_from_path(&path).expect("track should load");
        assert_eq!(track.fixed_dt, 0.0625);
        let steps = track.expanded_steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(track.tick_count(), 4);
        assert_eq!(steps[0], Vec2::new(1.5, 0.0));
        assert_eq!(steps[3], Vec2::new(0.0, -8.0));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn zero_repeat_still_plays_once() {
        let track = TargetTrack {
            fixed_dt: default_dt(),
            frames: vec![TrackFrame {
                dx: 1.0,
                dy: 0.0,
                repeat: 0,
            }],
        };
        assert_eq!(track.expanded_steps().len(), 1);
    }

    #[test]
    fn empty_track_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write track file");
        let err = load_track_from_path(&path).expect_err("empty frames");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn non_positive_dt_is_rejected() {
        let path = temp_file_path("dt");
        fs::write(&path, r#"{ "fixed_dt": 0.0, "frames": [ { "dx": 1.0 } ] }"#)
            .expect("write track file");
        let err = load_track_from_path(&path).expect_err("zero dt");
        assert!(err.contains("fixed_dt"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn demo_track_is_valid() {
        let demo = TargetTrack::demo();
        assert!(validate_track(&demo).is_ok());
        assert_eq!(demo.expanded_steps().len(), demo.tick_count());
    }
}
