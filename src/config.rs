use crate::cell::WorldSize;
use crate::error::MapError;
use crate::history::MAX_UNDO_STEPS;
use crate::map::check_world;
use crate::placement::MAX_BUILD_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor settings. Every field has a default, so a partial JSON file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// World size in cells.
    pub world: WorldSize,
    /// Pixel edge of one cell at zoom 1.
    pub cell_px: f32,
    /// Largest brush edge.
    pub max_build_size: u32,
    /// Undo depth.
    pub max_undo_steps: usize,
    /// Smallest zoom factor.
    pub min_zoom: f32,
    /// Largest zoom factor.
    pub max_zoom: f32,
    /// Zoom change per wheel notch.
    pub zoom_increment: f32,
    /// Tile selected on a fresh session.
    pub default_tile: String,
    /// Brush size on a fresh session.
    pub default_size: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            world: WorldSize::new(100, 80),
            cell_px: 32.0,
            max_build_size: MAX_BUILD_SIZE,
            max_undo_steps: MAX_UNDO_STEPS,
            min_zoom: 0.2,
            max_zoom: 5.0,
            zoom_increment: 0.15,
            default_tile: "🌳".to_owned(),
            default_size: 1,
        }
    }
}

impl EditorConfig {
    /// Parses and validates JSON config text.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let cfg: EditorConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads a `.json` config file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let p = path.as_ref();
        if p.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(MapError::UnsupportedFormat(p.display().to_string()));
        }
        let txt = std::fs::read_to_string(p).map_err(|source| MapError::Io {
            path: p.to_path_buf(),
            source,
        })?;
        let cfg: EditorConfig = serde_json::from_str(&txt).map_err(|source| MapError::Json {
            path: p.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects settings the editor cannot run with.
    pub fn validate(&self) -> Result<(), MapError> {
        check_world(self.world)?;
        if self.max_build_size == 0 {
            return Err(MapError::InvalidConfig("max_build_size must be at least 1".to_owned()));
        }
        if self.max_undo_steps == 0 {
            return Err(MapError::InvalidConfig("max_undo_steps must be at least 1".to_owned()));
        }
        if !(self.cell_px > 0.0) {
            return Err(MapError::InvalidConfig("cell_px must be positive".to_owned()));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(MapError::InvalidConfig(format!(
                "zoom bounds {}..{} are inverted or non-positive",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }
}
