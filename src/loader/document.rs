//! Save file: the grid snapshot plus view and palette state.

use crate::cell::WorldSize;
use crate::error::MapError;
use crate::loader::json_loader::GridSnapshot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Camera position as stored in a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPos {
    /// World x of the view's left edge.
    pub x: f32,
    /// World y of the view's top edge.
    pub y: f32,
}

fn default_zoom() -> f32 {
    1.0
}

/// Everything a save file holds. Only the grid is required; the rest falls
/// back to defaults when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    /// Version tag and cells.
    #[serde(flatten)]
    pub snapshot: GridSnapshot,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// View position.
    #[serde(default)]
    pub camera: CameraPos,
    /// View zoom.
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    /// Palette selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    /// Brush size.
    #[serde(rename = "selectedSize", default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<u32>,
    /// World the grid was drawn in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<WorldSize>,
}

impl SaveDocument {
    /// Document holding only `snapshot`.
    pub fn new(snapshot: GridSnapshot) -> Self {
        SaveDocument {
            snapshot,
            description: None,
            camera: CameraPos::default(),
            zoom: default_zoom(),
            selected: None,
            selected_size: None,
            world: None,
        }
    }

    /// Parses save text.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed save text.
    pub fn to_json_string(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a `.json` save.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let p = path.as_ref();
        check_json_ext(p)?;
        let txt = fs::read_to_string(p).map_err(|source| MapError::Io {
            path: p.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&txt).map_err(|source| MapError::Json {
            path: p.to_path_buf(),
            source,
        })
    }

    /// Writes a `.json` save.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MapError> {
        let p = path.as_ref();
        check_json_ext(p)?;
        let txt = self.to_json_string()?;
        fs::write(p, txt).map_err(|source| MapError::Io {
            path: p.to_path_buf(),
            source,
        })
    }
}

fn check_json_ext(p: &Path) -> Result<(), MapError> {
    match p.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(()),
        _ => Err(MapError::UnsupportedFormat(p.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_only_document_gets_defaults() {
        let doc = SaveDocument::from_json_str(r#"{ "grid": { "1,2": "🌳" } }"#).unwrap();
        assert_eq!(doc.snapshot.version, None);
        assert_eq!(doc.snapshot.grid.len(), 1);
        assert_eq!(doc.zoom, 1.0);
        assert_eq!(doc.camera, CameraPos::default());
        assert!(doc.selected.is_none());
    }

    #[test]
    fn writes_camel_case_keys_at_top_level() {
        let mut doc = SaveDocument::new(GridSnapshot {
            version: Some(6),
            grid: Default::default(),
        });
        doc.selected = Some("🏠".into());
        doc.selected_size = Some(2);
        let v: serde_json::Value = serde_json::from_str(&doc.to_json_string().unwrap()).unwrap();
        assert_eq!(v["version"], 6);
        assert_eq!(v["selectedSize"], 2);
        assert_eq!(v["selected"], "🏠");
        assert!(v.get("grid").is_some());
        assert!(v.get("snapshot").is_none());
        assert!(v.get("description").is_none());
    }

    #[test]
    fn refuses_non_json_paths() {
        let doc = SaveDocument::new(GridSnapshot {
            version: Some(6),
            grid: Default::default(),
        });
        let err = doc.write_file(std::env::temp_dir().join("map.tmx")).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedFormat(_)));
    }
}
