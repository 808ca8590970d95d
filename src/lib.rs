#![warn(missing_docs)]

//! Layered emoji tile-map editing core: sparse occupancy grid, multi-cell
//! placement rules, undo/redo and versioned JSON snapshots, plus an optional
//! Macroquad renderer.

mod camera;
mod cell;
mod config;
mod error;
mod history;
mod layer;
mod loader {
    pub mod document;
    pub mod json_loader;
}
mod map;
mod placement;
pub mod render;
mod resolve;
mod session;
mod spatial;
mod tileset;

pub use camera::Camera;
pub use cell::{footprint, CellCoord, CellRecord, LayerEntry, WorldSize};
pub use config::EditorConfig;
pub use error::MapError;
pub use history::{ActionKind, CellChange, ChangeSet, History, MAX_UNDO_STEPS};
pub use layer::Layer;
pub use loader::document::{CameraPos, SaveDocument};
pub use loader::json_loader::{decode_grid, encode_grid, GridCells, GridSnapshot, SNAPSHOT_VERSION};
pub use map::TileMap;
pub use placement::{PlacementEngine, Rejection, MAX_BUILD_SIZE};
pub use render::{draw_plan, render_list, DrawItem, TileDrawer};
pub use resolve::{orphaned_parts, resolve, resolve_in, resolve_topmost, OrphanedPart, ResolvedObject};
pub use session::{EditorSession, SessionEvent, Tool};
pub use spatial::{CellRect, OccupancyStore, CHUNK_SIZE};
pub use tileset::{CategoryKind, GeneratedTile, Pattern, Rgb, TileCatalog, TileCategory};

#[cfg(feature = "macroquad")]
pub use render::MacroquadDrawer;
