use crate::camera::Camera;
use crate::cell::CellCoord;
use crate::config::EditorConfig;
use crate::error::MapError;
use crate::history::{ActionKind, ChangeSet};
use crate::layer::Layer;
use crate::loader::document::{CameraPos, SaveDocument};
use crate::map::TileMap;
use crate::placement::Rejection;
use crate::render::{render_list, DrawItem};
use crate::spatial::CellRect;
use log::{info, warn};
use std::path::Path;

const SAVE_DESCRIPTION: &str = "Emoji tile map";

/// What a pointer press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Place the selected tile.
    #[default]
    Build,
    /// Remove whatever is under the pointer.
    Bulldoze,
}

/// Whole-session state changes a frontend may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Grid and history were wiped.
    Cleared,
    /// A document replaced the session state.
    Loaded {
        /// Occupied cells after the load.
        cells: usize,
    },
}

/// One editing session: the map plus view, palette and tool state.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    map: TileMap,
    camera: Camera,
    selected: String,
    brush: u32,
    tool: Tool,
    isolation: bool,
    description: Option<String>,
}

impl EditorSession {
    /// Fresh session; fails when `config` doesn't validate.
    pub fn new(config: EditorConfig) -> Result<Self, MapError> {
        config.validate()?;
        let map = TileMap::from_config(&config)?;
        let brush = config.default_size.clamp(1, config.max_build_size);
        Ok(EditorSession {
            selected: config.default_tile.clone(),
            map,
            camera: Camera::default(),
            brush,
            tool: Tool::Build,
            isolation: false,
            description: None,
            config,
        })
    }

    /// Settings this session runs with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The map being edited.
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Direct map access. All map writes still go through history.
    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    /// Current view.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Moves the view.
    pub fn pan_to(&mut self, x: f32, y: f32) {
        self.camera.set_pos(x, y);
    }

    /// Sets zoom within the configured bounds.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.camera
            .set_zoom(zoom, self.config.min_zoom, self.config.max_zoom);
    }

    /// Zooms by `factor` around screen point `(px, py)`.
    pub fn zoom_at(&mut self, factor: f32, px: f32, py: f32) {
        self.camera
            .zoom_at(factor, px, py, self.config.min_zoom, self.config.max_zoom);
    }

    /// One zoom step in (`steps > 0`) or out around `(px, py)`.
    pub fn zoom_steps(&mut self, steps: i32, px: f32, py: f32) {
        let factor = (1.0 + self.config.zoom_increment).powi(steps);
        self.zoom_at(factor, px, py);
    }

    /// Keeps the view over the world for a screen of the given size.
    pub fn clamp_camera(&mut self, screen_w: f32, screen_h: f32) {
        self.camera
            .clamp_to_world(self.map.world(), self.config.cell_px, screen_w, screen_h);
    }

    /// Cell under a screen pixel.
    pub fn screen_to_cell(&self, sx: f32, sy: f32) -> CellCoord {
        self.camera.screen_to_cell(sx, sy, self.config.cell_px)
    }

    /// Cells worth drawing, padded by one.
    pub fn visible_cells(&self, screen_w: f32, screen_h: f32) -> CellRect {
        self.camera
            .visible_cells(self.config.cell_px, screen_w, screen_h)
    }

    /// Painter's-order draw list for the current view.
    pub fn render_list(&self, screen_w: f32, screen_h: f32) -> Vec<DrawItem> {
        render_list(
            &self.map,
            self.visible_cells(screen_w, screen_h),
            self.config.cell_px,
            self.isolation.then(|| self.placement_layer()),
        )
    }

    /// Palette selection.
    pub fn selected_tile(&self) -> &str {
        &self.selected
    }

    /// Selects a palette tile; the placement layer follows it.
    pub fn select_tile(&mut self, tile: &str) {
        self.selected = tile.to_owned();
    }

    /// Brush edge in cells.
    pub fn brush_size(&self) -> u32 {
        self.brush
    }

    /// Sets the brush edge, clamped to `1..=max_build_size`.
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush = size.clamp(1, self.map.max_build_size());
    }

    /// Active tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switches tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Whether only the placement layer is shown and bulldozed.
    pub fn isolation(&self) -> bool {
        self.isolation
    }

    /// Toggles the isolation view.
    pub fn set_isolation(&mut self, on: bool) {
        self.isolation = on;
    }

    /// Layer the selected tile lands on.
    pub fn placement_layer(&self) -> Layer {
        self.map.catalog().default_layer_for(&self.selected)
    }

    /// Save file note.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Runs the current tool on a cell.
    pub fn apply_at(&mut self, c: CellCoord) -> Result<ChangeSet, Rejection> {
        match self.tool {
            Tool::Build => {
                let layer = self.placement_layer();
                self.map.place(c, &self.selected, self.brush, layer)
            }
            Tool::Bulldoze => {
                let only = self.isolation.then(|| self.placement_layer());
                self.map.bulldoze(c, only)
            }
        }
    }

    /// Runs the current tool on the cell under a screen pixel.
    pub fn apply_at_screen(&mut self, sx: f32, sy: f32) -> Result<ChangeSet, Rejection> {
        let c = self.screen_to_cell(sx, sy);
        self.apply_at(c)
    }

    /// Would the current brush fit at `c`? Always true for the bulldozer.
    pub fn preview_at(&self, c: CellCoord) -> Result<(), Rejection> {
        match self.tool {
            Tool::Build => self
                .map
                .preview(c, &self.selected, self.brush, self.placement_layer()),
            Tool::Bulldoze => Ok(()),
        }
    }

    /// Reverts the latest action.
    pub fn undo(&mut self) -> Option<ActionKind> {
        self.map.undo()
    }

    /// Re-applies the latest undone action.
    pub fn redo(&mut self) -> Option<ActionKind> {
        self.map.redo()
    }

    /// Wipes grid and history. View and palette stay.
    pub fn clear(&mut self) -> SessionEvent {
        self.map.clear();
        info!("cleared map");
        SessionEvent::Cleared
    }

    /// Snapshot of the whole session.
    pub fn to_document(&self) -> Result<SaveDocument, MapError> {
        let mut doc = SaveDocument::new(self.map.export_grid()?);
        doc.description = Some(
            self.description
                .clone()
                .unwrap_or_else(|| SAVE_DESCRIPTION.to_owned()),
        );
        doc.camera = CameraPos {
            x: self.camera.x,
            y: self.camera.y,
        };
        doc.zoom = self.camera.zoom;
        doc.selected = Some(self.selected.clone());
        doc.selected_size = Some(self.brush);
        doc.world = Some(self.map.world());
        Ok(doc)
    }

    /// New session from `config` holding `doc`.
    pub fn from_document(config: EditorConfig, doc: &SaveDocument) -> Result<Self, MapError> {
        let mut session = EditorSession::new(config)?;
        session.load_document(doc)?;
        Ok(session)
    }

    /// Replaces grid, view and palette state with `doc`. Fails without
    /// touching anything; on success the history is empty.
    pub fn load_document(&mut self, doc: &SaveDocument) -> Result<SessionEvent, MapError> {
        if let Some(world) = doc.world {
            if world != self.map.world() {
                warn!(
                    "save was made for a {}x{} world, loading into {}x{}",
                    world.width,
                    world.height,
                    self.map.world().width,
                    self.map.world().height
                );
            }
        }
        self.map.import_grid(&doc.snapshot)?;

        self.camera.set_pos(doc.camera.x, doc.camera.y);
        let zoom = if doc.zoom > 0.0 { doc.zoom } else { 1.0 };
        self.set_zoom(zoom);
        self.selected = doc
            .selected
            .clone()
            .unwrap_or_else(|| self.config.default_tile.clone());
        self.set_brush_size(doc.selected_size.unwrap_or(self.config.default_size));
        self.description = doc.description.clone();

        Ok(SessionEvent::Loaded {
            cells: self.map.store().len(),
        })
    }

    /// Pretty JSON save text.
    pub fn to_json_string(&self) -> Result<String, MapError> {
        self.to_document()?.to_json_string()
    }

    /// Loads save text.
    pub fn load_from_str(&mut self, json: &str) -> Result<SessionEvent, MapError> {
        let doc = SaveDocument::from_json_str(json)?;
        self.load_document(&doc)
    }

    /// Writes a `.json` save file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MapError> {
        self.to_document()?.write_file(path.as_ref())?;
        info!("saved {}", path.as_ref().display());
        Ok(())
    }

    /// Loads a `.json` save file.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<SessionEvent, MapError> {
        let doc = SaveDocument::read_file(path.as_ref())?;
        let ev = self.load_document(&doc)?;
        info!("loaded {}", path.as_ref().display());
        Ok(ev)
    }
}
