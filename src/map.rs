use crate::cell::{CellCoord, WorldSize};
use crate::config::EditorConfig;
use crate::error::MapError;
use crate::history::{ActionKind, ChangeSet, History};
use crate::layer::Layer;
use crate::loader::json_loader::{decode_grid, encode_grid, GridSnapshot};
use crate::placement::{PlacementEngine, Rejection};
use crate::resolve::{resolve, resolve_in, resolve_topmost, ResolvedObject};
use crate::spatial::OccupancyStore;
use crate::tileset::TileCatalog;
use log::info;

/// World sizes cell coordinates can address.
pub(crate) fn check_world(world: WorldSize) -> Result<(), MapError> {
    if world.width == 0 || world.height == 0 {
        return Err(MapError::InvalidConfig(format!(
            "world must be non-empty, got {}x{}",
            world.width, world.height
        )));
    }
    if world.width > i32::MAX as u32 || world.height > i32::MAX as u32 {
        return Err(MapError::InvalidConfig(format!(
            "world {}x{} exceeds {} cells per side",
            world.width,
            world.height,
            i32::MAX
        )));
    }
    Ok(())
}

/// Layered tile grid with its catalog and undo history.
///
/// All writes go through [`TileMap::place`], [`TileMap::bulldoze`],
/// [`TileMap::undo`], [`TileMap::redo`] or a whole-grid import, so every
/// mutation has an inverse on record.
#[derive(Debug, Clone)]
pub struct TileMap {
    world: WorldSize,
    max_build_size: u32,
    store: OccupancyStore,
    catalog: TileCatalog,
    history: History,
}

impl TileMap {
    /// Empty map. Fails when the world is empty or wider than `i32` cell
    /// coordinates reach, or when no brush size would be allowed.
    pub fn new(
        world: WorldSize,
        catalog: TileCatalog,
        max_build_size: u32,
        max_undo_steps: usize,
    ) -> Result<Self, MapError> {
        check_world(world)?;
        if max_build_size == 0 {
            return Err(MapError::InvalidConfig("max_build_size must be at least 1".to_owned()));
        }
        Ok(TileMap {
            world,
            max_build_size,
            store: OccupancyStore::new(),
            catalog,
            history: History::new(max_undo_steps),
        })
    }

    /// Empty map sized by `cfg`, using the built-in catalog.
    pub fn from_config(cfg: &EditorConfig) -> Result<Self, MapError> {
        TileMap::new(
            cfg.world,
            TileCatalog::builtin(),
            cfg.max_build_size,
            cfg.max_undo_steps,
        )
    }

    /// World bounds.
    pub fn world(&self) -> WorldSize {
        self.world
    }

    /// Largest accepted brush.
    pub fn max_build_size(&self) -> u32 {
        self.max_build_size
    }

    /// Read access to the raw cells, for renderers.
    pub fn store(&self) -> &OccupancyStore {
        &self.store
    }

    /// Tile registry.
    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Undo/redo log.
    pub fn history(&self) -> &History {
        &self.history
    }

    fn engine(&self) -> PlacementEngine<'_> {
        PlacementEngine::new(&self.store, &self.catalog, self.world, self.max_build_size)
    }

    /// Object covering `c` on `layer`.
    pub fn resolve(&self, c: CellCoord, layer: Layer) -> Option<ResolvedObject> {
        resolve(&self.store, c, layer)
    }

    /// Highest-ranked object covering `c`.
    pub fn resolve_topmost(&self, c: CellCoord) -> Option<ResolvedObject> {
        resolve_topmost(&self.store, c)
    }

    /// Topmost, or restricted to one layer.
    pub fn resolve_in(&self, c: CellCoord, only: Option<Layer>) -> Option<ResolvedObject> {
        resolve_in(&self.store, c, only)
    }

    /// Would this placement succeed?
    pub fn preview(&self, origin: CellCoord, tile: &str, size: u32, layer: Layer) -> Result<(), Rejection> {
        self.engine().preview(origin, tile, size, layer)
    }

    /// Places and records an object. An identical repaint returns an empty
    /// change-set and leaves history alone.
    pub fn place(
        &mut self,
        origin: CellCoord,
        tile: &str,
        size: u32,
        layer: Layer,
    ) -> Result<ChangeSet, Rejection> {
        let cs = self.engine().plan_place(origin, tile, size, layer)?;
        self.history.commit(&mut self.store, cs.clone());
        Ok(cs)
    }

    /// Removes and records the object at `c` (topmost, or on `only`).
    pub fn bulldoze(&mut self, c: CellCoord, only: Option<Layer>) -> Result<ChangeSet, Rejection> {
        let cs = self.engine().plan_bulldoze(c, only)?;
        self.history.commit(&mut self.store, cs.clone());
        Ok(cs)
    }

    /// Reverts the latest action.
    pub fn undo(&mut self) -> Option<ActionKind> {
        self.history.undo(&mut self.store)
    }

    /// Re-applies the latest undone action.
    pub fn redo(&mut self) -> Option<ActionKind> {
        self.history.redo(&mut self.store)
    }

    /// Something to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Something to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Serializable copy of the grid.
    pub fn export_grid(&self) -> Result<GridSnapshot, MapError> {
        encode_grid(&self.store)
    }

    /// Replaces the grid with `snap`. On error the map is untouched; on
    /// success history is cleared.
    pub fn import_grid(&mut self, snap: &GridSnapshot) -> Result<(), MapError> {
        let store = decode_grid(snap, &self.catalog, self.world, self.max_build_size)?;
        info!("imported {} cells", store.len());
        self.store = store;
        self.history.clear();
        Ok(())
    }

    /// Empties the grid and history.
    pub fn clear(&mut self) {
        self.store.clear();
        self.history.clear();
    }
}
