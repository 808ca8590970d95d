//! Validation and change-set construction for placing and bulldozing objects.
//!
//! Nothing here mutates the store. A successful call returns a [`ChangeSet`]
//! that the caller commits through [`History`](crate::history::History).

use crate::cell::{footprint, CellCoord, CellRecord, LayerEntry, WorldSize};
use crate::history::{ActionKind, CellChange, ChangeSet};
use crate::layer::Layer;
use crate::resolve::{resolve, resolve_in, ResolvedObject};
use crate::spatial::OccupancyStore;
use crate::tileset::TileCatalog;
use log::debug;
use std::collections::BTreeSet;
use thiserror::Error;

/// Largest brush edge the editor offers by default.
pub const MAX_BUILD_SIZE: u32 = 3;

/// Why an action was refused. Nothing is applied when one of these comes back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Footprint leaves the world.
    #[error("{size}x{size} at {origin} does not fit in the {}x{} world", .world.width, .world.height)]
    OutOfBounds {
        /// Requested origin.
        origin: CellCoord,
        /// Requested size.
        size: u32,
        /// World bounds.
        world: WorldSize,
    },
    /// Brush size outside `1..=max`.
    #[error("Size {size} is outside 1..={max}")]
    InvalidSize {
        /// Requested size.
        size: u32,
        /// Configured maximum.
        max: u32,
    },
    /// Ground tile off the ground layer, or a non-ground tile on it.
    #[error("{} ({tile} on {layer})", ground_rule(.layer))]
    WrongLayerGround {
        /// Tile id.
        tile: String,
        /// Requested layer.
        layer: Layer,
    },
    /// Path tile off the path layer.
    #[error("Path tiles only on Layer 1! ({tile} on {layer})")]
    WrongLayerPath {
        /// Tile id.
        tile: String,
        /// Requested layer.
        layer: Layer,
    },
    /// Another object already covers part of the footprint on that layer.
    #[error("Placement blocked at {cell} by {tile} on {layer}")]
    PlacementBlocked {
        /// First blocked cell.
        cell: CellCoord,
        /// Layer of the blocker.
        layer: Layer,
        /// Tile of the blocker.
        tile: String,
    },
    /// No object to bulldoze on the visible/target layer.
    #[error("Nothing to bulldoze at {cell}")]
    NothingToRemove {
        /// Queried cell.
        cell: CellCoord,
    },
}

fn ground_rule(layer: &Layer) -> &'static str {
    if *layer == Layer::Ground {
        "Cannot place non-ground on Layer 0!"
    } else {
        "Ground tiles only on Layer 0!"
    }
}

/// Read-only view used to validate actions against the current grid.
pub struct PlacementEngine<'a> {
    store: &'a OccupancyStore,
    catalog: &'a TileCatalog,
    world: WorldSize,
    max_size: u32,
}

/// Outcome of validation: either the target is already identical or these
/// objects get displaced by a same-category repaint.
enum Checked {
    Identical,
    Clear { displaced: Vec<ResolvedObject> },
}

impl<'a> PlacementEngine<'a> {
    /// Engine over `store`, accepting brushes up to `max_size`.
    pub fn new(
        store: &'a OccupancyStore,
        catalog: &'a TileCatalog,
        world: WorldSize,
        max_size: u32,
    ) -> Self {
        PlacementEngine {
            store,
            catalog,
            world,
            max_size,
        }
    }

    fn check_place(
        &self,
        origin: CellCoord,
        tile: &str,
        size: u32,
        layer: Layer,
    ) -> Result<Checked, Rejection> {
        if size == 0 || size > self.max_size {
            return Err(Rejection::InvalidSize {
                size,
                max: self.max_size,
            });
        }
        if !self.world.contains_square(origin, size) {
            return Err(Rejection::OutOfBounds {
                origin,
                size,
                world: self.world,
            });
        }

        let is_ground = self.catalog.is_ground_tile(tile);
        let is_path = self.catalog.is_path_tile(tile);
        if is_ground != (layer == Layer::Ground) {
            return Err(Rejection::WrongLayerGround {
                tile: tile.to_owned(),
                layer,
            });
        }
        if is_path && layer != Layer::Paths {
            return Err(Rejection::WrongLayerPath {
                tile: tile.to_owned(),
                layer,
            });
        }

        if let Some(existing) = resolve(self.store, origin, layer) {
            if existing.is_origin && existing.tile == tile && existing.size == size {
                debug!("identical placement of {tile} at {origin} skipped");
                return Ok(Checked::Identical);
            }
        }

        let mut displaced: Vec<ResolvedObject> = Vec::new();
        for cell in footprint(origin, size) {
            let Some(existing) = resolve(self.store, cell, layer) else {
                continue;
            };
            if !self.is_repaint(tile, &existing, layer) {
                debug!("placement blocked at {cell} by {} on {layer}", existing.tile);
                return Err(Rejection::PlacementBlocked {
                    cell,
                    layer,
                    tile: existing.tile,
                });
            }
            if !displaced.iter().any(|d| d.origin == existing.origin) {
                displaced.push(existing);
            }
        }
        Ok(Checked::Clear { displaced })
    }

    // Terrain and paths may be painted over their own kind on their own layer.
    fn is_repaint(&self, tile: &str, existing: &ResolvedObject, layer: Layer) -> bool {
        match layer {
            Layer::Ground => {
                self.catalog.is_ground_tile(tile) && self.catalog.is_ground_tile(&existing.tile)
            }
            Layer::Paths => {
                self.catalog.is_path_tile(tile) && self.catalog.is_path_tile(&existing.tile)
            }
            _ => false,
        }
    }

    /// Validates a placement without building anything.
    pub fn preview(
        &self,
        origin: CellCoord,
        tile: &str,
        size: u32,
        layer: Layer,
    ) -> Result<(), Rejection> {
        self.check_place(origin, tile, size, layer).map(|_| ())
    }

    /// Change-set placing `tile` as a `size`x`size` object at `origin` on `layer`.
    ///
    /// Returns an empty change-set when exactly that object is already there.
    /// A repainted ground/path object is removed whole: its cells outside the
    /// new footprint lose their entry on `layer` in the same change-set.
    pub fn plan_place(
        &self,
        origin: CellCoord,
        tile: &str,
        size: u32,
        layer: Layer,
    ) -> Result<ChangeSet, Rejection> {
        let displaced = match self.check_place(origin, tile, size, layer)? {
            Checked::Identical => return Ok(ChangeSet::empty(ActionKind::Place)),
            Checked::Clear { displaced } => displaced,
        };

        let mut changes = Vec::with_capacity((size * size) as usize);
        let mut touched = BTreeSet::new();
        for cell in footprint(origin, size) {
            let old = self.store.get(cell).cloned();
            let entry = if cell == origin {
                LayerEntry::origin(tile, size)
            } else {
                LayerEntry::part(origin)
            };
            let new = old.clone().unwrap_or_default().with_entry(layer, entry);
            touched.insert(cell);
            changes.push(CellChange {
                cell,
                old,
                new: Some(new),
            });
        }

        for obj in &displaced {
            for cell in obj.cells() {
                if touched.contains(&cell) {
                    continue;
                }
                if let Some(change) = self.strip_cell(cell, obj) {
                    touched.insert(cell);
                    changes.push(change);
                }
            }
        }

        Ok(ChangeSet::new(ActionKind::Place, changes))
    }

    /// Change-set removing the object at `cell`: the topmost one, or the one on
    /// `only` when layer isolation is active.
    pub fn plan_bulldoze(
        &self,
        cell: CellCoord,
        only: Option<Layer>,
    ) -> Result<ChangeSet, Rejection> {
        let Some(obj) = resolve_in(self.store, cell, only) else {
            debug!("nothing to bulldoze at {cell}");
            return Err(Rejection::NothingToRemove { cell });
        };
        let changes = obj
            .cells()
            .filter_map(|c| self.strip_cell(c, &obj))
            .collect();
        Ok(ChangeSet::new(ActionKind::Bulldoze, changes))
    }

    // Drops `obj`'s entry at `cell`, leaving other layers and other objects alone.
    fn strip_cell(&self, cell: CellCoord, obj: &ResolvedObject) -> Option<CellChange> {
        let old: &CellRecord = self.store.get(cell)?;
        let owned = match old.get(obj.layer)? {
            LayerEntry::Origin { .. } => cell == obj.origin,
            LayerEntry::Part { origin } => *origin == obj.origin,
        };
        if !owned {
            return None;
        }
        Some(CellChange {
            cell,
            old: Some(old.clone()),
            new: old.without(obj.layer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;

    const WORLD: WorldSize = WorldSize::new(20, 20);

    struct Fixture {
        store: OccupancyStore,
        catalog: TileCatalog,
        history: History,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                store: OccupancyStore::new(),
                catalog: TileCatalog::builtin(),
                history: History::default(),
            }
        }

        fn engine(&self) -> PlacementEngine<'_> {
            PlacementEngine::new(&self.store, &self.catalog, WORLD, MAX_BUILD_SIZE)
        }

        fn place(&mut self, x: i32, y: i32, tile: &str, size: u32, layer: Layer) -> Result<usize, Rejection> {
            let cs = self.engine().plan_place(CellCoord::new(x, y), tile, size, layer)?;
            let n = cs.len();
            self.history.commit(&mut self.store, cs);
            Ok(n)
        }

        fn bulldoze(&mut self, x: i32, y: i32, only: Option<Layer>) -> Result<usize, Rejection> {
            let cs = self.engine().plan_bulldoze(CellCoord::new(x, y), only)?;
            let n = cs.len();
            self.history.commit(&mut self.store, cs);
            Ok(n)
        }

        fn at(&self, x: i32, y: i32, layer: Layer) -> Option<ResolvedObject> {
            resolve(&self.store, CellCoord::new(x, y), layer)
        }
    }

    #[test]
    fn rejects_out_of_bounds_and_bad_sizes() {
        let mut f = Fixture::new();
        assert!(matches!(
            f.place(19, 19, "🏠", 2, Layer::Buildings),
            Err(Rejection::OutOfBounds { .. })
        ));
        assert!(matches!(
            f.place(-1, 0, "🌳", 1, Layer::Features),
            Err(Rejection::OutOfBounds { .. })
        ));
        assert!(matches!(
            f.place(0, 0, "🌳", 0, Layer::Features),
            Err(Rejection::InvalidSize { size: 0, .. })
        ));
        assert!(matches!(
            f.place(0, 0, "🌳", 4, Layer::Features),
            Err(Rejection::InvalidSize { size: 4, max: 3 })
        ));
        assert!(f.store.is_empty());
    }

    #[test]
    fn layer_rules() {
        let mut f = Fixture::new();
        for layer in [Layer::Paths, Layer::Features, Layer::Buildings, Layer::Air] {
            assert!(matches!(
                f.place(0, 0, "grass", 1, layer),
                Err(Rejection::WrongLayerGround { .. })
            ));
        }
        assert!(matches!(
            f.place(0, 0, "🌳", 1, Layer::Ground),
            Err(Rejection::WrongLayerGround { .. })
        ));
        assert!(matches!(
            f.place(0, 0, "road", 1, Layer::Ground),
            Err(Rejection::WrongLayerGround { .. })
        ));
        assert!(matches!(
            f.place(0, 0, "road", 1, Layer::Features),
            Err(Rejection::WrongLayerPath { .. })
        ));
        assert_eq!(f.place(0, 0, "road", 1, Layer::Paths), Ok(1));
        assert_eq!(f.place(1, 0, "grass", 1, Layer::Ground), Ok(1));
    }

    #[test]
    fn ground_rule_message_names_the_mistake() {
        let mut f = Fixture::new();
        let off_ground = f.place(0, 0, "grass", 1, Layer::Features).unwrap_err();
        assert!(off_ground.to_string().starts_with("Ground tiles only on Layer 0!"));
        let onto_ground = f.place(0, 0, "🌳", 1, Layer::Ground).unwrap_err();
        assert!(onto_ground.to_string().starts_with("Cannot place non-ground on Layer 0!"));
    }

    #[test]
    fn same_layer_overlap_is_blocked() {
        let mut f = Fixture::new();
        f.place(2, 2, "🏠", 2, Layer::Buildings).unwrap();
        let err = f.place(3, 3, "🏭", 2, Layer::Buildings).unwrap_err();
        assert_eq!(
            err,
            Rejection::PlacementBlocked {
                cell: CellCoord::new(3, 3),
                layer: Layer::Buildings,
                tile: "🏠".to_owned(),
            }
        );
        assert!(f.at(4, 4, Layer::Buildings).is_none());
        assert_eq!(f.history.undo_len(), 1);
    }

    #[test]
    fn cross_layer_overlap_is_fine() {
        let mut f = Fixture::new();
        f.place(0, 0, "grass", 3, Layer::Ground).unwrap();
        f.place(0, 0, "road", 1, Layer::Paths).unwrap();
        f.place(1, 1, "🌳", 2, Layer::Features).unwrap();
        f.place(1, 1, "🏠", 1, Layer::Buildings).unwrap();
        f.place(1, 1, "✈️", 1, Layer::Air).unwrap();
        let rec = f.store.get(CellCoord::new(1, 1)).unwrap();
        assert_eq!(rec.len(), 4);
    }

    #[test]
    fn identical_repaint_is_noop() {
        let mut f = Fixture::new();
        f.place(5, 5, "🏠", 2, Layer::Buildings).unwrap();
        assert_eq!(f.place(5, 5, "🏠", 2, Layer::Buildings), Ok(0));
        f.place(0, 0, "grass", 1, Layer::Ground).unwrap();
        assert_eq!(f.place(0, 0, "grass", 1, Layer::Ground), Ok(0));
        assert_eq!(f.history.undo_len(), 2);
    }

    #[test]
    fn ground_repaint_replaces_whole_object() {
        let mut f = Fixture::new();
        f.place(0, 0, "grass", 2, Layer::Ground).unwrap();
        f.place(0, 0, "🌳", 1, Layer::Features).unwrap();
        // Water over one corner of the grass patch.
        assert_eq!(f.place(1, 1, "water", 1, Layer::Ground), Ok(4));

        assert_eq!(f.at(1, 1, Layer::Ground).unwrap().tile, "water");
        for (x, y) in [(0, 0), (1, 0), (0, 1)] {
            assert!(f.at(x, y, Layer::Ground).is_none(), "({x},{y}) still grass");
        }
        // The tree on top is untouched.
        assert_eq!(f.at(0, 0, Layer::Features).unwrap().tile, "🌳");
        assert!(crate::resolve::orphaned_parts(&f.store).is_empty());

        f.history.undo(&mut f.store);
        assert_eq!(f.at(1, 1, Layer::Ground).unwrap().tile, "grass");
        assert_eq!(f.at(1, 1, Layer::Ground).unwrap().origin, CellCoord::new(0, 0));
    }

    #[test]
    fn path_repaint_allowed_ground_cannot_cover_path() {
        let mut f = Fixture::new();
        f.place(0, 0, "road", 1, Layer::Paths).unwrap();
        assert_eq!(f.place(0, 0, "rail", 1, Layer::Paths), Ok(1));
        f.place(3, 0, "🌉", 1, Layer::Paths).unwrap();
        // A bridge is not a path tile, so it does not repaint.
        assert!(matches!(
            f.place(3, 0, "road", 1, Layer::Paths),
            Err(Rejection::PlacementBlocked { .. })
        ));
    }

    #[test]
    fn bulldoze_topmost_and_isolated() {
        let mut f = Fixture::new();
        f.place(0, 0, "grass", 1, Layer::Ground).unwrap();
        f.place(0, 0, "🌳", 1, Layer::Features).unwrap();

        assert!(matches!(
            f.bulldoze(0, 0, Some(Layer::Buildings)),
            Err(Rejection::NothingToRemove { .. })
        ));
        assert_eq!(f.bulldoze(0, 0, None), Ok(1));
        assert!(f.at(0, 0, Layer::Features).is_none());
        assert!(f.at(0, 0, Layer::Ground).is_some());

        assert_eq!(f.bulldoze(0, 0, Some(Layer::Ground)), Ok(1));
        assert!(f.store.is_empty());
        assert!(matches!(
            f.bulldoze(0, 0, None),
            Err(Rejection::NothingToRemove { .. })
        ));
    }

    #[test]
    fn bulldoze_from_part_removes_footprint() {
        let mut f = Fixture::new();
        f.place(0, 0, "grass", 3, Layer::Ground).unwrap();
        f.place(5, 5, "🏠", 2, Layer::Buildings).unwrap();
        assert_eq!(f.bulldoze(6, 6, None), Ok(4));
        for c in footprint(CellCoord::new(5, 5), 2) {
            assert!(f.store.get(c).is_none());
        }
        assert_eq!(f.store.len(), 9);
    }

    #[test]
    fn preview_matches_plan() {
        let mut f = Fixture::new();
        f.place(2, 2, "🏠", 1, Layer::Buildings).unwrap();
        let engine = f.engine();
        assert!(engine.preview(CellCoord::new(0, 0), "🏠", 3, Layer::Buildings).is_err());
        assert!(engine.preview(CellCoord::new(3, 3), "🏠", 3, Layer::Buildings).is_ok());
    }
}
