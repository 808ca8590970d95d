//! "What occupies this cell?" queries over the occupancy store.
//!
//! Part markers carry their origin coordinates, so a lookup is at most two
//! store reads. A part whose origin is missing, lives on another layer or no
//! longer covers the part is an orphan: it resolves to nothing. Lookups log
//! orphans at debug level; imports report them once as a warning.

use crate::cell::{CellCoord, LayerEntry};
use crate::layer::Layer;
use crate::spatial::OccupancyStore;
use log::debug;

/// Object found at a cell, described by its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedObject {
    /// Tile id.
    pub tile: String,
    /// Footprint edge length.
    pub size: u32,
    /// Layer the object lives on.
    pub layer: Layer,
    /// Whether the queried cell is the origin itself.
    pub is_origin: bool,
    /// Origin cell.
    pub origin: CellCoord,
}

impl ResolvedObject {
    /// True when the footprint covers `c`.
    pub fn covers(&self, c: CellCoord) -> bool {
        covers(self.origin, self.size, c)
    }

    /// Cells of the footprint, row-major.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        crate::cell::footprint(self.origin, self.size)
    }
}

#[inline]
fn covers(origin: CellCoord, size: u32, c: CellCoord) -> bool {
    let n = size as i32;
    c.x >= origin.x && c.x < origin.x + n && c.y >= origin.y && c.y < origin.y + n
}

/// Part marker whose origin does not claim it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanedPart {
    /// Cell holding the dangling part marker.
    pub cell: CellCoord,
    /// Layer of the marker.
    pub layer: Layer,
    /// Origin the marker points at.
    pub origin: CellCoord,
}

fn check_part(
    store: &OccupancyStore,
    cell: CellCoord,
    layer: Layer,
    origin: CellCoord,
) -> Option<(String, u32)> {
    match store.get(origin).and_then(|rec| rec.get(layer)) {
        Some(LayerEntry::Origin { tile, size }) if covers(origin, *size, cell) => {
            Some((tile.clone(), *size))
        }
        _ => None,
    }
}

/// Object covering `c` on `layer`.
pub fn resolve(store: &OccupancyStore, c: CellCoord, layer: Layer) -> Option<ResolvedObject> {
    match store.get(c)?.get(layer)? {
        LayerEntry::Origin { tile, size } => Some(ResolvedObject {
            tile: tile.clone(),
            size: *size,
            layer,
            is_origin: true,
            origin: c,
        }),
        LayerEntry::Part { origin } => match check_part(store, c, layer, *origin) {
            Some((tile, size)) => Some(ResolvedObject {
                tile,
                size,
                layer,
                is_origin: false,
                origin: *origin,
            }),
            None => {
                debug!("orphaned part at {c} on layer {layer}: origin {origin} does not cover it");
                None
            }
        },
    }
}

/// Highest-ranked object at `c`. Orphans on upper layers are skipped.
pub fn resolve_topmost(store: &OccupancyStore, c: CellCoord) -> Option<ResolvedObject> {
    let rec = store.get(c)?;
    rec.layers_top_down().find_map(|layer| resolve(store, c, layer))
}

/// Isolation-aware lookup: `Some(layer)` restricts to that layer, `None` is topmost.
pub fn resolve_in(
    store: &OccupancyStore,
    c: CellCoord,
    only: Option<Layer>,
) -> Option<ResolvedObject> {
    match only {
        Some(layer) => resolve(store, c, layer),
        None => resolve_topmost(store, c),
    }
}

/// Every dangling part marker in the store, row-major then by layer.
pub fn orphaned_parts(store: &OccupancyStore) -> Vec<OrphanedPart> {
    let mut out = Vec::new();
    for (cell, rec) in store.iter() {
        for (layer, entry) in rec.iter() {
            if let LayerEntry::Part { origin } = entry {
                if check_part(store, cell, layer, *origin).is_none() {
                    out.push(OrphanedPart {
                        cell,
                        layer,
                        origin: *origin,
                    });
                }
            }
        }
    }
    out
}
