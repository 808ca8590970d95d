use crate::cell::{CellCoord, CellRecord};
use std::collections::{BTreeMap, HashMap};

/// Edge length of a storage bucket, in cells.
pub const CHUNK_SIZE: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

#[inline]
pub(crate) fn cell_to_chunk(c: CellCoord) -> ChunkCoord {
    ChunkCoord {
        x: c.x.div_euclid(CHUNK_SIZE),
        y: c.y.div_euclid(CHUNK_SIZE),
    }
}

/// Inclusive-exclusive cell rectangle `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    /// Top-left cell, inclusive.
    pub min: CellCoord,
    /// Bottom-right bound, exclusive.
    pub max: CellCoord,
}

impl CellRect {
    /// Rectangle from two corners in any order; `max` is exclusive.
    pub fn new(a: CellCoord, b: CellCoord) -> Self {
        CellRect {
            min: CellCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: CellCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle covering an `size`x`size` footprint.
    pub fn square(origin: CellCoord, size: u32) -> Self {
        let n = size as i32;
        CellRect::new(origin, origin.offset(n, n))
    }

    /// True when `c` lies inside.
    #[inline]
    pub fn contains(&self, c: CellCoord) -> bool {
        c.x >= self.min.x && c.x < self.max.x && c.y >= self.min.y && c.y < self.max.y
    }

    /// True when the rectangle holds no cells.
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }
}

#[derive(Debug, Clone, Default)]
struct Chunk {
    cells: HashMap<CellCoord, CellRecord>,
}

/// Sparse cell -> record storage, bucketed by chunk.
///
/// Plain key/value semantics: nothing here checks that part markers point at
/// real origins or that footprints don't overlap.
#[derive(Debug, Clone, Default)]
pub struct OccupancyStore {
    buckets: HashMap<ChunkCoord, Chunk>,
    len: usize,
}

impl PartialEq for OccupancyStore {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(c, rec)| other.get(c) == Some(rec))
    }
}

impl Eq for OccupancyStore {}

impl OccupancyStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record at `c`, if any layer is occupied there.
    pub fn get(&self, c: CellCoord) -> Option<&CellRecord> {
        self.buckets
            .get(&cell_to_chunk(c))
            .and_then(|chunk| chunk.cells.get(&c))
    }

    /// Stores `rec` at `c`. An empty record deletes the cell instead.
    pub fn set(&mut self, c: CellCoord, rec: CellRecord) {
        if rec.is_empty() {
            self.delete(c);
            return;
        }
        let bucket = self
            .buckets
            .entry(cell_to_chunk(c))
            .or_insert_with(Chunk::default);
        if bucket.cells.insert(c, rec).is_none() {
            self.len += 1;
        }
    }

    /// Removes the whole cell, returning its record.
    pub fn delete(&mut self, c: CellCoord) -> Option<CellRecord> {
        let cc = cell_to_chunk(c);
        let bucket = self.buckets.get_mut(&cc)?;
        let old = bucket.cells.remove(&c);
        if old.is_some() {
            self.len -= 1;
        }
        if bucket.cells.is_empty() {
            self.buckets.remove(&cc);
        }
        old
    }

    /// Writes `rec`, or deletes the cell when `rec` is `None`.
    pub fn put(&mut self, c: CellCoord, rec: Option<CellRecord>) {
        match rec {
            Some(rec) => self.set(c, rec),
            None => {
                self.delete(c);
            }
        }
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.len
    }

    /// No cell stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every cell.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Every stored cell, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellRecord)> {
        let sorted: BTreeMap<(i32, i32), (CellCoord, &CellRecord)> = self
            .buckets
            .values()
            .flat_map(|chunk| chunk.cells.iter())
            .map(|(c, rec)| ((c.y, c.x), (*c, rec)))
            .collect();
        sorted.into_values()
    }

    /// Stored cells inside `rect`, row-major. Only chunks touching the
    /// rectangle are visited.
    pub fn iter_region(&self, rect: CellRect) -> impl Iterator<Item = (CellCoord, &CellRecord)> {
        let mut hits: Vec<(CellCoord, &CellRecord)> = Vec::new();
        if !rect.is_empty() {
            let lo = cell_to_chunk(rect.min);
            let hi = cell_to_chunk(rect.max.offset(-1, -1));
            for cy in lo.y..=hi.y {
                for cx in lo.x..=hi.x {
                    if let Some(chunk) = self.buckets.get(&ChunkCoord { x: cx, y: cy }) {
                        hits.extend(
                            chunk
                                .cells
                                .iter()
                                .filter(|(c, _)| rect.contains(**c))
                                .map(|(c, rec)| (*c, rec)),
                        );
                    }
                }
            }
        }
        hits.sort_unstable_by_key(|(c, _)| (c.y, c.x));
        hits.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::LayerEntry;
    use crate::layer::Layer;

    fn grass() -> CellRecord {
        CellRecord::with(Layer::Ground, LayerEntry::origin("grass", 1))
    }

    #[test]
    fn set_get_delete() {
        let mut store = OccupancyStore::new();
        let c = CellCoord::new(3, 4);
        assert!(store.get(c).is_none());
        store.set(c, grass());
        assert_eq!(store.get(c), Some(&grass()));
        assert_eq!(store.len(), 1);
        store.set(c, grass());
        assert_eq!(store.len(), 1);
        assert_eq!(store.delete(c), Some(grass()));
        assert!(store.is_empty());
        assert!(store.buckets.is_empty());
    }

    #[test]
    fn empty_record_deletes() {
        let mut store = OccupancyStore::new();
        let c = CellCoord::new(0, 0);
        store.set(c, grass());
        store.set(c, CellRecord::new());
        assert!(store.get(c).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn negative_cells_land_in_their_own_chunk() {
        assert_eq!(cell_to_chunk(CellCoord::new(-1, -1)), ChunkCoord { x: -1, y: -1 });
        assert_eq!(cell_to_chunk(CellCoord::new(15, 16)), ChunkCoord { x: 0, y: 1 });
    }

    #[test]
    fn region_iteration_is_bounded_and_row_major() {
        let mut store = OccupancyStore::new();
        for c in [
            CellCoord::new(40, 40),
            CellCoord::new(1, 2),
            CellCoord::new(17, 1),
            CellCoord::new(0, 1),
            CellCoord::new(20, 20),
        ] {
            store.set(c, grass());
        }
        let rect = CellRect::new(CellCoord::new(0, 0), CellCoord::new(21, 21));
        let cells: Vec<_> = store.iter_region(rect).map(|(c, _)| c).collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 1),
                CellCoord::new(17, 1),
                CellCoord::new(1, 2),
                CellCoord::new(20, 20),
            ]
        );
        assert_eq!(store.iter().count(), 5);
    }

    #[test]
    fn equality_ignores_bucket_layout() {
        let mut a = OccupancyStore::new();
        let mut b = OccupancyStore::new();
        a.set(CellCoord::new(1, 1), grass());
        a.set(CellCoord::new(30, 1), grass());
        a.delete(CellCoord::new(30, 1));
        b.set(CellCoord::new(1, 1), grass());
        assert_eq!(a, b);
    }
}
