use crate::layer::Layer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fixed world dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSize {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

impl WorldSize {
    /// Creates a world size.
    pub const fn new(width: u32, height: u32) -> Self {
        WorldSize { width, height }
    }

    /// True when `c` is inside `[0, width) x [0, height)`.
    pub fn contains(&self, c: CellCoord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as i64) < self.width as i64 && (c.y as i64) < self.height as i64
    }

    /// True when the whole `size`x`size` footprint at `origin` fits.
    pub fn contains_square(&self, origin: CellCoord, size: u32) -> bool {
        let n = i64::from(size);
        origin.x >= 0
            && origin.y >= 0
            && origin.x as i64 + n <= self.width as i64
            && origin.y as i64 + n <= self.height as i64
    }
}

/// Integer grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl CellCoord {
    /// Creates a coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        CellCoord { x, y }
    }

    /// Offset by `(dx, dy)`.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        CellCoord::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for CellCoord {
    type Err = String;

    /// Parses the `"x,y"` snapshot key form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("cell key {s:?} is not \"x,y\""))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| format!("bad x in cell key {s:?}"))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| format!("bad y in cell key {s:?}"))?;
        Ok(CellCoord::new(x, y))
    }
}

/// Cells covered by an `size`x`size` object anchored at `origin`, row-major.
pub fn footprint(origin: CellCoord, size: u32) -> impl Iterator<Item = CellCoord> {
    let n = size as i32;
    (0..n).flat_map(move |dy| (0..n).map(move |dx| origin.offset(dx, dy)))
}

/// What one layer of a cell holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerEntry {
    /// Top-left cell of an object.
    Origin {
        /// Tile id.
        tile: String,
        /// Footprint edge length in cells.
        size: u32,
    },
    /// Any other cell of an object; points back at the origin on the same layer.
    Part {
        /// Origin cell of the owning object.
        origin: CellCoord,
    },
}

impl LayerEntry {
    /// Origin marker shorthand.
    pub fn origin(tile: impl Into<String>, size: u32) -> Self {
        LayerEntry::Origin {
            tile: tile.into(),
            size,
        }
    }

    /// Part marker shorthand.
    pub fn part(origin: CellCoord) -> Self {
        LayerEntry::Part { origin }
    }

    /// True for origin markers.
    pub fn is_origin(&self) -> bool {
        matches!(self, LayerEntry::Origin { .. })
    }
}

/// Everything stored at one cell, keyed by layer. A layer with no entry is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellRecord {
    layers: BTreeMap<Layer, LayerEntry>,
}

impl CellRecord {
    /// Record with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record holding a single entry.
    pub fn with(layer: Layer, entry: LayerEntry) -> Self {
        let mut rec = Self::new();
        rec.insert(layer, entry);
        rec
    }

    /// Entry on `layer`.
    pub fn get(&self, layer: Layer) -> Option<&LayerEntry> {
        self.layers.get(&layer)
    }

    /// Sets the entry on `layer`, returning what was there.
    pub fn insert(&mut self, layer: Layer, entry: LayerEntry) -> Option<LayerEntry> {
        self.layers.insert(layer, entry)
    }

    /// Clears `layer`, returning what was there.
    pub fn remove(&mut self, layer: Layer) -> Option<LayerEntry> {
        self.layers.remove(&layer)
    }

    /// No layer occupied.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of occupied layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Occupied layers, lowest rank first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Layer, &LayerEntry)> {
        self.layers.iter().map(|(l, e)| (*l, e))
    }

    /// Occupied layers, highest rank first.
    pub fn layers_top_down(&self) -> impl Iterator<Item = Layer> + '_ {
        self.layers.keys().rev().copied()
    }

    /// Copy with `layer` set to `entry`.
    pub fn with_entry(&self, layer: Layer, entry: LayerEntry) -> Self {
        let mut next = self.clone();
        next.insert(layer, entry);
        next
    }

    /// Copy with `layer` cleared; `None` when nothing is left.
    pub fn without(&self, layer: Layer) -> Option<Self> {
        let mut next = self.clone();
        next.remove(layer);
        (!next.is_empty()).then_some(next)
    }
}
