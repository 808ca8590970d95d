use crate::cell::CellCoord;
use crate::layer::Layer;
use crate::map::TileMap;
use crate::resolve::resolve;
use crate::spatial::CellRect;
use std::collections::HashSet;

/// One object to paint, in world pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Tile id.
    pub tile: String,
    /// Object origin cell.
    pub origin: CellCoord,
    /// Footprint edge in cells.
    pub size: u32,
    /// Layer, the primary sort key.
    pub layer: Layer,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Edge length in pixels.
    pub extent: f32,
    /// Whether the catalog draws it procedurally.
    pub generated: bool,
}

impl DrawItem {
    /// Bottom edge, the secondary sort key.
    pub fn bottom(&self) -> f32 {
        self.y + self.extent
    }

    /// Center point.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.extent / 2.0, self.y + self.extent / 2.0)
    }
}

/// Painter's-order list of every object touching `view`.
///
/// Each object appears once even when only some of its cells are visible.
/// Sorted by layer, then by bottom edge so lower objects overlap higher ones,
/// then by origin column. `only` hides every other layer (isolation view).
pub fn render_list(map: &TileMap, view: CellRect, cell_px: f32, only: Option<Layer>) -> Vec<DrawItem> {
    let world = map.world();
    let clipped = CellRect {
        min: CellCoord::new(view.min.x.max(0), view.min.y.max(0)),
        max: CellCoord::new(
            view.max.x.min(world.width as i32),
            view.max.y.min(world.height as i32),
        ),
    };
    if clipped.is_empty() {
        return Vec::new();
    }

    let store = map.store();
    let catalog = map.catalog();
    let mut seen: HashSet<(CellCoord, Layer)> = HashSet::new();
    let mut items = Vec::new();

    for (c, rec) in store.iter_region(clipped) {
        for (layer, _) in rec.iter() {
            if only.is_some_and(|l| l != layer) {
                continue;
            }
            let Some(obj) = resolve(store, c, layer) else {
                continue;
            };
            if !seen.insert((obj.origin, layer)) {
                continue;
            }
            items.push(DrawItem {
                generated: catalog.is_generated_kind(&obj.tile),
                x: obj.origin.x as f32 * cell_px,
                y: obj.origin.y as f32 * cell_px,
                extent: obj.size as f32 * cell_px,
                tile: obj.tile,
                origin: obj.origin,
                size: obj.size,
                layer,
            });
        }
    }

    items.sort_by(|a, b| {
        a.layer
            .cmp(&b.layer)
            .then(a.bottom().total_cmp(&b.bottom()))
            .then(a.origin.x.cmp(&b.origin.x))
    });
    items
}
