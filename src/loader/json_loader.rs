// Grid snapshot <-> occupancy store.
use crate::cell::{footprint, CellCoord, CellRecord, LayerEntry, WorldSize};
use crate::error::MapError;
use crate::layer::Layer;
use crate::resolve::orphaned_parts;
use crate::spatial::OccupancyStore;
use crate::tileset::TileCatalog;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};

/// Version tag written by this build. Older tags are migrated on import.
pub const SNAPSHOT_VERSION: u32 = 6;

/// Serializable grid: `"x,y"` -> `{ "<layer rank>": marker }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Format version; absent in the oldest saves.
    #[serde(default)]
    pub version: Option<u32>,
    /// Cell records keyed by `"x,y"`.
    #[serde(default)]
    pub grid: GridCells,
}

/// The `grid` field: an object keyed by `"x,y"`, or an array of
/// `["x,y", record]` pairs as some older saves wrote it. Always written keyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridCells {
    /// `{ "x,y": record }`.
    Keyed(BTreeMap<String, JsonValue>),
    /// `[["x,y", record], ...]`.
    Pairs(Vec<JsonValue>),
}

impl Default for GridCells {
    fn default() -> Self {
        GridCells::Keyed(BTreeMap::new())
    }
}

impl GridCells {
    /// Number of stored entries, counting duplicate pairs separately.
    pub fn len(&self) -> usize {
        match self {
            GridCells::Keyed(m) => m.len(),
            GridCells::Pairs(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record stored under `key`, if any. Malformed pairs are skipped.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            GridCells::Keyed(m) => m.get(key),
            GridCells::Pairs(v) => v.iter().find_map(|p| match p.as_array()?.as_slice() {
                [JsonValue::String(k), rec] if k == key => Some(rec),
                _ => None,
            }),
        }
    }

    /// Both encodings as one keyed map. Pairs must be `[string, record]`
    /// and no key may repeat.
    pub fn normalized(&self) -> Result<BTreeMap<&str, &JsonValue>, MapError> {
        match self {
            GridCells::Keyed(m) => Ok(m.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            GridCells::Pairs(v) => {
                let mut out = BTreeMap::new();
                for (i, pair) in v.iter().enumerate() {
                    let Some([JsonValue::String(key), rec]) = pair.as_array().map(Vec::as_slice) else {
                        return Err(MapError::InvalidSnapshot(format!(
                            "grid entry {i}: expected a [\"x,y\", record] pair, got {pair}"
                        )));
                    };
                    if out.insert(key.as_str(), rec).is_some() {
                        return Err(invalid(key, "listed more than once"));
                    }
                }
                Ok(out)
            }
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonMarker<'a> {
    Origin {
        tile: &'a str,
        size: u32,
        #[serde(rename = "isOrigin")]
        is_origin: bool,
    },
    Part {
        #[serde(rename = "originX")]
        origin_x: i32,
        #[serde(rename = "originY")]
        origin_y: i32,
        #[serde(rename = "isOrigin")]
        is_origin: bool,
    },
}

/// Marker decoded from either format; legacy ones may carry a layer inline.
struct RawMarker {
    entry: LayerEntry,
    layer: Option<Layer>,
}

fn invalid(key: &str, what: impl std::fmt::Display) -> MapError {
    MapError::InvalidSnapshot(format!("cell {key}: {what}"))
}

fn marker_to_json(entry: &LayerEntry) -> Result<JsonValue, MapError> {
    let m = match entry {
        LayerEntry::Origin { tile, size } => JsonMarker::Origin {
            tile,
            size: *size,
            is_origin: true,
        },
        LayerEntry::Part { origin } => JsonMarker::Part {
            origin_x: origin.x,
            origin_y: origin.y,
            is_origin: false,
        },
    };
    Ok(serde_json::to_value(m)?)
}

fn marker_from_json(key: &str, value: &JsonValue) -> Result<RawMarker, MapError> {
    let obj = match value {
        // Oldest saves stored a bare tile id for a 1x1 object.
        JsonValue::String(tile) if !tile.is_empty() => {
            return Ok(RawMarker {
                entry: LayerEntry::origin(tile.clone(), 1),
                layer: None,
            });
        }
        JsonValue::Object(obj) => obj,
        other => return Err(invalid(key, format!("unexpected marker {other}"))),
    };

    let layer = match obj.get("layer") {
        None | Some(JsonValue::Null) => None,
        Some(v) => {
            let rank = v
                .as_u64()
                .and_then(|r| u8::try_from(r).ok())
                .and_then(Layer::from_rank)
                .ok_or_else(|| invalid(key, format!("bad layer {v}")))?;
            Some(rank)
        }
    };

    let is_origin = obj.get("isOrigin").and_then(JsonValue::as_bool);
    let tile = obj.get("tile").and_then(JsonValue::as_str);

    let entry = match (is_origin, tile) {
        (Some(true), Some(tile)) | (None, Some(tile)) if !tile.is_empty() => {
            let size = match obj.get("size") {
                None | Some(JsonValue::Null) => 1,
                Some(v) => v
                    .as_u64()
                    .and_then(|s| u32::try_from(s).ok())
                    .filter(|s| *s >= 1)
                    .ok_or_else(|| invalid(key, format!("bad size {v}")))?,
            };
            LayerEntry::origin(tile, size)
        }
        (Some(false), _) | (None, None) => {
            let coord = |name: &str| {
                obj.get(name)
                    .and_then(JsonValue::as_i64)
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| invalid(key, format!("part marker without integer {name}")))
            };
            LayerEntry::part(CellCoord::new(coord("originX")?, coord("originY")?))
        }
        _ => return Err(invalid(key, "origin marker without tile")),
    };

    Ok(RawMarker { entry, layer })
}

fn parse_key(key: &str, world: WorldSize) -> Result<CellCoord, MapError> {
    let c: CellCoord = key.parse().map_err(MapError::InvalidSnapshot)?;
    if !world.contains(c) {
        return Err(invalid(key, format!("outside the {}x{} world", world.width, world.height)));
    }
    Ok(c)
}

fn check_origin_fits(
    key: &str,
    c: CellCoord,
    entry: &LayerEntry,
    world: WorldSize,
    max_size: u32,
) -> Result<(), MapError> {
    if let LayerEntry::Origin { size, .. } = entry {
        if *size > max_size {
            return Err(invalid(key, format!("size {size} exceeds the {max_size}x{max_size} limit")));
        }
        if !world.contains_square(c, *size) {
            return Err(invalid(key, format!("{size}x{size} footprint leaves the world")));
        }
    }
    Ok(())
}

/// Serializes every stored cell at [`SNAPSHOT_VERSION`].
pub fn encode_grid(store: &OccupancyStore) -> Result<GridSnapshot, MapError> {
    let mut grid = BTreeMap::new();
    for (c, rec) in store.iter() {
        let mut layers = JsonMap::new();
        for (layer, entry) in rec.iter() {
            layers.insert(layer.rank().to_string(), marker_to_json(entry)?);
        }
        grid.insert(c.to_string(), JsonValue::Object(layers));
    }
    Ok(GridSnapshot {
        version: Some(SNAPSHOT_VERSION),
        grid: GridCells::Keyed(grid),
    })
}

/// Builds a fresh store from `snap`. Nothing is returned unless every cell
/// decodes, so callers can swap the result in atomically.
///
/// Snapshots older than [`SNAPSHOT_VERSION`] hold one marker per cell with no
/// layer map; each is placed on its explicit `layer` or on the catalog's
/// default layer for its tile (parts follow their origin).
///
/// Origins larger than `max_size` or reaching past `world` are rejected.
pub fn decode_grid(
    snap: &GridSnapshot,
    catalog: &TileCatalog,
    world: WorldSize,
    max_size: u32,
) -> Result<OccupancyStore, MapError> {
    let cells = snap.grid.normalized()?;
    let store = match snap.version {
        Some(SNAPSHOT_VERSION) => decode_layered(&cells, world, max_size)?,
        Some(v) if v > SNAPSHOT_VERSION || v == 0 => {
            return Err(MapError::UnsupportedVersion {
                found: v,
                supported: SNAPSHOT_VERSION,
            });
        }
        legacy => {
            info!(
                "migrating legacy snapshot (version {:?}) with {} cells",
                legacy,
                cells.len()
            );
            decode_legacy(&cells, catalog, world, max_size)?
        }
    };

    let orphans = orphaned_parts(&store);
    if !orphans.is_empty() {
        warn!(
            "imported grid has {} orphaned part markers, first at {} on {}",
            orphans.len(),
            orphans[0].cell,
            orphans[0].layer
        );
    }
    Ok(store)
}

type Cells<'a> = BTreeMap<&'a str, &'a JsonValue>;

fn decode_layered(cells: &Cells<'_>, world: WorldSize, max_size: u32) -> Result<OccupancyStore, MapError> {
    let mut store = OccupancyStore::new();
    for (&key, &value) in cells {
        let c = parse_key(key, world)?;
        let JsonValue::Object(layers) = value else {
            return Err(invalid(key, "expected a layer map"));
        };
        let mut rec = CellRecord::new();
        for (rank, marker) in layers {
            let layer = rank
                .parse::<u8>()
                .ok()
                .and_then(Layer::from_rank)
                .ok_or_else(|| invalid(key, format!("unknown layer {rank:?}")))?;
            let raw = marker_from_json(key, marker)?;
            check_origin_fits(key, c, &raw.entry, world, max_size)?;
            rec.insert(layer, raw.entry);
        }
        store.set(c, rec);
    }
    Ok(store)
}

fn decode_legacy(
    cells: &Cells<'_>,
    catalog: &TileCatalog,
    world: WorldSize,
    max_size: u32,
) -> Result<OccupancyStore, MapError> {
    let mut raw: HashMap<CellCoord, RawMarker> = HashMap::with_capacity(cells.len());
    for (&key, &value) in cells {
        let c = parse_key(key, world)?;
        let marker = marker_from_json(key, value)?;
        check_origin_fits(key, c, &marker.entry, world, max_size)?;
        raw.insert(c, marker);
    }

    let layer_of = |c: CellCoord, m: &RawMarker| -> Option<Layer> {
        if let Some(layer) = m.layer {
            return Some(layer);
        }
        match &m.entry {
            LayerEntry::Origin { tile, .. } => Some(catalog.default_layer_for(tile)),
            LayerEntry::Part { origin } => match raw.get(origin) {
                Some(RawMarker {
                    entry: LayerEntry::Origin { tile, size },
                    layer,
                }) if footprint(*origin, *size).any(|f| f == c) => {
                    Some(layer.unwrap_or_else(|| catalog.default_layer_for(tile)))
                }
                _ => None,
            },
        }
    };

    let mut store = OccupancyStore::new();
    let mut dropped = 0usize;
    for (c, m) in &raw {
        match layer_of(*c, m) {
            Some(layer) => store.set(*c, CellRecord::with(layer, m.entry.clone())),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("dropped {dropped} legacy part markers whose origin could not be found");
    }
    Ok(store)
}
