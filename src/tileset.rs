//! Static tile registry: categories, default layers and generated textures.

use crate::layer::Layer;
use log::debug;
use std::collections::HashMap;

/// Placement role of a category. Drives the layer rules in the placement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// Terrain, only allowed on [`Layer::Ground`].
    Ground,
    /// Roads and rails, only allowed on [`Layer::Paths`].
    Path,
    /// Everything else.
    Object,
}

/// Named group of tiles sharing a default layer.
#[derive(Debug, Clone)]
pub struct TileCategory {
    /// Palette heading.
    pub name: String,
    /// Placement role.
    pub kind: CategoryKind,
    /// Layer tiles of this category land on unless overridden.
    pub default_layer: Layer,
    /// Tile ids, palette order.
    pub tiles: Vec<String>,
}

/// Plain RGB color used by generated tile descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Stroke pattern painted over a base color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Pattern {
    Waves,
    Bricks,
    Rails,
    Planks,
    Stripes,
}

/// Procedural texture description, consumed by the rendering side only.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratedTile {
    Color(Rgb),
    /// Base fill with stippled dots, `density` dots per square pixel.
    Noise { base: Rgb, dots: Rgb, density: f32 },
    Pattern { base: Rgb, stroke: Rgb, pattern: Pattern },
}

impl GeneratedTile {
    /// Color a renderer should use when it cannot draw the full texture.
    pub fn base_color(&self) -> Rgb {
        match *self {
            GeneratedTile::Color(c) => c,
            GeneratedTile::Noise { base, .. } => base,
            GeneratedTile::Pattern { base, .. } => base,
        }
    }
}

/// Lookup from tile id to category, layer and texture kind.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    categories: Vec<TileCategory>,
    // tile -> index of the first category listing it
    first_category: HashMap<String, usize>,
    overrides: HashMap<String, Layer>,
    generated: HashMap<String, GeneratedTile>,
    fallback: Layer,
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TileCatalog {
    /// Empty catalog; every tile resolves to `fallback`.
    pub fn new(fallback: Layer) -> Self {
        TileCatalog {
            categories: Vec::new(),
            first_category: HashMap::new(),
            overrides: HashMap::new(),
            generated: HashMap::new(),
            fallback,
        }
    }

    /// Appends a category. Tiles already listed by an earlier category keep
    /// their first membership.
    pub fn with_category(
        mut self,
        name: &str,
        kind: CategoryKind,
        default_layer: Layer,
        tiles: &[&str],
    ) -> Self {
        let idx = self.categories.len();
        for tile in tiles {
            self.first_category.entry((*tile).to_owned()).or_insert(idx);
        }
        self.categories.push(TileCategory {
            name: name.to_owned(),
            kind,
            default_layer,
            tiles: tiles.iter().map(|t| (*t).to_owned()).collect(),
        });
        self
    }

    /// Pins a single tile to a layer, beating its category default.
    pub fn with_override(mut self, tile: &str, layer: Layer) -> Self {
        self.overrides.insert(tile.to_owned(), layer);
        self
    }

    /// Registers a procedural texture for a tile id.
    pub fn with_generated(mut self, tile: &str, def: GeneratedTile) -> Self {
        self.generated.insert(tile.to_owned(), def);
        self
    }

    /// Catalog shipped with the editor.
    pub fn builtin() -> Self {
        use GeneratedTile as G;

        TileCatalog::new(Layer::Features)
            .with_category(
                "Ground",
                CategoryKind::Ground,
                Layer::Ground,
                &["grass", "water", "dirt", "sand", "stone", "🟩", "🟦", "🟫", "🌊"],
            )
            .with_category(
                "Paths",
                CategoryKind::Path,
                Layer::Paths,
                &["road", "rail", "brick", "plank", "🛣️", "🛤️"],
            )
            .with_category(
                "Nature",
                CategoryKind::Object,
                Layer::Features,
                &["🌲", "🌳", "🌴", "🌵", "🪨", "💧", "🌾", "🌻"],
            )
            .with_category(
                "Residential",
                CategoryKind::Object,
                Layer::Buildings,
                &["🏠", "🏡", "🏘️", "🛖", "🏚️"],
            )
            .with_category(
                "Commercial",
                CategoryKind::Object,
                Layer::Buildings,
                &["🏢", "🏬", "🏪", "🛒", "🏨", "🏦", "🏧", "🍔", "🍕", "☕"],
            )
            .with_category(
                "Industrial",
                CategoryKind::Object,
                Layer::Buildings,
                &["🏭", "🔧", "⚙️", "🧱", "🪵", "⛏️", "🏗️"],
            )
            .with_category(
                "Civic",
                CategoryKind::Object,
                Layer::Buildings,
                &[
                    "🏛️", "🏫", "🏥", "🏤", "⛪", "🕌", "🕍", "⛩️", "🏰", "🏯", "🏟️", "🚓", "🚑",
                    "🚒", "⛽", "💡", "♻️",
                ],
            )
            .with_category(
                "Transport",
                CategoryKind::Object,
                Layer::Features,
                &[
                    "🚗", "🚕", "🚌", "🚚", "🚛", "🚧", "🚦", "🌉", "⚓", "🚢", "🚤", "✈️", "🚁",
                    "🚀", "⛽",
                ],
            )
            .with_category(
                "Recreation",
                CategoryKind::Object,
                Layer::Features,
                &["🎡", "🎢", "🎪", "🎭", "🏞️", "🏕️", "🏖️", "⛱️", "⛲", "⛳", "⚽", "🏀"],
            )
            .with_category(
                "Farm",
                CategoryKind::Object,
                Layer::Features,
                &["🍓", "🍎", "🌽", "🥕", "🥔", "🍅", "🐄", "🐖", "🐑", "🐔", "🚜"],
            )
            .with_category(
                "Signs",
                CategoryKind::Object,
                Layer::Features,
                &["🚩", "📍", "🚧", "⬆️", "➡️", "⬇️", "⬅️", "⛔", "🚫", "🅿️"],
            )
            .with_category(
                "Sky",
                CategoryKind::Object,
                Layer::Air,
                &["☀️", "🌙", "☁️", "⚡", "✨", "💫"],
            )
            .with_override("✈️", Layer::Air)
            .with_override("🚁", Layer::Air)
            .with_override("🚀", Layer::Air)
            .with_override("🌉", Layer::Paths)
            .with_override("🎡", Layer::Buildings)
            .with_override("🎢", Layer::Buildings)
            .with_generated(
                "grass",
                G::Noise { base: Rgb(0x4c, 0xaf, 0x50), dots: Rgb(0x38, 0x8e, 0x3c), density: 0.3 },
            )
            .with_generated(
                "water",
                G::Pattern { base: Rgb(0x21, 0x96, 0xf3), stroke: Rgb(0x64, 0xb5, 0xf6), pattern: Pattern::Waves },
            )
            .with_generated(
                "dirt",
                G::Noise { base: Rgb(0x8d, 0x6e, 0x63), dots: Rgb(0x6d, 0x4c, 0x41), density: 0.4 },
            )
            .with_generated(
                "sand",
                G::Noise { base: Rgb(0xf4, 0xe1, 0xa1), dots: Rgb(0xe0, 0xc9, 0x7f), density: 0.25 },
            )
            .with_generated("stone", G::Color(Rgb(0x9e, 0x9e, 0x9e)))
            .with_generated(
                "road",
                G::Pattern { base: Rgb(0x55, 0x55, 0x55), stroke: Rgb(0xff, 0xeb, 0x3b), pattern: Pattern::Stripes },
            )
            .with_generated(
                "rail",
                G::Pattern { base: Rgb(0x79, 0x55, 0x48), stroke: Rgb(0xbd, 0xbd, 0xbd), pattern: Pattern::Rails },
            )
            .with_generated(
                "brick",
                G::Pattern { base: Rgb(0xb0, 0x50, 0x3a), stroke: Rgb(0xd7, 0xcc, 0xc8), pattern: Pattern::Bricks },
            )
            .with_generated(
                "plank",
                G::Pattern { base: Rgb(0xa1, 0x88, 0x7f), stroke: Rgb(0x5d, 0x40, 0x37), pattern: Pattern::Planks },
            )
    }

    /// Layer a tile lands on: exact override, then first category, then the fallback.
    pub fn default_layer_for(&self, tile: &str) -> Layer {
        if let Some(layer) = self.overrides.get(tile) {
            return *layer;
        }
        if let Some(cat) = self.category_of(tile) {
            return cat.default_layer;
        }
        debug!("unknown tile {tile:?}, using fallback layer {}", self.fallback);
        self.fallback
    }

    /// First category listing `tile`.
    pub fn category_of(&self, tile: &str) -> Option<&TileCategory> {
        self.first_category
            .get(tile)
            .and_then(|idx| self.categories.get(*idx))
    }

    /// Categories in palette order.
    pub fn categories(&self) -> &[TileCategory] {
        &self.categories
    }

    /// True when any ground category lists `tile`.
    pub fn is_ground_tile(&self, tile: &str) -> bool {
        self.member_of_kind(tile, CategoryKind::Ground)
    }

    /// True when any path category lists `tile`.
    pub fn is_path_tile(&self, tile: &str) -> bool {
        self.member_of_kind(tile, CategoryKind::Path)
    }

    /// Procedural texture tiles vs. glyph tiles.
    pub fn is_generated_kind(&self, tile: &str) -> bool {
        self.generated.contains_key(tile)
    }

    /// Texture description for a generated tile.
    pub fn generated_def(&self, tile: &str) -> Option<&GeneratedTile> {
        self.generated.get(tile)
    }

    /// Layer used for tiles nobody knows about.
    pub fn fallback_layer(&self) -> Layer {
        self.fallback
    }

    fn member_of_kind(&self, tile: &str, kind: CategoryKind) -> bool {
        self.categories
            .iter()
            .any(|c| c.kind == kind && c.tiles.iter().any(|t| t == tile))
    }
}
