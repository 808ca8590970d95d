use serde::{Deserialize, Serialize};
use std::fmt;

/// Depth rank an object lives on. Lower ranks sit under higher ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Layer {
    /// Terrain: grass, water, dirt.
    Ground = 0,
    /// Roads, rails and other paths drawn over terrain.
    Paths = 1,
    /// Trees, rocks, props.
    Features = 2,
    /// Houses, shops, factories.
    Buildings = 3,
    /// Planes, clouds, anything above the rooftops.
    Air = 4,
}

impl Layer {
    /// Every layer, lowest rank first.
    pub const ALL: [Layer; 5] = [
        Layer::Ground,
        Layer::Paths,
        Layer::Features,
        Layer::Buildings,
        Layer::Air,
    ];

    /// Numeric rank used in snapshots.
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Layer::rank`].
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(rank as usize).copied()
    }

    /// Display name for status lines and palettes.
    pub fn name(self) -> &'static str {
        match self {
            Layer::Ground => "Ground",
            Layer::Paths => "Paths",
            Layer::Features => "Features",
            Layer::Buildings => "Buildings",
            Layer::Air => "Air",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.rank())
    }
}

impl From<Layer> for u8 {
    fn from(layer: Layer) -> Self {
        layer.rank()
    }
}

impl TryFrom<u8> for Layer {
    type Error = String;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        Layer::from_rank(rank).ok_or_else(|| format!("unknown layer rank {rank}"))
    }
}
