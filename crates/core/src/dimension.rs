//! Dimension identifiers and per-dimension ambient rules.
//!
//! Ambient behaviour is dimension-scoped: some dimensions have no biome
//! ambience at all, some are treated as permanently "outside" (no roof
//! detection), and each has its own sea level for underground checks.

use serde::{Deserialize, Serialize};

/// Stable identifier for a world dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(pub i32);

impl DimensionId {
    /// The Overworld dimension.
    pub const OVERWORLD: Self = Self(0);
    /// The Nether dimension.
    pub const NETHER: Self = Self(-1);
    /// The End dimension.
    pub const END: Self = Self(1);

    /// Canonical string key used in configs/logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OVERWORLD => "overworld",
            Self::NETHER => "nether",
            Self::END => "end",
            _ => "custom",
        }
    }
}

impl Default for DimensionId {
    fn default() -> Self {
        Self::OVERWORLD
    }
}

/// Ambient rules for one dimension, supplied by the world collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionInfo {
    /// Dimension these rules apply to.
    pub id: DimensionId,
    /// Sea level used for underground detection.
    pub sea_level: i32,
    /// Whether biome ambience plays in this dimension at all.
    pub play_biome_sounds: bool,
    /// Treat the observer as outside regardless of roof coverage.
    pub always_outside: bool,
}

impl DimensionInfo {
    /// Default rules for a dimension id.
    pub fn for_dimension(id: DimensionId) -> Self {
        match id {
            DimensionId::NETHER => Self {
                id,
                sea_level: 32,
                play_biome_sounds: true,
                always_outside: true,
            },
            DimensionId::END => Self {
                id,
                sea_level: 0,
                play_biome_sounds: false,
                always_outside: true,
            },
            _ => Self {
                id,
                sea_level: 63,
                play_biome_sounds: true,
                always_outside: false,
            },
        }
    }
}

impl Default for DimensionInfo {
    fn default() -> Self {
        Self::for_dimension(DimensionId::OVERWORLD)
    }
}
