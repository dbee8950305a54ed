//! World access used by the scanners.

use ambience_core::{DimensionId, DimensionInfo, RegionId};
use crate::BlockPos;

/// Result of sampling one world cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSample {
    /// The cell is not available (unloaded chunk, outside the world).
    /// It is skipped entirely and does not count toward the sampled area.
    Unloaded,
    /// The cell is loaded but belongs to no sound-producing region.
    Empty,
    /// The cell belongs to the given region.
    Region(RegionId),
}

impl CellSample {
    /// Region carried by this sample, if any.
    pub fn region(self) -> Option<RegionId> {
        match self {
            CellSample::Region(region) => Some(region),
            _ => None,
        }
    }
}

impl From<Option<RegionId>> for CellSample {
    fn from(region: Option<RegionId>) -> Self {
        region.map_or(CellSample::Empty, CellSample::Region)
    }
}

/// Read-only view of the world supplied by the host.
///
/// Implementations must be cheap per call; scanners issue a bounded number of
/// queries per tick.
pub trait RegionSampler {
    /// Biome region at `pos`.
    fn biome_at(&self, pos: BlockPos) -> CellSample;

    /// Block-effect category at `pos` (e.g. water, lava, leaves).
    fn block_effect_at(&self, pos: BlockPos) -> CellSample;

    /// Y of the highest opaque block in the column, or `None` when unloaded.
    fn surface_height(&self, x: i32, z: i32) -> Option<i32>;

    /// Ambient rules of a dimension.
    fn dimension_info(&self, dimension: DimensionId) -> DimensionInfo {
        DimensionInfo::for_dimension(dimension)
    }
}

impl<T: RegionSampler + ?Sized> RegionSampler for &T {
    fn biome_at(&self, pos: BlockPos) -> CellSample {
        (**self).biome_at(pos)
    }

    fn block_effect_at(&self, pos: BlockPos) -> CellSample {
        (**self).block_effect_at(pos)
    }

    fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        (**self).surface_height(x, z)
    }

    fn dimension_info(&self, dimension: DimensionId) -> DimensionInfo {
        (**self).dimension_info(dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_region_converts_to_sample() {
        assert_eq!(CellSample::from(None), CellSample::Empty);
        assert_eq!(
            CellSample::from(Some(RegionId(3))),
            CellSample::Region(RegionId(3))
        );
        assert_eq!(CellSample::Unloaded.region(), None);
        assert_eq!(CellSample::Region(RegionId(1)).region(), Some(RegionId(1)));
    }
}
