//! In-memory world used by tests and the headless host.

use ambience_core::{DimensionId, DimensionInfo, RegionId};
use ambience_world::{BlockPos, CellSample, RegionSampler};
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

/// Programmable world: biomes per column, block effects per cell, surface
/// heights per column, and a set of unloaded chunks.
///
/// Everything not explicitly painted falls back to the defaults given at
/// construction.
#[derive(Debug, Clone)]
pub struct FixtureWorld {
    default_biome: Option<RegionId>,
    biomes: HashMap<(i32, i32), RegionId>,
    block_effects: HashMap<BlockPos, RegionId>,
    default_height: i32,
    heights: HashMap<(i32, i32), i32>,
    unloaded: HashSet<(i32, i32)>,
    dimensions: HashMap<DimensionId, DimensionInfo>,
}

impl FixtureWorld {
    /// A flat world at `default_height` covered by `default_biome`.
    pub fn new(default_biome: Option<RegionId>, default_height: i32) -> Self {
        Self {
            default_biome,
            biomes: HashMap::new(),
            block_effects: HashMap::new(),
            default_height,
            heights: HashMap::new(),
            unloaded: HashSet::new(),
            dimensions: HashMap::new(),
        }
    }

    /// Paint a biome over a rectangle of columns.
    pub fn paint_biome(
        &mut self,
        xs: RangeInclusive<i32>,
        zs: RangeInclusive<i32>,
        biome: RegionId,
    ) -> &mut Self {
        for x in xs {
            for z in zs.clone() {
                self.biomes.insert((x, z), biome);
            }
        }
        self
    }

    /// Fill a cuboid (inclusive corners) with a block-effect category.
    pub fn fill_block_effect(&mut self, min: BlockPos, max: BlockPos, effect: RegionId) -> &mut Self {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.block_effects.insert(BlockPos::new(x, y, z), effect);
                }
            }
        }
        self
    }

    /// Raise the surface over a rectangle of columns (e.g. to build a roof).
    pub fn set_height(&mut self, xs: RangeInclusive<i32>, zs: RangeInclusive<i32>, height: i32) -> &mut Self {
        for x in xs {
            for z in zs.clone() {
                self.heights.insert((x, z), height);
            }
        }
        self
    }

    /// Mark a 16x16 chunk column as unloaded.
    pub fn unload_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> &mut Self {
        self.unloaded.insert((chunk_x, chunk_z));
        self
    }

    /// Mark a chunk column as loaded again.
    pub fn load_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> &mut Self {
        self.unloaded.remove(&(chunk_x, chunk_z));
        self
    }

    /// Override the ambient rules of a dimension.
    pub fn set_dimension(&mut self, info: DimensionInfo) -> &mut Self {
        self.dimensions.insert(info.id, info);
        self
    }

    fn is_loaded(&self, pos: BlockPos) -> bool {
        !self.unloaded.contains(&pos.chunk())
    }
}

impl RegionSampler for FixtureWorld {
    fn biome_at(&self, pos: BlockPos) -> CellSample {
        if !self.is_loaded(pos) {
            return CellSample::Unloaded;
        }
        self.biomes
            .get(&(pos.x, pos.z))
            .copied()
            .or(self.default_biome)
            .into()
    }

    fn block_effect_at(&self, pos: BlockPos) -> CellSample {
        if !self.is_loaded(pos) {
            return CellSample::Unloaded;
        }
        self.block_effects.get(&pos).copied().into()
    }

    fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        if !self.is_loaded(BlockPos::new(x, 0, z)) {
            return None;
        }
        Some(self.heights.get(&(x, z)).copied().unwrap_or(self.default_height))
    }

    fn dimension_info(&self, dimension: DimensionId) -> DimensionInfo {
        self.dimensions
            .get(&dimension)
            .copied()
            .unwrap_or_else(|| DimensionInfo::for_dimension(dimension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREST: RegionId = RegionId(0);
    const PLAINS: RegionId = RegionId(1);
    const WATER: RegionId = RegionId(2);

    #[test]
    fn painted_biomes_override_default() {
        let mut world = FixtureWorld::new(Some(PLAINS), 63);
        world.paint_biome(0..=3, 0..=3, FOREST);
        assert_eq!(world.biome_at(BlockPos::new(2, 64, 2)), CellSample::Region(FOREST));
        assert_eq!(world.biome_at(BlockPos::new(9, 64, 2)), CellSample::Region(PLAINS));
    }

    #[test]
    fn unloaded_chunks_hide_everything() {
        let mut world = FixtureWorld::new(Some(PLAINS), 63);
        world
            .fill_block_effect(BlockPos::new(0, 60, 0), BlockPos::new(1, 60, 1), WATER)
            .unload_chunk(0, 0);
        assert_eq!(world.biome_at(BlockPos::new(1, 64, 1)), CellSample::Unloaded);
        assert_eq!(world.block_effect_at(BlockPos::new(1, 60, 1)), CellSample::Unloaded);
        assert_eq!(world.surface_height(1, 1), None);

        world.load_chunk(0, 0);
        assert_eq!(world.block_effect_at(BlockPos::new(1, 60, 1)), CellSample::Region(WATER));
        assert_eq!(world.block_effect_at(BlockPos::new(1, 61, 1)), CellSample::Empty);
    }

    #[test]
    fn heights_and_dimensions() {
        let mut world = FixtureWorld::new(None, 63);
        world.set_height(0..=0, 0..=0, 90);
        assert_eq!(world.surface_height(0, 0), Some(90));
        assert_eq!(world.surface_height(5, 5), Some(63));
        assert_eq!(world.biome_at(BlockPos::new(5, 64, 5)), CellSample::Empty);

        world.set_dimension(DimensionInfo {
            id: DimensionId::OVERWORLD,
            sea_level: 40,
            play_biome_sounds: false,
            always_outside: false,
        });
        assert_eq!(world.dimension_info(DimensionId::OVERWORLD).sea_level, 40);
        assert!(!world.dimension_info(DimensionId::END).play_biome_sounds);
    }
}
