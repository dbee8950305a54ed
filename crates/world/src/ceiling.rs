//! Roof detection around the observer.

use crate::{BlockPos, RegionSampler};

/// Coverage fraction at or above which the observer counts as inside.
pub const INSIDE_THRESHOLD: f32 = 0.55;

/// Samples surface heights on a square around the observer and tracks the
/// fraction of columns that have a roof above head height.
#[derive(Debug, Clone)]
pub struct CeilingCoverage {
    radius: i32,
    coverage: f32,
}

impl CeilingCoverage {
    pub fn new(radius: i32) -> Self {
        Self {
            radius: radius.max(0),
            coverage: 0.0,
        }
    }

    /// Resample coverage. A missing observer resets coverage to zero.
    pub fn update<W: RegionSampler + ?Sized>(&mut self, observer: Option<BlockPos>, world: &W) {
        let Some(center) = observer else {
            self.coverage = 0.0;
            return;
        };

        let head = center.y + 1;
        let mut sampled = 0u32;
        let mut covered = 0u32;
        for dx in -self.radius..=self.radius {
            for dz in -self.radius..=self.radius {
                if let Some(height) = world.surface_height(center.x + dx, center.z + dz) {
                    sampled += 1;
                    if height > head {
                        covered += 1;
                    }
                }
            }
        }

        self.coverage = if sampled == 0 {
            0.0
        } else {
            covered as f32 / sampled as f32
        };
    }

    /// Last computed coverage in [0.0, 1.0].
    pub fn coverage(&self) -> f32 {
        self.coverage
    }

    pub fn is_inside(&self) -> bool {
        self.coverage >= INSIDE_THRESHOLD
    }

    pub fn reset(&mut self) {
        self.coverage = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellSample;

    /// Flat world with a roof over every column with x >= 0.
    struct HalfRoof;

    impl RegionSampler for HalfRoof {
        fn biome_at(&self, _pos: BlockPos) -> CellSample {
            CellSample::Empty
        }

        fn block_effect_at(&self, _pos: BlockPos) -> CellSample {
            CellSample::Empty
        }

        fn surface_height(&self, x: i32, _z: i32) -> Option<i32> {
            if x >= 0 {
                Some(80)
            } else {
                Some(63)
            }
        }
    }

    #[test]
    fn open_sky_is_outside() {
        let mut ceiling = CeilingCoverage::new(2);
        ceiling.update(Some(BlockPos::new(-10, 64, 0)), &HalfRoof);
        assert_eq!(ceiling.coverage(), 0.0);
        assert!(!ceiling.is_inside());
    }

    #[test]
    fn full_roof_is_inside() {
        let mut ceiling = CeilingCoverage::new(2);
        ceiling.update(Some(BlockPos::new(10, 64, 0)), &HalfRoof);
        assert_eq!(ceiling.coverage(), 1.0);
        assert!(ceiling.is_inside());
    }

    #[test]
    fn partial_roof_uses_threshold() {
        let mut ceiling = CeilingCoverage::new(1);
        // Columns x = -1 open, x = 0 and x = 1 covered => 6 of 9.
        ceiling.update(Some(BlockPos::new(0, 64, 0)), &HalfRoof);
        assert!((ceiling.coverage() - 6.0 / 9.0).abs() < 1e-6);
        assert!(ceiling.is_inside());

        ceiling.update(None, &HalfRoof);
        assert_eq!(ceiling.coverage(), 0.0);
    }
}
