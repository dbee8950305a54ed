//! Property-based tests for area scanning
//!
//! Validates scan snapshot invariants:
//! - Sum of region counts never exceeds the total sampled area
//! - A pass completes in exactly `cadence_ticks` ticks
//! - Unloaded cells never count toward area
//! - The pass center stays fixed while the observer moves

use ambience_core::RegionId;
use ambience_world::{AreaScanner, BlockPos, CellSample, RegionSampler, ScanLayer, ScanTier};
use proptest::prelude::*;

/// Stripes of biomes along x; columns with x divisible by `hole` are unloaded.
struct StripeWorld {
    stripe: i32,
    hole: i32,
}

impl RegionSampler for StripeWorld {
    fn biome_at(&self, pos: BlockPos) -> CellSample {
        if self.hole > 0 && pos.x.rem_euclid(self.hole) == 0 {
            return CellSample::Unloaded;
        }
        match pos.x.div_euclid(self.stripe).rem_euclid(3) {
            0 => CellSample::Empty,
            band => CellSample::Region(RegionId(band as u32)),
        }
    }

    fn block_effect_at(&self, pos: BlockPos) -> CellSample {
        self.biome_at(pos)
    }

    fn surface_height(&self, _x: i32, _z: i32) -> Option<i32> {
        Some(63)
    }
}

fn run_pass(scanner: &mut AreaScanner, world: &StripeWorld, center: BlockPos) -> u32 {
    let mut ticks = 0;
    loop {
        ticks += 1;
        if scanner.tick(Some(center), world) {
            return ticks;
        }
        assert!(ticks < 10_000, "scan pass never completed");
    }
}

proptest! {
    /// Property: counts sum to at most the total area, and the pass takes cadence ticks.
    #[test]
    fn counts_bounded_by_area(
        radius in 0i32..6,
        vertical in 0i32..3,
        cadence in 1u32..12,
        stripe in 1i32..5,
        hole in 0i32..4,
        x in -50i32..50,
        z in -50i32..50,
    ) {
        let tier = ScanTier::new(radius, vertical, cadence);
        let world = StripeWorld { stripe, hole };
        let mut scanner = AreaScanner::new("prop", ScanLayer::Biome, tier);

        let ticks = run_pass(&mut scanner, &world, BlockPos::new(x, 64, z));
        let expected_ticks = tier.volume().div_ceil(tier.cells_per_tick());
        prop_assert_eq!(u64::from(ticks), expected_ticks);
        prop_assert!(u64::from(ticks) <= u64::from(cadence));

        let snapshot = scanner.snapshot();
        let matched: u32 = snapshot.counts().map(|(_, count)| count).sum();
        prop_assert!(matched <= snapshot.total_area());
        prop_assert!(u64::from(snapshot.total_area()) <= tier.volume());
        if hole == 0 {
            prop_assert_eq!(u64::from(snapshot.total_area()), tier.volume());
        }
    }

    /// Property: moving mid-pass does not change the published snapshot.
    #[test]
    fn pass_center_is_fixed(
        radius in 1i32..5,
        cadence in 2u32..8,
        drift in 1i32..30,
    ) {
        let tier = ScanTier::new(radius, 0, cadence);
        let world = StripeWorld { stripe: 2, hole: 0 };
        let start = BlockPos::new(0, 64, 0);

        let mut still = AreaScanner::new("still", ScanLayer::Biome, tier);
        run_pass(&mut still, &world, start);

        let mut moving = AreaScanner::new("moving", ScanLayer::Biome, tier);
        let mut step = 0;
        loop {
            let position = start.offset(step * drift, 0, 0);
            step += 1;
            if moving.tick(Some(position), &world) {
                break;
            }
        }
        prop_assert_eq!(still.snapshot(), moving.snapshot());
    }
}
