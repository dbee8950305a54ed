//! Time-sliced area scanning around the observer.
//!
//! A scanner walks a fixed cuboid around the observer in slices, so that one
//! full pass is spread over `cadence_ticks` ticks. When a pass completes, the
//! tallies are published as a fresh [`ScanSnapshot`] and the next pass starts
//! from the observer's position at that time.

use ambience_core::RegionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{BlockPos, CellSample, RegionSampler};

/// Size and cadence of one scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTier {
    /// Horizontal radius in blocks (square footprint of side `2r + 1`).
    pub radius: i32,
    /// Vertical half-extent in blocks; 0 scans only the observer's layer.
    pub vertical: i32,
    /// Ticks one full pass is spread over.
    pub cadence_ticks: u32,
}

impl ScanTier {
    pub const fn new(radius: i32, vertical: i32, cadence_ticks: u32) -> Self {
        Self {
            radius,
            vertical,
            cadence_ticks,
        }
    }

    fn side(&self) -> u64 {
        2 * self.radius.max(0) as u64 + 1
    }

    fn height(&self) -> u64 {
        2 * self.vertical.max(0) as u64 + 1
    }

    /// Cells visited by one full pass.
    pub fn volume(&self) -> u64 {
        self.side()
            .saturating_mul(self.side())
            .saturating_mul(self.height())
    }

    /// Cells visited per tick so that a pass finishes in `cadence_ticks`.
    pub fn cells_per_tick(&self) -> u64 {
        self.volume().div_ceil(u64::from(self.cadence_ticks.max(1)))
    }

    /// Offset from the pass center of the `index`-th cell (x fastest, then z, then y).
    fn offset(&self, index: u64) -> (i32, i32, i32) {
        let side = self.side();
        let dx = (index % side) as i32 - self.radius.max(0);
        let dz = ((index / side) % side) as i32 - self.radius.max(0);
        let dy = (index / (side * side)) as i32 - self.vertical.max(0);
        (dx, dy, dz)
    }
}

/// Which world query a scanner issues per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanLayer {
    /// Biome census.
    Biome,
    /// Block-effect categories (water, lava, foliage, ...).
    BlockEffect,
}

/// Result of one completed scan pass.
///
/// Replaced wholesale on each pass; consumers only ever read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSnapshot {
    counts: BTreeMap<RegionId, u32>,
    total_area: u32,
}

impl ScanSnapshot {
    /// Build a snapshot from explicit tallies.
    ///
    /// `total_area` is raised to the sum of the counts if it is smaller, so
    /// the snapshot never claims more matches than cells.
    pub fn from_counts<I>(counts: I, total_area: u32) -> Self
    where
        I: IntoIterator<Item = (RegionId, u32)>,
    {
        let mut map = BTreeMap::new();
        for (region, count) in counts {
            if count > 0 {
                *map.entry(region).or_insert(0) += count;
            }
        }
        let matched: u32 = map.values().sum();
        Self {
            counts: map,
            total_area: total_area.max(matched),
        }
    }

    /// Occurrences of `region` in the pass.
    pub fn count(&self, region: RegionId) -> u32 {
        self.counts.get(&region).copied().unwrap_or(0)
    }

    /// `(region, count)` pairs in ascending region order.
    pub fn counts(&self) -> impl Iterator<Item = (RegionId, u32)> + '_ {
        self.counts.iter().map(|(&region, &count)| (region, count))
    }

    /// Cells actually visited (unloaded cells excluded).
    pub fn total_area(&self) -> u32 {
        self.total_area
    }

    /// Returns true when nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.total_area == 0
    }

    /// Number of distinct regions seen.
    pub fn region_count(&self) -> usize {
        self.counts.len()
    }

    /// Region with the most occurrences; ties go to the lower region id.
    pub fn dominant(&self) -> Option<RegionId> {
        self.counts
            .iter()
            .fold(None, |best: Option<(RegionId, u32)>, (&region, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((region, count)),
            })
            .map(|(region, _)| region)
    }
}

struct ScanPass {
    center: BlockPos,
    cursor: u64,
    counts: BTreeMap<RegionId, u32>,
    area: u32,
}

impl ScanPass {
    fn new(center: BlockPos) -> Self {
        Self {
            center,
            cursor: 0,
            counts: BTreeMap::new(),
            area: 0,
        }
    }
}

/// Incremental area scanner.
pub struct AreaScanner {
    name: &'static str,
    layer: ScanLayer,
    tier: ScanTier,
    pass: Option<ScanPass>,
    snapshot: ScanSnapshot,
    passes_completed: u64,
}

impl AreaScanner {
    /// Create a scanner; `name` is only used for logging.
    pub fn new(name: &'static str, layer: ScanLayer, tier: ScanTier) -> Self {
        Self {
            name,
            layer,
            tier,
            pass: None,
            snapshot: ScanSnapshot::default(),
            passes_completed: 0,
        }
    }

    /// Advance the current pass by one slice.
    ///
    /// Returns true when this call completed a pass and published a new snapshot.
    /// A missing observer abandons the pass and publishes an empty snapshot.
    pub fn tick<W: RegionSampler + ?Sized>(&mut self, observer: Option<BlockPos>, world: &W) -> bool {
        let Some(position) = observer else {
            if self.pass.take().is_some() || !self.snapshot.is_empty() {
                debug!(scanner = self.name, "observer gone, dropping scan state");
            }
            self.snapshot = ScanSnapshot::default();
            return false;
        };

        let tier = self.tier;
        let layer = self.layer;
        let volume = tier.volume();
        let pass = self.pass.get_or_insert_with(|| ScanPass::new(position));

        let end = (pass.cursor + tier.cells_per_tick()).min(volume);
        for index in pass.cursor..end {
            let (dx, dy, dz) = tier.offset(index);
            let cell = pass.center.offset(dx, dy, dz);
            let sample = match layer {
                ScanLayer::Biome => world.biome_at(cell),
                ScanLayer::BlockEffect => world.block_effect_at(cell),
            };
            match sample {
                CellSample::Unloaded => {}
                CellSample::Empty => pass.area += 1,
                CellSample::Region(region) => {
                    pass.area += 1;
                    *pass.counts.entry(region).or_insert(0) += 1;
                }
            }
        }
        pass.cursor = end;

        if end < volume {
            return false;
        }

        if let Some(done) = self.pass.take() {
            self.snapshot = ScanSnapshot {
                counts: done.counts,
                total_area: done.area,
            };
            self.passes_completed += 1;
            debug!(
                scanner = self.name,
                center = %done.center,
                regions = self.snapshot.region_count(),
                area = self.snapshot.total_area(),
                "scan pass complete"
            );
        }
        true
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> &ScanSnapshot {
        &self.snapshot
    }

    /// Drop any in-flight pass and the published snapshot.
    pub fn reset(&mut self) {
        self.pass = None;
        self.snapshot = ScanSnapshot::default();
    }

    pub fn tier(&self) -> ScanTier {
        self.tier
    }

    pub fn layer(&self) -> ScanLayer {
        self.layer
    }

    /// Number of passes published since creation.
    pub fn passes_completed(&self) -> u64 {
        self.passes_completed
    }

    /// True while a pass is partially done.
    pub fn in_progress(&self) -> bool {
        self.pass.is_some()
    }
}
