//! Reduction of scan snapshots into one desired volume per acoustic.

use ambience_core::AcousticId;
use ambience_world::{EnvironmentState, ScanSnapshot};
use rand::RngCore;
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::AcousticMatcher;

/// Volume of a region that is present at all, before area weighting.
pub const DEFAULT_VOLUME_FLOOR: f32 = 0.05;

/// Desired volume per acoustic for one aggregation cycle.
///
/// Built from scratch every cycle. Writes overwrite: when several regions map
/// to the same acoustic, the region processed last wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredVolumeMap {
    volumes: BTreeMap<AcousticId, f32>,
}

impl DesiredVolumeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the desired volume of `acoustic` (clamped to [0.0, 1.0], NaN and infinities become 0.0).
    pub fn put(&mut self, acoustic: AcousticId, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.volumes.insert(acoustic, volume);
    }

    pub fn get(&self, acoustic: AcousticId) -> Option<f32> {
        self.volumes.get(&acoustic).copied()
    }

    /// Desired volume, or 0.0 when absent.
    pub fn volume(&self, acoustic: AcousticId) -> f32 {
        self.get(acoustic).unwrap_or(0.0)
    }

    pub fn remove(&mut self, acoustic: AcousticId) -> Option<f32> {
        self.volumes.remove(&acoustic)
    }

    pub fn contains(&self, acoustic: AcousticId) -> bool {
        self.volumes.contains_key(&acoustic)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Reset for reuse as a pooled buffer.
    pub fn clear(&mut self) {
        self.volumes.clear();
    }

    /// `(acoustic, volume)` pairs in ascending acoustic order.
    pub fn iter(&self) -> impl Iterator<Item = (AcousticId, f32)> + '_ {
        self.volumes.iter().map(|(&acoustic, &volume)| (acoustic, volume))
    }
}

impl IntoIterator for DesiredVolumeMap {
    type Item = (AcousticId, f32);
    type IntoIter = btree_map::IntoIter<AcousticId, f32>;

    fn into_iter(self) -> Self::IntoIter {
        self.volumes.into_iter()
    }
}

impl FromIterator<(AcousticId, f32)> for DesiredVolumeMap {
    fn from_iter<I: IntoIterator<Item = (AcousticId, f32)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (acoustic, volume) in iter {
            map.put(acoustic, volume);
        }
        map
    }
}

/// Turns area-weighted region tallies into desired acoustic volumes.
#[derive(Debug, Clone, Copy)]
pub struct AcousticAggregator {
    floor: f32,
}

impl AcousticAggregator {
    pub fn new(floor: f32) -> Self {
        Self {
            floor: floor.clamp(0.0, 1.0),
        }
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// `floor + (1 - floor) * count / total_area`, or 0.0 when the region is absent.
    pub fn area_volume(&self, count: u32, total_area: u32) -> f32 {
        if count == 0 || total_area == 0 {
            return 0.0;
        }
        if count >= total_area {
            return 1.0;
        }
        let share = count as f32 / total_area as f32;
        (self.floor + (1.0 - self.floor) * share).clamp(self.floor, 1.0)
    }

    /// Build a fresh map from `snapshots`, processed in order.
    pub fn aggregate<M: AcousticMatcher + ?Sized>(
        &self,
        snapshots: &[&ScanSnapshot],
        matcher: &M,
        env: &EnvironmentState,
    ) -> DesiredVolumeMap {
        let mut desired = DesiredVolumeMap::new();
        for snapshot in snapshots {
            self.accumulate(&mut desired, snapshot, matcher, env);
        }
        desired
    }

    /// Write the volumes derived from one snapshot into `desired`.
    ///
    /// Empty snapshots contribute nothing.
    pub fn accumulate<M: AcousticMatcher + ?Sized>(
        &self,
        desired: &mut DesiredVolumeMap,
        snapshot: &ScanSnapshot,
        matcher: &M,
        env: &EnvironmentState,
    ) {
        let total = snapshot.total_area();
        if total == 0 {
            return;
        }
        for (region, count) in snapshot.counts() {
            let volume = self.area_volume(count, total);
            if volume <= 0.0 {
                continue;
            }
            for acoustic in matcher.candidates_for(region, env) {
                desired.put(acoustic, volume);
            }
        }
    }

    /// Force always-on acoustics to full volume, overriding area-derived values.
    pub fn apply_always_on<I>(&self, desired: &mut DesiredVolumeMap, sounds: I)
    where
        I: IntoIterator<Item = AcousticId>,
    {
        for acoustic in sounds {
            desired.put(acoustic, 1.0);
        }
    }

    /// One-shot spot sound drawn from the dominant region of `snapshot`.
    pub fn pick_spot_sound<M: AcousticMatcher + ?Sized>(
        &self,
        snapshot: &ScanSnapshot,
        matcher: &M,
        env: &EnvironmentState,
        rng: &mut dyn RngCore,
    ) -> Option<AcousticId> {
        let region = snapshot.dominant()?;
        matcher.spot_sound_for(region, env, rng)
    }
}

impl Default for AcousticAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME_FLOOR)
    }
}
