//! Acoustic definitions and region-to-sound matching.
//!
//! An [`AcousticLibrary`] is loaded from a JSON document that names regions
//! (biomes, block-effect categories) and the ambient sounds they produce:
//!
//! ```json
//! {
//!   "acoustics": [{ "name": "ambient/forest", "path": "sounds/ambient/forest.ogg" }],
//!   "regions": [{
//!     "region": "biome:forest",
//!     "sounds": [{ "acoustic": "ambient/forest", "condition": "day" }],
//!     "spot_chance": 0.02,
//!     "spot_sounds": [{ "acoustic": "spot/woodpecker", "weight": 3 }]
//!   }],
//!   "observer": { "sounds": [{ "acoustic": "ambient/underwater", "condition": "underwater" }] }
//! }
//! ```

use ambience_core::{AcousticId, Interner, RegionId};
use ambience_world::EnvironmentState;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Source of acoustic candidates for regions and for the observer itself.
pub trait AcousticMatcher {
    /// Looping sounds a region produces under `env`. Empty is a normal outcome.
    fn candidates_for(&self, region: RegionId, env: &EnvironmentState) -> Vec<AcousticId>;

    /// Maybe pick a one-shot spot sound for `region`.
    fn spot_sound_for(
        &self,
        region: RegionId,
        env: &EnvironmentState,
        rng: &mut dyn RngCore,
    ) -> Option<AcousticId>;

    /// Sounds tied to the observer's own state, played at full volume.
    fn always_on(&self, env: &EnvironmentState) -> Vec<AcousticId>;

    /// Maybe pick a one-shot spot sound tied to the observer.
    fn observer_spot_sound(
        &self,
        env: &EnvironmentState,
        rng: &mut dyn RngCore,
    ) -> Option<AcousticId>;

    /// Display name of an acoustic, for diagnostics.
    fn acoustic_name(&self, _acoustic: AcousticId) -> Option<&str> {
        None
    }
}

impl<T: AcousticMatcher + ?Sized> AcousticMatcher for Arc<T> {
    fn candidates_for(&self, region: RegionId, env: &EnvironmentState) -> Vec<AcousticId> {
        (**self).candidates_for(region, env)
    }

    fn spot_sound_for(
        &self,
        region: RegionId,
        env: &EnvironmentState,
        rng: &mut dyn RngCore,
    ) -> Option<AcousticId> {
        (**self).spot_sound_for(region, env, rng)
    }

    fn always_on(&self, env: &EnvironmentState) -> Vec<AcousticId> {
        (**self).always_on(env)
    }

    fn observer_spot_sound(
        &self,
        env: &EnvironmentState,
        rng: &mut dyn RngCore,
    ) -> Option<AcousticId> {
        (**self).observer_spot_sound(env, rng)
    }

    fn acoustic_name(&self, acoustic: AcousticId) -> Option<&str> {
        (**self).acoustic_name(acoustic)
    }
}

/// Environmental gate on a sound entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCondition {
    #[default]
    Always,
    Day,
    Night,
    Raining,
    Underwater,
    Underground,
    Inside,
    Outside,
}

impl SoundCondition {
    /// Whether the condition holds in `env`.
    pub fn matches(self, env: &EnvironmentState) -> bool {
        match self {
            SoundCondition::Always => true,
            SoundCondition::Day => !env.night,
            SoundCondition::Night => env.night,
            SoundCondition::Raining => env.raining,
            SoundCondition::Underwater => env.underwater,
            SoundCondition::Underground => env.underground,
            SoundCondition::Inside => env.inside,
            SoundCondition::Outside => !env.inside,
        }
    }
}

/// Errors emitted while loading an acoustic library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Wrap IO errors when reading the library file.
    #[error("failed to read acoustic library {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Wrap serde parsing issues.
    #[error("failed to parse acoustic library: {0}")]
    Parse(#[from] serde_json::Error),
    /// A region or acoustic name was blank.
    #[error("empty name in {0}")]
    EmptyName(String),
    /// The same region was defined twice.
    #[error("region {0} defined more than once")]
    DuplicateRegion(String),
    /// Spot chance outside [0, 1].
    #[error("spot chance {chance} for {owner} is outside 0.0..=1.0")]
    SpotChance { owner: String, chance: f32 },
    /// Spot sound with zero weight.
    #[error("spot sound {acoustic} for {owner} has zero weight")]
    SpotWeight { owner: String, acoustic: String },
}

#[derive(Debug, Deserialize)]
struct LibraryDefinition {
    #[serde(default)]
    acoustics: Vec<AcousticDefinition>,
    #[serde(default)]
    regions: Vec<RegionDefinition>,
    #[serde(default)]
    observer: SoundSetDefinition,
}

#[derive(Debug, Deserialize)]
struct AcousticDefinition {
    name: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegionDefinition {
    region: String,
    #[serde(flatten)]
    set: SoundSetDefinition,
}

#[derive(Debug, Default, Deserialize)]
struct SoundSetDefinition {
    #[serde(default)]
    sounds: Vec<SoundDefinition>,
    #[serde(default)]
    spot_chance: f32,
    #[serde(default)]
    spot_sounds: Vec<SpotDefinition>,
}

#[derive(Debug, Deserialize)]
struct SoundDefinition {
    acoustic: String,
    #[serde(default)]
    condition: SoundCondition,
}

#[derive(Debug, Deserialize)]
struct SpotDefinition {
    acoustic: String,
    #[serde(default = "default_spot_weight")]
    weight: u32,
    #[serde(default)]
    condition: SoundCondition,
}

fn default_spot_weight() -> u32 {
    1
}

#[derive(Debug, Clone, Copy)]
struct SpotSound {
    acoustic: AcousticId,
    weight: u32,
    condition: SoundCondition,
}

/// Sounds attached to one region (or to the observer).
#[derive(Debug, Clone, Default)]
struct SoundSet {
    sounds: Vec<(AcousticId, SoundCondition)>,
    spot_chance: f32,
    spot_sounds: Vec<SpotSound>,
}

impl SoundSet {
    fn matching(&self, env: &EnvironmentState) -> Vec<AcousticId> {
        let mut out = Vec::with_capacity(self.sounds.len());
        for &(acoustic, condition) in &self.sounds {
            if condition.matches(env) && !out.contains(&acoustic) {
                out.push(acoustic);
            }
        }
        out
    }

    fn pick_spot(&self, env: &EnvironmentState, rng: &mut dyn RngCore) -> Option<AcousticId> {
        if self.spot_sounds.is_empty() || self.spot_chance <= 0.0 {
            return None;
        }
        if rng.gen::<f32>() >= self.spot_chance {
            return None;
        }

        let total: u64 = self
            .spot_sounds
            .iter()
            .filter(|spot| spot.condition.matches(env))
            .map(|spot| u64::from(spot.weight))
            .sum();
        if total == 0 {
            return None;
        }

        let mut roll = rng.gen_range(0..total);
        for spot in self.spot_sounds.iter().filter(|spot| spot.condition.matches(env)) {
            let weight = u64::from(spot.weight);
            if roll < weight {
                return Some(spot.acoustic);
            }
            roll -= weight;
        }
        None
    }
}

/// Data-driven [`AcousticMatcher`].
#[derive(Debug, Clone, Default)]
pub struct AcousticLibrary {
    regions: Interner<RegionId>,
    acoustics: Interner<AcousticId>,
    paths: BTreeMap<AcousticId, String>,
    sets: HashMap<RegionId, SoundSet>,
    observer: SoundSet,
}

impl AcousticLibrary {
    /// Empty library; populate with the `add_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a library from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, LibraryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse a library from a JSON document.
    pub fn from_json_str(input: &str) -> Result<Self, LibraryError> {
        let definition: LibraryDefinition = serde_json::from_str(input)?;
        let mut library = Self::new();

        for acoustic in definition.acoustics {
            let id = library.named_acoustic(&acoustic.name, "acoustics")?;
            if let Some(path) = acoustic.path {
                library.paths.insert(id, path);
            }
        }

        for region in definition.regions {
            if region.region.trim().is_empty() {
                return Err(LibraryError::EmptyName("regions".to_string()));
            }
            if library.regions.get(&region.region).is_some() {
                return Err(LibraryError::DuplicateRegion(region.region));
            }
            let id = library.regions.intern(&region.region);
            let set = library.compile_set(&region.region, region.set)?;
            library.sets.insert(id, set);
        }

        library.observer = library.compile_set("observer", definition.observer)?;

        debug!(
            regions = library.regions.len(),
            acoustics = library.acoustics.len(),
            "loaded acoustic library"
        );
        Ok(library)
    }

    fn named_acoustic(&mut self, name: &str, owner: &str) -> Result<AcousticId, LibraryError> {
        if name.trim().is_empty() {
            return Err(LibraryError::EmptyName(owner.to_string()));
        }
        Ok(self.acoustics.intern(name))
    }

    fn compile_set(
        &mut self,
        owner: &str,
        definition: SoundSetDefinition,
    ) -> Result<SoundSet, LibraryError> {
        if !(0.0..=1.0).contains(&definition.spot_chance) {
            return Err(LibraryError::SpotChance {
                owner: owner.to_string(),
                chance: definition.spot_chance,
            });
        }

        let mut set = SoundSet {
            spot_chance: definition.spot_chance,
            ..SoundSet::default()
        };
        for sound in definition.sounds {
            let id = self.named_acoustic(&sound.acoustic, owner)?;
            set.sounds.push((id, sound.condition));
        }
        for spot in definition.spot_sounds {
            if spot.weight == 0 {
                return Err(LibraryError::SpotWeight {
                    owner: owner.to_string(),
                    acoustic: spot.acoustic,
                });
            }
            let id = self.named_acoustic(&spot.acoustic, owner)?;
            set.spot_sounds.push(SpotSound {
                acoustic: id,
                weight: spot.weight,
                condition: spot.condition,
            });
        }
        Ok(set)
    }

    /// Handle for a region name, registering it if new.
    pub fn region(&mut self, name: &str) -> RegionId {
        self.regions.intern(name)
    }

    /// Handle for an acoustic name, registering it if new.
    pub fn acoustic(&mut self, name: &str) -> AcousticId {
        self.acoustics.intern(name)
    }

    /// Attach a looping sound to a region.
    pub fn add_region_sound(
        &mut self,
        region: RegionId,
        acoustic: AcousticId,
        condition: SoundCondition,
    ) -> &mut Self {
        self.sets
            .entry(region)
            .or_default()
            .sounds
            .push((acoustic, condition));
        self
    }

    /// Attach a spot sound to a region and set the region's spot chance.
    pub fn add_region_spot_sound(
        &mut self,
        region: RegionId,
        acoustic: AcousticId,
        weight: u32,
        chance: f32,
    ) -> &mut Self {
        let set = self.sets.entry(region).or_default();
        set.spot_chance = chance.clamp(0.0, 1.0);
        set.spot_sounds.push(SpotSound {
            acoustic,
            weight: weight.max(1),
            condition: SoundCondition::Always,
        });
        self
    }

    /// Attach an always-on sound to the observer.
    pub fn add_observer_sound(&mut self, acoustic: AcousticId, condition: SoundCondition) -> &mut Self {
        self.observer.sounds.push((acoustic, condition));
        self
    }

    /// Attach an observer spot sound and set the observer spot chance.
    pub fn add_observer_spot_sound(&mut self, acoustic: AcousticId, weight: u32, chance: f32) -> &mut Self {
        self.observer.spot_chance = chance.clamp(0.0, 1.0);
        self.observer.spot_sounds.push(SpotSound {
            acoustic,
            weight: weight.max(1),
            condition: SoundCondition::Always,
        });
        self
    }

    /// Existing region handle for `name`.
    pub fn find_region(&self, name: &str) -> Option<RegionId> {
        self.regions.get(name)
    }

    /// Existing acoustic handle for `name`.
    pub fn find_acoustic(&self, name: &str) -> Option<AcousticId> {
        self.acoustics.get(name)
    }

    pub fn region_name(&self, region: RegionId) -> Option<&str> {
        self.regions.name(region)
    }

    /// Asset path of an acoustic, relative to the asset root.
    pub fn asset_path(&self, acoustic: AcousticId) -> Option<&str> {
        self.paths.get(&acoustic).map(String::as_str)
    }

    /// All known acoustics with their names.
    pub fn acoustics(&self) -> impl Iterator<Item = (AcousticId, &str)> + '_ {
        self.acoustics.iter()
    }

    /// Number of regions that have sounds attached.
    pub fn region_count(&self) -> usize {
        self.sets.len()
    }
}

impl AcousticMatcher for AcousticLibrary {
    fn candidates_for(&self, region: RegionId, env: &EnvironmentState) -> Vec<AcousticId> {
        self.sets
            .get(&region)
            .map(|set| set.matching(env))
            .unwrap_or_default()
    }

    fn spot_sound_for(
        &self,
        region: RegionId,
        env: &EnvironmentState,
        rng: &mut dyn RngCore,
    ) -> Option<AcousticId> {
        self.sets.get(&region)?.pick_spot(env, rng)
    }

    fn always_on(&self, env: &EnvironmentState) -> Vec<AcousticId> {
        self.observer.matching(env)
    }

    fn observer_spot_sound(
        &self,
        env: &EnvironmentState,
        rng: &mut dyn RngCore,
    ) -> Option<AcousticId> {
        self.observer.pick_spot(env, rng)
    }

    fn acoustic_name(&self, acoustic: AcousticId) -> Option<&str> {
        self.acoustics.name(acoustic)
    }
}
