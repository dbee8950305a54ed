//! Ambience settings and volume controls.
//!
//! Settings are read-only for a session: the host builds them once (usually
//! from TOML) and hands an `Arc<AmbienceSettings>` to the soundscape.

use ambience_core::DimensionId;
use ambience_world::ScanTier;
use serde::{Deserialize, Serialize};

/// Settings for the ambient soundscape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbienceSettings {
    /// Master volume (0.0 to 1.0)
    pub master: f32,
    /// Ambient sounds volume (0.0 to 1.0)
    pub ambient: f32,
    /// Whether audio is muted
    pub muted: bool,
    /// Ticks an emitter takes to fade from its throttle volume to silence.
    pub fade_ticks: u32,
    /// Minimum volume of any region that is present at all.
    pub volume_floor: f32,
    /// Ticks between aggregation cycles.
    pub aggregation_interval: u32,
    pub effects: EffectSettings,
    pub biome: BiomeSoundSettings,
    pub blocks: BlockSoundSettings,
    pub ceiling: CeilingSettings,
}

/// Shared effect parameters owned by the effects subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Block range of area effects; the far block scanner uses it as radius.
    pub effect_range: i32,
}

/// Biome ambience options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeSoundSettings {
    pub enabled: bool,
    /// Biome census tier (vertical extent is normally 0).
    pub scan: ScanTier,
    /// Overworld sea level override; 0 keeps the dimension default.
    pub sea_level_override: i32,
    /// Dimensions where biome sounds never play.
    pub dimension_blacklist: Vec<DimensionId>,
}

/// Block-effect ambience options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSoundSettings {
    pub enabled: bool,
    /// Short-range, frequently refreshed scanner.
    pub near: ScanTier,
    /// Vertical half-extent of the far scanner.
    pub far_vertical: i32,
    /// Ticks one far pass is spread over.
    pub far_cadence_ticks: u32,
}

/// Roof detection options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CeilingSettings {
    pub radius: i32,
}

impl Default for AmbienceSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            ambient: 0.7,
            muted: false,
            fade_ticks: 40,
            volume_floor: 0.05,
            aggregation_interval: 4,
            effects: EffectSettings::default(),
            biome: BiomeSoundSettings::default(),
            blocks: BlockSoundSettings::default(),
            ceiling: CeilingSettings::default(),
        }
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self { effect_range: 24 }
    }
}

impl Default for BiomeSoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scan: ScanTier::new(20, 0, 4),
            sea_level_override: 0,
            dimension_blacklist: Vec::new(),
        }
    }
}

impl Default for BlockSoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            near: ScanTier::new(8, 4, 10),
            far_vertical: 8,
            far_cadence_ticks: 40,
        }
    }
}

impl Default for CeilingSettings {
    fn default() -> Self {
        Self { radius: 3 }
    }
}

impl AmbienceSettings {
    /// Create new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the effective ambient volume (master * ambient).
    pub fn effective_ambient_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master * self.ambient
        }
    }

    /// Toggle mute state.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Set master volume (clamped to 0.0-1.0).
    pub fn set_master(&mut self, volume: f32) {
        self.master = volume.clamp(0.0, 1.0);
    }

    /// Set ambient volume (clamped to 0.0-1.0).
    pub fn set_ambient(&mut self, volume: f32) {
        self.ambient = volume.clamp(0.0, 1.0);
    }

    /// Tier of the far block scanner; its radius is the shared effect range.
    pub fn far_tier(&self) -> ScanTier {
        ScanTier::new(
            self.effects.effect_range,
            self.blocks.far_vertical,
            self.blocks.far_cadence_ticks,
        )
    }

    /// Whether biome sounds are suppressed in `dimension` by configuration.
    pub fn is_dimension_blacklisted(&self, dimension: DimensionId) -> bool {
        self.biome.dimension_blacklist.contains(&dimension)
    }

    /// Copy of these settings with every value forced into a usable range.
    pub fn sanitized(&self) -> Self {
        let tier = |tier: ScanTier| {
            ScanTier::new(
                tier.radius.clamp(0, 64),
                tier.vertical.clamp(0, 64),
                tier.cadence_ticks.max(1),
            )
        };

        let mut out = self.clone();
        out.master = out.master.clamp(0.0, 1.0);
        out.ambient = out.ambient.clamp(0.0, 1.0);
        out.volume_floor = out.volume_floor.clamp(0.0, 1.0);
        out.aggregation_interval = out.aggregation_interval.max(1);
        out.effects.effect_range = out.effects.effect_range.clamp(0, 64);
        out.biome.scan = tier(out.biome.scan);
        out.biome.sea_level_override = out.biome.sea_level_override.clamp(0, 256);
        out.blocks.near = tier(out.blocks.near);
        out.blocks.far_vertical = out.blocks.far_vertical.clamp(0, 64);
        out.blocks.far_cadence_ticks = out.blocks.far_cadence_ticks.max(1);
        out.ceiling.radius = out.ceiling.radius.clamp(0, 16);
        out
    }
}
