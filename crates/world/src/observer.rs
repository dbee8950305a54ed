//! The observation point and the environment derived around it.

use ambience_core::{DimensionId, DimensionInfo};
use serde::{Deserialize, Serialize};

use crate::BlockPos;

/// Blocks below sea level at which the observer counts as underground.
pub const UNDERGROUND_DEPTH: i32 = 10;

/// Host-supplied state of the moving observer (the player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observer {
    /// Block the observer stands in.
    pub position: BlockPos,
    /// Dimension the observer is in.
    pub dimension: DimensionId,
    /// Dead observers hear no ambience.
    pub alive: bool,
    /// Head is submerged.
    pub underwater: bool,
    /// It is raining at the observer's location.
    pub raining: bool,
    /// Night time in the observer's dimension.
    pub night: bool,
}

impl Observer {
    /// A living observer in the overworld at `position`, daytime, dry weather.
    pub fn at(position: BlockPos) -> Self {
        Self {
            position,
            dimension: DimensionId::OVERWORLD,
            alive: true,
            underwater: false,
            raining: false,
            night: false,
        }
    }
}

/// Conditions that decide which acoustics apply this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// More than [`UNDERGROUND_DEPTH`] blocks below sea level.
    pub underground: bool,
    /// Roof coverage at or above the inside threshold.
    pub inside: bool,
    pub underwater: bool,
    pub raining: bool,
    pub night: bool,
}

impl EnvironmentState {
    /// Derive the environment for `observer`.
    ///
    /// `sea_level_override` replaces the overworld sea level when non-zero.
    pub fn derive(
        observer: &Observer,
        dimension: &DimensionInfo,
        inside: bool,
        sea_level_override: i32,
    ) -> Self {
        let sea_level = if dimension.id == DimensionId::OVERWORLD && sea_level_override > 0 {
            sea_level_override
        } else {
            dimension.sea_level
        };

        Self {
            underground: observer.position.y < sea_level - UNDERGROUND_DEPTH,
            inside,
            underwater: observer.underwater,
            raining: observer.raining,
            night: observer.night,
        }
    }
}
