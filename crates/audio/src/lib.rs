//! Ambient soundscape core.
//!
//! Turns area scans around the observer into a stable set of looping ambient
//! emitters with smooth volume changes.
//!
//! # Architecture
//!
//! - [`AcousticMatcher`] / [`AcousticLibrary`] - which sounds a region produces
//! - [`AcousticAggregator`] - scan snapshots to a [`DesiredVolumeMap`]
//! - [`EmitterRegistry`] - diffs desired volumes against live [`Emitter`]s
//! - [`PlaybackBackend`] - audio output ([`StubBackend`], or rodio behind `rodio_backend`)
//! - [`Soundscape`] - per-tick driver owning all of the above
//!
//! # Example
//!
//! ```ignore
//! let mut soundscape = Soundscape::new(settings, library, StubBackend::new());
//! soundscape.on_connect();
//! soundscape.tick(Some(&observer), &world);
//! ```

mod acoustics;
mod aggregator;
mod backend;
mod emitter;
mod registry;
mod settings;
mod soundscape;

pub use acoustics::{AcousticLibrary, AcousticMatcher, LibraryError, SoundCondition};
pub use aggregator::{AcousticAggregator, DesiredVolumeMap, DEFAULT_VOLUME_FLOOR};
#[cfg(feature = "rodio_backend")]
pub use backend::RodioBackend;
pub use backend::{BackendCall, PlaybackBackend, PlaybackHandle, StubBackend};
pub use emitter::{Emitter, EmitterState};
pub use registry::{EmitterDiagnostic, EmitterRegistry, ReconcileSummary};
pub use settings::{
    AmbienceSettings, BiomeSoundSettings, BlockSoundSettings, CeilingSettings, EffectSettings,
};
pub use soundscape::{CycleReport, Soundscape};
