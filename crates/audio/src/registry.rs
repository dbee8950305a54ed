//! Set of live emitters, at most one per acoustic.

use ambience_core::AcousticId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::{DesiredVolumeMap, Emitter, EmitterState, PlaybackBackend};

/// Counts of what one [`EmitterRegistry::reconcile`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// New emitters created.
    pub started: usize,
    /// Existing emitters whose throttle was refreshed.
    pub continued: usize,
    /// Of `continued`, emitters pulled back out of a fade.
    pub unfaded: usize,
    /// Emitters told to fade out.
    pub faded: usize,
    /// Finished emitters removed.
    pub reaped: usize,
}

/// Debug line for one emitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmitterDiagnostic {
    pub acoustic: AcousticId,
    /// Acoustic name, when the matcher knows it.
    pub name: Option<String>,
    pub state: EmitterState,
    pub throttle: f32,
    pub volume: f32,
}

impl fmt::Display for EmitterDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "EMITTER: {name}")?,
            None => write!(f, "EMITTER: {}", self.acoustic)?,
        }
        write!(
            f,
            " [{}] throttle={:.2} volume={:.2}",
            self.state, self.throttle, self.volume
        )
    }
}

/// Live background emitters keyed by acoustic.
#[derive(Debug, Default)]
pub struct EmitterRegistry {
    emitters: BTreeMap<AcousticId, Emitter>,
    fade_ticks: u32,
}

impl EmitterRegistry {
    pub fn new(fade_ticks: u32) -> Self {
        Self {
            emitters: BTreeMap::new(),
            fade_ticks,
        }
    }

    /// Bring the emitter set in line with `desired`.
    ///
    /// Finished emitters are dropped first. Every remaining emitter either takes
    /// its new desired volume (cancelling a fade) or starts fading. Acoustics
    /// left over in `desired` get a new emitter; zero volumes are skipped.
    pub fn reconcile<B: PlaybackBackend + ?Sized>(
        &mut self,
        mut desired: DesiredVolumeMap,
        backend: &mut B,
    ) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        let before = self.emitters.len();
        self.emitters.retain(|_, emitter| !emitter.is_done_playing());
        summary.reaped = before - self.emitters.len();

        for (&acoustic, emitter) in self.emitters.iter_mut() {
            match desired.remove(acoustic) {
                Some(volume) if volume > 0.0 => {
                    emitter.set_volume_throttle(volume);
                    if emitter.is_fading() {
                        emitter.unfade();
                        summary.unfaded += 1;
                    }
                    summary.continued += 1;
                }
                _ => {
                    if !emitter.is_fading() {
                        emitter.fade();
                        summary.faded += 1;
                    }
                }
            }
        }

        for (acoustic, volume) in desired {
            if volume <= 0.0 {
                continue;
            }
            debug!(%acoustic, volume, "starting emitter");
            let emitter = Emitter::start(acoustic, volume, self.fade_ticks, backend);
            self.emitters.insert(acoustic, emitter);
            summary.started += 1;
        }

        if summary != ReconcileSummary::default() {
            debug!(
                started = summary.started,
                faded = summary.faded,
                unfaded = summary.unfaded,
                reaped = summary.reaped,
                live = self.emitters.len(),
                "reconciled emitters"
            );
        }
        summary
    }

    /// Advance every emitter one tick, scaling output by `scale`.
    pub fn tick_all<B: PlaybackBackend + ?Sized>(&mut self, backend: &mut B, scale: f32) {
        for emitter in self.emitters.values_mut() {
            emitter.tick(backend, scale);
        }
    }

    /// Stop every emitter immediately and empty the registry. Returns how many were live.
    pub fn clear_all<B: PlaybackBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        let count = self.emitters.len();
        for emitter in self.emitters.values_mut() {
            emitter.stop(backend);
        }
        self.emitters.clear();
        if count > 0 {
            debug!(count, "cleared emitters");
        }
        count
    }

    pub fn get(&self, acoustic: AcousticId) -> Option<&Emitter> {
        self.emitters.get(&acoustic)
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn fade_ticks(&self) -> u32 {
        self.fade_ticks
    }

    /// Emitters in ascending acoustic order.
    pub fn iter(&self) -> impl Iterator<Item = &Emitter> + '_ {
        self.emitters.values()
    }

    /// One diagnostic per emitter, without names.
    pub fn diagnostics(&self) -> Vec<EmitterDiagnostic> {
        self.iter()
            .map(|emitter| EmitterDiagnostic {
                acoustic: emitter.acoustic(),
                name: None,
                state: emitter.state(),
                throttle: emitter.throttle(),
                volume: emitter.effective_volume(),
            })
            .collect()
    }
}
