//! Background emitter state machine.

use ambience_core::AcousticId;
use serde::Serialize;
use std::fmt;

use crate::{PlaybackBackend, PlaybackHandle};

/// Lifecycle of an emitter.
///
/// `Active -> FadingOut` on [`Emitter::fade`], `FadingOut -> Active` on
/// [`Emitter::unfade`], `FadingOut -> Done` when the ramp elapses or the backend
/// finishes, `Active -> Done` on [`Emitter::stop`] or backend completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmitterState {
    /// Audible at the throttle volume.
    Active,
    /// Ramping from the throttle volume to silence.
    FadingOut,
    /// Terminal; the backend instance has been stopped.
    Done,
}

impl fmt::Display for EmitterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EmitterState::Active => "active",
            EmitterState::FadingOut => "fading",
            EmitterState::Done => "done",
        };
        f.write_str(label)
    }
}

/// One managed looping ambient sound.
#[derive(Debug, Clone)]
pub struct Emitter {
    acoustic: AcousticId,
    handle: PlaybackHandle,
    throttle: f32,
    state: EmitterState,
    fade_ticks: u32,
    fade_elapsed: u32,
    volume: f32,
}

impl Emitter {
    /// Start playback of `acoustic` and wrap it.
    ///
    /// The emitter is created even when the backend fails to start; it then
    /// completes on its first tick.
    pub fn start<B: PlaybackBackend + ?Sized>(
        acoustic: AcousticId,
        throttle: f32,
        fade_ticks: u32,
        backend: &mut B,
    ) -> Self {
        let handle = backend.start(acoustic);
        Self {
            acoustic,
            handle,
            throttle: throttle.clamp(0.0, 1.0),
            state: EmitterState::Active,
            fade_ticks,
            fade_elapsed: 0,
            volume: 0.0,
        }
    }

    pub fn acoustic(&self) -> AcousticId {
        self.acoustic
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    /// Last aggregated desired volume.
    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    /// Volume pushed to the backend on the last tick.
    pub fn effective_volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume_throttle(&mut self, throttle: f32) {
        self.throttle = throttle.clamp(0.0, 1.0);
    }

    /// Begin fading out. No effect unless active.
    pub fn fade(&mut self) {
        if self.state == EmitterState::Active {
            self.state = EmitterState::FadingOut;
            self.fade_elapsed = 0;
        }
    }

    /// Cancel a fade in progress; the next tick plays at the throttle volume again.
    pub fn unfade(&mut self) {
        if self.state == EmitterState::FadingOut {
            self.state = EmitterState::Active;
            self.fade_elapsed = 0;
        }
    }

    pub fn is_fading(&self) -> bool {
        self.state == EmitterState::FadingOut
    }

    pub fn is_done_playing(&self) -> bool {
        self.state == EmitterState::Done
    }

    /// Fraction of the fade window elapsed, in [0.0, 1.0].
    pub fn fade_progress(&self) -> f32 {
        match self.state {
            EmitterState::Active => 0.0,
            EmitterState::Done => 1.0,
            EmitterState::FadingOut if self.fade_ticks == 0 => 1.0,
            EmitterState::FadingOut => {
                (self.fade_elapsed as f32 / self.fade_ticks as f32).min(1.0)
            }
        }
    }

    /// Advance one tick and push the current volume, scaled by `scale`, to the backend.
    pub fn tick<B: PlaybackBackend + ?Sized>(&mut self, backend: &mut B, scale: f32) {
        if self.state == EmitterState::Done {
            return;
        }
        if backend.is_done(self.handle) {
            self.finish(backend);
            return;
        }

        match self.state {
            EmitterState::Active => {
                self.volume = self.throttle * scale;
                backend.set_volume(self.handle, self.volume);
            }
            EmitterState::FadingOut => {
                self.fade_elapsed = self.fade_elapsed.saturating_add(1);
                let fraction = self.fade_progress();
                if fraction >= 1.0 {
                    self.finish(backend);
                } else {
                    self.volume = self.throttle * (1.0 - fraction) * scale;
                    backend.set_volume(self.handle, self.volume);
                }
            }
            EmitterState::Done => {}
        }
    }

    /// Stop immediately, bypassing any fade. Idempotent.
    pub fn stop<B: PlaybackBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.state != EmitterState::Done {
            self.finish(backend);
        }
    }

    // The only way into Done; issues the single backend stop for this emitter.
    fn finish<B: PlaybackBackend + ?Sized>(&mut self, backend: &mut B) {
        self.state = EmitterState::Done;
        self.volume = 0.0;
        backend.stop(self.handle);
    }
}

impl fmt::Display for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] throttle={:.2} volume={:.2}",
            self.acoustic, self.state, self.throttle, self.volume
        )
    }
}
