//! Playback backends.
//!
//! The soundscape only talks to audio output through [`PlaybackBackend`].
//! Start failures are never reported synchronously: the returned handle simply
//! reports done on the next poll, and the emitter that owns it is reaped.

use ambience_core::AcousticId;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Handle of one playing (or failed) looping instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PlaybackHandle(pub u64);

/// Audio output used by emitters.
pub trait PlaybackBackend {
    /// Start looping `acoustic`. Always returns a handle; failures show up via [`is_done`](Self::is_done).
    fn start(&mut self, acoustic: AcousticId) -> PlaybackHandle;

    /// Set the output volume of a playing instance.
    fn set_volume(&mut self, handle: PlaybackHandle, volume: f32);

    /// Stop a playing instance. Unknown handles are ignored.
    fn stop(&mut self, handle: PlaybackHandle);

    /// True once the instance is no longer producing sound.
    fn is_done(&self, handle: PlaybackHandle) -> bool;

    /// Fire-and-forget one-shot (spot sounds).
    fn play_once(&mut self, acoustic: AcousticId, volume: f32);

    /// Stop everything this backend is playing.
    fn stop_all(&mut self);
}

impl<T: PlaybackBackend + ?Sized> PlaybackBackend for Box<T> {
    fn start(&mut self, acoustic: AcousticId) -> PlaybackHandle {
        (**self).start(acoustic)
    }

    fn set_volume(&mut self, handle: PlaybackHandle, volume: f32) {
        (**self).set_volume(handle, volume)
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        (**self).stop(handle)
    }

    fn is_done(&self, handle: PlaybackHandle) -> bool {
        (**self).is_done(handle)
    }

    fn play_once(&mut self, acoustic: AcousticId, volume: f32) {
        (**self).play_once(acoustic, volume)
    }

    fn stop_all(&mut self) {
        (**self).stop_all()
    }
}

/// One call received by a [`StubBackend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BackendCall {
    Start {
        acoustic: AcousticId,
        handle: PlaybackHandle,
    },
    SetVolume {
        handle: PlaybackHandle,
        volume: f32,
    },
    Stop {
        handle: PlaybackHandle,
    },
    PlayOnce {
        acoustic: AcousticId,
        volume: f32,
    },
    StopAll,
}

#[derive(Debug, Clone, Copy)]
struct StubVoice {
    acoustic: AcousticId,
    volume: f32,
}

/// Backend that produces no sound.
///
/// Tracks playing instances exactly like a real device would, so headless runs
/// and tests observe the same lifecycle. Optionally records every call.
#[derive(Debug, Default)]
pub struct StubBackend {
    next_handle: u64,
    playing: BTreeMap<PlaybackHandle, StubVoice>,
    failing: HashSet<AcousticId>,
    record: bool,
    calls: Vec<BackendCall>,
}

impl StubBackend {
    /// Silent backend that does not record calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Silent backend that records every call for later inspection.
    pub fn recording() -> Self {
        Self {
            record: true,
            ..Self::default()
        }
    }

    fn log(&mut self, call: BackendCall) {
        if self.record {
            self.calls.push(call);
        }
    }

    /// Make every future start of `acoustic` fail.
    pub fn fail_starts_for(&mut self, acoustic: AcousticId) {
        self.failing.insert(acoustic);
    }

    /// Let starts of `acoustic` succeed again.
    pub fn clear_failure(&mut self, acoustic: AcousticId) {
        self.failing.remove(&acoustic);
    }

    /// Simulate an instance ending on its own (stream ended, device lost).
    pub fn finish(&mut self, handle: PlaybackHandle) {
        self.playing.remove(&handle);
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Current volume of a playing instance.
    pub fn volume(&self, handle: PlaybackHandle) -> Option<f32> {
        self.playing.get(&handle).map(|voice| voice.volume)
    }

    /// Number of instances currently playing.
    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    /// Whether any instance of `acoustic` is playing.
    pub fn is_playing(&self, acoustic: AcousticId) -> bool {
        self.playing.values().any(|voice| voice.acoustic == acoustic)
    }

    /// Number of recorded starts of `acoustic`.
    pub fn start_count(&self, acoustic: AcousticId) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Start { acoustic: a, .. } if *a == acoustic))
            .count()
    }

    /// Number of recorded stops of `handle`.
    pub fn stop_count(&self, handle: PlaybackHandle) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Stop { handle: h } if *h == handle))
            .count()
    }
}

impl PlaybackBackend for StubBackend {
    fn start(&mut self, acoustic: AcousticId) -> PlaybackHandle {
        let handle = PlaybackHandle(self.next_handle);
        self.next_handle += 1;
        if self.failing.contains(&acoustic) {
            debug!(%acoustic, "stub backend: start failed");
        } else {
            self.playing.insert(
                handle,
                StubVoice {
                    acoustic,
                    volume: 0.0,
                },
            );
        }
        self.log(BackendCall::Start { acoustic, handle });
        handle
    }

    fn set_volume(&mut self, handle: PlaybackHandle, volume: f32) {
        if let Some(voice) = self.playing.get_mut(&handle) {
            voice.volume = volume;
        }
        self.log(BackendCall::SetVolume { handle, volume });
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        self.playing.remove(&handle);
        self.log(BackendCall::Stop { handle });
    }

    fn is_done(&self, handle: PlaybackHandle) -> bool {
        !self.playing.contains_key(&handle)
    }

    fn play_once(&mut self, acoustic: AcousticId, volume: f32) {
        self.log(BackendCall::PlayOnce { acoustic, volume });
    }

    fn stop_all(&mut self) {
        self.playing.clear();
        self.log(BackendCall::StopAll);
    }
}

#[cfg(feature = "rodio_backend")]
mod rodio_output {
    use super::*;
    use crate::AcousticLibrary;
    use anyhow::{Context, Result};
    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::Path;

    /// Backend that loops decoded assets on one rodio sink per handle.
    pub struct RodioBackend {
        /// Output stream (must be kept alive)
        _stream: OutputStream,
        stream_handle: OutputStreamHandle,
        sounds: HashMap<AcousticId, Vec<u8>>,
        sinks: HashMap<PlaybackHandle, Sink>,
        one_shots: Vec<Sink>,
        next_handle: u64,
    }

    impl RodioBackend {
        pub fn new() -> Result<Self> {
            let (stream, stream_handle) =
                OutputStream::try_default().context("Failed to create audio output stream")?;

            Ok(Self {
                _stream: stream,
                stream_handle,
                sounds: HashMap::new(),
                sinks: HashMap::new(),
                one_shots: Vec::new(),
                next_handle: 0,
            })
        }

        /// Register encoded audio bytes for an acoustic.
        pub fn load_sound(&mut self, acoustic: AcousticId, data: Vec<u8>) {
            self.sounds.insert(acoustic, data);
        }

        /// Load every acoustic of `library` that names an asset path under `root`.
        ///
        /// Missing files are logged and skipped; starts of those acoustics fail softly.
        pub fn load_library(&mut self, library: &AcousticLibrary, root: &Path) -> usize {
            let mut loaded = 0;
            for (acoustic, name) in library.acoustics() {
                let Some(relative) = library.asset_path(acoustic) else {
                    continue;
                };
                let path = root.join(relative);
                match std::fs::read(&path) {
                    Ok(data) => {
                        self.load_sound(acoustic, data);
                        loaded += 1;
                    }
                    Err(err) => {
                        tracing::warn!("Failed to load sound {name} from {}: {err}", path.display());
                    }
                }
            }
            loaded
        }

        fn open_sink(&self, acoustic: AcousticId, looped: bool) -> Result<Sink> {
            let data = self
                .sounds
                .get(&acoustic)
                .with_context(|| format!("Sound not loaded: {acoustic}"))?;
            let cursor = Cursor::new(data.clone());
            let sink = Sink::try_new(&self.stream_handle).context("Failed to create audio sink")?;
            if looped {
                let source = rodio::Decoder::new_looped(cursor).context("Failed to decode audio")?;
                sink.append(source);
            } else {
                let source = rodio::Decoder::new(cursor).context("Failed to decode audio")?;
                sink.append(source);
            }
            Ok(sink)
        }
    }

    impl PlaybackBackend for RodioBackend {
        fn start(&mut self, acoustic: AcousticId) -> PlaybackHandle {
            let handle = PlaybackHandle(self.next_handle);
            self.next_handle += 1;
            match self.open_sink(acoustic, true) {
                Ok(sink) => {
                    sink.set_volume(0.0);
                    self.sinks.insert(handle, sink);
                }
                Err(e) => tracing::warn!("Failed to start {acoustic}: {e:#}"),
            }
            handle
        }

        fn set_volume(&mut self, handle: PlaybackHandle, volume: f32) {
            if let Some(sink) = self.sinks.get(&handle) {
                sink.set_volume(volume);
            }
        }

        fn stop(&mut self, handle: PlaybackHandle) {
            if let Some(sink) = self.sinks.remove(&handle) {
                sink.stop();
            }
        }

        fn is_done(&self, handle: PlaybackHandle) -> bool {
            self.sinks.get(&handle).map(|s| s.empty()).unwrap_or(true)
        }

        fn play_once(&mut self, acoustic: AcousticId, volume: f32) {
            self.one_shots.retain(|s| !s.empty());
            match self.open_sink(acoustic, false) {
                Ok(sink) => {
                    sink.set_volume(volume);
                    self.one_shots.push(sink);
                }
                Err(e) => debug!("Spot sound {acoustic} not played: {e:#}"),
            }
        }

        fn stop_all(&mut self) {
            for (_, sink) in self.sinks.drain() {
                sink.stop();
            }
            for sink in self.one_shots.drain(..) {
                sink.stop();
            }
        }
    }
}

#[cfg(feature = "rodio_backend")]
pub use rodio_output::RodioBackend;

#[cfg(test)]
mod tests {
    use super::*;

    const WIND: AcousticId = AcousticId(1);
    const RAIN: AcousticId = AcousticId(2);

    #[test]
    fn start_and_stop_track_playing_set() {
        let mut backend = StubBackend::recording();
        let handle = backend.start(WIND);
        assert!(!backend.is_done(handle));
        assert!(backend.is_playing(WIND));

        backend.set_volume(handle, 0.5);
        assert_eq!(backend.volume(handle), Some(0.5));

        backend.stop(handle);
        assert!(backend.is_done(handle));
        assert_eq!(backend.stop_count(handle), 1);
        assert_eq!(backend.start_count(WIND), 1);
    }

    #[test]
    fn failed_start_reports_done() {
        let mut backend = StubBackend::new();
        backend.fail_starts_for(RAIN);
        let handle = backend.start(RAIN);
        assert!(backend.is_done(handle));
        assert_eq!(backend.playing_count(), 0);

        backend.clear_failure(RAIN);
        let handle = backend.start(RAIN);
        assert!(!backend.is_done(handle));
    }

    #[test]
    fn stop_all_silences_everything() {
        let mut backend = StubBackend::recording();
        let a = backend.start(WIND);
        let b = backend.start(RAIN);
        backend.stop_all();
        assert!(backend.is_done(a) && backend.is_done(b));
        assert_eq!(backend.calls().last(), Some(&BackendCall::StopAll));
    }

    #[test]
    fn non_recording_backend_keeps_no_history() {
        let mut backend = StubBackend::new();
        let handle = backend.start(WIND);
        backend.set_volume(handle, 1.0);
        backend.play_once(RAIN, 1.0);
        assert!(backend.calls().is_empty());
        assert_eq!(backend.volume(handle), Some(1.0));
    }

    #[test]
    fn finish_simulates_natural_end() {
        let mut backend = StubBackend::recording();
        let handle = backend.start(WIND);
        backend.finish(handle);
        assert!(backend.is_done(handle));
        assert_eq!(backend.take_calls().len(), 1);
        assert!(backend.calls().is_empty());
    }
}
