//! Property-based tests for the emitter lifecycle
//!
//! Validates registry and emitter invariants:
//! - At most one emitter per acoustic across any reconcile sequence
//! - A fade always completes after exactly the fade duration
//! - Unfading restores the throttle volume
//! - Teardown stops every started instance exactly once

use ambience_audio::{
    BackendCall, DesiredVolumeMap, Emitter, EmitterRegistry, EmitterState, StubBackend,
};
use ambience_core::AcousticId;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

fn desired_map() -> impl Strategy<Value = Vec<(u32, f32)>> {
    prop::collection::vec((0u32..8, prop_oneof![Just(0.0f32), 0.0f32..=1.0]), 0..8)
}

fn to_map(entries: &[(u32, f32)]) -> DesiredVolumeMap {
    entries
        .iter()
        .map(|&(id, volume)| (AcousticId(id), volume))
        .collect()
}

proptest! {
    /// Property: the registry never holds two emitters for one acoustic,
    /// and never starts a second instance while one is still live.
    #[test]
    fn at_most_one_emitter_per_acoustic(
        cycles in prop::collection::vec((desired_map(), 0u32..6), 1..24),
        fade_ticks in 0u32..6,
    ) {
        let mut backend = StubBackend::recording();
        let mut registry = EmitterRegistry::new(fade_ticks);

        for (entries, ticks) in &cycles {
            registry.reconcile(to_map(entries), &mut backend);
            for _ in 0..*ticks {
                registry.tick_all(&mut backend, 1.0);
            }

            let acoustics: Vec<_> = registry.iter().map(Emitter::acoustic).collect();
            let unique: HashSet<_> = acoustics.iter().copied().collect();
            prop_assert_eq!(acoustics.len(), unique.len());

            // One live backend instance per acoustic at most.
            let mut live: BTreeMap<AcousticId, usize> = BTreeMap::new();
            for emitter in registry.iter() {
                if !emitter.is_done_playing() {
                    *live.entry(emitter.acoustic()).or_default() += 1;
                }
            }
            prop_assert!(live.values().all(|&count| count == 1));
            prop_assert_eq!(backend.playing_count(), live.len());
        }
    }

    /// Property: fade_ticks ticks after fade() the emitter is Done.
    #[test]
    fn fade_completes_after_fade_duration(
        throttle in 0.01f32..=1.0,
        fade_ticks in 1u32..60,
        warmup in 0u32..5,
    ) {
        let mut backend = StubBackend::recording();
        let mut emitter = Emitter::start(AcousticId(0), throttle, fade_ticks, &mut backend);
        for _ in 0..warmup {
            emitter.tick(&mut backend, 1.0);
        }

        emitter.fade();
        let mut last = throttle;
        for _ in 0..fade_ticks - 1 {
            emitter.tick(&mut backend, 1.0);
            prop_assert_eq!(emitter.state(), EmitterState::FadingOut);
            prop_assert!(emitter.effective_volume() <= last + 1e-6);
            last = emitter.effective_volume();
        }
        emitter.tick(&mut backend, 1.0);
        prop_assert!(emitter.is_done_playing());
        prop_assert_eq!(backend.stop_count(emitter.handle()), 1);
    }

    /// Property: unfade after k < fade_ticks ticks restores the full throttle.
    #[test]
    fn unfade_restores_throttle(
        throttle in 0.01f32..=1.0,
        fade_ticks in 2u32..60,
        k_seed in 0u32..1000,
    ) {
        let k = k_seed % fade_ticks;
        let mut backend = StubBackend::new();
        let mut emitter = Emitter::start(AcousticId(0), throttle, fade_ticks, &mut backend);
        emitter.tick(&mut backend, 1.0);

        emitter.fade();
        for _ in 0..k {
            emitter.tick(&mut backend, 1.0);
        }
        emitter.unfade();
        emitter.tick(&mut backend, 1.0);

        prop_assert_eq!(emitter.state(), EmitterState::Active);
        prop_assert_eq!(emitter.effective_volume(), emitter.throttle());
    }

    /// Property: clear_all leaves nothing playing and stops each instance once.
    #[test]
    fn clear_all_stops_every_started_instance(
        cycles in prop::collection::vec(desired_map(), 1..10),
        fade_ticks in 0u32..4,
    ) {
        let mut backend = StubBackend::recording();
        let mut registry = EmitterRegistry::new(fade_ticks);
        for entries in &cycles {
            registry.reconcile(to_map(entries), &mut backend);
            registry.tick_all(&mut backend, 1.0);
        }

        registry.clear_all(&mut backend);
        prop_assert!(registry.is_empty());
        prop_assert_eq!(backend.playing_count(), 0);

        for call in backend.calls() {
            if let BackendCall::Start { handle, .. } = call {
                prop_assert_eq!(backend.stop_count(*handle), 1);
            }
        }
    }
}
