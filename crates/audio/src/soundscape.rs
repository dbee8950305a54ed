//! Per-tick driver for the ambient soundscape.

use ambience_core::{scoped_rng, AcousticId, DimensionInfo, SimTick};
use ambience_world::{
    AreaScanner, CeilingCoverage, EnvironmentState, Observer, RegionSampler, ScanLayer,
    ScanSnapshot,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    AcousticAggregator, AcousticMatcher, AmbienceSettings, DesiredVolumeMap, EmitterDiagnostic,
    EmitterRegistry, PlaybackBackend, ReconcileSummary,
};

const REGION_SPOT_SALT: u64 = 0x5350_4f54_5245_4749;
const OBSERVER_SPOT_SALT: u64 = 0x5350_4f54_4f42_5356;

/// What the last aggregation cycle decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub tick: SimTick,
    /// False when the observer was absent or dead.
    pub observer_present: bool,
    pub environment: EnvironmentState,
    /// Whether biome snapshots fed this cycle.
    pub biome_sounds: bool,
    /// Acoustics with a desired volume above zero.
    pub desired: usize,
    pub summary: ReconcileSummary,
    pub region_spot: Option<AcousticId>,
    pub observer_spot: Option<AcousticId>,
    /// Emitters in the registry after reconciliation.
    pub emitters: usize,
}

/// Ambient soundscape for one observer.
///
/// The host drives it with [`tick`](Self::tick) once per simulation step and
/// delivers connection changes through [`on_connect`](Self::on_connect) and
/// [`on_disconnect`](Self::on_disconnect). A new soundscape is disconnected and
/// ignores ticks until connected.
pub struct Soundscape<B: PlaybackBackend, M: AcousticMatcher> {
    settings: Arc<AmbienceSettings>,
    matcher: M,
    backend: B,
    biome_scanner: AreaScanner,
    near_scanner: AreaScanner,
    far_scanner: AreaScanner,
    ceiling: CeilingCoverage,
    aggregator: AcousticAggregator,
    registry: EmitterRegistry,
    tick: SimTick,
    seed: u64,
    connected: bool,
    environment: EnvironmentState,
    last_cycle: Option<CycleReport>,
}

impl<B: PlaybackBackend, M: AcousticMatcher> Soundscape<B, M> {
    /// Out-of-range settings are sanitized before any scanner is sized from them.
    pub fn new(settings: Arc<AmbienceSettings>, matcher: M, backend: B) -> Self {
        let clean = settings.sanitized();
        let settings = if clean == *settings {
            settings
        } else {
            Arc::new(clean)
        };
        let biome_scanner = AreaScanner::new("biome", ScanLayer::Biome, settings.biome.scan);
        let near_scanner = AreaScanner::new("near", ScanLayer::BlockEffect, settings.blocks.near);
        let far_scanner = AreaScanner::new("far", ScanLayer::BlockEffect, settings.far_tier());
        let ceiling = CeilingCoverage::new(settings.ceiling.radius);
        let aggregator = AcousticAggregator::new(settings.volume_floor);
        let registry = EmitterRegistry::new(settings.fade_ticks);

        Self {
            settings,
            matcher,
            backend,
            biome_scanner,
            near_scanner,
            far_scanner,
            ceiling,
            aggregator,
            registry,
            tick: SimTick::ZERO,
            seed: 0,
            connected: false,
            environment: EnvironmentState::default(),
            last_cycle: None,
        }
    }

    /// Seed for spot sound selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Arm the soundscape, dropping anything left from a previous session.
    pub fn on_connect(&mut self) {
        self.reset();
        self.connected = true;
        info!("ambience connected");
    }

    /// Silence everything and disarm.
    pub fn on_disconnect(&mut self) {
        let stopped = self.registry.clear_all(&mut self.backend);
        self.backend.stop_all();
        self.reset_scan_state();
        self.connected = false;
        info!(stopped, "ambience disconnected");
    }

    /// Stop all emitters and forget scan state without changing the connection.
    pub fn reset(&mut self) {
        self.registry.clear_all(&mut self.backend);
        self.reset_scan_state();
    }

    fn reset_scan_state(&mut self) {
        self.biome_scanner.reset();
        self.near_scanner.reset();
        self.far_scanner.reset();
        self.ceiling.reset();
        self.environment = EnvironmentState::default();
        self.last_cycle = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Advance one simulation step.
    ///
    /// Returns the cycle report when this tick ran an aggregation cycle.
    pub fn tick<W: RegionSampler + ?Sized>(
        &mut self,
        observer: Option<&Observer>,
        world: &W,
    ) -> Option<&CycleReport> {
        if !self.connected {
            return None;
        }

        let observer = observer.filter(|observer| observer.alive);
        let position = observer.map(|observer| observer.position);

        if self.settings.biome.enabled {
            self.biome_scanner.tick(position, world);
        }
        if self.settings.blocks.enabled {
            self.near_scanner.tick(position, world);
            self.far_scanner.tick(position, world);
        }

        let tick = self.tick;
        let ran_cycle = tick.is_multiple_of(u64::from(self.settings.aggregation_interval));
        if ran_cycle {
            let report = self.run_cycle(tick, observer, world);
            self.last_cycle = Some(report);
        }

        let scale = self.settings.effective_ambient_volume();
        self.registry.tick_all(&mut self.backend, scale);
        self.tick = tick.advance(1);

        if ran_cycle {
            self.last_cycle.as_ref()
        } else {
            None
        }
    }

    fn run_cycle<W: RegionSampler + ?Sized>(
        &mut self,
        tick: SimTick,
        observer: Option<&Observer>,
        world: &W,
    ) -> CycleReport {
        let Some(observer) = observer else {
            self.ceiling.reset();
            self.environment = EnvironmentState::default();
            let summary = self
                .registry
                .reconcile(DesiredVolumeMap::new(), &mut self.backend);
            return CycleReport {
                tick,
                observer_present: false,
                environment: self.environment,
                biome_sounds: false,
                desired: 0,
                summary,
                region_spot: None,
                observer_spot: None,
                emitters: self.registry.len(),
            };
        };

        let dimension = world.dimension_info(observer.dimension);
        self.ceiling.update(Some(observer.position), world);
        let inside = !dimension.always_outside && self.ceiling.is_inside();
        let env = EnvironmentState::derive(
            observer,
            &dimension,
            inside,
            self.settings.biome.sea_level_override,
        );
        self.environment = env;

        let biome_sounds = self.biome_sounds_active(&dimension, &env);
        let mut desired = DesiredVolumeMap::new();
        if biome_sounds {
            self.aggregator
                .accumulate(&mut desired, self.biome_scanner.snapshot(), &self.matcher, &env);
        }
        if self.settings.blocks.enabled {
            // Near runs last so its fresher volumes win over far ones.
            self.aggregator
                .accumulate(&mut desired, self.far_scanner.snapshot(), &self.matcher, &env);
            self.aggregator
                .accumulate(&mut desired, self.near_scanner.snapshot(), &self.matcher, &env);
        }
        self.aggregator
            .apply_always_on(&mut desired, self.matcher.always_on(&env));

        let scale = self.settings.effective_ambient_volume();
        let region_spot = if biome_sounds {
            let mut rng = scoped_rng(self.seed, REGION_SPOT_SALT, tick);
            self.aggregator.pick_spot_sound(
                self.biome_scanner.snapshot(),
                &self.matcher,
                &env,
                &mut rng,
            )
        } else {
            None
        };
        let observer_spot = {
            let mut rng = scoped_rng(self.seed, OBSERVER_SPOT_SALT, tick);
            self.matcher.observer_spot_sound(&env, &mut rng)
        };
        for acoustic in region_spot.iter().chain(observer_spot.iter()) {
            debug!(%acoustic, "spot sound");
            self.backend.play_once(*acoustic, scale);
        }

        let wanted = desired.iter().filter(|(_, volume)| *volume > 0.0).count();
        let summary = self.registry.reconcile(desired, &mut self.backend);

        CycleReport {
            tick,
            observer_present: true,
            environment: env,
            biome_sounds,
            desired: wanted,
            summary,
            region_spot,
            observer_spot,
            emitters: self.registry.len(),
        }
    }

    fn biome_sounds_active(&self, dimension: &DimensionInfo, env: &EnvironmentState) -> bool {
        self.settings.biome.enabled
            && dimension.play_biome_sounds
            && !self.settings.is_dimension_blacklisted(dimension.id)
            && (env.underground || dimension.always_outside || !env.inside)
    }

    /// One line per emitter, named through the matcher. Does not change state.
    pub fn diagnostics(&self) -> Vec<EmitterDiagnostic> {
        let mut lines = self.registry.diagnostics();
        for line in &mut lines {
            line.name = self.matcher.acoustic_name(line.acoustic).map(str::to_owned);
        }
        lines
    }

    pub fn last_cycle(&self) -> Option<&CycleReport> {
        self.last_cycle.as_ref()
    }

    /// Environment derived on the last cycle.
    pub fn environment(&self) -> EnvironmentState {
        self.environment
    }

    /// Last published biome census.
    pub fn biome_snapshot(&self) -> &ScanSnapshot {
        self.biome_scanner.snapshot()
    }

    pub fn registry(&self) -> &EmitterRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn settings(&self) -> &AmbienceSettings {
        &self.settings
    }

    /// Ticks processed since creation.
    pub fn current_tick(&self) -> SimTick {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AcousticLibrary, BackendCall, SoundCondition, StubBackend};
    use ambience_core::{DimensionId, RegionId};
    use ambience_testkit::FixtureWorld;
    use ambience_world::{BlockPos, ScanTier};

    struct Setup {
        library: AcousticLibrary,
        forest: RegionId,
        water: RegionId,
        birds: AcousticId,
        stream: AcousticId,
        bubbles: AcousticId,
    }

    fn setup() -> Setup {
        let mut library = AcousticLibrary::new();
        let forest = library.region("biome:forest");
        let water = library.region("block:water");
        let birds = library.acoustic("ambient/birds");
        let stream = library.acoustic("ambient/stream");
        let bubbles = library.acoustic("ambient/underwater");
        library
            .add_region_sound(forest, birds, SoundCondition::Always)
            .add_region_sound(water, stream, SoundCondition::Always)
            .add_observer_sound(bubbles, SoundCondition::Underwater);
        Setup {
            library,
            forest,
            water,
            birds,
            stream,
            bubbles,
        }
    }

    fn fast_settings() -> AmbienceSettings {
        let mut settings = AmbienceSettings {
            master: 1.0,
            ambient: 1.0,
            fade_ticks: 4,
            aggregation_interval: 1,
            ..AmbienceSettings::default()
        };
        settings.biome.scan = ScanTier::new(2, 0, 1);
        settings.blocks.near = ScanTier::new(1, 1, 1);
        settings.blocks.far_vertical = 1;
        settings.blocks.far_cadence_ticks = 1;
        settings.effects.effect_range = 2;
        settings.ceiling.radius = 1;
        settings
    }

    fn soundscape(
        settings: AmbienceSettings,
        library: AcousticLibrary,
    ) -> Soundscape<StubBackend, AcousticLibrary> {
        let mut soundscape =
            Soundscape::new(Arc::new(settings), library, StubBackend::recording());
        soundscape.on_connect();
        soundscape
    }

    fn surface() -> Observer {
        Observer::at(BlockPos::new(0, 64, 0))
    }

    #[test]
    fn disconnected_soundscape_ignores_ticks() {
        let s = setup();
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut scape = Soundscape::new(Arc::new(fast_settings()), s.library, StubBackend::recording());
        assert!(!scape.is_connected());
        assert!(scape.tick(Some(&surface()), &world).is_none());
        assert!(scape.backend().calls().is_empty());
        assert_eq!(scape.current_tick(), SimTick::ZERO);
    }

    #[test]
    fn oversized_settings_are_sanitized() {
        let s = setup();
        let mut settings = fast_settings();
        settings.effects.effect_range = i32::MAX;
        settings.blocks.near = ScanTier::new(i32::MAX, i32::MAX, 0);
        settings.aggregation_interval = 0;

        let scape = Soundscape::new(Arc::new(settings), s.library, StubBackend::recording());
        assert_eq!(scape.settings().effects.effect_range, 64);
        assert_eq!(scape.settings().blocks.near, ScanTier::new(64, 64, 1));
        assert_eq!(scape.settings().aggregation_interval, 1);
    }

    #[test]
    fn in_range_settings_are_shared() {
        let s = setup();
        let settings = Arc::new(fast_settings());
        let scape = Soundscape::new(Arc::clone(&settings), s.library, StubBackend::recording());
        assert_eq!(scape.settings(), &*settings);
        assert_eq!(Arc::strong_count(&settings), 2);
    }

    #[test]
    fn forest_starts_a_single_emitter() {
        let s = setup();
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut scape = soundscape(fast_settings(), s.library);

        let report = scape
            .tick(Some(&surface()), &world)
            .cloned()
            .expect("cycle report");
        assert!(report.biome_sounds);
        assert_eq!(report.summary.started, 1);

        for _ in 0..10 {
            scape.tick(Some(&surface()), &world);
        }
        let emitter = scape.registry().get(s.birds).expect("birds emitter");
        assert_eq!(emitter.effective_volume(), 1.0);
        assert_eq!(scape.registry().len(), 1);
        assert_eq!(scape.backend().start_count(s.birds), 1);
    }

    #[test]
    fn dead_observer_fades_everything() {
        let s = setup();
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut scape = soundscape(fast_settings(), s.library);
        scape.tick(Some(&surface()), &world);

        let mut dead = surface();
        dead.alive = false;
        let report = scape.tick(Some(&dead), &world).cloned().expect("cycle");
        assert!(!report.observer_present);
        assert_eq!(report.summary.faded, 1);

        for _ in 0..5 {
            scape.tick(Some(&dead), &world);
        }
        assert!(scape.registry().is_empty());
        assert_eq!(scape.backend().playing_count(), 0);
    }

    #[test]
    fn roof_suppresses_biome_sounds_above_ground() {
        let s = setup();
        let mut world = FixtureWorld::new(Some(s.forest), 63);
        world.set_height(-3..=3, -3..=3, 80);
        let mut scape = soundscape(fast_settings(), s.library);

        let report = scape.tick(Some(&surface()), &world).cloned().expect("cycle");
        assert!(report.environment.inside);
        assert!(!report.biome_sounds);
        assert!(scape.registry().get(s.birds).is_none());
    }

    #[test]
    fn underground_keeps_biome_sounds_despite_roof() {
        let s = setup();
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut scape = soundscape(fast_settings(), s.library);
        let deep = Observer::at(BlockPos::new(0, 40, 0));

        let report = scape.tick(Some(&deep), &world).cloned().expect("cycle");
        assert!(report.environment.underground);
        assert!(report.environment.inside);
        assert!(report.biome_sounds);
        assert!(scape.registry().get(s.birds).is_some());
    }

    #[test]
    fn blacklisted_dimension_has_no_biome_sounds() {
        let s = setup();
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut settings = fast_settings();
        settings.biome.dimension_blacklist = vec![DimensionId::NETHER];
        let mut scape = soundscape(settings, s.library);

        let mut observer = surface();
        observer.dimension = DimensionId::NETHER;
        let report = scape.tick(Some(&observer), &world).cloned().expect("cycle");
        assert!(!report.biome_sounds);
        assert!(scape.registry().is_empty());
    }

    #[test]
    fn block_effects_and_always_on_sounds_join_the_mix() {
        let s = setup();
        let mut world = FixtureWorld::new(None, 63);
        world.fill_block_effect(BlockPos::new(-1, 63, -1), BlockPos::new(1, 65, 1), s.water);
        let mut scape = soundscape(fast_settings(), s.library);

        let mut observer = surface();
        observer.underwater = true;
        scape.tick(Some(&observer), &world);

        assert!(scape.registry().get(s.stream).is_some());
        let bubbles = scape.registry().get(s.bubbles).expect("always-on emitter");
        assert_eq!(bubbles.throttle(), 1.0);
        assert!(scape.environment().underwater);
    }

    #[test]
    fn disconnect_stops_everything_and_disarms() {
        let s = setup();
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut scape = soundscape(fast_settings(), s.library);
        scape.tick(Some(&surface()), &world);
        assert_eq!(scape.registry().len(), 1);

        scape.on_disconnect();
        assert!(!scape.is_connected());
        assert!(scape.registry().is_empty());
        assert_eq!(scape.backend().calls().last(), Some(&BackendCall::StopAll));

        let calls = scape.backend().calls().len();
        scape.tick(Some(&surface()), &world);
        assert_eq!(scape.backend().calls().len(), calls);
    }

    #[test]
    fn spot_sounds_are_played_once_per_cycle() {
        let mut s = setup();
        let woodpecker = s.library.acoustic("spot/woodpecker");
        s.library.add_region_spot_sound(s.forest, woodpecker, 1, 1.0);
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut scape = soundscape(fast_settings(), s.library).with_seed(9);

        let report = scape.tick(Some(&surface()), &world).cloned().expect("cycle");
        assert_eq!(report.region_spot, Some(woodpecker));
        let one_shots = scape
            .backend()
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::PlayOnce { .. }))
            .count();
        assert_eq!(one_shots, 1);
    }

    #[test]
    fn diagnostics_use_acoustic_names() {
        let s = setup();
        let world = FixtureWorld::new(Some(s.forest), 63);
        let mut scape = soundscape(fast_settings(), s.library);
        scape.tick(Some(&surface()), &world);

        let lines = scape.diagnostics();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name.as_deref(), Some("ambient/birds"));
        assert!(lines[0].to_string().starts_with("EMITTER: ambient/birds"));
    }
}
