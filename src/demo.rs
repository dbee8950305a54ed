//! Scripted demo session: a small fixture world and an observer touring it.

use ambience_audio::AcousticLibrary;
use ambience_core::DimensionId;
use ambience_testkit::FixtureWorld;
use ambience_world::{BlockPos, Observer};

const SPAWN: BlockPos = BlockPos::new(0, 64, 0);

/// Forest around spawn with a leafy canopy and a lava pocket below, plains
/// to the east with a roofed shelter, then an ocean.
pub fn build_world(library: &mut AcousticLibrary) -> FixtureWorld {
    let forest = library.region("biome:forest");
    let plains = library.region("biome:plains");
    let ocean = library.region("biome:ocean");
    let water = library.region("block:water");
    let lava = library.region("block:lava");
    let leaves = library.region("block:leaves");

    let mut world = FixtureWorld::new(Some(forest), 63);
    world
        .paint_biome(40..=120, -40..=40, plains)
        .paint_biome(121..=220, -40..=40, ocean)
        .fill_block_effect(BlockPos::new(121, 56, -12), BlockPos::new(220, 62, 12), water)
        .fill_block_effect(BlockPos::new(-6, 67, -6), BlockPos::new(6, 70, 6), leaves)
        .fill_block_effect(BlockPos::new(-4, 22, -4), BlockPos::new(4, 25, 4), lava)
        .set_height(60..=70, -5..=5, 72);
    world
}

/// One stretch of the walk: move linearly to `to` over `ticks` ticks.
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub to: BlockPos,
    pub ticks: u64,
    pub night: bool,
    pub raining: bool,
    pub underwater: bool,
    pub alive: bool,
}

impl Leg {
    pub fn walk(to: BlockPos, ticks: u64) -> Self {
        Self {
            to,
            ticks: ticks.max(1),
            night: false,
            raining: false,
            underwater: false,
            alive: true,
        }
    }

    pub fn at_night(mut self) -> Self {
        self.night = true;
        self
    }

    pub fn in_rain(mut self) -> Self {
        self.raining = true;
        self
    }

    pub fn submerged(mut self) -> Self {
        self.underwater = true;
        self
    }

    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }
}

/// Deterministic observer path, sampled per tick.
#[derive(Debug, Clone)]
pub struct ObserverWalk {
    start: BlockPos,
    legs: Vec<Leg>,
}

impl ObserverWalk {
    pub fn new(start: BlockPos) -> Self {
        Self {
            start,
            legs: Vec::new(),
        }
    }

    pub fn leg(mut self, leg: Leg) -> Self {
        self.legs.push(leg);
        self
    }

    /// The demo tour through every area of [`build_world`].
    pub fn tour() -> Self {
        Self::new(SPAWN)
            .leg(Leg::walk(SPAWN, 200))
            .leg(Leg::walk(BlockPos::new(65, 64, 0), 300))
            .leg(Leg::walk(BlockPos::new(65, 64, 0), 200).in_rain())
            .leg(Leg::walk(BlockPos::new(170, 64, 0), 300))
            .leg(Leg::walk(BlockPos::new(170, 55, 0), 100).submerged())
            .leg(Leg::walk(SPAWN, 400).at_night())
            .leg(Leg::walk(BlockPos::new(0, 28, 0), 200).at_night())
            .leg(Leg::walk(BlockPos::new(0, 28, 0), 60).dead())
            .leg(Leg::walk(SPAWN, 200))
    }

    /// Total ticks covered by the legs.
    pub fn len(&self) -> u64 {
        self.legs.iter().map(|leg| leg.ticks).sum()
    }

    /// Observer state at `tick`; past the end the observer rests at the last point.
    pub fn observer_at(&self, tick: u64) -> Observer {
        let mut from = self.start;
        let mut elapsed = 0;
        for leg in &self.legs {
            if tick < elapsed + leg.ticks {
                let t = (tick - elapsed) as f32 / leg.ticks as f32;
                return observe(lerp(from, leg.to, t), leg);
            }
            elapsed += leg.ticks;
            from = leg.to;
        }
        Observer::at(from)
    }
}

fn lerp(from: BlockPos, to: BlockPos, t: f32) -> BlockPos {
    let step = |a: i32, b: i32| a + ((b - a) as f32 * t).round() as i32;
    BlockPos::new(step(from.x, to.x), step(from.y, to.y), step(from.z, to.z))
}

fn observe(position: BlockPos, leg: &Leg) -> Observer {
    Observer {
        position,
        dimension: DimensionId::OVERWORLD,
        alive: leg.alive,
        underwater: leg.underwater,
        raining: leg.raining,
        night: leg.night,
    }
}
