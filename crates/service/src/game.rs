use crate::wire::MiningResponse;
use axite_common::{ActorId, GridCoord, Tile};
use axite_events::{EventCycle, ObeliskSpawner, ShiftClock};
use axite_gen::{GenConfig, genesis_shift};
use axite_kernel::{World, WorldEvent};
use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime};

/// A feed entry surfaced to the client alongside state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bulletin {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: BulletinKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulletinKind {
    Info,
    Loot,
    Event,
    Alert,
}

/// The facade the client talks to.
///
/// Owns the world and everything that mutates it: generation config,
/// the obelisk spawner, and both schedule clocks. All operations run
/// synchronously against `&mut self`, so overlapping mutations on one
/// tile cannot happen.
pub struct GameService {
    world: World,
    config: GenConfig,
    spawner: ObeliskSpawner,
    shift_clock: ShiftClock,
    event_cycle: EventCycle,
}

impl GameService {
    /// Generate the initial world and arm the schedules.
    pub fn new(config: GenConfig, now_wall: SystemTime, now_mono: Instant) -> Self {
        let seed = config.seed();
        let mut world = World::with_seed(seed);
        genesis_shift(&mut world, &config);
        tracing::info!(seed, tiles = world.tile_count(), "world initialized");
        Self {
            world,
            config,
            spawner: ObeliskSpawner::seeded(seed),
            shift_clock: ShiftClock::new(now_wall),
            event_cycle: EventCycle::with_default_interval(now_mono),
        }
    }

    /// Mining call: `(x, y, address)` against the authoritative grid.
    pub fn mine(&mut self, x: i32, y: i32, address: &str) -> MiningResponse {
        let actor = ActorId::new(address);
        match self.world.mine(GridCoord::new(x, y), &actor) {
            Ok(outcome) => MiningResponse::from_outcome(outcome),
            Err(error) => MiningResponse::from_error(error),
        }
    }

    /// Placement call: true iff the tile was empty and unbuilt.
    pub fn place(&mut self, x: i32, y: i32, address: &str) -> bool {
        let owner = ActorId::new(address);
        self.world.place_structure(GridCoord::new(x, y), &owner)
    }

    /// Tile query: full snapshot, no pagination or delta.
    pub fn tiles(&self) -> Vec<Tile> {
        self.world.tiles().cloned().collect()
    }

    /// Manually trigger a genesis shift, suppressing today's scheduled one.
    pub fn genesis_shift(&mut self, now: SystemTime) -> Bulletin {
        genesis_shift(&mut self.world, &self.config);
        self.shift_clock.mark_shifted(now);
        Bulletin {
            text: "Genesis Shift triggered. World map re-generated.".into(),
            kind: BulletinKind::Event,
        }
    }

    /// Manually trigger the obelisk event (debug path in the original).
    pub fn spawn_event(&mut self) -> Option<GridCoord> {
        self.spawner.spawn(&mut self.world)
    }

    /// Drive the schedules. Returns bulletins for anything that fired.
    pub fn poll(&mut self, now_wall: SystemTime, now_mono: Instant) -> Vec<Bulletin> {
        let mut bulletins = Vec::new();

        if self.shift_clock.poll(now_wall) {
            genesis_shift(&mut self.world, &self.config);
            bulletins.push(Bulletin {
                text: "Genesis Shift triggered. World map re-generated.".into(),
                kind: BulletinKind::Event,
            });
        }

        if self.event_cycle.poll(now_mono) {
            // A skipped event (no eligible tile) is silent, not an error.
            if let Some(at) = self.spawner.spawn(&mut self.world) {
                bulletins.push(Bulletin {
                    text: format!("ANCIENT OBELISK rising in sector [{at}]"),
                    kind: BulletinKind::Alert,
                });
            }
        }

        bulletins
    }

    /// Read-only world access for inspection and snapshotting.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Drain pending world events, e.g. into a persistence segment.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        self.world.drain_events()
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }
}
