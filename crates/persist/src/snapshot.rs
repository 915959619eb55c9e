use axite_common::{GridCoord, Tile};
use axite_kernel::{World, WorldEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A content-addressed snapshot of the world at a specific shift.
///
/// The hash is computed from the captured state, enabling corruption
/// detection on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Genesis shift counter at capture time.
    pub shift_count: u64,
    /// Seed at capture time (for deterministic continuation).
    pub seed: u64,
    /// The full tile map, in canonical coordinate order.
    pub tiles: BTreeMap<GridCoord, Tile>,
    /// Content hash for integrity verification (FNV-1a over the captured
    /// state). Sufficient for corruption detection.
    pub hash: u64,
}

impl Snapshot {
    /// Capture the current world state.
    pub fn capture(world: &World) -> Self {
        let tiles: BTreeMap<GridCoord, Tile> =
            world.tiles().map(|t| (t.coord, t.clone())).collect();
        let shift_count = world.shift_count();
        let seed = world.seed();
        let hash = content_hash(shift_count, seed, &tiles);
        Self {
            shift_count,
            seed,
            tiles,
            hash,
        }
    }

    /// Verify integrity by recomputing the hash.
    pub fn verify(&self) -> bool {
        self.hash == content_hash(self.shift_count, self.seed, &self.tiles)
    }

    /// Restore a world from this snapshot. The restored world has an
    /// empty event log; restore is not a mutation worth logging.
    pub fn restore(&self) -> World {
        let mut world = World::with_seed(self.seed);
        world.set_shift_count(self.shift_count);
        for tile in self.tiles.values() {
            world.restore_tile(tile.clone());
        }
        world
    }
}

fn content_hash(shift_count: u64, seed: u64, tiles: &BTreeMap<GridCoord, Tile>) -> u64 {
    fnv1a_hash(&format!("{shift_count}{seed}{tiles:?}"))
}

/// Append-only event log for persistence and replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<WorldEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append events. Events are never modified after writing.
    pub fn append(&mut self, events: &[WorldEvent]) {
        self.events.extend_from_slice(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Replay the log on top of a snapshot.
    ///
    /// Stops at a `Regenerated` event: the grid behind it is reproduced
    /// by the generator from the seed, not by the log, so events past the
    /// barrier would land on tiles this snapshot does not describe.
    pub fn replay_from(&self, snapshot: &Snapshot) -> World {
        let mut world = snapshot.restore();
        for event in &self.events {
            if matches!(event, WorldEvent::Regenerated { .. }) {
                tracing::warn!("replay halted at regeneration barrier");
                break;
            }
            world.apply(event);
        }
        world
    }
}

/// In-memory snapshot store: capture points plus the pending log.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: Vec<Snapshot>,
    log: EventLog,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a snapshot of the current world and store it. Returns its index.
    pub fn take_snapshot(&mut self, world: &World) -> usize {
        self.snapshots.push(Snapshot::capture(world));
        self.snapshots.len() - 1
    }

    /// Drain pending events from the world into the log.
    pub fn flush_events(&mut self, world: &mut World) {
        let events = world.drain_events();
        self.log.append(&events);
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn get_snapshot(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Roll the world back to a stored snapshot.
    pub fn rollback(&self, index: usize) -> Option<World> {
        self.snapshots.get(index).map(Snapshot::restore)
    }
}

/// FNV-1a hash for content addressing. Not cryptographic; corruption
/// detection only.
fn fnv1a_hash(data: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in data.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
