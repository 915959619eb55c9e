use axite_common::{ActorId, GridCoord, Loot, Structure, Tile, TileType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An event record produced by every mutation to the world.
///
/// The event log is the foundation for persistence and replay. Each event
/// captures enough information to re-apply the mutation on top of a
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldEvent {
    /// The entire grid was replaced by a genesis shift.
    ///
    /// Replay cannot cross this barrier; the regenerated grid is
    /// reproduced from the seed by the generator, not from the log.
    Regenerated {
        shift_count: u64,
        seed: u64,
        tile_count: usize,
    },
    /// A tile was mined but still has durability left.
    Mined {
        at: GridCoord,
        by: ActorId,
        remaining: u16,
    },
    /// A tile was mined to zero, emitted loot, and reset to empty.
    Depleted {
        at: GridCoord,
        by: ActorId,
        loot: Loot,
    },
    /// A structure was placed on an empty tile.
    StructurePlaced { at: GridCoord, structure: Structure },
    /// A tile was promoted to a durability-50 obelisk objective.
    ObeliskRaised { at: GridCoord, previous: TileType },
}

/// Why a mining action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MineError {
    /// The tile is absent or already at zero durability.
    #[error("sector depleted")]
    Depleted,
}

/// What a successful mining action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum MineOutcome {
    /// Durability decreased but the tile survives.
    Progress { remaining: u16 },
    /// The tile hit zero durability, reset to empty, and paid out.
    Depleted { loot: Loot },
}

/// Durability assigned when a tile is promoted to an obelisk.
pub const OBELISK_DURABILITY: u16 = 50;

/// The authoritative world state.
///
/// All mutations go through explicit operations; the kernel owns the
/// truth and the service, persistence, and tooling layers derive from it.
/// Taking `&mut World` is the single-writer boundary: overlapping mining
/// calls on one tile cannot be expressed against it.
///
/// Uses BTreeMap for deterministic iteration order across all platforms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    tiles: BTreeMap<GridCoord, Tile>,
    /// Number of genesis shifts applied since creation.
    shift_count: u64,
    /// Seed the current grid was generated from. Advanced by splitmix64
    /// on each shift so consecutive worlds are deterministic.
    seed: u64,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Create an empty world with seed 0 and no tiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with a specific generation seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Number of genesis shifts applied so far.
    pub fn shift_count(&self) -> u64 {
        self.shift_count
    }

    /// Seed of the current grid.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of tiles in the store.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Read a single tile.
    pub fn get(&self, at: GridCoord) -> Option<&Tile> {
        self.tiles.get(&at)
    }

    /// Full snapshot of all tiles, in deterministic coordinate order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Drain and return the event log. Used by persistence.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Replace the entire grid with freshly generated tiles.
    ///
    /// This is the genesis shift application: nothing survives — not
    /// structures, not ownership, not partially mined durability. The
    /// seed advances so the next shift rolls a different world.
    pub fn install(&mut self, tiles: BTreeMap<GridCoord, Tile>) {
        self.shift_count += 1;
        let tile_count = tiles.len();
        self.tiles = tiles;
        self.seed = splitmix64(self.seed);
        tracing::info!(shift = self.shift_count, tiles = tile_count, "grid installed");
        self.event_log.push(WorldEvent::Regenerated {
            shift_count: self.shift_count,
            seed: self.seed,
            tile_count,
        });
    }

    /// Mine one hit off the tile at `at`.
    ///
    /// Fails with [`MineError::Depleted`] when the tile is absent or has
    /// no durability left; failure never mutates state. On the hit that
    /// reaches zero the tile kind resets to `Empty` and the fixed loot
    /// for the depleted kind is emitted.
    pub fn mine(&mut self, at: GridCoord, actor: &ActorId) -> Result<MineOutcome, MineError> {
        let tile = self.tiles.get_mut(&at).ok_or(MineError::Depleted)?;
        if tile.durability == 0 {
            return Err(MineError::Depleted);
        }

        tile.durability -= 1;
        if tile.durability == 0 {
            let loot = Loot::for_kind(tile.kind);
            tile.kind = TileType::Empty;
            tracing::debug!(%at, kind = %loot.kind, amount = loot.amount, "tile depleted");
            self.event_log.push(WorldEvent::Depleted {
                at,
                by: actor.clone(),
                loot,
            });
            Ok(MineOutcome::Depleted { loot })
        } else {
            let remaining = tile.durability;
            self.event_log.push(WorldEvent::Mined {
                at,
                by: actor.clone(),
                remaining,
            });
            Ok(MineOutcome::Progress { remaining })
        }
    }

    /// Place a level-1 extractor on an empty tile.
    ///
    /// Returns true iff the tile exists, is `Empty`, and carries no
    /// structure; no failure reason is surfaced beyond false.
    pub fn place_structure(&mut self, at: GridCoord, owner: &ActorId) -> bool {
        let Some(tile) = self.tiles.get_mut(&at) else {
            return false;
        };
        if tile.kind != TileType::Empty || tile.structure.is_some() {
            return false;
        }
        let structure = Structure::extractor(owner.clone());
        tile.structure = Some(structure.clone());
        tile.kind = TileType::Structure;
        tile.owner = Some(owner.clone());
        tracing::debug!(%at, %owner, "structure placed");
        self.event_log
            .push(WorldEvent::StructurePlaced { at, structure });
        true
    }

    /// Promote a tile to a high-durability obelisk objective.
    ///
    /// Only `Empty` and `Axite` tiles are eligible. Returns false for any
    /// other kind or for an absent tile.
    pub fn raise_obelisk(&mut self, at: GridCoord) -> bool {
        let Some(tile) = self.tiles.get_mut(&at) else {
            return false;
        };
        if !matches!(tile.kind, TileType::Empty | TileType::Axite) {
            return false;
        }
        let previous = tile.kind;
        tile.kind = TileType::Obelisk;
        tile.durability = OBELISK_DURABILITY;
        tracing::info!(%at, "obelisk raised");
        self.event_log.push(WorldEvent::ObeliskRaised { at, previous });
        true
    }

    /// Re-apply a logged mutation (used when replaying event segments on
    /// top of a snapshot). `Regenerated` is a barrier and is not applied.
    pub fn apply(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::Regenerated { .. } => {}
            WorldEvent::Mined { at, remaining, .. } => {
                if let Some(tile) = self.tiles.get_mut(at) {
                    tile.durability = *remaining;
                }
            }
            WorldEvent::Depleted { at, .. } => {
                if let Some(tile) = self.tiles.get_mut(at) {
                    tile.durability = 0;
                    tile.kind = TileType::Empty;
                }
            }
            WorldEvent::StructurePlaced { at, structure } => {
                if let Some(tile) = self.tiles.get_mut(at) {
                    tile.owner = Some(structure.owner.clone());
                    tile.structure = Some(structure.clone());
                    tile.kind = TileType::Structure;
                }
            }
            WorldEvent::ObeliskRaised { at, .. } => {
                if let Some(tile) = self.tiles.get_mut(at) {
                    tile.kind = TileType::Obelisk;
                    tile.durability = OBELISK_DURABILITY;
                }
            }
        }
    }

    /// Compute a deterministic hash of the world state for comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.shift_count.to_le_bytes());
        mix(&mut h, &self.seed.to_le_bytes());
        for (coord, tile) in &self.tiles {
            mix(&mut h, &coord.x.to_le_bytes());
            mix(&mut h, &coord.y.to_le_bytes());
            mix(&mut h, tile.kind.to_string().as_bytes());
            mix(&mut h, &tile.durability.to_le_bytes());
            if let Some(ref s) = tile.structure {
                mix(&mut h, s.id.as_bytes());
                mix(&mut h, &[s.level]);
                mix(&mut h, s.owner.0.as_bytes());
            }
        }
        h
    }

    /// Insert a single tile directly (snapshot restore only; does not log).
    pub fn restore_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.coord, tile);
    }

    /// Set shift counter directly (snapshot restore only).
    pub fn set_shift_count(&mut self, shift_count: u64) {
        self.shift_count = shift_count;
    }
}

/// Splitmix64, a fast deterministic PRNG step function. Advances the
/// world seed on each genesis shift in a reproducible way.
pub fn splitmix64(state: u64) -> u64 {
    let state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> ActorId {
        ActorId::new("0xtest")
    }

    fn world_with(tiles: Vec<Tile>) -> World {
        let mut map = BTreeMap::new();
        for t in tiles {
            map.insert(t.coord, t);
        }
        let mut w = World::with_seed(1);
        w.install(map);
        w.drain_events();
        w
    }

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.tile_count(), 0);
        assert_eq!(w.shift_count(), 0);
    }

    #[test]
    fn install_replaces_everything() {
        let at = GridCoord::new(1, 1);
        let mut w = world_with(vec![Tile::resource(at, TileType::Gold, 7)]);
        assert_eq!(w.tile_count(), 1);

        w.install(BTreeMap::from([(
            GridCoord::ORIGIN,
            Tile::empty(GridCoord::ORIGIN),
        )]));
        assert_eq!(w.tile_count(), 1);
        assert!(w.get(at).is_none());
        assert_eq!(w.shift_count(), 2);
    }

    #[test]
    fn install_advances_seed() {
        let mut w = World::with_seed(42);
        let before = w.seed();
        w.install(BTreeMap::new());
        assert_ne!(w.seed(), before);
    }

    #[test]
    fn mining_decrements_until_depletion() {
        let at = GridCoord::new(2, -1);
        let mut w = world_with(vec![Tile::resource(at, TileType::Axite, 4)]);

        for expected in [3u16, 2, 1] {
            match w.mine(at, &actor()).unwrap() {
                MineOutcome::Progress { remaining } => assert_eq!(remaining, expected),
                other => panic!("expected progress, got {other:?}"),
            }
        }
        match w.mine(at, &actor()).unwrap() {
            MineOutcome::Depleted { loot } => {
                assert_eq!(loot.kind, TileType::Axite);
                assert_eq!(loot.amount, 2);
            }
            other => panic!("expected depletion, got {other:?}"),
        }
        let tile = w.get(at).unwrap();
        assert_eq!(tile.kind, TileType::Empty);
        assert_eq!(tile.durability, 0);
    }

    #[test]
    fn mining_depleted_tile_fails_without_mutation() {
        let at = GridCoord::new(0, 1);
        let mut w = world_with(vec![Tile::empty(at)]);
        let hash = w.state_hash();
        assert_eq!(w.mine(at, &actor()), Err(MineError::Depleted));
        assert_eq!(w.state_hash(), hash);
    }

    #[test]
    fn mining_absent_tile_fails() {
        let mut w = world_with(vec![]);
        assert_eq!(
            w.mine(GridCoord::new(99, 99), &actor()),
            Err(MineError::Depleted)
        );
    }

    #[test]
    fn placement_requires_empty_unbuilt_tile() {
        let at = GridCoord::new(3, 3);
        let mut w = world_with(vec![
            Tile::empty(at),
            Tile::resource(GridCoord::new(4, 4), TileType::Gold, 7),
        ]);

        assert!(w.place_structure(at, &actor()));
        let tile = w.get(at).unwrap();
        assert_eq!(tile.kind, TileType::Structure);
        assert!(tile.structure.is_some());
        assert_eq!(tile.owner.as_ref(), Some(&actor()));

        // Second placement on the same tile always fails.
        assert!(!w.place_structure(at, &actor()));
        // Resource tiles are not buildable.
        assert!(!w.place_structure(GridCoord::new(4, 4), &actor()));
        // Absent tiles are not buildable.
        assert!(!w.place_structure(GridCoord::new(50, 50), &actor()));
    }

    #[test]
    fn obelisk_full_lifecycle() {
        let at = GridCoord::new(-5, 2);
        let mut w = world_with(vec![Tile::resource(at, TileType::Axite, 4)]);

        assert!(w.raise_obelisk(at));
        let tile = w.get(at).unwrap();
        assert_eq!(tile.kind, TileType::Obelisk);
        assert_eq!(tile.durability, OBELISK_DURABILITY);

        for _ in 0..49 {
            assert!(matches!(
                w.mine(at, &actor()),
                Ok(MineOutcome::Progress { .. })
            ));
        }
        match w.mine(at, &actor()).unwrap() {
            MineOutcome::Depleted { loot } => {
                assert_eq!(loot.kind, TileType::Obelisk);
                assert_eq!(loot.amount, 10);
            }
            other => panic!("expected jackpot, got {other:?}"),
        }
        assert_eq!(w.get(at).unwrap().kind, TileType::Empty);
    }

    #[test]
    fn obelisk_rejects_ineligible_tiles() {
        let gold = GridCoord::new(1, 0);
        let built = GridCoord::new(2, 0);
        let mut w = world_with(vec![Tile::resource(gold, TileType::Gold, 7), Tile::empty(built)]);
        w.place_structure(built, &actor());

        assert!(!w.raise_obelisk(gold));
        assert!(!w.raise_obelisk(built));
        assert!(!w.raise_obelisk(GridCoord::new(77, 77)));
    }

    #[test]
    fn events_are_recorded() {
        let at = GridCoord::new(0, 2);
        let mut w = world_with(vec![Tile::resource(at, TileType::Crystal, 2), Tile::empty(GridCoord::ORIGIN)]);
        w.mine(at, &actor()).unwrap();
        w.mine(at, &actor()).unwrap();
        w.place_structure(GridCoord::ORIGIN, &actor());

        let events = w.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], WorldEvent::Mined { .. }));
        assert!(matches!(events[1], WorldEvent::Depleted { .. }));
        assert!(matches!(events[2], WorldEvent::StructurePlaced { .. }));
    }

    #[test]
    fn drain_events_clears_log() {
        let at = GridCoord::new(0, 0);
        let mut w = world_with(vec![Tile::resource(at, TileType::Axite, 4)]);
        w.mine(at, &actor()).unwrap();
        assert_eq!(w.drain_events().len(), 1);
        assert!(w.events().is_empty());
    }

    #[test]
    fn apply_reproduces_mutations() {
        let mined = GridCoord::new(1, 1);
        let built = GridCoord::new(2, 2);
        let raised = GridCoord::new(3, 0);
        let tiles = vec![
            Tile::resource(mined, TileType::Gold, 7),
            Tile::empty(built),
            Tile::resource(raised, TileType::Axite, 4),
        ];
        let mut w1 = world_with(tiles.clone());
        let mut w2 = world_with(tiles);
        assert_eq!(w1.shift_count(), w2.shift_count());

        w1.mine(mined, &actor()).unwrap();
        w1.mine(mined, &actor()).unwrap();
        w1.place_structure(built, &actor());
        w1.raise_obelisk(raised);

        for event in w1.events().to_vec() {
            w2.apply(&event);
        }
        assert_eq!(w1.state_hash(), w2.state_hash());
    }

    #[test]
    fn state_hash_deterministic() {
        let tiles = vec![Tile::resource(GridCoord::new(1, 2), TileType::Crystal, 12)];
        let w1 = world_with(tiles.clone());
        let w2 = world_with(tiles);
        assert_eq!(w1.state_hash(), w2.state_hash());
    }

    #[test]
    fn state_hash_tracks_durability() {
        let at = GridCoord::new(0, 0);
        let mut w = world_with(vec![Tile::resource(at, TileType::Axite, 4)]);
        let before = w.state_hash();
        w.mine(at, &actor()).unwrap();
        assert_ne!(w.state_hash(), before);
    }
}
