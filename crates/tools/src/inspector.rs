use axite_common::{GridCoord, TileType};
use axite_kernel::World;

/// World inspector for developer tooling.
///
/// Read-only queries against the world state for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a census of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let mut summary = WorldSummary {
            shift_count: world.shift_count(),
            seed: world.seed(),
            tile_count: world.tile_count(),
            pending_events: world.events().len(),
            ..WorldSummary::default()
        };
        for tile in world.tiles() {
            match tile.kind {
                TileType::Empty => summary.empty += 1,
                TileType::Axite => summary.axite += 1,
                TileType::Gold => summary.gold += 1,
                TileType::Crystal => summary.crystal += 1,
                TileType::Structure => summary.structures += 1,
                TileType::Obelisk => summary.obelisks += 1,
                TileType::Lore => summary.lore += 1,
            }
            summary.total_durability += tile.durability as u64;
        }
        summary
    }

    /// Detail view of a single tile.
    pub fn inspect_tile(world: &World, at: GridCoord) -> Option<TileInfo> {
        world.get(at).map(|tile| TileInfo {
            at,
            kind: tile.kind,
            durability: tile.durability,
            owner: tile.owner.as_ref().map(|o| o.0.clone()),
            structure_level: tile.structure.as_ref().map(|s| s.level),
        })
    }
}

/// Census of the world for the inspector.
#[derive(Debug, Clone, Default)]
pub struct WorldSummary {
    pub shift_count: u64,
    pub seed: u64,
    pub tile_count: usize,
    pub pending_events: usize,
    pub empty: usize,
    pub axite: usize,
    pub gold: usize,
    pub crystal: usize,
    pub structures: usize,
    pub obelisks: usize,
    pub lore: usize,
    /// Sum of remaining durability across all resource tiles.
    pub total_durability: u64,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: shift={} seed={} tiles={} (empty={} axite={} gold={} crystal={} structures={} obelisks={}) durability={} pending_events={}",
            self.shift_count,
            self.seed,
            self.tile_count,
            self.empty,
            self.axite,
            self.gold,
            self.crystal,
            self.structures,
            self.obelisks,
            self.total_durability,
            self.pending_events,
        )
    }
}

/// Detailed info about a single tile.
#[derive(Debug, Clone)]
pub struct TileInfo {
    pub at: GridCoord,
    pub kind: TileType,
    pub durability: u16,
    pub owner: Option<String>,
    pub structure_level: Option<u8>,
}

impl std::fmt::Display for TileInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile [{}] kind={} durability={}", self.at, self.kind, self.durability)?;
        if let Some(ref owner) = self.owner {
            write!(f, " owner={owner}")?;
        }
        if let Some(level) = self.structure_level {
            write!(f, " structure_level={level}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axite_common::{ActorId, Tile};
    use std::collections::BTreeMap;

    fn sample_world() -> World {
        let mut tiles = BTreeMap::new();
        for (i, kind) in [TileType::Axite, TileType::Gold, TileType::Crystal]
            .into_iter()
            .enumerate()
        {
            let coord = GridCoord::new(i as i32 + 1, 0);
            tiles.insert(coord, Tile::resource(coord, kind, 4));
        }
        tiles.insert(GridCoord::ORIGIN, Tile::empty(GridCoord::ORIGIN));
        let mut w = World::with_seed(1);
        w.install(tiles);
        w.drain_events();
        w
    }

    #[test]
    fn summary_empty_world() {
        let world = World::new();
        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.tile_count, 0);
        assert_eq!(summary.shift_count, 0);
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut world = sample_world();
        world.place_structure(GridCoord::ORIGIN, &ActorId::new("0xa"));

        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.tile_count, 4);
        assert_eq!(summary.axite, 1);
        assert_eq!(summary.gold, 1);
        assert_eq!(summary.crystal, 1);
        assert_eq!(summary.structures, 1);
        assert_eq!(summary.empty, 0);
        assert_eq!(summary.total_durability, 12);
        assert_eq!(summary.pending_events, 1);
    }

    #[test]
    fn inspect_tile_found() {
        let world = sample_world();
        let info = WorldInspector::inspect_tile(&world, GridCoord::new(1, 0)).unwrap();
        assert_eq!(info.kind, TileType::Axite);
        assert_eq!(info.durability, 4);
        assert!(info.owner.is_none());
    }

    #[test]
    fn inspect_tile_not_found() {
        let world = sample_world();
        assert!(WorldInspector::inspect_tile(&world, GridCoord::new(9, 9)).is_none());
    }

    #[test]
    fn summary_display() {
        let summary = WorldInspector::summary(&sample_world());
        let s = format!("{summary}");
        assert!(s.contains("shift=1"));
        assert!(s.contains("axite=1"));
    }
}
