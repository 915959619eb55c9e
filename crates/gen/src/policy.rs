use axite_common::{GridCoord, Tile, TileType};
use axite_kernel::World;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uniform-random thresholds for tiles outside the starter cluster.
/// A single draw in [0, 1) against descending cutoffs, rarest first.
const CRYSTAL_CUTOFF: f64 = 0.98;
const GOLD_CUTOFF: f64 = 0.95;
const AXITE_CUTOFF: f64 = 0.90;

const CRYSTAL_DURABILITY: u16 = 12;
const GOLD_DURABILITY: u16 = 7;
const AXITE_DURABILITY: u16 = 4;
/// Starter-cluster resources are soft so new players deplete them fast.
const STARTER_DURABILITY: u16 = 3;

/// Generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    /// Half the side length of the generated square; tiles cover
    /// `[-half_extent, half_extent)` on both axes.
    pub half_extent: i32,
    /// Chebyshev radius of the guaranteed starter cluster around the origin.
    pub starter_radius: i32,
    /// Chance a starter-cluster tile (other than the origin) is a resource.
    pub starter_resource_chance: f64,
    /// Chance a starter resource is gold rather than axite.
    pub starter_gold_chance: f64,
    /// Optional RNG seed for reproducible worlds.
    pub rng_seed: Option<u64>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            half_extent: 50,
            starter_radius: 3,
            starter_resource_chance: 0.6,
            starter_gold_chance: 0.3,
            rng_seed: None,
        }
    }
}

impl GenConfig {
    /// The configured seed, or one drawn from entropy if absent.
    pub fn seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }
}

/// A replaceable tile-rolling strategy.
///
/// The world generator asks the policy for one tile per coordinate;
/// swapping the policy changes the terrain distribution without touching
/// the kernel or the generator loop.
pub trait TilePolicy {
    fn roll(&mut self, coord: GridCoord) -> Tile;
}

/// The production policy: guaranteed starter cluster near the origin,
/// independent uniform scatter everywhere else. No spatial coherence by
/// policy choice; every tile rolls on its own.
pub struct ScatterPolicy {
    starter_radius: i32,
    starter_resource_chance: f64,
    starter_gold_chance: f64,
    rng: SmallRng,
}

impl ScatterPolicy {
    /// Build a policy from the config, seeding from it (or entropy).
    pub fn new(config: &GenConfig) -> Self {
        Self::seeded(config, config.seed())
    }

    /// Build a policy with an explicit seed, ignoring the config seed.
    pub fn seeded(config: &GenConfig, seed: u64) -> Self {
        Self {
            starter_radius: config.starter_radius,
            starter_resource_chance: config.starter_resource_chance,
            starter_gold_chance: config.starter_gold_chance,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl TilePolicy for ScatterPolicy {
    fn roll(&mut self, coord: GridCoord) -> Tile {
        if coord.chebyshev(GridCoord::ORIGIN) <= self.starter_radius {
            // Guaranteed starter cluster: origin is always a safe spawn,
            // the ring around it holds only soft axite and gold.
            if coord == GridCoord::ORIGIN {
                return Tile::empty(coord);
            }
            if self.rng.random_bool(self.starter_resource_chance) {
                let kind = if self.rng.random_bool(self.starter_gold_chance) {
                    TileType::Gold
                } else {
                    TileType::Axite
                };
                return Tile::resource(coord, kind, STARTER_DURABILITY);
            }
            return Tile::empty(coord);
        }

        let rand: f64 = self.rng.random();
        if rand > CRYSTAL_CUTOFF {
            Tile::resource(coord, TileType::Crystal, CRYSTAL_DURABILITY)
        } else if rand > GOLD_CUTOFF {
            Tile::resource(coord, TileType::Gold, GOLD_DURABILITY)
        } else if rand > AXITE_CUTOFF {
            Tile::resource(coord, TileType::Axite, AXITE_DURABILITY)
        } else {
            Tile::empty(coord)
        }
    }
}

/// Populate the full bounded grid with the given policy.
pub fn generate(config: &GenConfig, policy: &mut impl TilePolicy) -> BTreeMap<GridCoord, Tile> {
    let _span = tracing::info_span!("generate", half_extent = config.half_extent).entered();
    let mut tiles = BTreeMap::new();
    for x in -config.half_extent..config.half_extent {
        for y in -config.half_extent..config.half_extent {
            let coord = GridCoord::new(x, y);
            tiles.insert(coord, policy.roll(coord));
        }
    }
    tracing::debug!(tiles = tiles.len(), "grid generated");
    tiles
}

/// Genesis shift: discard the current grid and regenerate from the
/// world's current seed. Structures, ownership, and in-flight durability
/// are deliberately wiped, not migrated.
pub fn genesis_shift(world: &mut World, config: &GenConfig) {
    let mut policy = ScatterPolicy::seeded(config, world.seed());
    let tiles = generate(config, &mut policy);
    world.install(tiles);
}
