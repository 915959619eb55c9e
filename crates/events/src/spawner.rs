use axite_common::GridCoord;
use axite_kernel::World;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Picks a pseudo-objective tile and promotes it to an obelisk.
///
/// Candidates are drawn uniformly from a small box around the origin so
/// the objective lands near where players start. Eligibility (empty or
/// axite) is enforced by the kernel.
pub struct ObeliskSpawner {
    /// Maximum candidate draws before the event is skipped.
    attempts: u32,
    /// Candidates come from `[-spread, spread)` on both axes.
    spread: i32,
    rng: SmallRng,
}

impl ObeliskSpawner {
    pub const DEFAULT_ATTEMPTS: u32 = 50;
    pub const DEFAULT_SPREAD: i32 = 8;

    /// Spawner with the default budget and box, seeded from entropy.
    pub fn new() -> Self {
        Self::seeded(rand::random())
    }

    /// Spawner with a fixed seed for reproducible tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            attempts: Self::DEFAULT_ATTEMPTS,
            spread: Self::DEFAULT_SPREAD,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Try to raise an obelisk somewhere near the origin.
    ///
    /// Returns the chosen coordinate, or `None` when no eligible tile
    /// turned up within the attempt budget.
    pub fn spawn(&mut self, world: &mut World) -> Option<GridCoord> {
        for _ in 0..self.attempts {
            let at = GridCoord::new(
                self.rng.random_range(-self.spread..self.spread),
                self.rng.random_range(-self.spread..self.spread),
            );
            if world.raise_obelisk(at) {
                return Some(at);
            }
        }
        tracing::debug!(attempts = self.attempts, "no eligible tile, event skipped");
        None
    }
}

impl Default for ObeliskSpawner {
    fn default() -> Self {
        Self::new()
    }
}
