//! World kernel: authoritative tile state and the operations that mutate it.
//!
//! # Invariants
//! - All state mutations flow through explicit operations on [`World`].
//! - A depleted resource tile is reset to `Empty` in the same operation
//!   that emits its loot.
//! - The event log is append-only and records every mutation.

pub mod world;

pub use world::{MineError, MineOutcome, OBELISK_DURABILITY, World, WorldEvent};
