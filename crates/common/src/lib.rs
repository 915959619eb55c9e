//! Shared domain types for the axite world simulation.
//!
//! # Invariants
//! - A tile with kind `Empty` always has durability 0.
//! - Loot amounts come from a fixed per-kind table, never randomized.

pub mod types;

pub use types::{ActorId, GridCoord, Loot, Structure, StructureKind, Tile, TileType};
