//! World generation: populate the bounded grid around the origin.
//!
//! # Invariants
//! - The origin tile is always empty.
//! - Tiles within the starter radius are only ever empty, axite, or gold.
//! - Generation is a pure function of the policy seed; no spatial noise,
//!   every tile rolls independently.

mod policy;

pub use policy::{GenConfig, ScatterPolicy, TilePolicy, generate, genesis_shift};
