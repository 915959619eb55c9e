//! Developer tooling: read-only world inspection.

pub mod inspector;

pub use inspector::{TileInfo, WorldInspector, WorldSummary};
