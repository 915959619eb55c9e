//! Persistence: world snapshots plus an append-only event log.
//!
//! # Invariants
//! - The event log is append-only.
//! - Snapshots carry a content hash and are verified before restore.
//! - Replay applies post-snapshot events only, and never crosses a
//!   `Regenerated` barrier.

pub mod snapshot;
pub mod store;

pub use snapshot::{EventLog, Snapshot, SnapshotStore};
pub use store::{StoreError, WorldFileStore, WorldMeta};
