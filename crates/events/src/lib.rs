//! World events: obelisk spawning and shift scheduling.
//!
//! # Invariants
//! - A successful spawn always leaves an obelisk with full durability at
//!   the returned coordinate.
//! - A spawner that exhausts its attempt budget changes nothing; the
//!   caller treats `None` as "event skipped", never as an error.

mod schedule;
mod spawner;

pub use schedule::{EventCycle, ShiftClock};
pub use spawner::ObeliskSpawner;
