//! Game service: the boundary the client calls.
//!
//! Wraps the kernel's operations in the wire shapes and messages the
//! original client protocol used, and drives the scheduled genesis shift
//! and event cycle from its `poll` entry point.
//!
//! # Invariants
//! - Every world mutation goes through the kernel's explicit operations;
//!   the service never touches tiles directly.
//! - A failed mining call reports "Sector depleted." and mutates nothing.

mod game;
mod wire;

pub use game::{Bulletin, BulletinKind, GameService};
pub use wire::MiningResponse;
