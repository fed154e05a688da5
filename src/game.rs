//! Game layer for the arena.
//!
//! Implements the rules of a match:
//! - Robots with position, heading, health and toss cooldown
//! - Movement with wall and contact truncation
//! - Cone scanning against start-of-tick snapshots
//! - Instantaneous toss resolution
//! - World state and invariant checks

mod command;
pub mod invariants;
mod physics;
mod projectile;
mod robot;
mod scanner;
mod world;

pub use command::{Command, CommandSet, MAX_LOGGED_SCANS};
pub use physics::{apply_move, apply_turn, clamp_to_bounds, reach_within_bounds};
pub use projectile::{Hit, TossOutcome, resolve_toss};
pub use robot::{Robot, RobotId, RobotSnapshot, RobotStats, StateView};
pub use scanner::{ScanResult, scan};
pub use world::World;
