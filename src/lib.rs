// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Tickarena: a deterministic, tick-driven robot combat arena.
//!
//! Robots are driven by sandboxed scripts that may only observe the world
//! through a per-tick capability object. Each tick every script runs
//! against the same start-of-tick snapshot, and the arena then applies
//! turns, moves, tosses and damage in a fixed order, so a match is a pure
//! function of its robots, scripts, configuration and seed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   League / Scenario / Transcript    │
//! ├─────────────────────────────────────┤
//! │        Arena (game loop)            │
//! ├──────────────────┬──────────────────┤
//! │  Game rules      │  Script sandbox  │
//! │  (world physics) │  (Lua via mlua)  │
//! ├──────────────────┴──────────────────┤
//! │            Geometry                 │
//! └─────────────────────────────────────┘
//! ```

pub mod arena;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod league;
pub mod sandbox;
pub mod scenario;
pub mod transcript;

pub use arena::{Arena, Entrant, MatchReport, MatchState, Outcome, TickRecord, run_match};
pub use config::{ArenaConfig, Bounds, HitTiming, TimeoutOutcome};
pub use error::{ConfigError, LoadError, MatchError, ScriptFault};
pub use game::{Command, Robot, RobotId, StateView, World};
pub use geometry::Vec2;
pub use sandbox::{Api, FnScript, LuaScript, Script};
pub use scenario::Scenario;
