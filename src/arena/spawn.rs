//! Deterministic starting positions.

// Spawn generation uses intentional casts for RNG operations
#![allow(clippy::cast_precision_loss)]

use crate::config::{ArenaConfig, Bounds};
use crate::error::ConfigError;
use crate::geometry::{FULL_TURN, Vec2, distance, normalize};

/// Placement attempts per robot before giving up on a spacing.
const MAX_ATTEMPTS: usize = 1_000;

/// Fraction of each half-extent kept clear along the walls.
const WALL_MARGIN: f64 = 0.1;

/// Deterministic PRNG using xorshift64.
#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate random f64 in [0, 1].
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    /// Generate random f64 in [lo, hi].
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        (hi - lo).mul_add(self.next_f64(), lo)
    }
}

/// A generated starting pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    /// Starting position.
    pub position: Vec2,
    /// Starting heading.
    pub heading: f64,
}

/// Generate `count` starting poses from `seed`.
///
/// Robots are kept away from the walls and spread at least four times the
/// minimum separation apart when there is room, falling back to the
/// minimum separation otherwise. Unbounded arenas use the default bounds
/// as the spawn area.
///
/// # Errors
///
/// Returns an error if the robots cannot be placed.
pub fn spawn_positions(seed: u64, count: usize, config: &ArenaConfig) -> Result<Vec<Spawn>, ConfigError> {
    let area = config.bounds.unwrap_or_default();
    let preferred = config.min_separation.max(1.0) * 4.0;

    for spacing in [preferred, config.min_separation] {
        let mut rng = Rng::new(seed);
        if let Some(spawns) = try_place(&mut rng, count, &area, spacing) {
            return Ok(spawns);
        }
    }
    Err(ConfigError::invalid(
        "bounds",
        format!("cannot place {count} robots {} apart", config.min_separation),
    ))
}

fn try_place(rng: &mut Rng, count: usize, area: &Bounds, spacing: f64) -> Option<Vec<Spawn>> {
    let hw = area.half_width() * (1.0 - WALL_MARGIN);
    let hh = area.half_height() * (1.0 - WALL_MARGIN);
    let mut spawns: Vec<Spawn> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut placed = false;
        for _ in 0..MAX_ATTEMPTS {
            let candidate = Vec2::new(rng.range(-hw, hw), rng.range(-hh, hh));
            if spawns.iter().all(|s| distance(s.position, candidate) >= spacing) {
                spawns.push(Spawn {
                    position: candidate,
                    heading: normalize(rng.next_f64() * FULL_TURN),
                });
                placed = true;
                break;
            }
        }
        if !placed {
            return None;
        }
    }
    Some(spawns)
}
