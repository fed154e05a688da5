//! World invariants - sanity checks that detect bugs.
//!
//! These should never trigger in a correctly implemented engine. The arena
//! checks them after every tick in debug builds; tests call them directly.

use crate::game::World;
use crate::geometry::{FULL_TURN, distance};

/// Slack allowed on separation checks for floating-point rounding.
pub const SEPARATION_EPSILON: f64 = 1e-6;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let config = &world.config;

    for robot in &world.robots {
        if !(0.0..FULL_TURN).contains(&robot.heading) {
            violations.push(InvariantViolation {
                message: format!("Robot {} heading {} outside [0, 360)", robot.id, robot.heading),
            });
        }
        if !robot.position.is_finite() {
            violations.push(InvariantViolation {
                message: format!("Robot {} has non-finite position {:?}", robot.id, robot.position),
            });
        }
        if robot.health > config.max_health {
            violations.push(InvariantViolation {
                message: format!(
                    "Robot {} health {} > max {}",
                    robot.id, robot.health, config.max_health
                ),
            });
        }
        if robot.forfeited && robot.health > 0 {
            violations.push(InvariantViolation {
                message: format!("Robot {} forfeited but still has health", robot.id),
            });
        }
        if let Some(bounds) = config.bounds
            && !bounds.contains(robot.position.x, robot.position.y)
        {
            violations.push(InvariantViolation {
                message: format!("Robot {} at {:?} is out of bounds", robot.id, robot.position),
            });
        }
    }

    let alive: Vec<_> = world.robots.iter().filter(|r| r.is_alive()).collect();
    for (i, a) in alive.iter().enumerate() {
        for b in alive.iter().skip(i + 1) {
            let d = distance(a.position, b.position);
            if d + SEPARATION_EPSILON < config.min_separation {
                violations.push(InvariantViolation {
                    message: format!(
                        "Robots {} and {} are {d} apart (min {})",
                        a.id, b.id, config.min_separation
                    ),
                });
            }
        }
    }

    violations
}
