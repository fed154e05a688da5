//! Toss resolution.
//!
//! A toss is an instantaneous line segment from the thrower along its
//! heading. The nearest living robot whose centre lies within `hit_radius`
//! of the segment is hit. Damage is not applied here; callers collect hits
//! and apply them together so that mutual kills are possible.

use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::game::{RobotId, RobotSnapshot};
use crate::geometry::{Vec2, project_onto_ray};

/// A toss that connected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Robot that threw.
    pub thrower: RobotId,
    /// Robot that was struck.
    pub target: RobotId,
    /// Distance along the throw line to the target.
    pub distance: f64,
    /// Health to remove.
    pub damage: u32,
}

/// What happened to a toss request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TossOutcome {
    /// The toss struck a robot.
    Hit(Hit),
    /// The toss was thrown and struck nothing.
    Miss,
    /// Rejected because the thrower is still cooling down.
    CoolingDown,
    /// Rejected because the requested distance was not a number.
    Invalid,
}

/// Resolve a toss of `distance` from `origin` along `heading`.
///
/// `candidates` are the robots that may be struck; the thrower and dead
/// robots among them are skipped. Ties on distance go to the lower id.
#[must_use]
pub fn resolve_toss(
    thrower: RobotId,
    origin: Vec2,
    heading: f64,
    distance: f64,
    candidates: &[RobotSnapshot],
    config: &ArenaConfig,
) -> Option<Hit> {
    let dir = Vec2::from_heading(heading);
    candidates
        .iter()
        .filter(|c| c.id != thrower && c.is_alive())
        .filter_map(|c| {
            let (along, across) = project_onto_ray(origin, dir, c.position);
            (along > 0.0 && along <= distance && across <= config.hit_radius).then_some((along, c.id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(along, target)| Hit {
            thrower,
            target,
            distance: along,
            damage: config.toss_damage,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(id: RobotId, x: f64, y: f64) -> RobotSnapshot {
        RobotSnapshot {
            id,
            position: Vec2::new(x, y),
            heading: 0.0,
            health: 100,
        }
    }

    #[test]
    fn test_direct_hit() {
        let config = ArenaConfig::default();
        let snaps = [snap(1, 0.0, 0.0), snap(2, 0.0, 50.0)];
        let hit = resolve_toss(1, Vec2::ZERO, 0.0, 100.0, &snaps, &config).unwrap();
        assert_eq!(hit.target, 2);
        assert_eq!(hit.damage, config.toss_damage);
        assert!((hit.distance - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_toss_misses() {
        let config = ArenaConfig::default();
        let snaps = [snap(1, 0.0, 0.0), snap(2, 0.0, 50.0)];
        assert!(resolve_toss(1, Vec2::ZERO, 0.0, 40.0, &snaps, &config).is_none());
    }

    #[test]
    fn test_hit_radius_edge() {
        let config = ArenaConfig::default();
        let snaps = [snap(1, 0.0, 0.0), snap(2, 5.0, 50.0), snap(3, -5.1, 60.0)];
        let hit = resolve_toss(1, Vec2::ZERO, 0.0, 100.0, &snaps, &config).unwrap();
        assert_eq!(hit.target, 2);
    }

    #[test]
    fn test_behind_thrower_not_hit() {
        let config = ArenaConfig::default();
        let snaps = [snap(1, 0.0, 0.0), snap(2, 0.0, -20.0)];
        assert!(resolve_toss(1, Vec2::ZERO, 0.0, 100.0, &snaps, &config).is_none());
    }

    #[test]
    fn test_nearest_candidate_wins() {
        let config = ArenaConfig::default();
        let snaps = [snap(1, 0.0, 0.0), snap(2, 0.0, 80.0), snap(3, 1.0, 30.0)];
        let hit = resolve_toss(1, Vec2::ZERO, 0.0, 100.0, &snaps, &config).unwrap();
        assert_eq!(hit.target, 3);
    }

    #[test]
    fn test_dead_candidates_ignored() {
        let config = ArenaConfig::default();
        let mut dead = snap(2, 0.0, 30.0);
        dead.health = 0;
        let snaps = [snap(1, 0.0, 0.0), dead, snap(3, 0.0, 60.0)];
        let hit = resolve_toss(1, Vec2::ZERO, 0.0, 100.0, &snaps, &config).unwrap();
        assert_eq!(hit.target, 3);
    }

    #[test]
    fn test_toss_east() {
        let config = ArenaConfig::default();
        let snaps = [snap(1, 0.0, 0.0), snap(2, 70.0, 0.0)];
        let hit = resolve_toss(1, Vec2::ZERO, 90.0, 100.0, &snaps, &config);
        assert_eq!(hit.map(|h| h.target), Some(2));
    }
}
