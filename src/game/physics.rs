//! Movement and rotation.
//!
//! Moves are resolved one robot at a time in ascending id order. A move is
//! truncated where its ray leaves the arena and where it would first bring
//! the mover within `min_separation` of another living robot, so no robot
//! ever tunnels through another.

use crate::config::{ArenaConfig, Bounds};
use crate::game::Robot;
use crate::geometry::{Vec2, first_contact};

/// Apply a rotation request to `robot`. Returns the rotation actually made.
pub fn apply_turn(robot: &mut Robot, degrees: f64, config: &ArenaConfig) -> f64 {
    let delta = config.clamp_turn(degrees);
    robot.rotate(delta);
    delta
}

/// Apply a move request to `robots[index]` along its current heading.
///
/// Returns the distance actually travelled (always non-negative).
pub fn apply_move(robots: &mut [Robot], index: usize, distance: f64, config: &ArenaConfig) -> f64 {
    let Some(mover) = robots.get(index) else {
        return 0.0;
    };
    let requested = config.clamp_move(distance);
    if requested == 0.0 {
        return 0.0;
    }

    let start = mover.position;
    let dir = Vec2::from_heading(mover.heading).scale(requested.signum());
    let mut reach = requested.abs();

    if let Some(bounds) = config.bounds {
        reach = reach.min(reach_within_bounds(start, dir, &bounds));
    }

    if config.min_separation > 0.0 {
        for (i, other) in robots.iter().enumerate() {
            if i == index || !other.is_alive() {
                continue;
            }
            if let Some(t) = first_contact(start, dir, reach, other.position, config.min_separation) {
                reach = reach.min(t);
            }
        }
    }

    let mut end = start + dir.scale(reach);
    if let Some(bounds) = config.bounds {
        end = clamp_to_bounds(end, &bounds);
    }

    let travelled = (end - start).length();
    if let Some(mover) = robots.get_mut(index) {
        mover.position = end;
    }
    travelled
}

/// Distance along `dir` from `start` before the ray leaves `bounds`.
#[must_use]
pub fn reach_within_bounds(start: Vec2, dir: Vec2, bounds: &Bounds) -> f64 {
    let axis = |pos: f64, step: f64, half: f64| -> f64 {
        if step > 0.0 {
            ((half - pos) / step).max(0.0)
        } else if step < 0.0 {
            ((-half - pos) / step).max(0.0)
        } else {
            f64::INFINITY
        }
    };
    axis(start.x, dir.x, bounds.half_width()).min(axis(start.y, dir.y, bounds.half_height()))
}

/// Snap a point onto the closed arena rectangle.
#[must_use]
pub fn clamp_to_bounds(point: Vec2, bounds: &Bounds) -> Vec2 {
    let hw = bounds.half_width();
    let hh = bounds.half_height();
    Vec2::new(point.x.clamp(-hw, hw), point.y.clamp(-hh, hh))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn robot(id: u8, x: f64, y: f64, heading: f64) -> Robot {
        Robot::new(id, format!("r{id}"), Vec2::new(x, y), heading, 100)
    }

    #[test]
    fn test_move_north() {
        let config = ArenaConfig::default();
        let mut robots = vec![robot(1, 0.0, 0.0, 0.0)];
        let moved = apply_move(&mut robots, 0, 10.0, &config);
        assert!((moved - 10.0).abs() < EPS);
        assert!(robots[0].position.x.abs() < EPS);
        assert!((robots[0].position.y - 10.0).abs() < EPS);
    }

    #[test]
    fn test_move_backwards() {
        let config = ArenaConfig::default();
        let mut robots = vec![robot(1, 0.0, 0.0, 90.0)];
        apply_move(&mut robots, 0, -5.0, &config);
        assert!((robots[0].position.x + 5.0).abs() < EPS);
    }

    #[test]
    fn test_move_clamped_to_max() {
        let config = ArenaConfig::default();
        let mut robots = vec![robot(1, 0.0, 0.0, 180.0)];
        let moved = apply_move(&mut robots, 0, 1000.0, &config);
        assert!((moved - config.max_move).abs() < EPS);
        assert!((robots[0].position.y + config.max_move).abs() < EPS);
    }

    #[test]
    fn test_move_stops_at_wall() {
        let config = ArenaConfig::default();
        let mut robots = vec![robot(1, 0.0, 495.0, 0.0)];
        let moved = apply_move(&mut robots, 0, 10.0, &config);
        assert!((moved - 5.0).abs() < EPS);
        assert!((robots[0].position.y - 500.0).abs() < EPS);

        let moved = apply_move(&mut robots, 0, 10.0, &config);
        assert!(moved.abs() < EPS);
        assert!((robots[0].position.y - 500.0).abs() < EPS);
    }

    #[test]
    fn test_diagonal_wall_truncates_along_ray() {
        let config = ArenaConfig::default();
        let mut robots = vec![robot(1, 498.0, 0.0, 45.0)];
        apply_move(&mut robots, 0, 10.0, &config);
        let p = robots[0].position;
        assert!((p.x - 500.0).abs() < EPS);
        // Truncated along the ray, not slid along the wall.
        assert!((p.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_move_blocked_by_robot() {
        let config = ArenaConfig::default();
        let mut robots = vec![robot(1, 0.0, 0.0, 0.0), robot(2, 0.0, 15.0, 0.0)];
        let moved = apply_move(&mut robots, 0, 10.0, &config);
        assert!((moved - 5.0).abs() < 1e-6);
        assert!((robots[0].position.y - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_dead_robots_do_not_block() {
        let config = ArenaConfig::default();
        let mut robots = vec![robot(1, 0.0, 0.0, 0.0), robot(2, 0.0, 15.0, 0.0)];
        robots[1].health = 0;
        let moved = apply_move(&mut robots, 0, 10.0, &config);
        assert!((moved - 10.0).abs() < EPS);
    }

    #[test]
    fn test_unbounded_arena() {
        let config = ArenaConfig {
            bounds: None,
            ..ArenaConfig::default()
        };
        let mut robots = vec![robot(1, 0.0, 5000.0, 0.0)];
        apply_move(&mut robots, 0, 10.0, &config);
        assert!((robots[0].position.y - 5010.0).abs() < EPS);
    }

    #[test]
    fn test_turn_clamped() {
        let config = ArenaConfig {
            max_turn: 45.0,
            ..ArenaConfig::default()
        };
        let mut r = robot(1, 0.0, 0.0, 0.0);
        let applied = apply_turn(&mut r, -90.0, &config);
        assert!((applied + 45.0).abs() < EPS);
        assert!((r.heading - 315.0).abs() < EPS);
    }
}
