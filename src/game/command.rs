//! Commands issued by scripts.

use serde::{Deserialize, Serialize};

/// Scan calls beyond this many per tick are counted but not logged.
pub const MAX_LOGGED_SCANS: usize = 8;

/// A single command issued through the script API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Move along the heading by a signed distance.
    Move {
        /// Requested distance.
        distance: f64,
    },
    /// Rotate by a signed number of degrees.
    Turn {
        /// Requested rotation.
        degrees: f64,
    },
    /// Throw along the heading.
    Toss {
        /// Requested throw distance.
        distance: f64,
    },
    /// Observe a world-frame cone.
    Scan {
        /// Cone centre in degrees.
        angle: f64,
        /// Total cone width in degrees.
        resolution: f64,
    },
}

/// Commands a robot issued during one tick.
///
/// Move, turn and toss each hold one slot; a later call of the same kind
/// replaces the earlier one. Scans take effect immediately and are only
/// logged here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSet {
    /// Pending rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<f64>,
    /// Pending move distance.
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub movement: Option<f64>,
    /// Pending toss distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toss: Option<f64>,
    /// Scan calls made (first [`MAX_LOGGED_SCANS`] only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scans: Vec<(f64, f64)>,
    /// Total scan calls made.
    #[serde(skip_serializing_if = "is_zero")]
    pub scan_count: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl CommandSet {
    /// Record a command, replacing any earlier command of the same kind.
    pub fn record(&mut self, command: Command) {
        match command {
            Command::Move { distance } => self.movement = Some(distance),
            Command::Turn { degrees } => self.turn = Some(degrees),
            Command::Toss { distance } => self.toss = Some(distance),
            Command::Scan { angle, resolution } => {
                self.scan_count = self.scan_count.saturating_add(1);
                if self.scans.len() < MAX_LOGGED_SCANS {
                    self.scans.push((angle, resolution));
                }
            }
        }
    }

    /// Effective commands in application order: turn, move, toss.
    #[must_use]
    pub fn effective(&self) -> Vec<Command> {
        let mut out = Vec::with_capacity(3);
        if let Some(degrees) = self.turn {
            out.push(Command::Turn { degrees });
        }
        if let Some(distance) = self.movement {
            out.push(Command::Move { distance });
        }
        if let Some(distance) = self.toss {
            out.push(Command::Toss { distance });
        }
        out
    }

    /// Whether nothing was issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turn.is_none() && self.movement.is_none() && self.toss.is_none() && self.scan_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut set = CommandSet::default();
        set.record(Command::Turn { degrees: 45.0 });
        set.record(Command::Move { distance: 3.0 });
        set.record(Command::Turn { degrees: -10.0 });
        assert_eq!(set.turn, Some(-10.0));
        assert_eq!(set.movement, Some(3.0));
        assert!(set.toss.is_none());
    }

    #[test]
    fn test_effective_order_is_turn_move_toss() {
        let mut set = CommandSet::default();
        set.record(Command::Toss { distance: 50.0 });
        set.record(Command::Move { distance: 5.0 });
        set.record(Command::Turn { degrees: 90.0 });
        let cmds = set.effective();
        assert_eq!(
            cmds,
            vec![
                Command::Turn { degrees: 90.0 },
                Command::Move { distance: 5.0 },
                Command::Toss { distance: 50.0 },
            ]
        );
    }

    #[test]
    fn test_scans_are_logged_not_queued() {
        let mut set = CommandSet::default();
        for i in 0..20 {
            set.record(Command::Scan {
                angle: f64::from(i),
                resolution: 45.0,
            });
        }
        assert_eq!(set.scan_count, 20);
        assert_eq!(set.scans.len(), MAX_LOGGED_SCANS);
        assert!(set.effective().is_empty());
        assert!(!set.is_empty());
    }
}
