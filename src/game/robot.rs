//! Robot state management.

use serde::{Deserialize, Serialize};

use crate::game::CommandSet;
use crate::geometry::{Vec2, normalize};

/// Unique identifier for a robot (1-based, stable for the whole match).
pub type RobotId = u8;

/// Per-robot counters accumulated over a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotStats {
    /// Tosses that were accepted (hits and misses).
    pub tosses: u32,
    /// Tosses that hit another robot.
    pub hits_landed: u32,
    /// Damage received.
    pub damage_taken: u32,
    /// Scan calls made.
    pub scans: u32,
    /// Ticks forfeited to script faults.
    pub faults: u32,
}

/// Arena-owned state for a single robot.
///
/// Scripts never see this directly; they get a [`StateView`].
#[derive(Debug, Clone)]
pub struct Robot {
    /// Unique identifier.
    pub id: RobotId,
    /// Display name.
    pub name: String,
    /// Current position.
    pub position: Vec2,
    /// Current heading in `[0, 360)`.
    pub heading: f64,
    /// Remaining health; the robot is dead at 0.
    pub health: u32,
    /// First tick at which another toss is accepted.
    pub toss_ready_at: u32,
    /// Whether the robot was removed for repeated faults.
    pub forfeited: bool,
    /// Commands issued on the most recent tick the robot acted.
    pub last_commands: CommandSet,
    /// Match counters.
    pub stats: RobotStats,
}

impl Robot {
    /// Create a new robot.
    #[must_use]
    pub fn new(id: RobotId, name: impl Into<String>, position: Vec2, heading: f64, health: u32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            heading: normalize(heading),
            health,
            toss_ready_at: 0,
            forfeited: false,
            last_commands: CommandSet::default(),
            stats: RobotStats::default(),
        }
    }

    /// Whether the robot still has health.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Rotate by `delta` degrees, keeping the heading normalized.
    pub fn rotate(&mut self, delta: f64) {
        self.heading = normalize(self.heading + delta);
    }

    /// Remove health, flooring at zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.health);
        self.health -= dealt;
        self.stats.damage_taken += dealt;
        dealt
    }

    /// Whether a toss is allowed on `tick`.
    #[must_use]
    pub const fn can_toss(&self, tick: u32) -> bool {
        tick >= self.toss_ready_at
    }

    /// Remove the robot from play permanently.
    pub fn forfeit(&mut self) {
        self.forfeited = true;
        self.health = 0;
    }

    /// Immutable copy of the physical state.
    #[must_use]
    pub const fn snapshot(&self) -> RobotSnapshot {
        RobotSnapshot {
            id: self.id,
            position: self.position,
            heading: self.heading,
            health: self.health,
        }
    }
}

/// Physical state of a robot frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotSnapshot {
    /// Robot identifier.
    pub id: RobotId,
    /// Position.
    pub position: Vec2,
    /// Heading in degrees.
    pub heading: f64,
    /// Health.
    pub health: u32,
}

impl RobotSnapshot {
    /// Whether the robot was alive at this instant.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Read-only state handed to a robot's script each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    /// Tick index, starting at 0.
    pub tick: u32,
    /// The robot's own identifier.
    pub id: RobotId,
    /// Own position at the start of the tick.
    pub position: Vec2,
    /// Own heading at the start of the tick.
    pub heading: f64,
    /// Own health at the start of the tick.
    pub health: u32,
}

impl StateView {
    /// Build the view of `snapshot` on `tick`.
    #[must_use]
    pub const fn new(tick: u32, snapshot: &RobotSnapshot) -> Self {
        Self {
            tick,
            id: snapshot.id,
            position: snapshot.position,
            heading: snapshot.heading,
            health: snapshot.health,
        }
    }
}
