//! World state: every robot plus the tick counter.

use crate::config::{ArenaConfig, HitTiming};
use crate::game::{
    Command, Hit, Robot, RobotId, RobotSnapshot, StateView, TossOutcome, apply_move, apply_turn,
    resolve_toss,
};

/// Complete physical state of a match.
#[derive(Debug, Clone)]
pub struct World {
    /// Rules in force.
    pub config: ArenaConfig,
    /// All robots, sorted by id.
    pub robots: Vec<Robot>,
    /// Current tick (0-indexed).
    pub tick: u32,
}

impl World {
    /// Create a world. Robots are sorted by id.
    #[must_use]
    pub fn new(config: ArenaConfig, mut robots: Vec<Robot>) -> Self {
        robots.sort_by_key(|r| r.id);
        Self {
            config,
            robots,
            tick: 0,
        }
    }

    /// Get a robot by id.
    #[must_use]
    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.index_of(id).and_then(|i| self.robots.get(i))
    }

    /// Get a mutable robot by id.
    pub fn robot_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.index_of(id).and_then(|i| self.robots.get_mut(i))
    }

    fn index_of(&self, id: RobotId) -> Option<usize> {
        self.robots.binary_search_by_key(&id, |r| r.id).ok()
    }

    /// Snapshot every robot.
    #[must_use]
    pub fn snapshot_all(&self) -> Vec<RobotSnapshot> {
        self.robots.iter().map(Robot::snapshot).collect()
    }

    /// The read-only view a robot's script receives this tick.
    #[must_use]
    pub fn snapshot(&self, id: RobotId) -> Option<StateView> {
        self.robot(id).map(|r| StateView::new(self.tick, &r.snapshot()))
    }

    /// Ids of living robots in ascending order.
    #[must_use]
    pub fn alive_ids(&self) -> Vec<RobotId> {
        self.robots.iter().filter(|r| r.is_alive()).map(|r| r.id).collect()
    }

    /// Number of living robots.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.robots.iter().filter(|r| r.is_alive()).count()
    }

    /// Apply one command to a robot.
    ///
    /// Turn and move mutate the robot immediately. A toss starts the
    /// cooldown and reports any hit, but the damage is left to
    /// [`World::apply_hits`]. `start` holds the start-of-tick snapshots used
    /// when hits are checked against start-of-tick positions. Scan commands
    /// have no effect here.
    pub fn apply(&mut self, id: RobotId, command: Command, start: &[RobotSnapshot]) -> Option<TossOutcome> {
        let index = self.index_of(id)?;
        if !self.robots.get(index).is_some_and(Robot::is_alive) {
            return None;
        }
        match command {
            Command::Turn { degrees } => {
                let robot = self.robots.get_mut(index)?;
                apply_turn(robot, degrees, &self.config);
                None
            }
            Command::Move { distance } => {
                apply_move(&mut self.robots, index, distance, &self.config);
                None
            }
            Command::Toss { distance } => Some(self.toss(index, distance, start)),
            Command::Scan { .. } => None,
        }
    }

    fn toss(&mut self, index: usize, distance: f64, start: &[RobotSnapshot]) -> TossOutcome {
        let tick = self.tick;
        let cooldown = self.config.toss_cooldown;
        let Some(range) = self.config.clamp_toss(distance) else {
            return TossOutcome::Invalid;
        };
        let Some(robot) = self.robots.get_mut(index) else {
            return TossOutcome::Invalid;
        };
        if !robot.can_toss(tick) {
            return TossOutcome::CoolingDown;
        }
        robot.toss_ready_at = tick.saturating_add(cooldown);
        robot.stats.tosses += 1;
        let (thrower, origin, heading) = (robot.id, robot.position, robot.heading);

        let hit = match self.config.hit_timing {
            HitTiming::StartOfTick => {
                let origin = start
                    .iter()
                    .find(|s| s.id == thrower)
                    .map_or(origin, |s| s.position);
                resolve_toss(thrower, origin, heading, range, start, &self.config)
            }
            HitTiming::EndOfTick => {
                let now = self.snapshot_all();
                resolve_toss(thrower, origin, heading, range, &now, &self.config)
            }
        };
        match hit {
            Some(hit) => TossOutcome::Hit(hit),
            None => TossOutcome::Miss,
        }
    }

    /// Apply a batch of hits at once.
    ///
    /// Every hit lands even when its thrower dies from another hit in the
    /// same batch.
    pub fn apply_hits(&mut self, hits: &[Hit]) {
        for hit in hits {
            if let Some(thrower) = self.robot_mut(hit.thrower) {
                thrower.stats.hits_landed += 1;
            }
            if let Some(target) = self.robot_mut(hit.target) {
                target.take_damage(hit.damage);
            }
        }
    }
}
