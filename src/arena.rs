//! Arena game loop.
//!
//! The arena owns the tick clock. Each tick it:
//! 1. Snapshots every robot
//! 2. Runs each living robot's script in ascending id order
//! 3. Applies turns then moves, robot by robot
//! 4. Resolves tosses and collects hits
//! 5. Applies all damage at once
//! 6. Advances the clock and checks for a finish
//!
//! Given the same robots, scripts, configuration and seed, a match always
//! plays out identically.

mod spawn;

use std::convert::Infallible;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use spawn::{Rng, Spawn, spawn_positions};

use crate::config::{ArenaConfig, TimeoutOutcome};
use crate::error::{ConfigError, MatchError};
use crate::game::{
    Command, CommandSet, Hit, Robot, RobotId, RobotSnapshot, StateView, TossOutcome, World,
};
use crate::geometry::{Vec2, distance};
use crate::sandbox::{Sandbox, Script};
use crate::scenario::Scenario;
use crate::transcript::TranscriptWriter;

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// One robot won.
    Winner(RobotId),
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// The winning robot, if any.
    #[must_use]
    pub const fn winner(self) -> Option<RobotId> {
        match self {
            Self::Winner(id) => Some(id),
            Self::Draw => None,
        }
    }
}

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Ticks are still being played.
    Running,
    /// The match is over.
    Finished(Outcome),
}

/// A robot together with the script that drives it.
pub struct Entrant {
    /// Starting state.
    pub robot: Robot,
    /// Controlling script.
    pub script: Box<dyn Script>,
}

impl std::fmt::Debug for Entrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entrant")
            .field("robot", &self.robot)
            .finish_non_exhaustive()
    }
}

/// Commands one robot issued on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCommands {
    /// Robot.
    pub id: RobotId,
    /// What it issued.
    pub commands: CommandSet,
}

/// A script fault on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    /// Robot whose script faulted.
    pub id: RobotId,
    /// Description of the fault.
    pub fault: String,
}

/// A script API misuse on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Robot whose script misused the API.
    pub id: RobotId,
    /// Primitive involved.
    pub api: String,
    /// What was wrong.
    pub warning: String,
    /// Arguments as passed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// A toss and its result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TossRecord {
    /// Thrower.
    pub id: RobotId,
    /// Result.
    pub outcome: TossOutcome,
}

/// Everything that happened on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Tick index that was played.
    pub tick: u32,
    /// Robot states at the end of the tick.
    pub robots: Vec<RobotSnapshot>,
    /// Commands issued by robots whose scripts succeeded.
    pub commands: Vec<IssuedCommands>,
    /// Scripts that faulted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<FaultRecord>,
    /// API misuse, at most [`MAX_WARNINGS`](crate::sandbox::MAX_WARNINGS) per robot.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningRecord>,
    /// Tosses thrown, hit or miss.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tosses: Vec<TossRecord>,
    /// Robots that died this tick.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deaths: Vec<RobotId>,
    /// Robots removed for repeated faults this tick.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forfeits: Vec<RobotId>,
}

/// Final state of one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotReport {
    /// Robot identifier.
    pub id: RobotId,
    /// Display name.
    pub name: String,
    /// Remaining health.
    pub health: u32,
    /// Whether the robot survived.
    pub alive: bool,
    /// Final position.
    pub position: Vec2,
    /// Final heading.
    pub heading: f64,
    /// Tosses thrown.
    pub tosses: u32,
    /// Tosses that hit.
    pub hits_landed: u32,
    /// Damage received.
    pub damage_taken: u32,
    /// Script faults.
    pub faults: u32,
    /// Whether the robot was removed for repeated faults.
    pub forfeited: bool,
}

/// Result of a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Scenario name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// How the match ended.
    pub outcome: Outcome,
    /// Ticks played.
    pub ticks: u32,
    /// Seed the match ran with.
    pub seed: u64,
    /// Final state of every robot, by id.
    pub robots: Vec<RobotReport>,
}

impl MatchReport {
    /// Report for `id`.
    #[must_use]
    pub fn robot(&self, id: RobotId) -> Option<&RobotReport> {
        self.robots.iter().find(|r| r.id == id)
    }

    /// Name of the winner, if any.
    #[must_use]
    pub fn winner_name(&self) -> Option<&str> {
        self.outcome
            .winner()
            .and_then(|id| self.robot(id))
            .map(|r| r.name.as_str())
    }
}

/// A match in progress.
#[derive(Debug)]
pub struct Arena {
    world: World,
    sandbox: Sandbox,
    state: MatchState,
    seed: u64,
}

impl Arena {
    /// Set up a match.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or any robot's starting state
    /// is invalid.
    pub fn new(config: ArenaConfig, entrants: Vec<Entrant>, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut robots = Vec::with_capacity(entrants.len());
        let mut sandbox = Sandbox::new();
        for entrant in entrants {
            sandbox.insert(entrant.robot.id, entrant.script);
            robots.push(entrant.robot);
        }
        validate_start(&config, &robots)?;

        let world = World::new(config, robots);
        tracing::info!(
            robots = world.robots.len(),
            seed,
            max_ticks = config.max_ticks,
            "match starting"
        );
        Ok(Self {
            world,
            sandbox,
            state: MatchState::Running,
            seed,
        })
    }

    /// Current world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MatchState {
        self.state
    }

    /// Whether the match is over.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, MatchState::Finished(_))
    }

    /// Seed the match was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Play one tick. Returns `None` once the match is over.
    pub fn step(&mut self) -> Option<TickRecord> {
        if self.is_finished() {
            return None;
        }
        let tick = self.world.tick;
        let config = self.world.config;

        // Phase 1: snapshot
        let start: Rc<[RobotSnapshot]> = Rc::from(self.world.snapshot_all());
        let mut record = TickRecord {
            tick,
            robots: Vec::new(),
            commands: Vec::new(),
            faults: Vec::new(),
            warnings: Vec::new(),
            tosses: Vec::new(),
            deaths: Vec::new(),
            forfeits: Vec::new(),
        };

        // Phase 2: scripts, ascending id
        let mut issued: Vec<IssuedCommands> = Vec::with_capacity(start.len());
        for snap in start.iter().filter(|s| s.is_alive()) {
            let invocation = self
                .sandbox
                .invoke(StateView::new(tick, snap), Rc::clone(&start), &config);
            let Some(robot) = self.world.robot_mut(snap.id) else {
                continue;
            };
            robot.stats.scans += invocation.commands.scan_count;
            record
                .warnings
                .extend(invocation.warnings.into_iter().map(|w| WarningRecord {
                    id: snap.id,
                    api: w.api.to_string(),
                    warning: w.warning.to_string(),
                    args: w.args,
                }));
            if let Some(fault) = invocation.fault {
                robot.stats.faults += 1;
                record.faults.push(FaultRecord {
                    id: snap.id,
                    fault: fault.to_string(),
                });
            }
            if invocation.forfeit {
                robot.forfeit();
                record.forfeits.push(snap.id);
            }
            issued.push(IssuedCommands {
                id: snap.id,
                commands: invocation.commands,
            });
        }

        // Phase 3: turn then move
        for entry in &issued {
            if let Some(degrees) = entry.commands.turn {
                self.world.apply(entry.id, Command::Turn { degrees }, &start);
            }
            if let Some(distance) = entry.commands.movement {
                self.world.apply(entry.id, Command::Move { distance }, &start);
            }
        }

        // Phase 4: tosses
        let mut hits: Vec<Hit> = Vec::new();
        for entry in &issued {
            let Some(distance) = entry.commands.toss else {
                continue;
            };
            if let Some(outcome) = self.world.apply(entry.id, Command::Toss { distance }, &start) {
                if let TossOutcome::Hit(hit) = outcome {
                    tracing::debug!(tick, thrower = hit.thrower, target = hit.target, "toss hit");
                    hits.push(hit);
                }
                record.tosses.push(TossRecord {
                    id: entry.id,
                    outcome,
                });
            }
        }

        // Phase 5: simultaneous damage
        let alive_before: Vec<RobotId> = self.world.alive_ids();
        self.world.apply_hits(&hits);
        for id in alive_before {
            if self.world.robot(id).is_some_and(|r| !r.is_alive()) {
                tracing::info!(tick, robot_id = id, "robot destroyed");
                record.deaths.push(id);
            }
        }

        // Phase 6: clock and termination
        self.world.tick += 1;
        self.check_finished();

        // Phase 7: remember what each robot issued
        for entry in &issued {
            if let Some(robot) = self.world.robot_mut(entry.id) {
                robot.last_commands = entry.commands.clone();
            }
        }

        if cfg!(debug_assertions) {
            for violation in crate::game::invariants::check_invariants(&self.world) {
                tracing::error!(tick, "{violation}");
            }
        }

        record.robots = self.world.snapshot_all();
        record.commands = issued;
        tracing::debug!(tick, alive = self.world.alive_count(), "tick complete");
        Some(record)
    }

    /// Play until the match is over.
    pub fn run(&mut self) -> Outcome {
        match self.run_with(|_| Ok::<(), Infallible>(())) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Play until the match is over, handing every tick to `observe`.
    ///
    /// # Errors
    ///
    /// Stops at the first error returned by `observe`.
    pub fn run_with<E>(&mut self, mut observe: impl FnMut(&TickRecord) -> Result<(), E>) -> Result<Outcome, E> {
        loop {
            if let MatchState::Finished(outcome) = self.state {
                return Ok(outcome);
            }
            if let Some(record) = self.step() {
                observe(&record)?;
            }
        }
    }

    /// Final report, once the match is over.
    #[must_use]
    pub fn report(&self) -> Option<MatchReport> {
        match self.state {
            MatchState::Running => None,
            MatchState::Finished(outcome) => Some(MatchReport {
                name: None,
                outcome,
                ticks: self.world.tick,
                seed: self.seed,
                robots: self
                    .world
                    .robots
                    .iter()
                    .map(|r| RobotReport {
                        id: r.id,
                        name: r.name.clone(),
                        health: r.health,
                        alive: r.is_alive(),
                        position: r.position,
                        heading: r.heading,
                        tosses: r.stats.tosses,
                        hits_landed: r.stats.hits_landed,
                        damage_taken: r.stats.damage_taken,
                        faults: r.stats.faults,
                        forfeited: r.forfeited,
                    })
                    .collect(),
            }),
        }
    }

    fn check_finished(&mut self) {
        if let Some(outcome) = self.evaluate() {
            tracing::info!(tick = self.world.tick, ?outcome, "match finished");
            self.state = MatchState::Finished(outcome);
        }
    }

    fn evaluate(&self) -> Option<Outcome> {
        let alive = self.world.alive_ids();
        match alive.as_slice() {
            [] => Some(Outcome::Draw),
            [id] => Some(Outcome::Winner(*id)),
            _ if self.world.tick >= self.world.config.max_ticks => Some(self.timeout_outcome()),
            _ => None,
        }
    }

    fn timeout_outcome(&self) -> Outcome {
        match self.world.config.timeout_outcome {
            TimeoutOutcome::Draw => Outcome::Draw,
            TimeoutOutcome::HighestHealth => {
                let alive: Vec<&Robot> = self.world.robots.iter().filter(|r| r.is_alive()).collect();
                let best = alive.iter().map(|r| r.health).max().unwrap_or(0);
                let mut leaders = alive.iter().filter(|r| r.health == best);
                match (leaders.next(), leaders.next()) {
                    (Some(leader), None) => Outcome::Winner(leader.id),
                    _ => Outcome::Draw,
                }
            }
        }
    }
}

/// Check robots' starting states against `config`.
///
/// # Errors
///
/// Returns the first problem found: robot count, duplicate ids, non-finite
/// or out-of-bounds positions, health outside `1..=max_health`, or two
/// robots closer than `min_separation`.
pub fn validate_start(config: &ArenaConfig, robots: &[Robot]) -> Result<(), ConfigError> {
    if robots.len() < 2 {
        return Err(ConfigError::TooFewRobots(robots.len()));
    }
    if robots.len() > config.max_robots {
        return Err(ConfigError::TooManyRobots {
            count: robots.len(),
            max: config.max_robots,
        });
    }
    for (index, robot) in robots.iter().enumerate() {
        let invalid = |reason: String| ConfigError::InvalidRobot { index, reason };
        if robots[..index].iter().any(|r| r.id == robot.id) {
            return Err(invalid(format!("duplicate id {}", robot.id)));
        }
        if !robot.position.is_finite() || !robot.heading.is_finite() {
            return Err(invalid("position and heading must be finite".to_string()));
        }
        if let Some(bounds) = config.bounds
            && !bounds.contains(robot.position.x, robot.position.y)
        {
            return Err(invalid(format!(
                "start ({}, {}) is outside the arena",
                robot.position.x, robot.position.y
            )));
        }
        if robot.health == 0 || robot.health > config.max_health {
            return Err(invalid(format!(
                "health {} must be between 1 and {}",
                robot.health, config.max_health
            )));
        }
        if let Some(other) = robots[..index]
            .iter()
            .find(|r| distance(r.position, robot.position) < config.min_separation)
        {
            return Err(invalid(format!(
                "starts closer than {} to robot {}",
                config.min_separation, other.id
            )));
        }
    }
    Ok(())
}

/// Load a scenario, play it to the end and report.
///
/// Every tick is written to `transcript` when one is given.
///
/// # Errors
///
/// Returns an error if the scenario is invalid, a script fails to load,
/// or the transcript cannot be written.
pub fn run_match<W: std::io::Write>(
    scenario: &Scenario,
    mut transcript: Option<&mut TranscriptWriter<W>>,
) -> Result<MatchReport, MatchError> {
    let mut arena = scenario.build()?;
    let outcome = match transcript.as_deref_mut() {
        Some(writer) => {
            writer.write_meta(scenario, arena.world())?;
            arena.run_with(|record| writer.write_tick(record))?
        }
        None => arena.run(),
    };

    let mut report = arena.report().unwrap_or_else(|| MatchReport {
        name: None,
        outcome,
        ticks: arena.world().tick,
        seed: arena.seed(),
        robots: Vec::new(),
    });
    report.name.clone_from(&scenario.name);

    if let Some(writer) = transcript {
        writer.write_outcome(&report)?;
        writer.flush()?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HitTiming;
    use crate::sandbox::{Api, FnScript};

    fn idle() -> Box<dyn Script> {
        Box::new(FnScript(|_: &mut Api| {}))
    }

    fn entrant(id: RobotId, x: f64, y: f64, heading: f64, script: Box<dyn Script>) -> Entrant {
        Entrant {
            robot: Robot::new(id, format!("r{id}"), Vec2::new(x, y), heading, 100),
            script,
        }
    }

    #[test]
    fn test_idle_match_times_out_as_draw() {
        let config = ArenaConfig {
            max_ticks: 20,
            ..ArenaConfig::default()
        };
        let mut arena = Arena::new(
            config,
            vec![entrant(1, -50.0, 0.0, 0.0, idle()), entrant(2, 50.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        assert_eq!(arena.run(), Outcome::Draw);
        let report = arena.report().unwrap();
        assert_eq!(report.ticks, 20);
        assert!(report.robots.iter().all(|r| r.alive && r.health == 100));
    }

    #[test]
    fn test_shooter_wins() {
        // Robot 1 faces east towards robot 2 and tosses whenever it can.
        let shooter = Box::new(FnScript(|api: &mut Api| api.toss(100.0)));
        let mut arena = Arena::new(
            ArenaConfig::default(),
            vec![entrant(1, -50.0, 0.0, 90.0, shooter), entrant(2, 50.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        assert_eq!(arena.run(), Outcome::Winner(1));
        let report = arena.report().unwrap();
        // Ten hits, one every ten ticks starting at tick 0.
        assert_eq!(report.ticks, 91);
        assert_eq!(report.robot(1).unwrap().hits_landed, 10);
        assert_eq!(report.robot(1).unwrap().tosses, 10);
        assert_eq!(report.robot(2).unwrap().health, 0);
        assert_eq!(report.winner_name(), Some("r1"));
    }

    #[test]
    fn test_mutual_kill_is_draw() {
        let shooter = || Box::new(FnScript(|api: &mut Api| api.toss(100.0))) as Box<dyn Script>;
        let mut a = entrant(1, 0.0, -25.0, 0.0, shooter());
        let mut b = entrant(2, 0.0, 25.0, 180.0, shooter());
        a.robot.health = 10;
        b.robot.health = 10;
        let mut arena = Arena::new(ArenaConfig::default(), vec![a, b], 0).unwrap();
        assert_eq!(arena.run(), Outcome::Draw);
        assert_eq!(arena.world().tick, 1);
    }

    #[test]
    fn test_highest_health_timeout() {
        let config = ArenaConfig {
            max_ticks: 5,
            timeout_outcome: TimeoutOutcome::HighestHealth,
            ..ArenaConfig::default()
        };
        let shooter = Box::new(FnScript(|api: &mut Api| api.toss(100.0)));
        let mut arena = Arena::new(
            config,
            vec![entrant(1, 0.0, 0.0, 0.0, shooter), entrant(2, 0.0, 60.0, 0.0, idle())],
            0,
        )
        .unwrap();
        assert_eq!(arena.run(), Outcome::Winner(1));
    }

    #[test]
    fn test_highest_health_tie_is_draw() {
        let config = ArenaConfig {
            max_ticks: 3,
            timeout_outcome: TimeoutOutcome::HighestHealth,
            ..ArenaConfig::default()
        };
        let mut arena = Arena::new(
            config,
            vec![entrant(1, -50.0, 0.0, 0.0, idle()), entrant(2, 50.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        assert_eq!(arena.run(), Outcome::Draw);
    }

    #[test]
    fn test_start_of_tick_dodge_still_hit() {
        // Target steps east out of the line on the same tick it is fired at.
        let shooter = Box::new(FnScript(|api: &mut Api| api.toss(100.0)));
        let dodger = Box::new(FnScript(|api: &mut Api| api.move_by(10.0)));
        let mut arena = Arena::new(
            ArenaConfig::default(),
            vec![entrant(1, 0.0, 0.0, 0.0, shooter), entrant(2, 0.0, 50.0, 90.0, dodger)],
            0,
        )
        .unwrap();
        let record = arena.step().unwrap();
        assert!(matches!(record.tosses[0].outcome, TossOutcome::Hit(_)));
        assert_eq!(arena.world().robot(2).unwrap().health, 90);
    }

    #[test]
    fn test_end_of_tick_dodge_escapes() {
        let config = ArenaConfig {
            hit_timing: HitTiming::EndOfTick,
            ..ArenaConfig::default()
        };
        let shooter = Box::new(FnScript(|api: &mut Api| api.toss(100.0)));
        let dodger = Box::new(FnScript(|api: &mut Api| api.move_by(10.0)));
        let mut arena = Arena::new(
            config,
            vec![entrant(1, 0.0, 0.0, 0.0, shooter), entrant(2, 0.0, 50.0, 90.0, dodger)],
            0,
        )
        .unwrap();
        let record = arena.step().unwrap();
        assert_eq!(record.tosses[0].outcome, TossOutcome::Miss);
    }

    #[test]
    fn test_turn_applies_before_toss() {
        // Robot 1 faces north, turns east and tosses on the same tick.
        let shooter = Box::new(FnScript(|api: &mut Api| {
            api.turn(90.0);
            api.toss(100.0);
        }));
        let mut arena = Arena::new(
            ArenaConfig::default(),
            vec![entrant(1, 0.0, 0.0, 0.0, shooter), entrant(2, 50.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        let record = arena.step().unwrap();
        assert!(matches!(record.tosses[0].outcome, TossOutcome::Hit(_)));
    }

    #[test]
    fn test_faulting_robot_loses_tick_only() {
        let mut ticks = 0;
        let flaky = Box::new(FnScript(move |api: &mut Api| {
            ticks += 1;
            api.move_by(5.0);
            assert!(ticks != 1, "first tick fails");
        }));
        let mut arena = Arena::new(
            ArenaConfig::default(),
            vec![entrant(1, 0.0, 0.0, 0.0, flaky), entrant(2, 100.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        let first = arena.step().unwrap();
        assert_eq!(first.faults.len(), 1);
        assert!(arena.world().robot(1).unwrap().position.y.abs() < 1e-9);
        let second = arena.step().unwrap();
        assert!(second.faults.is_empty());
        assert!((arena.world().robot(1).unwrap().position.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_forfeit_ends_match() {
        let config = ArenaConfig {
            max_consecutive_faults: Some(3),
            ..ArenaConfig::default()
        };
        let broken = Box::new(FnScript(|_: &mut Api| panic!("broken")));
        let mut arena = Arena::new(
            config,
            vec![entrant(1, 0.0, 0.0, 0.0, broken), entrant(2, 100.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        assert_eq!(arena.run(), Outcome::Winner(2));
        let report = arena.report().unwrap();
        assert_eq!(report.ticks, 3);
        assert!(report.robot(1).unwrap().forfeited);
    }

    #[test]
    fn test_last_commands_recorded() {
        let mover = Box::new(FnScript(|api: &mut Api| {
            api.turn(10.0);
            api.turn(20.0);
        }));
        let mut arena = Arena::new(
            ArenaConfig::default(),
            vec![entrant(1, 0.0, 0.0, 0.0, mover), entrant(2, 100.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        arena.step();
        let robot = arena.world().robot(1).unwrap();
        assert_eq!(robot.last_commands.turn, Some(20.0));
        assert!((robot.heading - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_api_misuse_lands_in_tick_record() {
        let chatty = Box::new(FnScript(|api: &mut Api| {
            for _ in 0..5 {
                api.toss(30.0);
            }
        }));
        let mut arena = Arena::new(
            ArenaConfig::default(),
            vec![entrant(1, 0.0, 0.0, 0.0, chatty), entrant(2, 100.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        let record = arena.step().unwrap();
        assert_eq!(record.warnings.len(), crate::sandbox::MAX_WARNINGS);
        assert!(record.warnings.iter().all(|w| w.id == 1 && w.api == "toss"));
        assert_eq!(record.warnings[0].args, vec!["30".to_string()]);
        assert_eq!(record.tosses.len(), 1);
    }

    #[test]
    fn test_validate_start_rejects_overlap() {
        let config = ArenaConfig::default();
        let robots = vec![
            Robot::new(1, "a", Vec2::ZERO, 0.0, 100),
            Robot::new(2, "b", Vec2::new(5.0, 0.0), 0.0, 100),
        ];
        assert!(matches!(
            validate_start(&config, &robots),
            Err(ConfigError::InvalidRobot { index: 1, .. })
        ));
    }

    #[test]
    fn test_validate_start_rejects_counts_and_health() {
        let config = ArenaConfig::default();
        let one = vec![Robot::new(1, "a", Vec2::ZERO, 0.0, 100)];
        assert!(matches!(validate_start(&config, &one), Err(ConfigError::TooFewRobots(1))));

        let robots = vec![
            Robot::new(1, "a", Vec2::ZERO, 0.0, 100),
            Robot::new(2, "b", Vec2::new(50.0, 0.0), 0.0, 0),
        ];
        assert!(validate_start(&config, &robots).is_err());

        let robots = vec![
            Robot::new(1, "a", Vec2::ZERO, 0.0, 100),
            Robot::new(1, "b", Vec2::new(50.0, 0.0), 0.0, 100),
        ];
        assert!(validate_start(&config, &robots).is_err());
    }

    #[test]
    fn test_step_after_finish_is_none() {
        let config = ArenaConfig {
            max_ticks: 1,
            ..ArenaConfig::default()
        };
        let mut arena = Arena::new(
            config,
            vec![entrant(1, -50.0, 0.0, 0.0, idle()), entrant(2, 50.0, 0.0, 0.0, idle())],
            0,
        )
        .unwrap();
        assert!(arena.step().is_some());
        assert!(arena.is_finished());
        assert!(arena.step().is_none());
    }
}
