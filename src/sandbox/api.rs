//! The capability object handed to a script for one tick.

use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::ArenaConfig;
use crate::game::{Command, CommandSet, RobotSnapshot, ScanResult, StateView, scan};

/// Warnings kept per robot per tick; later ones are dropped.
pub const MAX_WARNINGS: usize = 3;

pub(crate) const REPEATED_CALL: &str = "called multiple times in one tick";
pub(crate) const MISSING_ARGUMENT: &str = "missing argument";
pub(crate) const NOT_A_NUMBER: &str = "argument is not a number";
pub(crate) const TIMED_OUT: &str = "execution timed out";

/// A misuse of the script API that did not fault the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiWarning {
    /// Primitive that was misused.
    pub api: &'static str,
    /// What was wrong.
    pub warning: &'static str,
    /// Arguments as the script passed them.
    pub args: Vec<String>,
}

/// The only surface through which a script touches the world.
///
/// An `Api` is bound to one robot for one tick. Queries read the
/// start-of-tick snapshot; actions are recorded and applied by the arena
/// once every script has run.
#[derive(Debug, Clone, Default)]
pub struct Api {
    view: StateView,
    snapshots: Rc<[RobotSnapshot]>,
    config: ArenaConfig,
    deadline: Option<Instant>,
    commands: CommandSet,
    warnings: Vec<ApiWarning>,
}

impl Api {
    /// Bind a new API to the robot described by `view`.
    #[must_use]
    pub fn new(view: StateView, snapshots: Rc<[RobotSnapshot]>, config: ArenaConfig) -> Self {
        Self {
            view,
            snapshots,
            config,
            deadline: None,
            commands: CommandSet::default(),
            warnings: Vec::new(),
        }
    }

    /// Start the wall-clock budget for this invocation.
    pub(crate) fn start_clock(&mut self) {
        self.deadline = Some(Instant::now() + Duration::from_millis(self.config.tick_timeout_ms));
    }

    /// Own state at the start of the tick.
    #[must_use]
    pub const fn state(&self) -> &StateView {
        &self.view
    }

    /// Rules in force.
    pub(crate) const fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// When the current invocation must be abandoned, if a clock is running.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Robots visible in the cone centred on `angle` with width `resolution`.
    pub fn scan(&mut self, angle: f64, resolution: f64) -> Vec<ScanResult> {
        self.commands.record(Command::Scan { angle, resolution });
        scan(&self.snapshots, self.view.id, angle, resolution, &self.config)
    }

    /// Queue a move along the heading. A later call replaces this one.
    pub fn move_by(&mut self, distance: f64) {
        if self.commands.movement.is_some() {
            self.warn("move", REPEATED_CALL, vec![distance.to_string()]);
        }
        self.commands.record(Command::Move { distance });
    }

    /// Queue a rotation. A later call replaces this one.
    pub fn turn(&mut self, degrees: f64) {
        if self.commands.turn.is_some() {
            self.warn("turn", REPEATED_CALL, vec![degrees.to_string()]);
        }
        self.commands.record(Command::Turn { degrees });
    }

    /// Queue a toss along the heading. A later call replaces this one.
    pub fn toss(&mut self, distance: f64) {
        if self.commands.toss.is_some() {
            self.warn("toss", REPEATED_CALL, vec![distance.to_string()]);
        }
        self.commands.record(Command::Toss { distance });
    }

    /// Record a misuse of `api`. Only the first [`MAX_WARNINGS`] per tick
    /// are kept and logged.
    pub(crate) fn warn(&mut self, api: &'static str, warning: &'static str, args: Vec<String>) {
        if self.warnings.len() >= MAX_WARNINGS {
            return;
        }
        tracing::warn!(robot_id = self.view.id, tick = self.view.tick, api, ?args, "{warning}");
        self.warnings.push(ApiWarning { api, warning, args });
    }

    /// Warnings recorded so far this tick.
    #[must_use]
    pub fn warnings(&self) -> &[ApiWarning] {
        &self.warnings
    }

    /// Heading at the start of the tick; queued turns are not reflected.
    #[must_use]
    pub const fn direction(&self) -> f64 {
        self.view.heading
    }

    /// Consume the API, yielding the commands issued.
    #[must_use]
    pub fn into_commands(self) -> CommandSet {
        self.commands
    }

    /// Consume the API, yielding the commands issued and the warnings raised.
    #[must_use]
    pub fn into_parts(self) -> (CommandSet, Vec<ApiWarning>) {
        (self.commands, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    fn api() -> Api {
        let snaps: Rc<[RobotSnapshot]> = Rc::from(vec![
            RobotSnapshot {
                id: 1,
                position: Vec2::ZERO,
                heading: 30.0,
                health: 100,
            },
            RobotSnapshot {
                id: 2,
                position: Vec2::new(0.0, 100.0),
                heading: 0.0,
                health: 100,
            },
        ]);
        let view = StateView::new(4, &snaps[0]);
        Api::new(view, snaps, ArenaConfig::default())
    }

    #[test]
    fn test_direction_ignores_pending_turn() {
        let mut api = api();
        api.turn(45.0);
        assert!((api.direction() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_scan_sees_start_of_tick_world() {
        let mut api = api();
        api.move_by(10.0);
        let found = api.scan(0.0, 20.0);
        assert_eq!(found.len(), 1);
        assert!((found[0].distance - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_into_commands_last_write_wins() {
        let mut api = api();
        api.toss(10.0);
        api.toss(60.0);
        api.scan(0.0, 45.0);
        let commands = api.into_commands();
        assert_eq!(commands.toss, Some(60.0));
        assert_eq!(commands.scan_count, 1);
    }

    #[test]
    fn test_repeated_call_warns() {
        let mut api = api();
        api.turn(10.0);
        api.turn(20.0);
        api.move_by(5.0);
        assert_eq!(
            api.warnings(),
            &[ApiWarning {
                api: "turn",
                warning: REPEATED_CALL,
                args: vec!["20".to_string()],
            }]
        );
        let (commands, warnings) = api.into_parts();
        assert_eq!(commands.turn, Some(20.0));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_warnings_capped_per_tick() {
        let mut api = api();
        for i in 0..10 {
            api.toss(f64::from(i));
        }
        assert_eq!(api.warnings().len(), MAX_WARNINGS);
        assert_eq!(api.into_commands().toss, Some(9.0));
    }
}
