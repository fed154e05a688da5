//! Script execution sandbox.
//!
//! Each robot's script runs once per tick against an [`Api`] bound to that
//! robot alone. Faults and budget overruns are contained here: the robot
//! loses its commands for the tick and the match carries on.

mod api;
mod lua;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub use api::{Api, ApiWarning, MAX_WARNINGS};
pub use lua::LuaScript;

use crate::config::ArenaConfig;
use crate::error::ScriptFault;
use crate::game::{CommandSet, RobotId, RobotSnapshot, StateView};

/// Anything that can drive a robot.
///
/// A script may keep private state between calls; the sandbox keeps one
/// instance per robot for the whole match.
pub trait Script {
    /// Decide this tick's commands through `api`.
    ///
    /// # Errors
    ///
    /// Returns a fault if the script fails or runs out of budget.
    fn run(&mut self, api: &mut Api) -> Result<(), ScriptFault>;
}

/// A native script built from a closure.
///
/// Native code cannot be pre-empted, so its time budget is checked after it
/// returns.
pub struct FnScript<F>(pub F);

impl<F> std::fmt::Debug for FnScript<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnScript")
    }
}

impl<F> Script for FnScript<F>
where
    F: FnMut(&mut Api),
{
    fn run(&mut self, api: &mut Api) -> Result<(), ScriptFault> {
        (self.0)(api);
        Ok(())
    }
}

/// Result of invoking one robot's script for one tick.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Commands to apply (empty on fault).
    pub commands: CommandSet,
    /// API misuse noticed during the call, kept even on fault.
    pub warnings: Vec<ApiWarning>,
    /// Why the tick was lost, if it was.
    pub fault: Option<ScriptFault>,
    /// The robot reached its consecutive fault limit on this tick.
    pub forfeit: bool,
}

struct Slot {
    id: RobotId,
    script: Box<dyn Script>,
    consecutive_faults: u32,
    total_faults: u32,
}

/// Per-robot script slots with fault accounting.
#[derive(Default)]
pub struct Sandbox {
    slots: Vec<Slot>,
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("robots", &self.slots.iter().map(|s| s.id).collect::<Vec<_>>())
            .finish()
    }
}

impl Sandbox {
    /// Create an empty sandbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the script for `id`, replacing any previous one.
    pub fn insert(&mut self, id: RobotId, script: Box<dyn Script>) {
        let slot = Slot {
            id,
            script,
            consecutive_faults: 0,
            total_faults: 0,
        };
        match self.slots.binary_search_by_key(&id, |s| s.id) {
            Ok(i) => self.slots[i] = slot,
            Err(i) => self.slots.insert(i, slot),
        }
    }

    /// Whether a script is registered for `id`.
    #[must_use]
    pub fn contains(&self, id: RobotId) -> bool {
        self.slots.binary_search_by_key(&id, |s| s.id).is_ok()
    }

    /// Total faults recorded for `id`.
    #[must_use]
    pub fn faults(&self, id: RobotId) -> u32 {
        self.slots
            .binary_search_by_key(&id, |s| s.id)
            .map_or(0, |i| self.slots[i].total_faults)
    }

    /// Run the script for `view.id` once.
    ///
    /// The script sees `snapshots` and nothing else. On a fault its partial
    /// commands are discarded and the fault is logged; a robot without a
    /// script issues nothing.
    pub fn invoke(&mut self, view: StateView, snapshots: Rc<[RobotSnapshot]>, config: &ArenaConfig) -> Invocation {
        let Ok(index) = self.slots.binary_search_by_key(&view.id, |s| s.id) else {
            return Invocation::default();
        };
        let slot = &mut self.slots[index];

        let mut api = Api::new(view, snapshots, *config);
        api.start_clock();
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| slot.script.run(&mut api)));
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(Ok(())) if elapsed > Duration::from_millis(config.tick_timeout_ms) => {
                Err(ScriptFault::Timeout { elapsed })
            }
            Ok(result) => result,
            Err(payload) => Err(ScriptFault::Panic(panic_message(payload.as_ref()))),
        };

        match result {
            Ok(()) => {
                slot.consecutive_faults = 0;
                let (commands, warnings) = api.into_parts();
                Invocation {
                    commands,
                    warnings,
                    fault: None,
                    forfeit: false,
                }
            }
            Err(fault) => {
                if matches!(fault, ScriptFault::Timeout { .. }) {
                    api.warn("run", api::TIMED_OUT, Vec::new());
                }
                slot.consecutive_faults += 1;
                slot.total_faults += 1;
                tracing::warn!(
                    robot_id = view.id,
                    tick = view.tick,
                    consecutive = slot.consecutive_faults,
                    "script fault: {fault}"
                );
                let forfeit = config
                    .max_consecutive_faults
                    .is_some_and(|limit| slot.consecutive_faults >= limit);
                if forfeit {
                    tracing::warn!(robot_id = view.id, tick = view.tick, "robot forfeits after repeated faults");
                }
                let (_, warnings) = api.into_parts();
                Invocation {
                    commands: CommandSet::default(),
                    warnings,
                    fault: Some(fault),
                    forfeit,
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
