//! Lua-hosted robot scripts.
//!
//! Every robot gets its own Lua state, so globals persist across ticks and
//! are never shared, even between robots running the same source. Only the
//! `table`, `string` and `math` libraries are opened, and the base-library
//! loaders are removed. The host installs five globals (`scan`, `move`,
//! `turn`, `toss`, `direction`) and routes `print` to the log. Bad arguments
//! to the primitives are warnings, not errors.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mlua::{Function, HookTriggers, Lua, LuaOptions, StdLib, Table, Value, Variadic, VmState};

use crate::config::ArenaConfig;
use crate::error::{LoadError, ScriptFault};
use crate::game::{RobotId, StateView};
use crate::sandbox::api::{MISSING_ARGUMENT, NOT_A_NUMBER};
use crate::sandbox::{Api, Script};

/// VM instructions between budget checks.
const HOOK_INTERVAL: u32 = 1_000;

/// Base-library globals that could reach the host or defeat the budget.
///
/// `pcall` and `xpcall` go too: a budget error raised by the hook must
/// unwind the whole invocation.
const REMOVED_GLOBALS: [&str; 7] = [
    "dofile",
    "loadfile",
    "load",
    "require",
    "collectgarbage",
    "pcall",
    "xpcall",
];

const BUDGET_EXCEEDED: &str = "script budget exceeded";

/// Instruction and wall-clock budget shared with the VM hook.
#[derive(Debug, Default)]
struct Budget {
    used: Cell<u64>,
    limit: Cell<u64>,
    deadline: Cell<Option<Instant>>,
    tripped: Cell<bool>,
}

impl Budget {
    fn arm(&self, limit: u64, deadline: Option<Instant>) {
        self.used.set(0);
        self.limit.set(limit);
        self.deadline.set(deadline);
        self.tripped.set(false);
    }

    /// Charge `n` instructions. Returns `true` once the budget is gone.
    fn charge(&self, n: u64) -> bool {
        let used = self.used.get().saturating_add(n);
        self.used.set(used);
        let late = self.deadline.get().is_some_and(|d| Instant::now() >= d);
        if used > self.limit.get() || late {
            self.tripped.set(true);
        }
        self.tripped.get()
    }
}

/// A robot script running in its own Lua state.
pub struct LuaScript {
    lua: Lua,
    api: Rc<RefCell<Api>>,
    budget: Rc<Budget>,
    robot: RobotId,
}

impl fmt::Debug for LuaScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaScript")
            .field("robot", &self.robot)
            .finish_non_exhaustive()
    }
}

impl LuaScript {
    /// Read and load a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the script fails to load.
    pub fn from_file(path: &Path, robot: RobotId, seed: u64, config: &ArenaConfig) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|error| LoadError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Self::load(&source, &name, robot, seed, config)
    }

    /// Compile `source` and run its top level.
    ///
    /// The top level runs under the same budgets as a tick, and must leave
    /// a global `run` function behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not compile, its top level
    /// raises or exhausts its budget, or no `run` function is defined.
    pub fn load(source: &str, name: &str, robot: RobotId, seed: u64, config: &ArenaConfig) -> Result<Self, LoadError> {
        let lua = Lua::new_with(StdLib::TABLE | StdLib::STRING | StdLib::MATH, LuaOptions::default())?;
        lua.set_memory_limit(config.max_memory_bytes)?;

        let api = Rc::new(RefCell::new(Api::default()));
        let budget = Rc::new(Budget::default());

        let hook_budget = Rc::clone(&budget);
        lua.set_hook(
            HookTriggers::new().every_nth_instruction(HOOK_INTERVAL),
            move |_lua, _debug| {
                if hook_budget.charge(u64::from(HOOK_INTERVAL)) {
                    return Err(mlua::Error::RuntimeError(BUDGET_EXCEEDED.into()));
                }
                Ok(VmState::Continue)
            },
        );

        harden(&lua, robot, seed)?;
        install_api(&lua, &api)?;

        budget.arm(
            config.instruction_budget,
            Some(Instant::now() + Duration::from_millis(config.tick_timeout_ms)),
        );
        if let Err(e) = lua.load(source).set_name(name).exec() {
            if budget.tripped.get() {
                return Err(LoadError::Timeout(name.to_string()));
            }
            return Err(e.into());
        }

        let run: Value = lua.globals().get("run")?;
        if !matches!(run, Value::Function(_)) {
            return Err(LoadError::MissingEntry);
        }

        Ok(Self {
            lua,
            api,
            budget,
            robot,
        })
    }

    fn call_run(&self, view: &StateView) -> mlua::Result<()> {
        let run: Function = self.lua.globals().get("run")?;
        let state = self.lua.create_table()?;
        state.set("tick", view.tick)?;
        state.set("id", view.id)?;
        state.set("x", view.position.x)?;
        state.set("y", view.position.y)?;
        state.set("heading", view.heading)?;
        state.set("health", view.health)?;
        let () = run.call(state)?;
        Ok(())
    }
}

impl Script for LuaScript {
    fn run(&mut self, api: &mut Api) -> Result<(), ScriptFault> {
        let started = Instant::now();
        let view = *api.state();
        self.budget.arm(api.config().instruction_budget, api.deadline());

        *self.api.borrow_mut() = std::mem::take(api);
        let result = self.call_run(&view);
        *api = self.api.take();

        match result {
            Ok(()) => Ok(()),
            Err(_) if self.budget.tripped.get() => Err(ScriptFault::Timeout {
                elapsed: started.elapsed(),
            }),
            Err(e) => Err(ScriptFault::Runtime(e.to_string())),
        }
    }
}

/// Remove host-reaching globals, route `print` to the log and seed `math.random`.
fn harden(lua: &Lua, robot: RobotId, seed: u64) -> mlua::Result<()> {
    let globals = lua.globals();
    for name in REMOVED_GLOBALS {
        globals.set(name, Value::Nil)?;
    }

    globals.set(
        "print",
        lua.create_function(move |_, args: Variadic<Value>| {
            let line = args.iter().map(describe).collect::<Vec<_>>().join("\t");
            tracing::info!(robot_id = robot, "{line}");
            Ok(())
        })?,
    )?;

    let math: Table = globals.get("math")?;
    let randomseed: Function = math.get("randomseed")?;
    #[allow(clippy::cast_possible_wrap)]
    let mixed = (seed ^ u64::from(robot).wrapping_mul(0x9E37_79B9_7F4A_7C15)) as i64;
    let () = randomseed.call(mixed)?;
    Ok(())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.to_string_lossy().to_string(),
        other => other.type_name().to_string(),
    }
}

/// Read a numeric argument for `name`.
///
/// A missing or non-numeric value records a warning and yields `None`, so
/// the call becomes a no-op instead of a script error.
#[allow(clippy::cast_precision_loss)]
fn number_arg(api: &mut Api, name: &'static str, value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Number(n) => Some(*n),
        Value::Nil => {
            api.warn(name, MISSING_ARGUMENT, Vec::new());
            None
        }
        other => {
            api.warn(name, NOT_A_NUMBER, vec![describe(other)]);
            None
        }
    }
}

/// Install the five robot primitives, each bound to the shared [`Api`] slot.
fn install_api(lua: &Lua, api: &Rc<RefCell<Api>>) -> mlua::Result<()> {
    let globals = lua.globals();

    let slot = Rc::clone(api);
    globals.set(
        "scan",
        lua.create_function(move |lua, (angle, resolution): (Value, Value)| {
            let out = lua.create_table()?;
            let mut api = slot.borrow_mut();
            let (Some(angle), Some(resolution)) = (
                number_arg(&mut api, "scan", &angle),
                number_arg(&mut api, "scan", &resolution),
            ) else {
                return Ok(out);
            };
            for (i, hit) in api.scan(angle, resolution).iter().enumerate() {
                let entry = lua.create_table()?;
                entry.set("angle", hit.angle)?;
                entry.set("distance", hit.distance)?;
                entry.set("id", hit.id)?;
                out.set(i + 1, entry)?;
            }
            Ok(out)
        })?,
    )?;

    let slot = Rc::clone(api);
    globals.set(
        "move",
        lua.create_function(move |_, distance: Value| {
            let mut api = slot.borrow_mut();
            if let Some(distance) = number_arg(&mut api, "move", &distance) {
                api.move_by(distance);
            }
            Ok(())
        })?,
    )?;

    let slot = Rc::clone(api);
    globals.set(
        "turn",
        lua.create_function(move |_, degrees: Value| {
            let mut api = slot.borrow_mut();
            if let Some(degrees) = number_arg(&mut api, "turn", &degrees) {
                api.turn(degrees);
            }
            Ok(())
        })?,
    )?;

    let slot = Rc::clone(api);
    globals.set(
        "toss",
        lua.create_function(move |_, distance: Value| {
            let mut api = slot.borrow_mut();
            if let Some(distance) = number_arg(&mut api, "toss", &distance) {
                api.toss(distance);
            }
            Ok(())
        })?,
    )?;

    let slot = Rc::clone(api);
    globals.set(
        "direction",
        lua.create_function(move |_, ()| Ok(slot.borrow().direction()))?,
    )?;

    Ok(())
}
