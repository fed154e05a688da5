//! Scenario fixtures.
//!
//! A scenario is a JSON document naming the robots of a match, where they
//! start and which script drives each one:
//!
//! ```json
//! {
//!   "name": "game over",
//!   "seed": 1,
//!   "config": { "max_ticks": 200 },
//!   "robots": [
//!     { "script": "p1.lua", "x": -50, "y": 0 },
//!     { "script": "p2.lua", "x": 50, "y": 0, "heading": 180 }
//!   ]
//! }
//! ```
//!
//! Script paths are relative to the fixture file. Robots without a
//! position are placed by [`spawn_positions`] from the seed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, Entrant, spawn_positions, validate_start};
use crate::config::ArenaConfig;
use crate::error::ConfigError;
use crate::game::{Robot, RobotId};
use crate::geometry::Vec2;
use crate::sandbox::LuaScript;

/// One robot in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotSpec {
    /// Script path, relative to the fixture.
    pub script: PathBuf,
    /// Display name; defaults to the script's file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Starting x; must be given together with `y`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Starting y; must be given together with `x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Starting heading; defaults to 0 (north) for placed robots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Starting health; defaults to `max_health`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
}

impl RobotSpec {
    /// A robot that will be placed from the seed.
    #[must_use]
    pub fn spawned(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            name: None,
            x: None,
            y: None,
            heading: None,
            health: None,
        }
    }
}

/// A complete match description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Scenario name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Seed for spawns and script randomness.
    #[serde(default)]
    pub seed: u64,
    /// Rules; unspecified fields take their defaults.
    #[serde(default)]
    pub config: ArenaConfig,
    /// Participants, in id order (the first robot is id 1).
    pub robots: Vec<RobotSpec>,
    /// Directory script paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Scenario {
    /// Read a fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json(&text, base_dir)
    }

    /// Parse a fixture from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid fixture.
    pub fn from_json(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut scenario: Self = serde_json::from_str(text)?;
        scenario.base_dir = base_dir.into();
        Ok(scenario)
    }

    /// A scenario where every script is spawned from `seed`.
    #[must_use]
    pub fn from_scripts(scripts: &[PathBuf], config: ArenaConfig, seed: u64) -> Self {
        Self {
            name: None,
            seed,
            config,
            robots: scripts.iter().map(RobotSpec::spawned).collect(),
            base_dir: PathBuf::new(),
        }
    }

    /// Where the script of `spec` lives on disk.
    #[must_use]
    pub fn script_path(&self, spec: &RobotSpec) -> PathBuf {
        if spec.script.is_absolute() {
            spec.script.clone()
        } else {
            self.base_dir.join(&spec.script)
        }
    }

    /// Starting robots, with ids assigned in fixture order.
    ///
    /// # Errors
    ///
    /// Returns an error if a robot is malformed or spawning fails.
    pub fn robots(&self) -> Result<Vec<Robot>, ConfigError> {
        self.config.validate()?;
        if self.robots.len() > self.config.max_robots {
            return Err(ConfigError::TooManyRobots {
                count: self.robots.len(),
                max: self.config.max_robots,
            });
        }
        let unplaced = self
            .robots
            .iter()
            .filter(|spec| spec.x.is_none() && spec.y.is_none())
            .count();
        let mut spawns = spawn_positions(self.seed, unplaced, &self.config)?.into_iter();

        let mut robots = Vec::with_capacity(self.robots.len());
        for (index, spec) in self.robots.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let id = (index + 1) as RobotId;
            let (position, heading) = match (spec.x, spec.y) {
                (Some(x), Some(y)) => (Vec2::new(x, y), spec.heading.unwrap_or(0.0)),
                (None, None) => {
                    let spawn = spawns.next().ok_or_else(|| ConfigError::InvalidRobot {
                        index,
                        reason: "could not be placed".to_string(),
                    })?;
                    (spawn.position, spec.heading.unwrap_or(spawn.heading))
                }
                _ => {
                    return Err(ConfigError::InvalidRobot {
                        index,
                        reason: "x and y must be given together".to_string(),
                    });
                }
            };
            let name = spec.name.clone().unwrap_or_else(|| {
                spec.script
                    .file_stem()
                    .map_or_else(|| format!("robot{id}"), |s| s.to_string_lossy().into_owned())
            });
            let health = spec.health.unwrap_or(self.config.max_health);
            robots.push(Robot::new(id, name, position, heading, health));
        }
        Ok(robots)
    }

    /// Check the fixture without loading any script.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let robots = self.robots()?;
        validate_start(&self.config, &robots)
    }

    /// Load every script and set up the match.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture is invalid or a script fails to load.
    pub fn build(&self) -> Result<Arena, ConfigError> {
        let robots = self.robots()?;
        validate_start(&self.config, &robots)?;

        let mut entrants = Vec::with_capacity(robots.len());
        for (index, (robot, spec)) in robots.into_iter().zip(&self.robots).enumerate() {
            let path = self.script_path(spec);
            let script = LuaScript::from_file(&path, robot.id, self.seed, &self.config)
                .map_err(|error| ConfigError::Script { index, error })?;
            entrants.push(Entrant {
                robot,
                script: Box::new(script),
            });
        }
        Arena::new(self.config, entrants, self.seed)
    }
}
