//! Error types for the arena.
//!
//! Script faults are recoverable and never leave the sandbox as errors of
//! the match; configuration and load errors are fatal before a match starts.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Why a script invocation produced no commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptFault {
    /// Wall-clock or instruction budget exhausted.
    Timeout {
        /// Time spent before the invocation was abandoned.
        elapsed: Duration,
    },
    /// The script raised an error.
    Runtime(String),
    /// A native script panicked.
    Panic(String),
}

impl fmt::Display for ScriptFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { elapsed } => {
                write!(f, "script exceeded its budget after {}us", elapsed.as_micros())
            }
            Self::Runtime(msg) => write!(f, "script error: {msg}"),
            Self::Panic(msg) => write!(f, "script panicked: {msg}"),
        }
    }
}

impl std::error::Error for ScriptFault {}

/// Failure to prepare a script before the match.
#[derive(Debug)]
pub enum LoadError {
    /// Source file could not be read.
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        error: std::io::Error,
    },
    /// The script failed to compile or its top level raised an error.
    Compile(String),
    /// The top level of the named script ran out of budget.
    Timeout(String),
    /// The script does not define a callable `run`.
    MissingEntry,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, error } => write!(f, "failed to read {}: {error}", path.display()),
            Self::Compile(msg) => write!(f, "failed to load script: {msg}"),
            Self::Timeout(name) => write!(f, "{name}: top level exceeded its budget"),
            Self::MissingEntry => write!(f, "script does not define a run(state) function"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<mlua::Error> for LoadError {
    fn from(e: mlua::Error) -> Self {
        Self::Compile(e.to_string())
    }
}

/// Malformed configuration or scenario fixture.
#[derive(Debug)]
pub enum ConfigError {
    /// Fixture or config file could not be read.
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        error: std::io::Error,
    },
    /// Fixture or config file is not valid JSON for the expected shape.
    Parse(serde_json::Error),
    /// A configuration value is out of range.
    InvalidSetting {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// Not enough robots for a match.
    TooFewRobots(usize),
    /// More robots than the configuration allows.
    TooManyRobots {
        /// Robots requested.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A robot's starting state is unusable.
    InvalidRobot {
        /// Index of the robot in the fixture (0-based).
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// A robot's script failed to load.
    Script {
        /// Index of the robot in the fixture (0-based).
        index: usize,
        /// Load failure.
        error: LoadError,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidSetting`].
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, error } => write!(f, "failed to read {}: {error}", path.display()),
            Self::Parse(e) => write!(f, "malformed JSON: {e}"),
            Self::InvalidSetting { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::TooFewRobots(n) => write!(f, "too few robots: {n} (minimum 2)"),
            Self::TooManyRobots { count, max } => {
                write!(f, "too many robots: {count} (maximum {max})")
            }
            Self::InvalidRobot { index, reason } => write!(f, "robot {index}: {reason}"),
            Self::Script { index, error } => write!(f, "robot {index}: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            Self::Parse(e) => Some(e),
            Self::Script { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Failure while running a match.
#[derive(Debug)]
pub enum MatchError {
    /// The match could not be set up.
    Config(ConfigError),
    /// The transcript could not be written.
    Transcript(std::io::Error),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Transcript(e) => write!(f, "failed to write transcript: {e}"),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Transcript(e) => Some(e),
        }
    }
}

impl From<ConfigError> for MatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<std::io::Error> for MatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Transcript(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_fault_display() {
        let fault = ScriptFault::Timeout {
            elapsed: Duration::from_millis(3),
        };
        assert!(fault.to_string().contains("3000us"));
        assert!(ScriptFault::Runtime("boom".into()).to_string().contains("boom"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::TooFewRobots(1);
        assert!(err.to_string().contains("too few robots"));

        let err = ConfigError::TooManyRobots { count: 9, max: 8 };
        assert!(err.to_string().contains('9'));

        let err = ConfigError::Script {
            index: 1,
            error: LoadError::MissingEntry,
        };
        assert!(err.to_string().contains("run(state)"));

        let err = LoadError::Timeout("spin.lua".into());
        assert!(err.to_string().starts_with("spin.lua: top level exceeded"));
    }

    #[test]
    fn test_match_error_wraps_config() {
        let err = MatchError::from(ConfigError::TooFewRobots(0));
        assert!(err.to_string().contains("too few robots"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
