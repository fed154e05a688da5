//! Engine configuration.
//!
//! Every field has a default so fixtures only need to name what they
//! override. Values are checked by [`ArenaConfig::validate`] before a match
//! is allowed to start.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of robots in a match.
pub const MAX_ROBOTS: usize = 8;

/// Which positions toss hit checks are made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTiming {
    /// Positions as they stood when the tick began.
    #[default]
    StartOfTick,
    /// Positions after this tick's movement has been applied.
    EndOfTick,
}

/// How a match that reaches `max_ticks` is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutOutcome {
    /// Always a draw.
    #[default]
    Draw,
    /// The unique survivor with the most health wins; ties are a draw.
    HighestHealth,
}

/// Rectangular arena centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Total width (east-west extent).
    pub width: f64,
    /// Total height (north-south extent).
    pub height: f64,
}

impl Bounds {
    /// Half of the width.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Half of the height.
    #[must_use]
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Whether a point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.half_width() && y.abs() <= self.half_height()
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

/// Configuration for a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Arena bounds; `None` means unbounded.
    pub bounds: Option<Bounds>,
    /// Ticks before the match is forced to finish.
    pub max_ticks: u32,
    /// Upper limit on robots per match.
    pub max_robots: usize,
    /// Starting (and maximum) health.
    pub max_health: u32,
    /// Smallest non-zero move per tick.
    pub min_move: f64,
    /// Largest move per tick.
    pub max_move: f64,
    /// Largest rotation per tick, in degrees.
    pub max_turn: f64,
    /// Minimum centre-to-centre distance between robots.
    pub min_separation: f64,
    /// Narrowest scan cone, in degrees.
    pub min_scan: f64,
    /// Widest scan cone, in degrees.
    pub max_scan: f64,
    /// Optional maximum scan distance.
    pub max_scan_range: Option<f64>,
    /// Longest toss distance.
    pub max_toss_range: f64,
    /// Ticks between tosses.
    pub toss_cooldown: u32,
    /// Perpendicular distance from the throw line that still counts as a hit.
    pub hit_radius: f64,
    /// Health removed per hit.
    pub toss_damage: u32,
    /// Positions used for hit checks.
    pub hit_timing: HitTiming,
    /// Decision rule when `max_ticks` is reached.
    pub timeout_outcome: TimeoutOutcome,
    /// Wall-clock budget per script invocation, in milliseconds.
    pub tick_timeout_ms: u64,
    /// VM instruction budget per script invocation.
    pub instruction_budget: u64,
    /// Memory cap for each script VM, in bytes.
    pub max_memory_bytes: usize,
    /// Consecutive faults that forfeit a robot; `None` never forfeits.
    pub max_consecutive_faults: Option<u32>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            bounds: Some(Bounds::default()),
            max_ticks: 1000,
            max_robots: MAX_ROBOTS,
            max_health: 100,
            min_move: 1.0,
            max_move: 10.0,
            max_turn: 180.0,
            min_separation: 10.0,
            min_scan: 10.0,
            max_scan: 45.0,
            max_scan_range: None,
            max_toss_range: 100.0,
            toss_cooldown: 10,
            hit_radius: 5.0,
            toss_damage: 10,
            hit_timing: HitTiming::default(),
            timeout_outcome: TimeoutOutcome::default(),
            tick_timeout_ms: 100,
            instruction_budget: 1_000_000,
            max_memory_bytes: 10 * 1024 * 1024,
            max_consecutive_faults: None,
        }
    }
}

impl ArenaConfig {
    /// Read a partial configuration from a JSON file and validate it.
    ///
    /// Fields the file does not name keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid
    /// configuration, or holds an out-of-range value.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bounds) = self.bounds
            && !(bounds.width.is_finite()
                && bounds.height.is_finite()
                && bounds.width > 0.0
                && bounds.height > 0.0)
        {
            return Err(ConfigError::invalid("bounds", "width and height must be positive"));
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::invalid("max_ticks", "must be at least 1"));
        }
        if self.max_robots < 2 || self.max_robots > MAX_ROBOTS {
            return Err(ConfigError::invalid(
                "max_robots",
                format!("must be between 2 and {MAX_ROBOTS}"),
            ));
        }
        if self.max_health == 0 {
            return Err(ConfigError::invalid("max_health", "must be at least 1"));
        }
        check_range("min_move/max_move", self.min_move, self.max_move)?;
        check_range("min_scan/max_scan", self.min_scan, self.max_scan)?;
        check_non_negative("max_turn", self.max_turn)?;
        check_non_negative("min_separation", self.min_separation)?;
        check_non_negative("hit_radius", self.hit_radius)?;
        if !(self.max_toss_range.is_finite() && self.max_toss_range >= 1.0) {
            return Err(ConfigError::invalid("max_toss_range", "must be at least 1"));
        }
        if let Some(range) = self.max_scan_range {
            check_non_negative("max_scan_range", range)?;
        }
        if self.max_consecutive_faults == Some(0) {
            return Err(ConfigError::invalid(
                "max_consecutive_faults",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }

    /// Clamp a requested move distance, keeping its sign.
    ///
    /// Zero and NaN requests become zero; infinities go to the limit.
    #[must_use]
    pub fn clamp_move(&self, distance: f64) -> f64 {
        if distance.is_nan() || distance == 0.0 {
            return 0.0;
        }
        distance.signum() * distance.abs().clamp(self.min_move, self.max_move)
    }

    /// Clamp a requested rotation to the per-tick cap, keeping its sign.
    #[must_use]
    pub fn clamp_turn(&self, delta: f64) -> f64 {
        if delta.is_nan() {
            return 0.0;
        }
        delta.clamp(-self.max_turn, self.max_turn)
    }

    /// Clamp a toss distance into `[1, max_toss_range]`.
    ///
    /// Returns `None` for NaN.
    #[must_use]
    pub fn clamp_toss(&self, distance: f64) -> Option<f64> {
        (!distance.is_nan()).then(|| distance.clamp(1.0, self.max_toss_range))
    }

    /// Clamp a scan resolution into `[min_scan, max_scan]`.
    #[must_use]
    pub fn clamp_resolution(&self, resolution: f64) -> f64 {
        if resolution.is_nan() {
            self.max_scan
        } else {
            resolution.clamp(self.min_scan, self.max_scan)
        }
    }
}

fn check_range(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
        return Err(ConfigError::invalid(field, "need 0 <= min <= max"));
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(ConfigError::invalid(field, "must be finite and non-negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: ArenaConfig =
            serde_json::from_str(r#"{"max_ticks": 50, "hit_timing": "end_of_tick"}"#).unwrap();
        assert_eq!(config.max_ticks, 50);
        assert_eq!(config.hit_timing, HitTiming::EndOfTick);
        assert_eq!(config.max_health, 100);
        assert_eq!(config.toss_cooldown, 10);
    }

    #[test]
    fn test_unbounded_from_null() {
        let config: ArenaConfig = serde_json::from_str(r#"{"bounds": null}"#).unwrap();
        assert!(config.bounds.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let parsed = serde_json::from_str::<ArenaConfig>(r#"{"max_tick": 5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_from_file_reads_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{"max_ticks": 250, "toss_damage": 25, "bounds": {"width": 400, "height": 300}}"#)
            .unwrap();
        let config = ArenaConfig::from_file(&path).unwrap();
        assert_eq!(config.max_ticks, 250);
        assert_eq!(config.toss_damage, 25);
        assert_eq!(
            config.bounds,
            Some(Bounds {
                width: 400.0,
                height: 300.0
            })
        );
        assert_eq!(config.toss_cooldown, 10);
    }

    #[test]
    fn test_from_file_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(ArenaConfig::from_file(&missing), Err(ConfigError::Io { .. })));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "max_ticks = 5").unwrap();
        assert!(matches!(ArenaConfig::from_file(&garbled), Err(ConfigError::Parse(_))));

        let out_of_range = dir.path().join("zero.json");
        std::fs::write(&out_of_range, r#"{"max_ticks": 0}"#).unwrap();
        assert!(matches!(
            ArenaConfig::from_file(&out_of_range),
            Err(ConfigError::InvalidSetting { field: "max_ticks", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_move_range() {
        let config = ArenaConfig {
            min_move: 20.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { field: "min_move/max_move", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_ticks() {
        let config = ArenaConfig {
            max_ticks: 0,
            ..ArenaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_move_keeps_sign() {
        let config = ArenaConfig::default();
        assert!((config.clamp_move(25.0) - 10.0).abs() < 1e-12);
        assert!((config.clamp_move(-25.0) + 10.0).abs() < 1e-12);
        assert!((config.clamp_move(0.2) - 1.0).abs() < 1e-12);
        assert!(config.clamp_move(0.0).abs() < 1e-12);
        assert!(config.clamp_move(f64::NAN).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_turn_caps_magnitude() {
        let config = ArenaConfig {
            max_turn: 30.0,
            ..ArenaConfig::default()
        };
        assert!((config.clamp_turn(90.0) - 30.0).abs() < 1e-12);
        assert!((config.clamp_turn(-90.0) + 30.0).abs() < 1e-12);
        assert!((config.clamp_turn(12.0) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_toss_range() {
        let config = ArenaConfig::default();
        assert_eq!(config.clamp_toss(500.0), Some(100.0));
        assert_eq!(config.clamp_toss(-3.0), Some(1.0));
        assert_eq!(config.clamp_toss(f64::NAN), None);
    }

    #[test]
    fn test_infinite_requests_clamp_to_limits() {
        let config = ArenaConfig::default();
        assert_eq!(config.clamp_toss(f64::INFINITY), Some(100.0));
        assert_eq!(config.clamp_toss(f64::NEG_INFINITY), Some(1.0));
        assert!((config.clamp_move(f64::INFINITY) - 10.0).abs() < 1e-12);
        assert!((config.clamp_move(f64::NEG_INFINITY) + 10.0).abs() < 1e-12);
        assert!((config.clamp_turn(f64::INFINITY) - 180.0).abs() < 1e-12);
        assert!((config.clamp_turn(f64::NEG_INFINITY) + 180.0).abs() < 1e-12);
        assert!((config.clamp_resolution(f64::INFINITY) - 45.0).abs() < 1e-12);
        assert!((config.clamp_resolution(f64::NEG_INFINITY) - 10.0).abs() < 1e-12);
        assert!(config.clamp_turn(f64::NAN).abs() < 1e-12);
    }
}
