//! Round-robin leagues.
//!
//! Every unordered pair of bots meets `rounds` times. Round `k` is played
//! with seed `base_seed + k`, and the two bots swap starting order on odd
//! rounds so neither always moves first. Matches run in parallel; each
//! worker folds results into its own [`LeagueStats`] and the partial
//! tables are merged at the end.

// League accounting uses intentional casts for averages
#![allow(clippy::cast_precision_loss)]

use std::cmp::Ordering;
use std::path::PathBuf;

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;

use crate::arena::{MatchReport, Outcome};
use crate::config::ArenaConfig;
use crate::error::ConfigError;
use crate::scenario::{RobotSpec, Scenario};

/// Points for a win.
pub const WIN_POINTS: u32 = 3;

/// Points for a draw.
pub const DRAW_POINTS: u32 = 1;

/// A league entrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bot {
    /// Display name.
    pub name: String,
    /// Lua script.
    pub script: PathBuf,
}

impl Bot {
    /// A bot named after its script's file stem.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let script = path.into();
        let name = script
            .file_stem()
            .map_or_else(|| "unknown".to_string(), |s| s.to_string_lossy().into_owned());
        Self { name, script }
    }
}

/// League settings.
#[derive(Debug, Clone, Copy)]
pub struct LeagueOptions {
    /// Meetings per pair.
    pub rounds: u32,
    /// Seed of round 0.
    pub base_seed: u64,
    /// Rules for every match.
    pub config: ArenaConfig,
}

impl Default for LeagueOptions {
    fn default() -> Self {
        Self {
            rounds: 1,
            base_seed: 0,
            config: ArenaConfig::default(),
        }
    }
}

/// One scheduled match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    /// Bot index that starts as robot 1.
    pub first: usize,
    /// Bot index that starts as robot 2.
    pub second: usize,
    /// Round number.
    pub round: u32,
}

/// Every match of a league over `bots` entrants.
#[must_use]
pub fn pairings(bots: usize, rounds: u32) -> Vec<Pairing> {
    let mut out = Vec::new();
    for round in 0..rounds {
        for a in 0..bots {
            for b in a + 1..bots {
                let (first, second) = if round % 2 == 0 { (a, b) } else { (b, a) };
                out.push(Pairing { first, second, round });
            }
        }
    }
    out
}

/// One bot's line in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Bot name.
    pub name: String,
    /// Matches completed.
    pub played: u32,
    /// Matches won.
    pub wins: u32,
    /// Matches lost.
    pub losses: u32,
    /// Matches drawn.
    pub draws: u32,
    /// League points.
    pub points: u32,
    /// Health left at the end of every match, summed.
    pub total_health: u64,
    /// Matches that could not be played.
    pub errors: u32,
}

impl Standing {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            points: 0,
            total_health: 0,
            errors: 0,
        }
    }

    /// Share of completed matches won (0.0-1.0).
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.played == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.played)
    }

    fn merge(&mut self, other: &Self) {
        self.played += other.played;
        self.wins += other.wins;
        self.losses += other.losses;
        self.draws += other.draws;
        self.points += other.points;
        self.total_health += other.total_health;
        self.errors += other.errors;
    }
}

/// Order standings by points, then total health, then name.
pub fn rank(standings: &mut [Standing]) {
    standings.sort_by(compare);
}

/// Accumulated league results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeagueStats {
    /// Matches completed.
    pub matches_played: u64,
    /// Matches that could not be played.
    pub errors: u64,
    /// Matches that ended in a draw.
    pub draws: u64,
    /// Ticks across all completed matches.
    pub total_ticks: u64,
    /// One entry per bot, in entry order until [`LeagueStats::ranked`].
    pub standings: Vec<Standing>,
}

impl LeagueStats {
    /// Empty table for `bots`.
    #[must_use]
    pub fn new(bots: &[Bot]) -> Self {
        Self {
            standings: bots.iter().map(|b| Standing::new(&b.name)).collect(),
            ..Self::default()
        }
    }

    /// Record a finished match.
    pub fn add_report(&mut self, pairing: Pairing, report: &MatchReport) {
        self.matches_played += 1;
        self.total_ticks += u64::from(report.ticks);
        if report.outcome == Outcome::Draw {
            self.draws += 1;
        }

        // Robot ids follow scenario order: `first` is 1, `second` is 2.
        for (id, index) in [(1, pairing.first), (2, pairing.second)] {
            let Some(standing) = self.standings.get_mut(index) else {
                continue;
            };
            standing.played += 1;
            standing.total_health += report.robot(id).map_or(0, |r| u64::from(r.health));
            match report.outcome {
                Outcome::Winner(winner) if winner == id => {
                    standing.wins += 1;
                    standing.points += WIN_POINTS;
                }
                Outcome::Winner(_) => standing.losses += 1,
                Outcome::Draw => {
                    standing.draws += 1;
                    standing.points += DRAW_POINTS;
                }
            }
        }
    }

    /// Record a match that could not be played.
    pub fn add_error(&mut self, pairing: Pairing) {
        self.errors += 1;
        for index in [pairing.first, pairing.second] {
            if let Some(standing) = self.standings.get_mut(index) {
                standing.errors += 1;
            }
        }
    }

    /// Fold another partial table into this one.
    pub fn merge(&mut self, other: &Self) {
        self.matches_played += other.matches_played;
        self.errors += other.errors;
        self.draws += other.draws;
        self.total_ticks += other.total_ticks;
        if self.standings.is_empty() {
            self.standings.clone_from(&other.standings);
            return;
        }
        for (mine, theirs) in self.standings.iter_mut().zip(&other.standings) {
            mine.merge(theirs);
        }
    }

    /// Average match length in ticks.
    #[must_use]
    pub fn avg_ticks(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.matches_played as f64
    }

    /// Standings in ranking order.
    #[must_use]
    pub fn ranked(&self) -> Vec<Standing> {
        let mut standings = self.standings.clone();
        rank(&mut standings);
        standings
    }
}

fn scenario_for(bots: &[Bot], pairing: Pairing, options: &LeagueOptions) -> Scenario {
    let spec = |bot: &Bot| RobotSpec {
        name: Some(bot.name.clone()),
        ..RobotSpec::spawned(&bot.script)
    };
    Scenario {
        name: Some(format!(
            "{} vs {} (round {})",
            bots[pairing.first].name, bots[pairing.second].name, pairing.round
        )),
        seed: options.base_seed.wrapping_add(u64::from(pairing.round)),
        config: options.config,
        robots: vec![spec(&bots[pairing.first]), spec(&bots[pairing.second])],
        base_dir: PathBuf::new(),
    }
}

/// Play one scheduled match.
///
/// # Errors
///
/// Returns an error if either script fails to load or the match cannot be
/// set up.
pub fn play(bots: &[Bot], pairing: Pairing, options: &LeagueOptions) -> Result<MatchReport, ConfigError> {
    let scenario = scenario_for(bots, pairing, options);
    let mut arena = scenario.build()?;
    let outcome = arena.run();
    let mut report = arena.report().unwrap_or_else(|| MatchReport {
        name: None,
        outcome,
        ticks: arena.world().tick,
        seed: scenario.seed,
        robots: Vec::new(),
    });
    report.name = scenario.name;
    Ok(report)
}

/// Run a complete league.
///
/// Scripts are loaded afresh for every match, on the worker that plays it.
/// A match whose scripts fail to load is counted against both bots rather
/// than aborting the league.
///
/// # Errors
///
/// Returns an error if there are fewer than two bots, no rounds, or the
/// configuration is invalid.
pub fn run_league(
    bots: &[Bot],
    options: &LeagueOptions,
    progress: Option<&ProgressBar>,
) -> Result<LeagueStats, ConfigError> {
    if bots.len() < 2 {
        return Err(ConfigError::TooFewRobots(bots.len()));
    }
    if options.rounds == 0 {
        return Err(ConfigError::invalid("rounds", "must be at least 1"));
    }
    options.config.validate()?;

    let schedule = pairings(bots.len(), options.rounds);
    tracing::info!(bots = bots.len(), matches = schedule.len(), "league starting");

    let stats = schedule
        .into_par_iter()
        .fold(
            || LeagueStats::new(bots),
            |mut local, pairing| {
                match play(bots, pairing, options) {
                    Ok(report) => local.add_report(pairing, &report),
                    Err(error) => {
                        tracing::warn!(
                            first = %bots[pairing.first].name,
                            second = %bots[pairing.second].name,
                            %error,
                            "league match failed"
                        );
                        local.add_error(pairing);
                    }
                }
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                local
            },
        )
        .reduce(
            || LeagueStats::new(bots),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );
    Ok(stats)
}

/// Compare two standings in ranking order.
#[must_use]
pub fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.total_health.cmp(&a.total_health))
        .then_with(|| a.name.cmp(&b.name))
}

/// Bots for every script path, named by file stem.
#[must_use]
pub fn bots_from_paths(paths: &[PathBuf]) -> Vec<Bot> {
    paths.iter().map(Bot::from_path).collect()
}
