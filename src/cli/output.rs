//! Output formatting utilities for CLI.

// Output formatting uses intentional casts for percentages
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;
use std::fmt::Write;
use tickarena::MatchReport;
use tickarena::league::{LeagueStats, Standing};

/// Format a match report as human-readable text.
pub(super) fn format_report_text(report: &MatchReport) -> String {
    let mut output = String::new();

    match &report.name {
        Some(name) => {
            let _ = writeln!(output, "Match Result: {name} (seed: {})", report.seed);
        }
        None => {
            let _ = writeln!(output, "Match Result (seed: {})", report.seed);
        }
    }
    match (report.outcome.winner(), report.winner_name()) {
        (Some(id), Some(name)) => {
            let _ = writeln!(output, "  Winner: Robot {id} ({name})");
        }
        _ => output.push_str("  Winner: Draw\n"),
    }
    let _ = writeln!(output, "  Ticks: {}\n", report.ticks);

    for robot in &report.robots {
        let _ = write!(
            output,
            "  Robot {} ({}): {} hp at ({:.1}, {:.1}) heading {:.1}, {}/{} hits",
            robot.id,
            robot.name,
            robot.health,
            robot.position.x,
            robot.position.y,
            robot.heading,
            robot.hits_landed,
            robot.tosses,
        );
        if robot.faults > 0 {
            let _ = write!(output, ", {} faults", robot.faults);
        }
        if robot.forfeited {
            output.push_str(" [forfeited]");
        } else if !robot.alive {
            output.push_str(" [destroyed]");
        }
        output.push('\n');
    }

    output
}

/// JSON-serializable league result.
#[derive(Debug, Serialize)]
pub(super) struct JsonLeagueResult {
    /// Seed of the first round.
    base_seed: u64,
    /// Matches completed.
    matches_played: u64,
    /// Matches that could not be played.
    errors: u64,
    /// Matches drawn.
    draws: u64,
    /// Average match length in ticks.
    avg_ticks: f64,
    /// Standings in ranking order.
    standings: Vec<JsonStanding>,
}

/// JSON-serializable league standing.
#[derive(Debug, Serialize)]
pub(super) struct JsonStanding {
    /// Position in the table (1-based).
    rank: usize,
    /// Bot standing.
    #[serde(flatten)]
    standing: Standing,
    /// Win rate (0.0-1.0).
    win_rate: f64,
}

impl JsonLeagueResult {
    /// Create from league stats.
    pub(super) fn from_stats(stats: &LeagueStats, base_seed: u64) -> Self {
        let standings = stats
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(i, standing)| JsonStanding {
                rank: i + 1,
                win_rate: standing.win_rate(),
                standing,
            })
            .collect();

        Self {
            base_seed,
            matches_played: stats.matches_played,
            errors: stats.errors,
            draws: stats.draws,
            avg_ticks: stats.avg_ticks(),
            standings,
        }
    }
}

/// Format league stats as human-readable text.
pub(super) fn format_league_text(stats: &LeagueStats, base_seed: u64) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "League Results ({} matches, base seed {base_seed})",
        stats.matches_played
    );
    output.push_str("========================================\n\n");

    let _ = writeln!(
        output,
        "  {:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>7}",
        "#", "bot", "P", "W", "D", "L", "Pts", "Health"
    );
    for (i, s) in stats.ranked().iter().enumerate() {
        let _ = write!(
            output,
            "  {:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>7}",
            i + 1,
            s.name,
            s.played,
            s.wins,
            s.draws,
            s.losses,
            s.points,
            s.total_health
        );
        if s.errors > 0 {
            let _ = write!(output, "  ({} errors)", s.errors);
        }
        output.push('\n');
    }

    if stats.matches_played > 0 {
        let _ = writeln!(
            output,
            "\nDraws: {} ({:.1}%)",
            stats.draws,
            (stats.draws as f64 / stats.matches_played as f64) * 100.0
        );
    }
    if stats.errors > 0 {
        let _ = writeln!(output, "Failed matches: {}", stats.errors);
    }
    let _ = writeln!(output, "Average Match Length: {:.0} ticks", stats.avg_ticks());

    output
}

/// Format league stats as CSV.
pub(super) fn format_league_csv(stats: &LeagueStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("rank,bot,played,wins,draws,losses,points,total_health,errors,win_rate\n");

    // Data rows
    for (i, s) in stats.ranked().iter().enumerate() {
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{:.4}",
            i + 1,
            s.name,
            s.played,
            s.wins,
            s.draws,
            s.losses,
            s.points,
            s.total_health,
            s.errors,
            s.win_rate()
        );
    }

    output
}
