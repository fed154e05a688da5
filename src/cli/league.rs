//! League command implementation.

use super::output::{JsonLeagueResult, format_league_csv, format_league_text};
use super::{CliError, LeagueFormat, clock_seed};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tickarena::ArenaConfig;
use tickarena::league::{LeagueOptions, bots_from_paths, pairings, run_league};

/// Size the global thread pool. Returns whether this call built it.
fn configure_threads(threads: Option<usize>) -> bool {
    let Some(num_threads) = threads else {
        return false;
    };
    match rayon::ThreadPoolBuilder::new().num_threads(num_threads).build_global() {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(num_threads, "thread pool left as is: {e}");
            false
        }
    }
}

/// Execute the league command.
///
/// # Errors
///
/// Returns an error if the league cannot be set up.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    scripts: &[PathBuf],
    rounds: u32,
    seed: Option<u64>,
    threads: Option<usize>,
    config: Option<&Path>,
    max_ticks: Option<u32>,
    format: LeagueFormat,
    progress: bool,
) -> Result<(), CliError> {
    for path in scripts {
        if !path.is_file() {
            return Err(CliError::new(format!("Failed to read {}", path.display())));
        }
    }
    let bots = bots_from_paths(scripts);

    configure_threads(threads);

    let mut config = config.map(ArenaConfig::from_file).transpose()?.unwrap_or_default();
    if let Some(t) = max_ticks {
        config.max_ticks = t;
    }
    let options = LeagueOptions {
        rounds,
        base_seed: seed.unwrap_or_else(clock_seed),
        config,
    };

    // Progress bar
    let pb = if progress {
        let total = pairings(bots.len(), rounds).len() as u64;
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} matches ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let stats = run_league(&bots, &options, pb.as_ref())?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    match format {
        LeagueFormat::Text => {
            println!();
            print!("{}", format_league_text(&stats, options.base_seed));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        LeagueFormat::Json => {
            let json_result = JsonLeagueResult::from_stats(&stats, options.base_seed);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
        LeagueFormat::Csv => {
            print!("{}", format_league_csv(&stats));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_threads_twice_is_harmless() {
        assert!(!configure_threads(None));
        configure_threads(Some(2));
        assert!(!configure_threads(Some(3)));
    }
}
