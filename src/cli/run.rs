//! Run command implementation.

use super::output::format_report_text;
use super::{CliError, OutputFormat, clock_seed};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tickarena::transcript::TranscriptWriter;
use tickarena::{ArenaConfig, Scenario, run_match};

fn is_fixture(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Build the scenario for `inputs`: a single fixture file, or scripts to spawn.
///
/// `config` replaces the fixture's rules when given.
fn load_scenario(inputs: &[PathBuf], seed: Option<u64>, config: Option<ArenaConfig>) -> Result<Scenario, CliError> {
    match inputs {
        [single] if is_fixture(single) => {
            let mut scenario = Scenario::from_file(single)?;
            if let Some(seed) = seed {
                scenario.seed = seed;
            }
            if let Some(config) = config {
                scenario.config = config;
            }
            Ok(scenario)
        }
        [_] => Err(CliError::new(
            "Expected a scenario .json file or at least 2 scripts",
        )),
        scripts => {
            if let Some(fixture) = scripts.iter().find(|p| is_fixture(p)) {
                return Err(CliError::new(format!(
                    "{} is a scenario; pass it on its own",
                    fixture.display()
                )));
            }
            let seed = seed.unwrap_or_else(clock_seed);
            Ok(Scenario::from_scripts(scripts, config.unwrap_or_default(), seed))
        }
    }
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the match cannot be set up or the transcript cannot
/// be written.
pub(crate) fn execute(
    inputs: &[PathBuf],
    seed: Option<u64>,
    config: Option<&Path>,
    max_ticks: Option<u32>,
    format: OutputFormat,
    transcript: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = config.map(ArenaConfig::from_file).transpose()?;
    let mut scenario = load_scenario(inputs, seed, config)?;
    if let Some(t) = max_ticks {
        scenario.config.max_ticks = t;
    }

    if !quiet && format == OutputFormat::Text {
        println!("Running match with seed {}...", scenario.seed);
        let names: Vec<String> = scenario
            .robots
            .iter()
            .map(|r| r.script.display().to_string())
            .collect();
        println!("Robots: {}", names.join(", "));
        println!();
    }

    let report = match &transcript {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                CliError::new(format!("Failed to create {}: {e}", path.display()))
            })?;
            let mut writer = TranscriptWriter::new(BufWriter::new(file));
            run_match(&scenario, Some(&mut writer))?
        }
        None => run_match::<std::io::Sink>(&scenario, None)?,
    };

    match format {
        OutputFormat::Text => {
            print!("{}", format_report_text(&report));
            if let Some(path) = transcript
                && !quiet
            {
                println!();
                println!("Transcript saved to: {}", path.display());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/scenarios")
            .join(name)
            .join("scenario.json")
    }

    #[test]
    fn test_config_replaces_fixture_rules() {
        let config = ArenaConfig {
            max_ticks: 7,
            toss_damage: 50,
            ..ArenaConfig::default()
        };
        let scenario = load_scenario(&[fixture("07_game_over")], Some(3), Some(config)).unwrap();
        assert_eq!(scenario.seed, 3);
        assert_eq!(scenario.config.max_ticks, 7);
        assert_eq!(scenario.config.toss_damage, 50);
    }

    #[test]
    fn test_fixture_rules_kept_without_config() {
        let scenario = load_scenario(&[fixture("07_game_over")], None, None).unwrap();
        assert_eq!(scenario.config.max_ticks, 200);
    }

    #[test]
    fn test_scripts_use_config() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("bots");
        let scripts = [dir.join("spiral_hunter.lua"), dir.join("orbit_evader.lua")];
        let config = ArenaConfig {
            max_health: 40,
            ..ArenaConfig::default()
        };
        let scenario = load_scenario(&scripts, Some(1), Some(config)).unwrap();
        assert_eq!(scenario.config.max_health, 40);
        assert_eq!(scenario.robots.len(), 2);
    }
}
