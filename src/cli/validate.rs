//! Scenario validation command implementation.

use super::CliError;
use std::path::Path;
use tickarena::Scenario;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the scenario is malformed or a script fails to load.
pub(crate) fn execute(path: &Path) -> Result<(), CliError> {
    println!("Validating: {}", path.display());
    println!();

    let scenario = Scenario::from_file(path);
    print_check("Scenario parses", scenario.is_ok());
    let scenario = scenario?;

    let placement = scenario.validate();
    print_check("Robots and rules", placement.is_ok());
    placement?;

    let mut loaded = true;
    for (index, spec) in scenario.robots.iter().enumerate() {
        let script = scenario.script_path(spec);
        let ok = std::fs::metadata(&script).is_ok_and(|m| m.is_file());
        print_check(&format!("Robot {}: {}", index + 1, script.display()), ok);
        loaded &= ok;
    }
    if !loaded {
        return Err(CliError::new("One or more scripts are missing"));
    }

    print!("Script load test... ");
    match scenario.build() {
        Ok(arena) => {
            println!("OK");
            println!();
            println!("Summary:");
            println!("  Robots:     {}", arena.world().robots.len());
            println!("  Seed:       {}", scenario.seed);
            println!("  Max ticks:  {}", scenario.config.max_ticks);
        }
        Err(e) => {
            println!("FAILED");
            return Err(e.into());
        }
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
