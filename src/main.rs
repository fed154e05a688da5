//! Tickarena CLI - run scripted robot matches and leagues.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Tickarena - a deterministic robot combat arena
#[derive(Parser, Debug)]
#[command(name = "tickarena")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log more (-v for match events, -vv for every tick); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single match from a scenario file or a set of scripts
    Run {
        /// A scenario JSON file, or 2-8 Lua scripts to spawn at random
        #[arg(required = true, num_args = 1..=8)]
        inputs: Vec<PathBuf>,

        /// Random seed (overrides the scenario's seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON file of engine settings (replaces the scenario's rules)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum ticks (overrides the scenario's limit)
        #[arg(short = 't', long)]
        max_ticks: Option<u32>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Write a JSON Lines transcript of every tick
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Suppress the match header
        #[arg(short, long)]
        quiet: bool,
    },

    /// Play every pair of scripts against each other and rank them
    League {
        /// Lua scripts (at least 2)
        #[arg(required = true, num_args = 2..)]
        bots: Vec<PathBuf>,

        /// Matches per pair (default: 1)
        #[arg(short, long, default_value = "1")]
        rounds: u32,

        /// Seed of the first round (increments each round)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// JSON file of engine settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum ticks per match (default: 1000)
        #[arg(short = 't', long)]
        max_ticks: Option<u32>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::LeagueFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Check a scenario file and load its scripts without playing
    Validate {
        /// Scenario JSON file
        #[arg(required = true)]
        scenario: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Run {
            inputs,
            seed,
            config,
            max_ticks,
            format,
            transcript,
            quiet,
        } => cli::run::execute(&inputs, seed, config.as_deref(), max_ticks, format, transcript, quiet),

        Commands::League {
            bots,
            rounds,
            seed,
            threads,
            config,
            max_ticks,
            format,
            progress,
        } => cli::league::execute(
            &bots,
            rounds,
            seed,
            threads,
            config.as_deref(),
            max_ticks,
            format,
            progress,
        ),

        Commands::Validate { scenario } => cli::validate::execute(&scenario),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
