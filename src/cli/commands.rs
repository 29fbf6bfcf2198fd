//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command.
//! Extracted to enable comprehensive testing of command behavior.

use std::path::Path;
use std::process::ExitCode;

use crate::config::SimConfig;
use crate::engine::SimEngine;
use crate::error::SimResult;

use super::output::{
    format_capture, format_ensemble, format_verdict, print_config_summary, print_help,
    print_run_report, print_version, render_json,
};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            seed_override,
            json,
            verbose,
        } => run_simulation(config_path.as_deref(), seed_override, json, verbose),
        Command::Classify { config_path } => classify(config_path.as_deref()),
        Command::Validate { config_path } => validate_config(&config_path),
        Command::Ensemble {
            config_path,
            runs,
            seed_override,
        } => run_ensemble(config_path.as_deref(), runs, seed_override),
        Command::Capture {
            config_path,
            trials,
            seed_override,
        } => estimate_capture(config_path.as_deref(), trials, seed_override),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load the configuration at `path`, or the defaults when absent.
///
/// # Errors
///
/// Returns error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> SimResult<SimConfig> {
    match path {
        Some(p) => SimConfig::load(p),
        None => Ok(SimConfig::default()),
    }
}

/// Build an engine from `path` with an optional seed override.
fn build_engine(path: Option<&Path>, seed_override: Option<u64>) -> SimResult<SimEngine> {
    let mut engine = SimEngine::new(load_config(path)?)?;
    if let Some(seed) = seed_override {
        engine.reseed(seed);
    }
    Ok(engine)
}

/// Run the three models once and print the report.
///
/// # Arguments
///
/// * `path` - Optional configuration YAML
/// * `seed_override` - Optional seed to override the configured seed
/// * `json` - Emit JSON instead of the text report
/// * `verbose` - Whether to print the full trajectory
#[must_use]
pub fn run_simulation(
    path: Option<&Path>,
    seed_override: Option<u64>,
    json: bool,
    verbose: bool,
) -> ExitCode {
    let result = build_engine(path, seed_override).and_then(|mut engine| engine.run_once());

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    if json {
        match render_json(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        print_run_report(&output, verbose);
    }
    ExitCode::SUCCESS
}

/// Print the criticality verdict for a configuration.
#[must_use]
pub fn classify(path: Option<&Path>) -> ExitCode {
    match load_config(path).and_then(|config| SimEngine::new(config)?.classify()) {
        Ok(verdict) => {
            print!("{}", format_verdict(&verdict));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Validate a configuration file.
///
/// # Arguments
///
/// * `path` - Path to the configuration YAML file
#[must_use]
pub fn validate_config(path: &Path) -> ExitCode {
    println!("Validating: {}\n", path.display());

    match SimConfig::load(path) {
        Ok(config) => {
            print_config_summary(&config);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ Validation FAILED: {e}");
            ExitCode::from(1)
        }
    }
}

/// Run a replicate ensemble of the branching model.
///
/// # Arguments
///
/// * `path` - Optional configuration YAML
/// * `runs` - Number of replicates
/// * `seed_override` - Optional seed to override the configured seed
#[must_use]
pub fn run_ensemble(path: Option<&Path>, runs: usize, seed_override: Option<u64>) -> ExitCode {
    let result = build_engine(path, seed_override).and_then(|mut engine| {
        let summary = engine.run_ensemble(runs)?;
        Ok((engine.rng().master_seed(), summary))
    });

    match result {
        Ok((seed, summary)) => {
            println!("Branching ensemble (seed {seed}):");
            print!("{}", format_ensemble(&summary));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Estimate the geometric capture probability.
///
/// # Arguments
///
/// * `path` - Optional configuration YAML
/// * `trials` - Optional trial count overriding the configured one
/// * `seed_override` - Optional seed to override the configured seed
#[must_use]
pub fn estimate_capture(
    path: Option<&Path>,
    trials: Option<u64>,
    seed_override: Option<u64>,
) -> ExitCode {
    let result = build_engine(path, seed_override).and_then(|mut engine| {
        let estimate = engine.estimate_capture(trials)?;
        let mut geometry = engine.geometry();
        if let Some(trials) = trials {
            geometry.trials = trials;
        }
        Ok((engine.rng().master_seed(), geometry, estimate))
    });

    match result {
        Ok((seed, geometry, estimate)) => {
            println!("Geometric capture (seed {seed}):");
            print!("{}", format_capture(&geometry, &estimate));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
