//! CLI output formatting.
//!
//! This module contains all output formatting functions for the CLI.
//! Extracted to enable testing of output generation.

use crate::config::{GeometryParams, SimConfig};
use crate::engine::SimOutput;
use crate::error::{SimError, SimResult};
use crate::scenarios::criticality::CriticalityVerdict;
use crate::scenarios::ensemble::{EnsembleSummary, Estimate};
use crate::scenarios::kinetics::{ContinuousTrajectory, Species};
use crate::scenarios::branching::GenerationRecord;

/// Maximum rows printed from the concentration trajectory.
pub const TRAJECTORY_ROWS: usize = 11;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print version information.
pub fn print_version() {
    println!("chainsim {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"chainsim - Chain-reaction simulator

USAGE:
    chainsim <COMMAND> [OPTIONS]

COMMANDS:
    run [config.yaml]           Run kinetics, branching and criticality once
        --seed <N>              Override the configured seed
        --json                  Emit the result bundle as JSON
        -v, --verbose           Enable verbose output (info logging)

    classify [config.yaml]      Print the criticality verdict only

    validate <config.yaml>      Validate a configuration file

    ensemble [config.yaml]      Run replicate branching simulations
        --runs <N>              Number of replicates (default: 100)
        --seed <N>              Override the configured seed

    capture [config.yaml]       Estimate the geometric capture probability
        --trials <N>            Override the configured trial count
        --seed <N>              Override the configured seed

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    chainsim run
    chainsim run reactor.yaml --seed 12345
    chainsim run reactor.yaml --json
    chainsim ensemble reactor.yaml --runs 1000
    chainsim capture --trials 100000

LOGGING:
    Set RUST_LOG (e.g. RUST_LOG=debug) to see per-generation progress.
"
    );
}

/// Row indices for a table of at most `max_rows` evenly spread rows.
///
/// Always includes the first and last index when `len >= 2`.
#[must_use]
pub fn downsample_indices(len: usize, max_rows: usize) -> Vec<usize> {
    if len == 0 || max_rows == 0 {
        return Vec::new();
    }
    if len <= max_rows {
        return (0..len).collect();
    }
    if max_rows == 1 {
        return vec![0];
    }

    let mut indices: Vec<usize> = (0..max_rows)
        .map(|r| (r * (len - 1) + (max_rows - 1) / 2) / (max_rows - 1))
        .collect();
    indices.dedup();
    indices
}

/// Format the down-sampled concentration table.
#[must_use]
pub fn format_trajectory(trajectory: &ContinuousTrajectory, max_rows: usize) -> String {
    let mut out = format!(
        "  {:>10}  {:>12}  {:>12}  {:>12}\n",
        "t",
        Species::A.label(),
        Species::B.label(),
        Species::C.label()
    );
    for i in downsample_indices(trajectory.len(), max_rows) {
        if let Some(s) = trajectory.state(i) {
            out.push_str(&format!(
                "  {:>10.4}  {:>12.6}  {:>12.6}  {:>12.6}\n",
                s.time, s.a, s.b, s.c
            ));
        }
    }
    out
}

/// Format the generation table.
#[must_use]
pub fn format_generations(record: &GenerationRecord) -> String {
    let mut out = format!("  {:>10}  {:>14}\n", "generation", "population");
    for sample in record.samples() {
        out.push_str(&format!(
            "  {:>10}  {:>14}\n",
            sample.generation, sample.population
        ));
    }
    out
}

/// Format the criticality verdict block.
#[must_use]
pub fn format_verdict(verdict: &CriticalityVerdict) -> String {
    let [t1, t2, t3] = verdict.characteristic_times;
    format!(
        "  Criticality:          {}\n  Multiplication k:     {:.6}\n  Characteristic times: τ1 = {t1:.4}, τ2 = {t2:.4}, τ3 = {t3:.4}\n",
        verdict.criticality, verdict.multiplication_factor
    )
}

fn format_estimate(estimate: &Estimate) -> String {
    format!(
        "{:.4} ± {:.4} (95% CI {:.4} .. {:.4})",
        estimate.estimate,
        estimate.std_error,
        estimate.confidence_interval.0,
        estimate.confidence_interval.1
    )
}

/// Format an ensemble summary.
#[must_use]
pub fn format_ensemble(summary: &EnsembleSummary) -> String {
    format!(
        "  Replicates:             {}\n  Extinct / capped:       {} / {}\n  Extinction probability: {}\n  Final population:       {}\n  Recorded generations:   {}\n",
        summary.runs,
        summary.extinct_runs,
        summary.capped_runs,
        format_estimate(&summary.extinction_probability),
        format_estimate(&summary.final_population),
        format_estimate(&summary.recorded_generations)
    )
}

/// Format a capture estimate with the block it was drawn for.
#[must_use]
pub fn format_capture(geometry: &GeometryParams, estimate: &Estimate) -> String {
    format!(
        "  Mass, shape:         {}, {}\n  Trials:              {}\n  Capture probability: {}\n",
        geometry.mass,
        geometry.shape,
        geometry.trials,
        format_estimate(estimate)
    )
}

/// Serialize the result bundle as pretty JSON.
///
/// # Errors
///
/// Returns a serialization error if encoding fails.
pub fn render_json(output: &SimOutput) -> SimResult<String> {
    serde_json::to_string_pretty(output).map_err(|e| SimError::serialization(e.to_string()))
}

/// Print the text report for one run.
///
/// # Arguments
///
/// * `output` - The result bundle to display
/// * `verbose` - Whether to print every trajectory row
pub fn print_run_report(output: &SimOutput, verbose: bool) {
    println!("{RULE}");
    println!("Chain Reaction Simulation");
    if let Some(seed) = output.seed {
        println!("Seed: {seed}");
    }
    println!("{RULE}\n");

    println!("Criticality:");
    print!("{}", format_verdict(&output.verdict));

    let rows = if verbose {
        output.trajectory.len()
    } else {
        TRAJECTORY_ROWS
    };
    println!("\nDecay chain (A → B → C):");
    print!("{}", format_trajectory(&output.trajectory, rows));
    for species in Species::ALL {
        if let Some((t, v)) = output.trajectory.peak(species) {
            println!("  peak {}: {v:.6} at t = {t:.4}", species.label());
        }
    }
    if !output.trajectory.warnings().is_empty() {
        println!(
            "  ! {} negative concentration sample(s)",
            output.trajectory.warnings().len()
        );
    }

    println!("\nNeutron generations:");
    print!("{}", format_generations(&output.generations));
    println!("  Stopped: {}", output.generations.stop_reason());

    if let Some(ref capture) = output.capture {
        println!("\nGeometric capture:");
        println!("  Capture probability: {}", format_estimate(capture));
    }

    if let Some(ref ensemble) = output.ensemble {
        println!("\nEnsemble:");
        print!("{}", format_ensemble(ensemble));
    }

    println!("\n{RULE}");
    println!("Result: {}", output.verdict.criticality);
    println!("{RULE}\n");
}

/// Print a validated configuration summary.
pub fn print_config_summary(config: &SimConfig) {
    let k = &config.kinetics;
    let s = &config.stochastic;
    println!("{RULE}");
    println!("✓ Configuration valid (schema {})", config.schema_version);
    println!("{RULE}\n");
    println!("Kinetics:");
    println!(
        "  A0, B0, C0:   {}, {}, {}",
        k.initial_concentrations.a, k.initial_concentrations.b, k.initial_concentrations.c
    );
    println!(
        "  k1, k2, k3:   {}, {}, {}",
        k.rate_constants.k1, k.rate_constants.k2, k.rate_constants.k3
    );
    println!("  Time grid:    {} points over [0, {}]", k.time_points, k.max_time);
    println!("\nBranching:");
    println!("  Initial neutrons:     {}", s.initial_neutrons);
    println!("  Fission probability:  {}", s.fission_prob);
    println!("  Neutrons per fission: {}", s.neutrons_per_fission);
    println!("  Max generations:      {}", s.max_generations);
    println!("  Max neutrons:         {}", s.max_neutrons);
    println!("\nSeed: {}", config.reproducibility.seed);
    if config.ensemble.runs > 0 {
        println!("Ensemble runs: {}", config.ensemble.runs);
    }
    if let Some(g) = &config.geometry {
        println!(
            "Geometry: mass {}, shape {}, {} trials",
            g.mass, g.shape, g.trials
        );
    }
}
