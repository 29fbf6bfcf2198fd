//! Replicate ensembles of the branching model.
//!
//! Runs many independent branching simulations, each on its own partitioned
//! RNG stream, and summarises them as Monte Carlo estimates. Replicate `i`
//! always sees the same stream for a given master seed.

use serde::{Deserialize, Serialize};

use crate::config::{StochasticParams, MAX_ENSEMBLE_RUNS};
use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};
use crate::scenarios::branching::{StochasticBranchingModel, StopReason};

/// Monte Carlo point estimate with its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Point estimate.
    pub estimate: f64,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// 95% confidence interval (estimate ± 1.96 * `std_error`).
    pub confidence_interval: (f64, f64),
}

impl Estimate {
    /// Create an estimate.
    #[must_use]
    pub fn new(estimate: f64, std_error: f64) -> Self {
        let ci_half = 1.96 * std_error;
        Self {
            estimate,
            std_error,
            confidence_interval: (estimate - ci_half, estimate + ci_half),
        }
    }

    /// Sample mean and standard error of the mean.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len() as f64;
        if samples.is_empty() {
            return Self::new(0.0, 0.0);
        }
        let mean = samples.iter().sum::<f64>() / n;
        if samples.len() < 2 {
            return Self::new(mean, 0.0);
        }
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Self::new(mean, (variance / n).sqrt())
    }

    /// Check if value is within confidence interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.confidence_interval.0 && value <= self.confidence_interval.1
    }
}

/// Aggregate of an ensemble run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    /// Number of replicates.
    pub runs: usize,
    /// Replicates that went extinct.
    pub extinct_runs: usize,
    /// Replicates stopped by the population cap.
    pub capped_runs: usize,
    /// Fraction of replicates that went extinct.
    pub extinction_probability: Estimate,
    /// Population of the last recorded generation.
    pub final_population: Estimate,
    /// Number of recorded generations (including generation 0).
    pub recorded_generations: Estimate,
}

/// Replicate runner for the branching model.
#[derive(Debug, Clone, Default)]
pub struct BranchingEnsemble {
    model: StochasticBranchingModel,
}

impl BranchingEnsemble {
    /// Create an ensemble around a configured model.
    #[must_use]
    pub const fn new(model: StochasticBranchingModel) -> Self {
        Self { model }
    }

    /// Run `runs` replicates.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `runs` is 0 or above
    /// [`MAX_ENSEMBLE_RUNS`] or the parameters are out of domain, and
    /// propagates the first replicate failure unchanged.
    pub fn run(
        &self,
        params: &StochasticParams,
        runs: usize,
        rng: &mut SimRng,
    ) -> SimResult<EnsembleSummary> {
        if runs == 0 {
            return Err(SimError::invalid("ensemble.runs", "must be at least 1"));
        }
        if runs > MAX_ENSEMBLE_RUNS {
            return Err(SimError::invalid(
                "ensemble.runs",
                format!("must be at most {MAX_ENSEMBLE_RUNS}, got {runs}"),
            ));
        }
        params.check()?;

        let mut extinct_runs = 0;
        let mut capped_runs = 0;
        let mut extinct = Vec::new();
        let mut finals = Vec::new();
        let mut lengths = Vec::new();

        for mut stream in rng.partition_iter(runs) {
            let record = self.model.simulate(params, &mut stream)?;
            match record.stop_reason() {
                StopReason::Extinct => extinct_runs += 1,
                StopReason::PopulationCap => capped_runs += 1,
                StopReason::GenerationLimit => {}
            }
            extinct.push(if record.is_extinct() { 1.0 } else { 0.0 });
            finals.push(record.final_population());
            lengths.push(record.len() as f64);
        }

        log::info!("ensemble of {runs} replicates: {extinct_runs} extinct, {capped_runs} capped");

        Ok(EnsembleSummary {
            runs,
            extinct_runs,
            capped_runs,
            extinction_probability: Estimate::from_samples(&extinct),
            final_population: Estimate::from_samples(&finals),
            recorded_generations: Estimate::from_samples(&lengths),
        })
    }
}
