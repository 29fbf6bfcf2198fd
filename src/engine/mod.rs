//! Core simulation engine.
//!
//! Runs the three independent computations over one shared parameter set:
//! - Continuous decay-chain kinetics
//! - Stochastic neutron branching (deterministic RNG, PCG with partitioned seeds)
//! - Criticality classification
//! - Optionally, a geometric capture estimate
//!
//! The engine is fail-fast: parameters are validated before any model runs,
//! and the first error from any model is returned unchanged with no partial
//! output.

pub mod jidoka;
pub mod rng;

use serde::{Deserialize, Serialize};

pub use jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
pub use rng::{RandomSource, SimRng};

use crate::config::{GeometryParams, SimConfig, SimulationParameters};
use crate::error::SimResult;
use crate::scenarios::branching::{GenerationRecord, StochasticBranchingModel};
use crate::scenarios::criticality::{CriticalityAnalyzer, CriticalityVerdict};
use crate::scenarios::ensemble::{BranchingEnsemble, EnsembleSummary, Estimate};
use crate::scenarios::geometry::CaptureEstimator;
use crate::scenarios::kinetics::{ContinuousKineticModel, ContinuousTrajectory};

/// Everything one run hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOutput {
    /// Parameters the run used.
    pub parameters: SimulationParameters,
    /// Master seed, when the run was driven by a seeded [`SimRng`].
    pub seed: Option<u64>,
    /// Continuous model output.
    pub trajectory: ContinuousTrajectory,
    /// Stochastic model output.
    pub generations: GenerationRecord,
    /// Derived classification.
    pub verdict: CriticalityVerdict,
    /// Replicate ensemble, when configured.
    pub ensemble: Option<EnsembleSummary>,
    /// Geometric capture probability, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<Estimate>,
}

/// Main simulation engine.
///
/// Owns the configuration and a seeded RNG. The models hold no state
/// between runs.
#[derive(Debug, Clone)]
pub struct SimEngine {
    config: SimConfig,
    rng: SimRng,
    kinetics: ContinuousKineticModel,
    branching: StochasticBranchingModel,
}

impl SimEngine {
    /// Create a new simulation engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if configuration validation fails.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.check()?;
        let rng = SimRng::new(config.reproducibility.seed);
        let kinetics = ContinuousKineticModel::new(config.jidoka.clone());
        let branching = StochasticBranchingModel::new(config.jidoka.clone());

        Ok(Self {
            config,
            rng,
            kinetics,
            branching,
        })
    }

    /// Run the three components once over `params` with the given source.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` before any model runs if `params` is out
    /// of domain; otherwise the first model error, unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainsim::prelude::*;
    ///
    /// let engine = SimEngine::new(SimConfig::default()).unwrap();
    /// let params = SimulationParameters::builder().build().unwrap();
    /// let output = engine.run(&params, &mut SimRng::new(7)).unwrap();
    /// assert_eq!(output.trajectory.len(), params.kinetics.time_points);
    /// ```
    pub fn run<R: RandomSource + ?Sized>(
        &self,
        params: &SimulationParameters,
        rng: &mut R,
    ) -> SimResult<SimOutput> {
        params.check()?;
        log::info!(
            "running chain reaction: k = {:.4}, {} grid points, {} max generations",
            params.stochastic.multiplication_factor(),
            params.kinetics.time_points,
            params.stochastic.max_generations
        );

        let trajectory = self.kinetics.integrate(&params.kinetics)?;
        let generations = self.branching.simulate(&params.stochastic, rng)?;
        let verdict = CriticalityAnalyzer.classify(params)?;

        log::info!(
            "run complete: {} ({} generations recorded, {})",
            verdict.criticality,
            generations.len(),
            generations.stop_reason()
        );

        Ok(SimOutput {
            parameters: *params,
            seed: None,
            trajectory,
            generations,
            verdict,
            ensemble: None,
            capture: None,
        })
    }

    /// Run the configured parameters with the engine's own RNG, adding the
    /// capture estimate when a `geometry` section is present and the
    /// replicate ensemble when `ensemble.runs > 0`.
    ///
    /// # Errors
    ///
    /// Returns the first error from any component.
    pub fn run_once(&mut self) -> SimResult<SimOutput> {
        let params = self.config.parameters();
        let seed = self.rng.master_seed();

        let mut rng = self.rng.clone();
        let mut output = self.run(&params, &mut rng)?;
        output.seed = Some(seed);

        if let Some(geometry) = &self.config.geometry {
            output.capture = Some(CaptureEstimator.estimate(geometry, &mut rng)?);
        }

        let runs = self.config.ensemble.runs;
        if runs > 0 {
            let ensemble = BranchingEnsemble::new(self.branching.clone());
            output.ensemble = Some(ensemble.run(&params.stochastic, runs, &mut rng)?);
        }

        self.rng = rng;
        Ok(output)
    }

    /// Run only the replicate ensemble over the configured parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `runs == 0`, or the first replicate error.
    pub fn run_ensemble(&mut self, runs: usize) -> SimResult<EnsembleSummary> {
        let params = self.config.parameters();
        BranchingEnsemble::new(self.branching.clone()).run(&params.stochastic, runs, &mut self.rng)
    }

    /// Estimate the capture probability with the engine's RNG.
    ///
    /// Uses the configured `geometry` section, or the defaults when absent;
    /// `trials` overrides the trial count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a degenerate block or zero trials.
    pub fn estimate_capture(&mut self, trials: Option<u64>) -> SimResult<Estimate> {
        let mut geometry = self.config.geometry.unwrap_or_default();
        if let Some(trials) = trials {
            geometry.trials = trials;
        }
        CaptureEstimator.estimate(&geometry, &mut self.rng)
    }

    /// Geometry used by [`estimate_capture`](Self::estimate_capture).
    #[must_use]
    pub fn geometry(&self) -> GeometryParams {
        self.config.geometry.unwrap_or_default()
    }

    /// Classify the configured parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a zero rate constant.
    pub fn classify(&self) -> SimResult<CriticalityVerdict> {
        CriticalityAnalyzer.classify(&self.config.parameters())
    }

    /// Replace the RNG with a fresh one seeded from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.config.reproducibility.seed = seed;
        self.rng = SimRng::new(seed);
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get the RNG.
    #[must_use]
    pub const fn rng(&self) -> &SimRng {
        &self.rng
    }

    /// Get mutable RNG.
    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::branching::StopReason;
    use crate::scenarios::criticality::Criticality;

    #[test]
    fn test_sim_engine_new() {
        let engine = SimEngine::new(SimConfig::default()).unwrap();
        assert_eq!(engine.rng().master_seed(), 42);
        assert_eq!(engine.config().schema_version, "1.0");
    }

    #[test]
    fn test_sim_engine_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.kinetics.rate_constants.k1 = 0.0;
        let err = SimEngine::new(config).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_run_bundles_all_three() {
        let engine = SimEngine::new(SimConfig::default()).unwrap();
        let params = SimulationParameters::builder()
            .fission_prob(0.5)
            .neutrons_per_fission(2.0)
            .build()
            .unwrap();
        let output = engine.run(&params, &mut SimRng::new(1)).unwrap();

        assert_eq!(output.trajectory.len(), params.kinetics.time_points);
        assert_eq!(output.generations.samples()[0].population, params.stochastic.initial_neutrons);
        assert_eq!(output.verdict.criticality, Criticality::Critical);
        assert!(output.ensemble.is_none());
        assert!(output.seed.is_none());
        assert_eq!(output.parameters, params);
    }

    #[test]
    fn test_run_is_fail_fast_on_invalid_params() {
        struct CountingSource(usize);
        impl RandomSource for CountingSource {
            fn uniform(&mut self) -> f64 {
                self.0 += 1;
                0.0
            }
        }

        let engine = SimEngine::new(SimConfig::default()).unwrap();
        let mut params = SimulationParameters::default();
        params.kinetics.time_points = 1;

        let mut source = CountingSource(0);
        let err = engine.run(&params, &mut source).unwrap_err();
        assert!(err.is_invalid_parameter());
        assert_eq!(source.0, 0, "no draws before validation fails");
    }

    #[test]
    fn test_run_propagates_numeric_overflow() {
        let engine = SimEngine::new(SimConfig::default()).unwrap();
        let params = SimulationParameters::builder()
            .initial_neutrons(3.0)
            .fission_prob(1.0)
            .neutrons_per_fission(f64::MAX)
            .max_neutrons(f64::MAX)
            .build()
            .unwrap();
        let err = engine.run(&params, &mut SimRng::new(1)).unwrap_err();
        assert!(err.is_numeric_overflow());
    }

    #[test]
    fn test_yaml_cannot_silence_numeric_overflow() {
        let yaml = r"
stochastic:
  initial_neutrons: 3
  fission_prob: 1.0
  neutrons_per_fission: 1.7976931348623157e308
  max_neutrons: 1.7976931348623157e308
jidoka:
  negative_tolerance: 1.0e-3
";
        let mut engine = SimEngine::new(SimConfig::from_yaml(yaml).unwrap()).unwrap();
        let err = engine.run_once().unwrap_err();
        assert!(err.is_numeric_overflow(), "got {err}");

        let disabled = format!("{yaml}  check_finite: false\n");
        let err = SimConfig::from_yaml(&disabled).unwrap_err();
        assert!(err.to_string().contains("check_finite"), "got {err}");
    }

    #[test]
    fn test_run_once_with_geometry() {
        let mut config = SimConfig::default();
        config.geometry = Some(GeometryParams {
            trials: 500,
            ..GeometryParams::default()
        });
        let mut a = SimEngine::new(config.clone()).unwrap();
        let mut b = SimEngine::new(config).unwrap();
        let out_a = a.run_once().unwrap();
        let out_b = b.run_once().unwrap();

        let capture = out_a.capture.unwrap();
        assert!((0.0..=1.0).contains(&capture.estimate));
        assert_eq!(out_a, out_b);

        let plain = SimEngine::new(SimConfig::default()).unwrap().run_once().unwrap();
        assert!(plain.capture.is_none());
        assert_eq!(plain.generations, out_a.generations);
    }

    #[test]
    fn test_estimate_capture() {
        let mut engine = SimEngine::new(SimConfig::default()).unwrap();
        assert_eq!(engine.geometry(), GeometryParams::default());
        let first = engine.estimate_capture(Some(200)).unwrap();
        engine.reseed(42);
        let again = engine.estimate_capture(Some(200)).unwrap();
        assert_eq!(first, again);
        assert!(engine
            .estimate_capture(Some(0))
            .unwrap_err()
            .is_invalid_parameter());
    }

    #[test]
    fn test_run_once_reproducible() {
        let mut a = SimEngine::new(SimConfig::default()).unwrap();
        let mut b = SimEngine::new(SimConfig::default()).unwrap();
        let out_a = a.run_once().unwrap();
        let out_b = b.run_once().unwrap();
        assert_eq!(out_a, out_b);
        assert_eq!(out_a.seed, Some(42));
    }

    #[test]
    fn test_run_once_with_ensemble() {
        let mut config = SimConfig::default();
        config.ensemble.runs = 10;
        config.stochastic.max_neutrons = 1e3;
        let mut engine = SimEngine::new(config).unwrap();
        let output = engine.run_once().unwrap();
        let ensemble = output.ensemble.unwrap();
        assert_eq!(ensemble.runs, 10);
    }

    #[test]
    fn test_run_once_advances_rng() {
        let mut config = SimConfig::default();
        config.stochastic.fission_prob = 0.5;
        config.stochastic.neutrons_per_fission = 2.0;
        config.stochastic.initial_neutrons = 50.0;
        let mut engine = SimEngine::new(config).unwrap();
        let first = engine.run_once().unwrap();
        let second = engine.run_once().unwrap();
        assert_ne!(first.generations, second.generations);
    }

    #[test]
    fn test_reseed() {
        let mut engine = SimEngine::new(SimConfig::default()).unwrap();
        let first = engine.run_once().unwrap();
        engine.reseed(42);
        let again = engine.run_once().unwrap();
        assert_eq!(first, again);

        engine.reseed(7);
        assert_eq!(engine.rng().master_seed(), 7);
        assert_eq!(engine.config().reproducibility.seed, 7);
    }

    #[test]
    fn test_run_ensemble() {
        let mut config = SimConfig::default();
        config.stochastic.fission_prob = 0.0;
        let mut engine = SimEngine::new(config).unwrap();
        let summary = engine.run_ensemble(5).unwrap();
        assert_eq!(summary.extinct_runs, 5);
        assert!(engine.run_ensemble(0).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_classify() {
        let engine = SimEngine::new(SimConfig::default()).unwrap();
        let verdict = engine.classify().unwrap();
        // Defaults: 0.4 * 2.5
        assert_eq!(verdict.criticality, Criticality::Critical);
    }

    #[test]
    fn test_rng_mut() {
        let mut engine = SimEngine::new(SimConfig::default()).unwrap();
        let v = engine.rng_mut().gen_f64();
        assert!((0.0..1.0).contains(&v));
    }

    #[test]
    fn test_output_serializes() {
        let mut engine = SimEngine::new(SimConfig::default()).unwrap();
        let output = engine.run_once().unwrap();
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"trajectory\""));
        assert!(json.contains("\"generations\""));
        assert!(json.contains("\"verdict\""));
        let back: SimOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.generations.stop_reason(), output.generations.stop_reason());
        assert!(matches!(
            back.generations.stop_reason(),
            StopReason::Extinct | StopReason::PopulationCap | StopReason::GenerationLimit
        ));
    }
}
