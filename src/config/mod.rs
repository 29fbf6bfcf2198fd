//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe parameter structs with named fields
//! - Schema ranges via `validator`
//! - Runtime semantic validation (strict positivity, finiteness)
//!
//! Every model entry point re-checks the parameters it consumes, so an
//! invalid value is rejected before any sample is drawn or any step taken.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::engine::jidoka::JidokaConfig;
use crate::error::{SimError, SimResult};

/// Initial concentrations `(A0, B0, C0)` of the decay chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Concentrations {
    /// Species A.
    pub a: f64,
    /// Species B.
    #[serde(default)]
    pub b: f64,
    /// Species C.
    #[serde(default)]
    pub c: f64,
}

impl Default for Concentrations {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
        }
    }
}

/// First-order rate constants `(k1, k2, k3)` in 1/time units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateConstants {
    /// A → B.
    pub k1: f64,
    /// B → C.
    pub k2: f64,
    /// C → (removed).
    pub k3: f64,
}

impl Default for RateConstants {
    fn default() -> Self {
        Self {
            k1: 0.5,
            k2: 0.3,
            k3: 0.1,
        }
    }
}

impl RateConstants {
    /// Rates as `[k1, k2, k3]`.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.k1, self.k2, self.k3]
    }

    /// Fastest rate in the chain.
    #[must_use]
    pub fn max_rate(&self) -> f64 {
        self.k1.max(self.k2).max(self.k3)
    }
}

/// Largest sampling grid accepted for one trajectory.
pub const MAX_TIME_POINTS: usize = 10_000_000;

/// Parameters of the continuous three-species kinetic model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct KineticParams {
    /// Initial state `(A0, B0, C0)`.
    #[serde(default)]
    pub initial_concentrations: Concentrations,
    /// Rate constants `(k1, k2, k3)`.
    #[serde(default)]
    pub rate_constants: RateConstants,
    /// End of the sampling grid.
    #[serde(default = "default_max_time")]
    pub max_time: f64,
    /// Number of samples on `[0, max_time]`, both endpoints included.
    #[validate(range(min = 2))]
    #[serde(default = "default_time_points")]
    pub time_points: usize,
}

const fn default_max_time() -> f64 {
    20.0
}

const fn default_time_points() -> usize {
    201
}

impl Default for KineticParams {
    fn default() -> Self {
        Self {
            initial_concentrations: Concentrations::default(),
            rate_constants: RateConstants::default(),
            max_time: default_max_time(),
            time_points: default_time_points(),
        }
    }
}

impl KineticParams {
    /// Validate schema ranges and semantic constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative or non-finite concentrations,
    /// non-positive rate constants, `max_time <= 0`, or `time_points`
    /// outside `2..=MAX_TIME_POINTS`.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    fn validate_semantic(&self) -> SimResult<()> {
        let c = self.initial_concentrations;
        for (name, value) in [
            ("initial_concentrations.a", c.a),
            ("initial_concentrations.b", c.b),
            ("initial_concentrations.c", c.c),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid(
                    name,
                    format!("must be a finite nonnegative number, got {value}"),
                ));
            }
        }

        let k = self.rate_constants;
        for (name, value) in [
            ("rate_constants.k1", k.k1),
            ("rate_constants.k2", k.k2),
            ("rate_constants.k3", k.k3),
        ] {
            // k = 0 would mean an infinite time constant
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid(
                    name,
                    format!("must be a finite positive rate, got {value}"),
                ));
            }
        }

        if !self.max_time.is_finite() || self.max_time <= 0.0 {
            return Err(SimError::invalid(
                "max_time",
                format!("must be a finite positive time, got {}", self.max_time),
            ));
        }

        if self.time_points < 2 {
            return Err(SimError::invalid(
                "time_points",
                format!("grid needs at least 2 points, got {}", self.time_points),
            ));
        }
        if self.time_points > MAX_TIME_POINTS {
            return Err(SimError::invalid(
                "time_points",
                format!(
                    "grid may have at most {MAX_TIME_POINTS} points, got {}",
                    self.time_points
                ),
            ));
        }

        Ok(())
    }
}

/// Parameters of the discrete stochastic branching model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StochasticParams {
    /// Generation-0 population.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_initial_neutrons")]
    pub initial_neutrons: f64,
    /// Per-individual fission probability.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_fission_prob")]
    pub fission_prob: f64,
    /// Neutrons released by one fission (may be fractional).
    #[validate(range(min = 0.0))]
    #[serde(default = "default_neutrons_per_fission")]
    pub neutrons_per_fission: f64,
    /// Last generation index that may be simulated.
    #[serde(default = "default_max_generations")]
    pub max_generations: u32,
    /// Population cap; exceeding it ends the run before the next generation.
    #[serde(default = "default_max_neutrons")]
    pub max_neutrons: f64,
}

const fn default_initial_neutrons() -> f64 {
    10.0
}

const fn default_fission_prob() -> f64 {
    0.4
}

const fn default_neutrons_per_fission() -> f64 {
    2.5
}

const fn default_max_generations() -> u32 {
    50
}

const fn default_max_neutrons() -> f64 {
    1.0e6
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            initial_neutrons: default_initial_neutrons(),
            fission_prob: default_fission_prob(),
            neutrons_per_fission: default_neutrons_per_fission(),
            max_generations: default_max_generations(),
            max_neutrons: default_max_neutrons(),
        }
    }
}

impl StochasticParams {
    /// Validate schema ranges and semantic constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative neutron counts, a probability
    /// outside `[0, 1]`, or a non-positive population cap.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    fn validate_semantic(&self) -> SimResult<()> {
        if !self.initial_neutrons.is_finite() || self.initial_neutrons < 0.0 {
            return Err(SimError::invalid(
                "initial_neutrons",
                format!("must be a finite nonnegative count, got {}", self.initial_neutrons),
            ));
        }

        // NaN fails both comparisons
        if !(0.0..=1.0).contains(&self.fission_prob) {
            return Err(SimError::invalid(
                "fission_prob",
                format!("must lie in [0, 1], got {}", self.fission_prob),
            ));
        }

        if !self.neutrons_per_fission.is_finite() || self.neutrons_per_fission < 0.0 {
            return Err(SimError::invalid(
                "neutrons_per_fission",
                format!(
                    "must be a finite nonnegative yield, got {}",
                    self.neutrons_per_fission
                ),
            ));
        }

        if !self.max_neutrons.is_finite() || self.max_neutrons <= 0.0 {
            return Err(SimError::invalid(
                "max_neutrons",
                format!("must be a finite positive cap, got {}", self.max_neutrons),
            ));
        }

        Ok(())
    }

    /// Multiplication factor `k = fission_prob * neutrons_per_fission`.
    #[must_use]
    pub fn multiplication_factor(&self) -> f64 {
        self.fission_prob * self.neutrons_per_fission
    }
}

/// The full, validated parameter set shared by every model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationParameters {
    /// Continuous model parameters.
    #[validate(nested)]
    #[serde(default)]
    pub kinetics: KineticParams,
    /// Stochastic model parameters.
    #[validate(nested)]
    #[serde(default)]
    pub stochastic: StochasticParams,
}

impl SimulationParameters {
    /// Create a validated parameter set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if either half fails validation.
    pub fn new(kinetics: KineticParams, stochastic: StochasticParams) -> SimResult<Self> {
        let params = Self {
            kinetics,
            stochastic,
        };
        params.check()?;
        Ok(params)
    }

    /// Create a builder starting from the documented defaults.
    #[must_use]
    pub fn builder() -> SimulationParametersBuilder {
        SimulationParametersBuilder::default()
    }

    /// Validate both halves.
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidParameter` found.
    pub fn check(&self) -> SimResult<()> {
        self.kinetics.check()?;
        self.stochastic.check()
    }
}

/// Builder for programmatic construction of [`SimulationParameters`].
#[derive(Debug, Default)]
pub struct SimulationParametersBuilder {
    kinetics: KineticParams,
    stochastic: StochasticParams,
}

impl SimulationParametersBuilder {
    /// Set `(A0, B0, C0)`.
    #[must_use]
    pub const fn initial_concentrations(mut self, a: f64, b: f64, c: f64) -> Self {
        self.kinetics.initial_concentrations = Concentrations { a, b, c };
        self
    }

    /// Set `(k1, k2, k3)`.
    #[must_use]
    pub const fn rate_constants(mut self, k1: f64, k2: f64, k3: f64) -> Self {
        self.kinetics.rate_constants = RateConstants { k1, k2, k3 };
        self
    }

    /// Set the end of the sampling grid.
    #[must_use]
    pub const fn max_time(mut self, max_time: f64) -> Self {
        self.kinetics.max_time = max_time;
        self
    }

    /// Set the number of grid samples.
    #[must_use]
    pub const fn time_points(mut self, time_points: usize) -> Self {
        self.kinetics.time_points = time_points;
        self
    }

    /// Set the generation-0 population.
    #[must_use]
    pub const fn initial_neutrons(mut self, n: f64) -> Self {
        self.stochastic.initial_neutrons = n;
        self
    }

    /// Set the per-individual fission probability.
    #[must_use]
    pub const fn fission_prob(mut self, p: f64) -> Self {
        self.stochastic.fission_prob = p;
        self
    }

    /// Set the yield per fission.
    #[must_use]
    pub const fn neutrons_per_fission(mut self, nu: f64) -> Self {
        self.stochastic.neutrons_per_fission = nu;
        self
    }

    /// Set the generation limit.
    #[must_use]
    pub const fn max_generations(mut self, g: u32) -> Self {
        self.stochastic.max_generations = g;
        self
    }

    /// Set the population cap.
    #[must_use]
    pub const fn max_neutrons(mut self, cap: f64) -> Self {
        self.stochastic.max_neutrons = cap;
        self
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if any value is out of domain.
    pub fn build(self) -> SimResult<SimulationParameters> {
        SimulationParameters::new(self.kinetics, self.stochastic)
    }
}

/// Top-level configuration document.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Reproducibility settings.
    #[serde(default)]
    pub reproducibility: ReproducibilityConfig,

    /// Continuous model parameters.
    #[validate(nested)]
    #[serde(default)]
    pub kinetics: KineticParams,

    /// Stochastic model parameters.
    #[validate(nested)]
    #[serde(default)]
    pub stochastic: StochasticParams,

    /// Replicate ensemble settings.
    #[serde(default)]
    pub ensemble: EnsembleConfig,

    /// Geometric capture estimate, run alongside the models when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryParams>,

    /// Jidoka (stop-on-error) configuration.
    #[serde(default)]
    pub jidoka: JidokaConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            reproducibility: ReproducibilityConfig::default(),
            kinetics: KineticParams::default(),
            stochastic: StochasticParams::default(),
            ensemble: EnsembleConfig::default(),
            geometry: None,
            jidoka: JidokaConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        serde_yaml::to_string(self).map_err(|e| SimError::serialization(e.to_string()))
    }

    /// Validate schema and semantic constraints.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an unsupported schema version and
    /// `InvalidParameter` for any out-of-domain parameter.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        if !self.schema_version.starts_with("1.") {
            return Err(SimError::config(format!(
                "unsupported schema version '{}', expected 1.x",
                self.schema_version
            )));
        }
        self.ensemble.check()?;
        if let Some(geometry) = &self.geometry {
            geometry.check()?;
        }
        self.parameters().check()
    }

    /// Parameter set handed to the models.
    #[must_use]
    pub const fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            kinetics: self.kinetics,
            stochastic: self.stochastic,
        }
    }

    /// Create a configuration around an existing parameter set.
    #[must_use]
    pub fn with_parameters(params: SimulationParameters) -> Self {
        Self {
            kinetics: params.kinetics,
            stochastic: params.stochastic,
            ..Self::default()
        }
    }
}

/// Reproducibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReproducibilityConfig {
    /// Master seed for all RNG.
    pub seed: u64,
}

impl Default for ReproducibilityConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Largest replicate count accepted for one ensemble.
pub const MAX_ENSEMBLE_RUNS: usize = 1_000_000;

/// Replicate ensemble settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsembleConfig {
    /// Number of independent branching replicates (0 disables the ensemble).
    #[serde(default)]
    pub runs: usize,
}

impl EnsembleConfig {
    /// Check the replicate count against [`MAX_ENSEMBLE_RUNS`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `runs` exceeds the cap.
    pub fn check(&self) -> SimResult<()> {
        if self.runs > MAX_ENSEMBLE_RUNS {
            return Err(SimError::invalid(
                "ensemble.runs",
                format!("must be at most {MAX_ENSEMBLE_RUNS}, got {}", self.runs),
            ));
        }
        Ok(())
    }
}

/// Parameters of the geometric capture estimate.
///
/// The fissile block has volume `mass` and width-to-height ratio `shape`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GeometryParams {
    /// Block volume (unit density).
    #[validate(range(min = 0.0))]
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Width-to-height ratio of the block.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_shape")]
    pub shape: f64,
    /// Number of Monte Carlo trials.
    #[serde(default = "default_trials")]
    pub trials: u64,
}

const fn default_mass() -> f64 {
    1.0
}

const fn default_shape() -> f64 {
    1.0
}

const fn default_trials() -> u64 {
    10_000
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            shape: default_shape(),
            trials: default_trials(),
        }
    }
}

impl GeometryParams {
    /// Validate schema ranges and semantic constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive or non-finite mass or
    /// shape, or zero trials.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        for (name, value) in [("geometry.mass", self.mass), ("geometry.shape", self.shape)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid(
                    name,
                    format!("must be a finite positive number, got {value}"),
                ));
            }
        }
        if self.trials == 0 {
            return Err(SimError::invalid("geometry.trials", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = SimConfig::default();

        assert_eq!(config.schema_version, "1.0");
        assert_eq!(config.reproducibility.seed, 42);
        assert_eq!(config.kinetics.time_points, 201);
        assert!((config.stochastic.fission_prob - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.ensemble.runs, 0);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_ensemble_runs_capped() {
        let yaml = format!("ensemble:\n  runs: {}\n", MAX_ENSEMBLE_RUNS + 1);
        let err = SimConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("ensemble.runs"));

        let yaml = format!("ensemble:\n  runs: {MAX_ENSEMBLE_RUNS}\n");
        assert!(SimConfig::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn test_geometry_section() {
        let config = SimConfig::from_yaml("geometry:\n  mass: 2.0\n").unwrap();
        let geometry = config.geometry.unwrap();
        assert!((geometry.mass - 2.0).abs() < f64::EPSILON);
        assert!((geometry.shape - 1.0).abs() < f64::EPSILON);
        assert_eq!(geometry.trials, 10_000);

        assert!(SimConfig::default().geometry.is_none());
        let yaml = SimConfig::default().to_yaml().unwrap();
        assert!(!yaml.contains("geometry"));
    }

    #[test]
    fn test_geometry_rejects_degenerate_block() {
        for (yaml, field) in [
            ("geometry:\n  mass: 0.0\n", "geometry.mass"),
            ("geometry:\n  shape: -1.0\n", "schema"),
            ("geometry:\n  trials: 0\n", "geometry.trials"),
        ] {
            let err = SimConfig::from_yaml(yaml).unwrap_err();
            assert!(err.is_invalid_parameter(), "{yaml}");
            assert!(err.to_string().contains(field), "{yaml}: {err}");
        }
    }

    #[test]
    fn test_builder_defaults_are_valid() {
        let params = SimulationParameters::builder().build();
        assert!(params.is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let params = SimulationParameters::builder()
            .initial_concentrations(2.0, 0.5, 0.0)
            .rate_constants(1.0, 2.0, 3.0)
            .max_time(5.0)
            .time_points(11)
            .initial_neutrons(3.0)
            .fission_prob(0.5)
            .neutrons_per_fission(2.0)
            .max_generations(7)
            .max_neutrons(500.0)
            .build()
            .unwrap();

        assert!((params.kinetics.initial_concentrations.a - 2.0).abs() < f64::EPSILON);
        assert!((params.kinetics.rate_constants.k3 - 3.0).abs() < f64::EPSILON);
        assert_eq!(params.kinetics.time_points, 11);
        assert_eq!(params.stochastic.max_generations, 7);
        assert!((params.stochastic.multiplication_factor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let err = SimulationParameters::builder()
            .rate_constants(0.5, 0.0, 0.1)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("rate_constants.k2"));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = SimulationParameters::builder()
            .rate_constants(-1.0, 0.3, 0.1)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_malformed_grid_rejected() {
        let err = SimulationParameters::builder().time_points(1).build().unwrap_err();
        assert!(err.is_invalid_parameter());

        let err = SimulationParameters::builder()
            .time_points(usize::MAX)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("time_points"));

        let err = SimulationParameters::builder().max_time(0.0).build().unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("max_time"));

        let err = SimulationParameters::builder()
            .max_time(f64::INFINITY)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        for p in [-0.1, 1.5, f64::NAN] {
            let err = SimulationParameters::builder().fission_prob(p).build().unwrap_err();
            assert!(err.is_invalid_parameter(), "p = {p} must be rejected");
        }
    }

    #[test]
    fn test_probability_bounds_accepted() {
        assert!(SimulationParameters::builder().fission_prob(0.0).build().is_ok());
        assert!(SimulationParameters::builder().fission_prob(1.0).build().is_ok());
    }

    #[test]
    fn test_negative_neutrons_rejected() {
        let err = SimulationParameters::builder()
            .initial_neutrons(-1.0)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameter());

        let err = SimulationParameters::builder()
            .neutrons_per_fission(-2.0)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_population_cap_must_be_positive() {
        let err = SimulationParameters::builder().max_neutrons(0.0).build().unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("max_neutrons"));
    }

    #[test]
    fn test_negative_concentration_rejected() {
        let err = SimulationParameters::builder()
            .initial_concentrations(1.0, -0.5, 0.0)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("initial_concentrations.b"));
    }

    #[test]
    fn test_zero_generation_limit_accepted() {
        assert!(SimulationParameters::builder().max_generations(0).build().is_ok());
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r"
reproducibility:
  seed: 7
kinetics:
  initial_concentrations: { a: 1.0 }
  rate_constants: { k1: 1.0, k2: 0.5, k3: 0.25 }
  max_time: 10.0
  time_points: 101
stochastic:
  initial_neutrons: 5
  fission_prob: 0.5
  neutrons_per_fission: 2.0
  max_generations: 20
  max_neutrons: 1000
ensemble:
  runs: 100
";
        let config = SimConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.reproducibility.seed, 7);
        assert_eq!(config.kinetics.time_points, 101);
        assert!((config.kinetics.initial_concentrations.b).abs() < f64::EPSILON);
        assert!((config.stochastic.initial_neutrons - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.ensemble.runs, 100);
    }

    #[test]
    fn test_config_yaml_partial_uses_defaults() {
        let yaml = r"
stochastic:
  fission_prob: 0.9
";
        let config = SimConfig::from_yaml(yaml).unwrap();
        assert!((config.stochastic.fission_prob - 0.9).abs() < f64::EPSILON);
        assert!((config.stochastic.neutrons_per_fission - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.kinetics, KineticParams::default());
    }

    #[test]
    fn test_config_yaml_rejects_unknown_fields() {
        let yaml = r"
stochastic:
  fission_probability: 0.9
";
        let err = SimConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SimError::YamlParse(_)));
    }

    #[test]
    fn test_config_yaml_rejects_zero_rate() {
        let yaml = r"
kinetics:
  rate_constants: { k1: 0.0, k2: 0.5, k3: 0.25 }
";
        let err = SimConfig::from_yaml(yaml).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_config_yaml_rejects_schema_range() {
        let yaml = r"
kinetics:
  time_points: 1
";
        let err = SimConfig::from_yaml(yaml).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_config_rejects_unsupported_schema() {
        let yaml = r#"
schema_version: "2.0"
"#;
        let err = SimConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SimError::Config { .. }));
    }

    #[test]
    fn test_config_yaml_roundtrip_preserves_parameters() {
        let config = SimConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = SimConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.parameters(), config.parameters());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reproducibility:\n  seed: 1234").unwrap();
        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.reproducibility.seed, 1234);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = SimConfig::load("/nonexistent/chainsim.yaml").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }

    #[test]
    fn test_with_parameters() {
        let params = SimulationParameters::builder().fission_prob(0.1).build().unwrap();
        let config = SimConfig::with_parameters(params);
        assert_eq!(config.parameters(), params);
        assert_eq!(config.reproducibility.seed, 42);
    }

    #[test]
    fn test_rate_constants_helpers() {
        let k = RateConstants {
            k1: 0.2,
            k2: 3.0,
            k3: 1.0,
        };
        assert_eq!(k.as_array(), [0.2, 3.0, 1.0]);
        assert!((k.max_rate() - 3.0).abs() < f64::EPSILON);
    }
}
