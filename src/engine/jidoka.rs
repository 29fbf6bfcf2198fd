//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! Machines that detect problems and stop automatically to prevent defect
//! propagation. Both models pass every recorded value through the guard.
//!
//! # Severity Levels
//!
//! - **Acceptable**: value is finite and physical, continue
//! - **Warning**: a concentration dipped below zero (integration artifact),
//!   log and continue
//! - **Fatal**: NaN or Inf, halt with `NumericOverflow`

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::scenarios::kinetics::{KineticState, Species};

/// Severity levels for Jidoka findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Within tolerance, continue normally.
    Acceptable,
    /// Non-physical but not forbidden (log, continue).
    Warning,
    /// Unrecoverable state (halt immediately).
    Fatal,
}

/// Non-fatal finding reported by the guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaWarning {
    /// A concentration went negative.
    NegativeConcentration {
        /// Which species.
        species: Species,
        /// Sample time.
        time: f64,
        /// The negative value.
        value: f64,
    },
}

/// Jidoka guard configuration.
///
/// Non-finite values are always fatal; only the warning threshold is
/// configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JidokaConfig {
    /// Concentrations below `-negative_tolerance` raise a warning.
    #[serde(default = "default_negative_tolerance")]
    pub negative_tolerance: f64,
}

const fn default_negative_tolerance() -> f64 {
    1e-12
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            negative_tolerance: default_negative_tolerance(),
        }
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use chainsim::engine::jidoka::{JidokaConfig, JidokaGuard};
///
/// let mut guard = JidokaGuard::new(JidokaConfig::default());
/// assert!(guard.check_population(3, 128.0).is_ok());
/// assert!(guard.check_population(4, f64::INFINITY).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JidokaGuard {
    config: JidokaConfig,
    warnings: Vec<JidokaWarning>,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            warnings: Vec::new(),
        }
    }

    /// Classify a single concentration value.
    #[must_use]
    pub fn classify_concentration(&self, value: f64) -> ViolationSeverity {
        if !value.is_finite() {
            ViolationSeverity::Fatal
        } else if value < -self.config.negative_tolerance {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }

    /// Inspect one recorded concentration sample.
    ///
    /// # Errors
    ///
    /// Returns `NumericOverflow` if any species is NaN or infinite.
    pub fn check_concentrations(&mut self, index: usize, state: &KineticState) -> SimResult<()> {
        for species in Species::ALL {
            let value = state.get(species);
            match self.classify_concentration(value) {
                ViolationSeverity::Fatal => {
                    return Err(SimError::overflow(
                        format!("concentration.{}[{index}]", species.label()),
                        value,
                    ));
                }
                ViolationSeverity::Warning => {
                    log::warn!(
                        "negative concentration {value:.3e} for species {} at t={:.6}",
                        species.label(),
                        state.time
                    );
                    self.warnings.push(JidokaWarning::NegativeConcentration {
                        species,
                        time: state.time,
                        value,
                    });
                }
                ViolationSeverity::Acceptable => {}
            }
        }
        Ok(())
    }

    /// Inspect one generation's population.
    ///
    /// # Errors
    ///
    /// Returns `NumericOverflow` if the population is NaN or infinite.
    pub fn check_population(&self, generation: u32, population: f64) -> SimResult<()> {
        if !population.is_finite() {
            return Err(SimError::overflow(
                format!("population[{generation}]"),
                population,
            ));
        }
        Ok(())
    }

    /// Warnings collected so far.
    #[must_use]
    pub fn warnings(&self) -> &[JidokaWarning] {
        &self.warnings
    }

    /// Take collected warnings, leaving the guard empty.
    pub fn take_warnings(&mut self) -> Vec<JidokaWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }
}
