//! Criticality classification.
//!
//! The multiplication factor `k = p * ν` is the expected number of neutrons
//! produced per neutron of the previous generation. The chain is
//! subcritical for `k < 1`, critical for `k = 1` and supercritical for
//! `k > 1`. The continuous model contributes its characteristic times
//! `τᵢ = 1/kᵢ` for display.

use serde::{Deserialize, Serialize};

use crate::config::{RateConstants, SimulationParameters};
use crate::error::{SimError, SimResult};

/// Tolerance around `k = 1` treated as exactly critical.
pub const CRITICALITY_EPSILON: f64 = 1e-6;

/// Chain-reaction regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criticality {
    /// `k < 1`: the population dies out on average.
    Subcritical,
    /// `k ≈ 1`: the population is sustained on average.
    Critical,
    /// `k > 1`: the population grows on average.
    Supercritical,
}

impl Criticality {
    /// Classify a multiplication factor.
    ///
    /// The critical band is tested first so that values such as
    /// `0.4 * 2.5` land on `Critical` whichever way they round.
    #[must_use]
    pub fn from_factor(k: f64) -> Self {
        if (k - 1.0).abs() < CRITICALITY_EPSILON {
            Self::Critical
        } else if k > 1.0 {
            Self::Supercritical
        } else {
            Self::Subcritical
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Subcritical => "subcritical",
            Self::Critical => "critical",
            Self::Supercritical => "supercritical",
        };
        f.write_str(s)
    }
}

/// Classification plus the scalars it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalityVerdict {
    /// Regime.
    pub criticality: Criticality,
    /// `k = fission_prob * neutrons_per_fission`.
    pub multiplication_factor: f64,
    /// `[1/k1, 1/k2, 1/k3]` of the continuous model.
    pub characteristic_times: [f64; 3],
}

impl CriticalityVerdict {
    /// Mean population of generation `g` starting from `n0`, `n0 * k^g`.
    ///
    /// Ignores the rounding of fractional populations.
    #[must_use]
    pub fn expected_population(&self, n0: f64, generation: u32) -> f64 {
        let exponent = i32::try_from(generation).unwrap_or(i32::MAX);
        n0 * self.multiplication_factor.powi(exponent)
    }
}

/// Derives the verdict from the parameter set alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalityAnalyzer;

impl CriticalityAnalyzer {
    /// Classify the system.
    ///
    /// Reads only `fission_prob`, `neutrons_per_fission` and the rate
    /// constants; the result is identical for identical inputs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a rate constant is zero, negative or
    /// non-finite, or if the probability or yield is out of domain.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainsim::config::SimulationParameters;
    /// use chainsim::scenarios::criticality::{Criticality, CriticalityAnalyzer};
    ///
    /// let params = SimulationParameters::builder()
    ///     .fission_prob(0.5)
    ///     .neutrons_per_fission(2.0)
    ///     .build()
    ///     .unwrap();
    /// let verdict = CriticalityAnalyzer.classify(&params).unwrap();
    /// assert_eq!(verdict.criticality, Criticality::Critical);
    /// ```
    pub fn classify(&self, params: &SimulationParameters) -> SimResult<CriticalityVerdict> {
        let stochastic = &params.stochastic;
        if !(0.0..=1.0).contains(&stochastic.fission_prob) {
            return Err(SimError::invalid(
                "fission_prob",
                format!("must lie in [0, 1], got {}", stochastic.fission_prob),
            ));
        }
        if !stochastic.neutrons_per_fission.is_finite() || stochastic.neutrons_per_fission < 0.0 {
            return Err(SimError::invalid(
                "neutrons_per_fission",
                format!(
                    "must be a finite nonnegative yield, got {}",
                    stochastic.neutrons_per_fission
                ),
            ));
        }

        let characteristic_times = characteristic_times(&params.kinetics.rate_constants)?;
        let k = stochastic.multiplication_factor();

        Ok(CriticalityVerdict {
            criticality: Criticality::from_factor(k),
            multiplication_factor: k,
            characteristic_times,
        })
    }
}

/// `τᵢ = 1/kᵢ` for each rate constant.
///
/// # Errors
///
/// Returns `InvalidParameter` for a zero, negative or non-finite rate.
pub fn characteristic_times(rates: &RateConstants) -> SimResult<[f64; 3]> {
    let mut taus = [0.0; 3];
    for (i, k) in rates.as_array().into_iter().enumerate() {
        if !k.is_finite() || k <= 0.0 {
            return Err(SimError::invalid(
                format!("rate_constants.k{}", i + 1),
                format!("characteristic time undefined for rate {k}"),
            ));
        }
        taus[i] = 1.0 / k;
    }
    Ok(taus)
}
