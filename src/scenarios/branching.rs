//! Discrete-generation neutron branching process.
//!
//! A Galton-Watson style process: each individual of generation `g-1` is an
//! independent Bernoulli trial that fissions with probability `p` and then
//! contributes `ν` neutrons to generation `g`.
//!
//! # Stopping
//!
//! Before simulating generation `g` the previous population is inspected:
//! - `population[g-1] <= 0` ends the run (extinct)
//! - `population[g-1] > max_neutrons` ends the run (population cap)
//! - `g > max_generations` ends the run (generation limit)
//!
//! # Rounding
//!
//! A fractional population is turned into an individual count with
//! round-half-to-even, so `2.5 → 2` and `3.5 → 4`.

use serde::{Deserialize, Serialize};

use crate::config::StochasticParams;
use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
use crate::engine::rng::RandomSource;
use crate::error::SimResult;

/// Why a branching run stopped recording generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// The last recorded population was zero.
    Extinct,
    /// The last recorded population exceeded `max_neutrons`.
    PopulationCap,
    /// `max_generations` generations were simulated.
    GenerationLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Extinct => "extinct",
            Self::PopulationCap => "population cap exceeded",
            Self::GenerationLimit => "generation limit reached",
        };
        f.write_str(s)
    }
}

/// Population of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSample {
    /// Generation index, starting at 0.
    pub generation: u32,
    /// Neutron count (fractional when `ν` is).
    pub population: f64,
}

/// Generation → population sequence of one branching run.
///
/// Invariant: generations are `0, 1, 2, ...` without gaps, the first
/// population equals `initial_neutrons`, and the length never exceeds
/// `max_generations + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    samples: Vec<GenerationSample>,
    stop_reason: StopReason,
}

impl GenerationRecord {
    /// Recorded generations in order.
    #[must_use]
    pub fn samples(&self) -> &[GenerationSample] {
        &self.samples
    }

    /// Populations in generation order.
    pub fn populations(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.population)
    }

    /// `(generation, population)` pairs.
    #[must_use]
    pub fn pairs(&self) -> Vec<(u32, f64)> {
        self.samples
            .iter()
            .map(|s| (s.generation, s.population))
            .collect()
    }

    /// Number of recorded generations (including generation 0).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: generation 0 is recorded unconditionally.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last recorded sample.
    #[must_use]
    pub fn last(&self) -> Option<&GenerationSample> {
        self.samples.last()
    }

    /// Population of the last recorded generation.
    #[must_use]
    pub fn final_population(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.population)
    }

    /// Largest population recorded.
    #[must_use]
    pub fn peak_population(&self) -> f64 {
        self.populations().fold(0.0, f64::max)
    }

    /// Why the run stopped.
    #[must_use]
    pub const fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    /// Whether the chain died out.
    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.stop_reason == StopReason::Extinct
    }
}

/// Number of individuals represented by a (possibly fractional) population.
///
/// Uses round-half-to-even.
#[must_use]
pub fn round_population(population: f64) -> u64 {
    if population <= 0.0 {
        0
    } else {
        population.round_ties_even() as u64
    }
}

/// Stochastic neutron branching model.
#[derive(Debug, Clone, Default)]
pub struct StochasticBranchingModel {
    jidoka: JidokaConfig,
}

impl StochasticBranchingModel {
    /// Create a model with the given guard configuration.
    #[must_use]
    pub const fn new(jidoka: JidokaConfig) -> Self {
        Self { jidoka }
    }

    /// Simulate one branching run.
    ///
    /// Consumes exactly one uniform draw per individual per generation,
    /// individuals in index order and generations in increasing order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the parameters are out of domain and
    /// `NumericOverflow` if a population becomes non-finite.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainsim::config::StochasticParams;
    /// use chainsim::engine::rng::SimRng;
    /// use chainsim::scenarios::branching::StochasticBranchingModel;
    ///
    /// let params = StochasticParams {
    ///     initial_neutrons: 5.0,
    ///     fission_prob: 0.0,
    ///     max_generations: 10,
    ///     ..StochasticParams::default()
    /// };
    /// let mut rng = SimRng::new(42);
    /// let record = StochasticBranchingModel::default().simulate(&params, &mut rng).unwrap();
    /// assert_eq!(record.pairs(), vec![(0, 5.0), (1, 0.0)]);
    /// ```
    pub fn simulate<R: RandomSource + ?Sized>(
        &self,
        params: &StochasticParams,
        rng: &mut R,
    ) -> SimResult<GenerationRecord> {
        params.check()?;

        let guard = JidokaGuard::new(self.jidoka.clone());
        guard.check_population(0, params.initial_neutrons)?;

        let mut samples = vec![GenerationSample {
            generation: 0,
            population: params.initial_neutrons,
        }];
        let mut population = params.initial_neutrons;
        let mut generation = 0u32;

        let stop_reason = loop {
            if population <= 0.0 {
                break StopReason::Extinct;
            }
            if population > params.max_neutrons {
                break StopReason::PopulationCap;
            }
            if generation >= params.max_generations {
                break StopReason::GenerationLimit;
            }

            generation += 1;
            let individuals = round_population(population);
            let mut next = 0.0;
            for _ in 0..individuals {
                if rng.uniform() < params.fission_prob {
                    next += params.neutrons_per_fission;
                }
            }

            guard.check_population(generation, next)?;
            log::debug!("generation {generation}: {individuals} trials -> population {next}");

            samples.push(GenerationSample {
                generation,
                population: next,
            });
            population = next;
        };

        log::info!(
            "branching run stopped after generation {generation}: {stop_reason} (population {population})"
        );

        Ok(GenerationRecord {
            samples,
            stop_reason,
        })
    }
}
