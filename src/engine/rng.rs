//! Deterministic random number generation.
//!
//! Implements PCG (Permuted Congruential Generator) with partitioned seeds
//! for reproducible replicate runs.
//!
//! # Reproducibility Guarantee
//!
//! Given the same master seed, all random number sequences will be
//! bitwise-identical across:
//! - Different runs
//! - Different platforms
//! - Different replicate counts (via partitioning)

use rand::prelude::*;
use rand_pcg::Pcg64;

/// Source of uniform variates consumed by the stochastic models.
///
/// Implementors must return values in `[0, 1)`. The branching model draws
/// exactly once per individual, so any implementation that replays a fixed
/// sequence reproduces a run exactly.
pub trait RandomSource {
    /// Draw the next uniform value in `[0, 1)`.
    fn uniform(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }
}

/// Deterministic, reproducible random number generator.
///
/// Based on PCG (Permuted Congruential Generator) which provides:
/// - Excellent statistical properties
/// - Fast generation
/// - Predictable sequences from seed
/// - Independent streams via partitioning
#[derive(Debug, Clone)]
pub struct SimRng {
    /// Master seed for reproducibility.
    master_seed: u64,
    /// Current stream index for partitioning.
    stream: u64,
    /// Internal PCG state.
    rng: Pcg64,
}

impl SimRng {
    /// Create a new RNG with the given master seed.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        let rng = Pcg64::seed_from_u64(master_seed);
        Self {
            master_seed,
            stream: 0,
            rng,
        }
    }

    /// Get the master seed.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Get current stream index.
    #[must_use]
    pub const fn stream(&self) -> u64 {
        self.stream
    }

    /// Create partitioned RNGs for replicate runs.
    ///
    /// Each partition gets an independent stream derived from the master seed,
    /// so replicate `i` sees the same sequence no matter how many replicates
    /// run or in which order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainsim::engine::rng::SimRng;
    ///
    /// let mut rng = SimRng::new(42);
    /// let partitions = rng.partition(4);
    /// assert_eq!(partitions.len(), 4);
    /// ```
    #[must_use]
    pub fn partition(&mut self, n: usize) -> Vec<Self> {
        self.partition_iter(n).collect()
    }

    /// Lazy form of [`partition`](Self::partition).
    ///
    /// The parent stream advances by `n` immediately; partition `i` is only
    /// seeded when the iterator reaches it.
    pub fn partition_iter(&mut self, n: usize) -> impl Iterator<Item = Self> {
        let master_seed = self.master_seed;
        let base = self.stream;
        self.stream = base.saturating_add(n as u64);

        (0..n).map(move |i| {
            let stream = base.wrapping_add(i as u64).wrapping_add(1);
            let seed = master_seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
            Self {
                master_seed,
                stream,
                rng: Pcg64::seed_from_u64(seed),
            }
        })
    }

    /// Generate a random f64 in [0, 1).
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }
}

impl RandomSource for SimRng {
    fn uniform(&mut self) -> f64 {
        self.gen_f64()
    }
}
