//! Geometric capture estimate for a fissile block.
//!
//! A neutron is born uniformly inside an `a × a × b` block with
//! `a = (M·S)^(1/3)` and `b = (M / S²)^(1/3)`, so the block has volume `M`
//! and width-to-height ratio `S`. It releases two secondaries, each moved a
//! uniform distance in `[0, 1)` along an isotropic direction. A trial counts
//! as a capture when either secondary lands in the unit cube `[0, 1]³`.
//!
//! Each trial draws nine uniforms in a fixed order: the birth point
//! `(x, y, z)`, then azimuth, polar cosine and distance for the first
//! secondary, then the same three for the second.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::GeometryParams;
use crate::engine::rng::RandomSource;
use crate::error::{SimError, SimResult};
use crate::scenarios::ensemble::Estimate;

/// Uniform draws consumed by one trial.
pub const DRAWS_PER_TRIAL: u64 = 9;

/// Dimensions of the block derived from mass and shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Edge length along x and y.
    pub width: f64,
    /// Edge length along z.
    pub height: f64,
}

impl Block {
    /// Block of volume `mass` and width-to-height ratio `shape`.
    #[must_use]
    pub fn new(mass: f64, shape: f64) -> Self {
        Self {
            width: (mass * shape).cbrt(),
            height: (mass / (shape * shape)).cbrt(),
        }
    }

    /// Block volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.width * self.width * self.height
    }
}

type Point = [f64; 3];

fn in_unit_cube(p: Point) -> bool {
    p.iter().all(|c| (0.0..=1.0).contains(c))
}

/// Move `origin` a uniform distance along an isotropic direction.
fn scatter<R: RandomSource + ?Sized>(origin: Point, rng: &mut R) -> Point {
    let phi = TAU * rng.uniform();
    let cos_theta = 2.0 * rng.uniform() - 1.0;
    let distance = rng.uniform();
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    [
        origin[0] + distance * sin_theta * phi.cos(),
        origin[1] + distance * sin_theta * phi.sin(),
        origin[2] + distance * cos_theta,
    ]
}

/// Monte Carlo estimator of the capture probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureEstimator;

impl CaptureEstimator {
    /// Run `params.trials` trials and estimate the capture probability.
    ///
    /// The standard error is the binomial `sqrt(p (1 - p) / n)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive mass or shape or zero
    /// trials, and `NumericOverflow` if the block dimensions are not finite.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainsim::config::GeometryParams;
    /// use chainsim::engine::rng::SimRng;
    /// use chainsim::scenarios::geometry::CaptureEstimator;
    ///
    /// let estimate = CaptureEstimator
    ///     .estimate(&GeometryParams::default(), &mut SimRng::new(42))
    ///     .unwrap();
    /// assert!(estimate.estimate > 0.0 && estimate.estimate <= 1.0);
    /// ```
    pub fn estimate<R: RandomSource + ?Sized>(
        &self,
        params: &GeometryParams,
        rng: &mut R,
    ) -> SimResult<Estimate> {
        params.check()?;

        let block = Block::new(params.mass, params.shape);
        if !block.width.is_finite() {
            return Err(SimError::overflow("geometry.width", block.width));
        }
        if !block.height.is_finite() {
            return Err(SimError::overflow("geometry.height", block.height));
        }
        log::debug!(
            "capture estimate: {:.4} x {:.4} x {:.4} block, {} trials",
            block.width,
            block.width,
            block.height,
            params.trials
        );

        let mut captures: u64 = 0;
        for _ in 0..params.trials {
            let birth = [
                block.width * rng.uniform(),
                block.width * rng.uniform(),
                block.height * rng.uniform(),
            ];
            let first = scatter(birth, rng);
            let second = scatter(birth, rng);
            if in_unit_cube(first) || in_unit_cube(second) {
                captures += 1;
            }
        }

        let n = params.trials as f64;
        let p = captures as f64 / n;
        log::info!("capture estimate: {captures} of {} trials", params.trials);

        Ok(Estimate::new(p, (p * (1.0 - p) / n).sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::SimRng;

    /// Source that cycles through a fixed script.
    struct Scripted {
        values: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn uniform(&mut self) -> f64 {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v
        }
    }

    fn params(mass: f64, shape: f64, trials: u64) -> GeometryParams {
        GeometryParams {
            mass,
            shape,
            trials,
        }
    }

    #[test]
    fn test_block_dimensions() {
        let block = Block::new(8.0, 1.0);
        assert!((block.width - 2.0).abs() < 1e-12);
        assert!((block.height - 2.0).abs() < 1e-12);

        let flat = Block::new(2.0, 4.0);
        assert!((flat.volume() - 2.0).abs() < 1e-12);
        assert!((flat.width / flat.height - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_centre_birth_with_short_hops_always_captures() {
        // Birth at (0.5, 0.5, 0.5); polar cosine 0; hop length 0.1
        let mut rng = Scripted::new(&[0.5, 0.5, 0.5, 0.0, 0.5, 0.1, 0.25, 0.5, 0.1]);
        let e = CaptureEstimator.estimate(&params(1.0, 1.0, 50), &mut rng).unwrap();
        assert!((e.estimate - 1.0).abs() < f64::EPSILON);
        assert!(e.std_error.abs() < f64::EPSILON);
        assert_eq!(rng.next as u64, 50 * DRAWS_PER_TRIAL);
    }

    #[test]
    fn test_far_birth_never_captures() {
        // Mass 1000 puts the block edge at 10; birth near (9.9, 9.9, 9.9)
        let mut rng = Scripted::new(&[0.99, 0.99, 0.99, 0.0, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let e = CaptureEstimator
            .estimate(&params(1000.0, 1.0, 20), &mut rng)
            .unwrap();
        assert!(e.estimate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_either_secondary_counts() {
        // First hop leaves through +x, second hop stays inside
        let script = [0.95, 0.5, 0.5, 0.0, 0.5, 0.9, 0.5, 0.5, 0.01];
        let mut rng = Scripted::new(&script);
        let e = CaptureEstimator.estimate(&params(1.0, 1.0, 10), &mut rng).unwrap();
        assert!((e.estimate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_large_block_captures_less() {
        let unit = CaptureEstimator
            .estimate(&params(1.0, 1.0, 20_000), &mut SimRng::new(7))
            .unwrap();
        let large = CaptureEstimator
            .estimate(&params(27.0, 1.0, 20_000), &mut SimRng::new(7))
            .unwrap();
        assert!(
            (0.6..0.75).contains(&unit.estimate),
            "unit block {}",
            unit.estimate
        );
        // Births outside [0, 2]³ cannot reach the cube
        assert!(large.estimate < 0.1, "large block {}", large.estimate);
        assert!(large.estimate > 0.0);
    }

    #[test]
    fn test_binomial_standard_error() {
        let e = CaptureEstimator
            .estimate(&params(4.0, 2.0, 10_000), &mut SimRng::new(3))
            .unwrap();
        let p = e.estimate;
        assert!((e.std_error - (p * (1.0 - p) / 10_000.0).sqrt()).abs() < 1e-15);
        assert!(e.contains(p));
    }

    #[test]
    fn test_reproducible_for_seed() {
        let p = params(2.0, 0.5, 1000);
        let a = CaptureEstimator.estimate(&p, &mut SimRng::new(11)).unwrap();
        let b = CaptureEstimator.estimate(&p, &mut SimRng::new(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_degenerate_parameters() {
        let mut rng = SimRng::new(1);
        for bad in [
            params(0.0, 1.0, 10),
            params(-1.0, 1.0, 10),
            params(1.0, 0.0, 10),
            params(1.0, f64::NAN, 10),
            params(1.0, 1.0, 0),
        ] {
            let err = CaptureEstimator.estimate(&bad, &mut rng).unwrap_err();
            assert!(err.is_invalid_parameter(), "{bad:?}");
        }
        assert_eq!(rng.stream(), 0);
    }

    #[test]
    fn test_overflowing_block_is_fatal() {
        let err = CaptureEstimator
            .estimate(&params(f64::MAX, f64::MAX, 10), &mut SimRng::new(1))
            .unwrap_err();
        assert!(err.is_numeric_overflow());
    }
}
