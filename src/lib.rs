//! # chainsim
//!
//! Chain-reaction simulator.
//!
//! Runs three independent computations over one validated parameter set:
//! - A continuous three-species decay chain `A → B → C → ∅` (RK4)
//! - A stochastic discrete-generation neutron branching process
//! - A criticality verdict from the multiplication factor `k = p * ν`
//!
//! Every stochastic draw comes from an injected [`engine::rng::RandomSource`],
//! so a seeded [`engine::rng::SimRng`] reproduces a run bit for bit.
//!
//! ## Example
//!
//! ```rust
//! use chainsim::prelude::*;
//!
//! let params = SimulationParameters::builder()
//!     .fission_prob(0.5)
//!     .neutrons_per_fission(2.0)
//!     .build()
//!     .unwrap();
//!
//! let engine = SimEngine::new(SimConfig::with_parameters(params)).unwrap();
//! let output = engine.run(&params, &mut SimRng::new(42)).unwrap();
//! assert_eq!(output.verdict.criticality, Criticality::Critical);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod scenarios;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{
        GeometryParams, KineticParams, SimConfig, SimulationParameters, StochasticParams,
    };
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
    pub use crate::engine::rng::{RandomSource, SimRng};
    pub use crate::engine::{SimEngine, SimOutput};
    pub use crate::error::{SimError, SimResult};
    pub use crate::scenarios::{
        BranchingEnsemble, CaptureEstimator, ContinuousKineticModel, ContinuousTrajectory,
        Criticality, CriticalityAnalyzer, CriticalityVerdict, Estimate, GenerationRecord,
        StochasticBranchingModel, StopReason,
    };
}

/// Re-export for public API
pub use error::{SimError, SimResult};
