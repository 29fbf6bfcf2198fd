//! Chain-reaction models.
//!
//! Provides the computations the engine bundles into one run:
//! - Three-species decay chain (RK4 kinetics)
//! - Discrete-generation neutron branching
//! - Criticality classification
//! - Replicate ensembles of the branching model
//! - Geometric capture estimate for a fissile block

pub mod branching;
pub mod criticality;
pub mod ensemble;
pub mod geometry;
pub mod kinetics;

pub use branching::{GenerationRecord, GenerationSample, StochasticBranchingModel, StopReason};
pub use criticality::{Criticality, CriticalityAnalyzer, CriticalityVerdict};
pub use ensemble::{BranchingEnsemble, EnsembleSummary, Estimate};
pub use geometry::{Block, CaptureEstimator};
pub use kinetics::{ContinuousKineticModel, ContinuousTrajectory, DecayChain, KineticState, Species};
