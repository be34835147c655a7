//! Core traits and types for stochastic Riemannian optimization.
//!
//! This crate provides the pieces shared by a family of first-order solvers
//! on Riemannian manifolds: the manifold and cost-function contracts the
//! solvers consume, step-size rules, stopping criteria, the optimization log
//! and console progress reporting.
//!
//! # Key Concepts
//!
//! - **Manifolds**: Smooth spaces with an inner product on each tangent space
//! - **Movement**: Advancing a point along a tangent direction by a step size
//! - **Stochastic gradients**: Gradient estimates formed from a mini-batch,
//!   treated exactly like exact gradients by the solvers
//!
//! # Modules
//!
//! - [`cost_function`]: Cost function interface for optimization
//! - [`error`]: Error types for manifold operations and solver runs
//! - [`line_search`]: Backtracking and adaptive line searches
//! - [`manifold`]: Manifold capability set consumed by the solvers
//! - [`observer`]: Console progress reporting
//! - [`optimizer`]: Solver trait and shared solver settings
//! - [`optlog`]: Optimization log and solver results
//! - [`problem`]: Manifold and cost function bundled for a solve
//! - [`step_size`]: Step-size schedules and rules
//! - [`stopping`]: Stopping criteria and termination reasons
//! - [`types`]: Scalar trait and vector aliases

pub mod cost_function;
pub mod error;
pub mod line_search;
pub mod manifold;
pub mod observer;
pub mod optimizer;
pub mod optlog;
pub mod problem;
pub mod step_size;
pub mod stopping;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_manifolds;

// Re-export commonly used items at the crate root
pub use error::{ManifoldError, OptimizerError, OptimizerResult, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use riemsgd_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cost_function::{CostFunction, CountingCostFunction};
    pub use crate::error::{ManifoldError, OptimizerError, OptimizerResult, Result};
    pub use crate::line_search::{
        AdaptiveLineSearch, BacktrackingLineSearch, LineSearch, LineSearchParams,
        LineSearchResult,
    };
    pub use crate::manifold::Manifold;
    pub use crate::observer::{ConsoleObserver, NoOpObserver, SolverObserver};
    pub use crate::optimizer::{Solver, SolverConfig};
    pub use crate::optlog::{
        CompletedLog, FinalValues, IterationRecord, LogLevel, OptimizationLog,
        OptimizationResult,
    };
    pub use crate::problem::Problem;
    pub use crate::step_size::{
        LineSearchStep, ScheduledStep, StepRequest, StepSizeDecision, StepSizeRule,
        StepSizeSchedule,
    };
    pub use crate::stopping::{
        Progress, StoppingCriterion, StoppingPolicy, Termination, TerminationReason,
    };
    pub use crate::types::{DVector, Scalar};
}
