//! Stochastic gradient descent on Riemannian manifolds.
//!
//! This crate bundles [`riemsgd_core`] (manifold and cost contracts, step
//! sizes, stopping criteria, logging) and [`riemsgd_optim`] (the solver)
//! behind a single dependency.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use riemsgd::prelude::*;
//!
//! let problem = Problem::new(&manifold, &cost_fn).with_verbosity(2);
//! let mut solver = StochasticGradient::with_schedule(StepSizeSchedule::decaying(0.1, 0.6))
//!     .with_observer(ConsoleObserver::stdout());
//! let result = solver.solve(&problem, None)?;
//! ```

pub use nalgebra;
pub use riemsgd_core;
pub use riemsgd_optim;

pub use riemsgd_core::{ManifoldError, OptimizerError, OptimizerResult, Result};
pub use riemsgd_optim::StochasticGradient;

/// Everything needed to pose and solve a problem.
pub mod prelude {
    pub use riemsgd_core::prelude::*;
    pub use riemsgd_optim::StochasticGradient;
}
