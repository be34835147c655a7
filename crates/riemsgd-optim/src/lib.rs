//! Stochastic gradient solver for Riemannian manifolds.
//!
//! This crate provides the concrete solver built on the contracts of
//! `riemsgd-core`: it consumes a [`Problem`](riemsgd_core::problem::Problem),
//! delegates step sizes to a [`StepSizeRule`](riemsgd_core::step_size::StepSizeRule)
//! and termination to a [`StoppingPolicy`](riemsgd_core::stopping::StoppingPolicy).
//!
//! # Available Solvers
//!
//! - **StochasticGradient**: steepest descent on (mini-batch) gradient
//!   estimates with a scheduled or line-search step size
//!
//! # Examples
//!
//! ```rust
//! use riemsgd_optim::{StochasticGradient, StepSizeSchedule};
//! use riemsgd_core::stopping::StoppingCriterion;
//!
//! // Decaying step 0.1 / (1 + k)^0.6
//! let solver = StochasticGradient::with_schedule(StepSizeSchedule::decaying(0.1_f64, 0.6))
//!     .with_stopping_policy(
//!         StoppingCriterion::new()
//!             .with_max_iterations(1000)
//!             .with_min_gradient_norm(1e-6),
//!     );
//!
//! // Run it (manifold and cost_fn defined elsewhere)
//! // let result = solver.solve(&Problem::new(&manifold, &cost_fn), None)?;
//! # let _ = solver;
//! ```

pub mod stochastic_gradient;

pub use stochastic_gradient::StochasticGradient;

// Re-export commonly used items from core
pub use riemsgd_core::{
    line_search::{AdaptiveLineSearch, BacktrackingLineSearch},
    step_size::{LineSearchStep, ScheduledStep, StepSizeSchedule},
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports() {
        let _schedule = StepSizeSchedule::Constant(0.01_f64);
        let _rule = LineSearchStep::new(AdaptiveLineSearch::<f64>::new());
        let _solver = StochasticGradient::new(ScheduledStep::constant(0.01_f64));
        let _backtracking = BacktrackingLineSearch::<f64>::new();
    }
}
