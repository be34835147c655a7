//! Solver interface shared by the gradient-based solver family.
//!
//! A solver owns its step-size rule and stopping policy as injected
//! collaborators and implements only the iteration itself. Everything the
//! family has in common (stopping checks, logging, console output) lives in
//! [`crate::stopping`], [`crate::optlog`] and [`crate::observer`].

use crate::{
    cost_function::CostFunction,
    error::OptimizerResult,
    manifold::Manifold,
    optlog::{LogLevel, OptimizationResult},
    problem::Problem,
    types::Scalar,
};
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings common to every solver of the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// How much of the run is recorded in the returned log
    pub log_level: LogLevel,
}

impl SolverConfig {
    /// Creates a configuration that returns the bare final point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Sets the log level from a numeric verbosity (0, 1 or 2).
    pub fn with_log_verbosity(self, verbosity: u8) -> Self {
        self.with_log_level(LogLevel::from_verbosity(verbosity))
    }
}

/// Trait for Riemannian solvers.
///
/// `solve` runs to termination exactly once per call; calling it again
/// starts a fresh run with its own timer, iterate and log.
pub trait Solver<T: Scalar>: Debug {
    /// Returns the name of the solver.
    fn name(&self) -> &str;

    /// Minimizes the problem's cost, starting from `initial_point` or from a
    /// random point of the manifold when none is given.
    fn solve<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        initial_point: Option<M::Point>,
    ) -> OptimizerResult<OptimizationResult<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_config_levels() {
        assert_eq!(SolverConfig::new().log_level, LogLevel::None);
        assert_eq!(
            SolverConfig::new().with_log_verbosity(2).log_level,
            LogLevel::Iterations
        );
        assert_eq!(
            SolverConfig::new().with_log_level(LogLevel::Final).log_level,
            LogLevel::Final
        );
    }
}
