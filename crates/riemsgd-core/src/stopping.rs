//! Stopping criteria shared by every solver of the family.
//!
//! A [`StoppingPolicy`] looks at the [`Progress`] of a run after each step
//! and either lets it continue (`None`) or names the [`TerminationReason`].
//! Thresholds are checked in a fixed order and the first one crossed wins:
//!
//! 1. iteration ≥ max iterations
//! 2. elapsed time ≥ max time
//! 3. gradient norm ≤ min gradient norm
//! 4. step size ≤ min step size
//! 5. cost evaluations ≥ max cost evaluations
//!
//! A threshold left unset never fires.

use crate::{
    error::{OptimizerError, OptimizerResult},
    types::Scalar,
};
use num_traits::Float;
use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Snapshot of a run handed to the stopping policy after each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress<T: Scalar> {
    /// Wall-clock time since the solve started
    pub elapsed: Duration,
    /// Step size chosen at this iteration
    pub step_size: T,
    /// Norm of the gradient estimate at the iterate of this iteration
    pub gradient_norm: T,
    /// Number of completed iterations (1-based)
    pub iteration: usize,
    /// Cost evaluations so far, including those made by the step-size rule
    pub cost_evaluations: usize,
}

impl<T: Scalar> Progress<T> {
    /// Creates a progress snapshot with no cost evaluations recorded.
    pub fn new(elapsed: Duration, step_size: T, gradient_norm: T, iteration: usize) -> Self {
        Self {
            elapsed,
            step_size,
            gradient_norm,
            iteration,
            cost_evaluations: 0,
        }
    }

    /// Sets the number of cost evaluations.
    pub fn with_cost_evaluations(mut self, count: usize) -> Self {
        self.cost_evaluations = count;
        self
    }
}

/// Why a solve stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// Iteration budget exhausted
    MaxIterationsReached,
    /// Wall-clock budget exhausted
    MaxTimeExceeded,
    /// Gradient norm at or below its threshold
    GradientNormBelowThreshold,
    /// Step size at or below its threshold
    StepSizeBelowThreshold,
    /// Cost-evaluation budget exhausted
    MaxCostEvaluationsReached,
}

/// A termination reason with the iteration count and elapsed time at which
/// it fired. Its `Display` is the message printed at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Termination {
    /// Which threshold fired
    pub reason: TerminationReason,
    /// Iterations completed when it fired
    pub iteration: usize,
    /// Elapsed time when it fired
    pub elapsed: Duration,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.elapsed.as_secs_f64();
        match self.reason {
            TerminationReason::MaxIterationsReached => {
                write!(f, "Terminated - max iterations reached after {seconds:.2} seconds.")
            }
            TerminationReason::MaxTimeExceeded => write!(
                f,
                "Terminated - max time reached after {} iterations.",
                self.iteration
            ),
            TerminationReason::GradientNormBelowThreshold => write!(
                f,
                "Terminated - min grad norm reached after {} iterations, {seconds:.2} seconds.",
                self.iteration
            ),
            TerminationReason::StepSizeBelowThreshold => write!(
                f,
                "Terminated - min stepsize reached after {} iterations, {seconds:.2} seconds.",
                self.iteration
            ),
            TerminationReason::MaxCostEvaluationsReached => {
                write!(f, "Terminated - max cost evals reached after {seconds:.2} seconds.")
            }
        }
    }
}

/// Decides after each step whether a run should stop.
///
/// Solvers hold a policy as an injected collaborator and never special-case
/// its thresholds.
pub trait StoppingPolicy<T: Scalar>: fmt::Debug {
    /// Returns the reason to stop, or `None` to continue.
    fn evaluate(&self, progress: &Progress<T>) -> Option<TerminationReason>;

    /// Rejects configurations that could never stop a run.
    ///
    /// Called once before the first iteration.
    fn validate(&self) -> OptimizerResult<()>;
}

/// Threshold-based stopping criterion.
///
/// # Example
///
/// ```rust,ignore
/// let criterion = StoppingCriterion::unbounded()
///     .with_max_iterations(500)
///     .with_min_gradient_norm(1e-8);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoppingCriterion<T: Scalar> {
    /// Maximum number of iterations
    pub max_iterations: Option<usize>,
    /// Maximum wall-clock time; only checked between iterations
    pub max_time: Option<Duration>,
    /// Stop when the gradient norm is at or below this value
    pub min_gradient_norm: Option<T>,
    /// Stop when the step size is at or below this value
    pub min_step_size: Option<T>,
    /// Maximum number of cost evaluations
    pub max_cost_evaluations: Option<usize>,
}

impl<T: Scalar> Default for StoppingCriterion<T> {
    fn default() -> Self {
        Self {
            max_iterations: Some(1000),
            max_time: Some(Duration::from_secs(1000)),
            min_gradient_norm: Some(T::DEFAULT_GRADIENT_TOLERANCE),
            min_step_size: Some(T::MIN_STEP_SIZE),
            max_cost_evaluations: Some(5000),
        }
    }
}

impl<T: Scalar> StoppingCriterion<T> {
    /// Creates a stopping criterion with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a criterion with every threshold unset.
    ///
    /// At least one threshold must be added before solving.
    pub fn unbounded() -> Self {
        Self {
            max_iterations: None,
            max_time: None,
            min_gradient_norm: None,
            min_step_size: None,
            max_cost_evaluations: None,
        }
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = Some(max_iter);
        self
    }

    /// Sets the maximum optimization time.
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Sets the gradient norm threshold.
    pub fn with_min_gradient_norm(mut self, tol: T) -> Self {
        self.min_gradient_norm = Some(tol);
        self
    }

    /// Sets the step size threshold.
    pub fn with_min_step_size(mut self, tol: T) -> Self {
        self.min_step_size = Some(tol);
        self
    }

    /// Sets the cost evaluation budget.
    pub fn with_max_cost_evaluations(mut self, max_evals: usize) -> Self {
        self.max_cost_evaluations = Some(max_evals);
        self
    }

    fn validate_threshold(value: Option<T>, parameter: &str) -> OptimizerResult<()> {
        match value {
            Some(v) if <T as Float>::is_nan(v) || v < T::zero() => {
                Err(OptimizerError::invalid_configuration(
                    "threshold must be a non-negative number",
                    parameter,
                    v.to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl<T: Scalar> StoppingPolicy<T> for StoppingCriterion<T> {
    fn evaluate(&self, progress: &Progress<T>) -> Option<TerminationReason> {
        if let Some(max_iter) = self.max_iterations {
            if progress.iteration >= max_iter {
                return Some(TerminationReason::MaxIterationsReached);
            }
        }

        if let Some(max_time) = self.max_time {
            if progress.elapsed >= max_time {
                return Some(TerminationReason::MaxTimeExceeded);
            }
        }

        if let Some(min_grad) = self.min_gradient_norm {
            if progress.gradient_norm <= min_grad {
                return Some(TerminationReason::GradientNormBelowThreshold);
            }
        }

        if let Some(min_step) = self.min_step_size {
            if progress.step_size <= min_step {
                return Some(TerminationReason::StepSizeBelowThreshold);
            }
        }

        if let Some(max_evals) = self.max_cost_evaluations {
            if progress.cost_evaluations >= max_evals {
                return Some(TerminationReason::MaxCostEvaluationsReached);
            }
        }

        None
    }

    fn validate(&self) -> OptimizerResult<()> {
        Self::validate_threshold(self.min_gradient_norm, "min_gradient_norm")?;
        Self::validate_threshold(self.min_step_size, "min_step_size")?;

        let reachable = self.max_iterations.is_some()
            || self.max_time.is_some()
            || self.min_gradient_norm.is_some()
            || self.min_step_size.is_some()
            || self.max_cost_evaluations.is_some();

        if reachable {
            Ok(())
        } else {
            Err(OptimizerError::invalid_configuration(
                "no stopping threshold is reachable",
                "stopping_criterion",
                "unbounded",
            ))
        }
    }
}
