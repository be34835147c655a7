//! Optimization log and solver results.
//!
//! The log is append-only while a solve runs. [`OptimizationLog::finalize`]
//! consumes it and returns the read-only [`CompletedLog`], so a log can be
//! finalized at most once and is only readable after finalization.

use crate::{stopping::Termination, types::Scalar};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How much a solve records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LogLevel {
    /// Return the bare final point
    #[default]
    None,
    /// Record the final values only
    Final,
    /// Record the final values and one record per iteration
    Iterations,
}

impl LogLevel {
    /// Maps the numeric verbosity 0 / 1 / ≥2 to a level.
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => Self::None,
            1 => Self::Final,
            _ => Self::Iterations,
        }
    }

    /// Whether per-iteration records are kept.
    pub fn records_iterations(self) -> bool {
        self >= Self::Iterations
    }
}

/// One row of the iteration log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IterationRecord<T: Scalar> {
    /// Iteration index, 1-based
    pub iteration: usize,
    /// Cost at the iterate
    pub cost: T,
    /// Elapsed time when the record was taken
    pub elapsed: Duration,
    /// Named extra values; the solvers always add `gradnorm`
    pub extras: Vec<(String, T)>,
}

impl<T: Scalar> IterationRecord<T> {
    /// Creates a record without extras.
    pub fn new(iteration: usize, cost: T, elapsed: Duration) -> Self {
        Self {
            iteration,
            cost,
            elapsed,
            extras: Vec::new(),
        }
    }

    /// Adds a named extra value.
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, value: T) -> Self {
        self.extras.push((name.into(), value));
        self
    }

    /// Looks up an extra value by name.
    pub fn extra(&self, name: &str) -> Option<T> {
        self.extras
            .iter()
            .find(|(key, _)| key == name)
            .map(|&(_, value)| value)
    }
}

/// Terminal summary of a solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FinalValues<T: Scalar, P> {
    /// Final iterate
    pub point: P,
    /// Cost at the final iterate
    pub cost: T,
    /// Why and when the run stopped
    pub termination: Termination,
    /// Total elapsed time
    pub elapsed: Duration,
    /// Step size of the last iteration
    pub step_size: T,
    /// Gradient norm of the last iteration
    pub gradient_norm: T,
    /// Number of iterations performed
    pub iterations: usize,
    /// Number of cost evaluations, including the step-size rule's
    pub cost_evaluations: usize,
}

/// Log under construction during a solve.
#[derive(Debug, Clone)]
pub struct OptimizationLog<T: Scalar> {
    solver: String,
    level: LogLevel,
    stopping_criteria: String,
    parameters: Vec<(String, String)>,
    iterations: Vec<IterationRecord<T>>,
}

impl<T: Scalar> OptimizationLog<T> {
    /// Starts an empty log for `solver`.
    pub fn new(solver: impl Into<String>, level: LogLevel) -> Self {
        Self {
            solver: solver.into(),
            level,
            stopping_criteria: String::new(),
            parameters: Vec::new(),
            iterations: Vec::new(),
        }
    }

    /// Records a snapshot of the stopping criteria.
    #[must_use]
    pub fn with_stopping_criteria(mut self, description: impl Into<String>) -> Self {
        self.stopping_criteria = description.into();
        self
    }

    /// Records a solver parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    /// The level the log was created with.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Appends an iteration record. Records are never modified afterwards.
    pub fn append(&mut self, record: IterationRecord<T>) {
        self.iterations.push(record);
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    /// Returns `true` if no record has been appended.
    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Closes the log with the terminal summary.
    pub fn finalize<P>(self, final_values: FinalValues<T, P>) -> CompletedLog<T, P> {
        CompletedLog {
            solver: self.solver,
            stopping_criteria: self.stopping_criteria,
            parameters: self.parameters,
            iterations: self.iterations,
            final_values,
        }
    }
}

/// A finalized, read-only optimization log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompletedLog<T: Scalar, P> {
    solver: String,
    stopping_criteria: String,
    parameters: Vec<(String, String)>,
    iterations: Vec<IterationRecord<T>>,
    final_values: FinalValues<T, P>,
}

impl<T: Scalar, P> CompletedLog<T, P> {
    /// Name of the solver that produced the log.
    pub fn solver(&self) -> &str {
        &self.solver
    }

    /// Snapshot of the stopping criteria in effect.
    pub fn stopping_criteria(&self) -> &str {
        &self.stopping_criteria
    }

    /// Solver parameters as `(name, value)` pairs.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Per-iteration records in iteration order; empty below
    /// [`LogLevel::Iterations`].
    pub fn iterations(&self) -> &[IterationRecord<T>] {
        &self.iterations
    }

    /// The terminal summary.
    pub fn final_values(&self) -> &FinalValues<T, P> {
        &self.final_values
    }

    /// Cost of every recorded iteration.
    pub fn cost_history(&self) -> Vec<T> {
        self.iterations.iter().map(|r| r.cost).collect()
    }
}

/// Result of a solve: the final point, with the completed log when logging
/// was enabled.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizationResult<T: Scalar, P> {
    /// Log level [`LogLevel::None`]
    Point(P),
    /// Any other log level
    WithLog(CompletedLog<T, P>),
}

impl<T: Scalar, P> OptimizationResult<T, P> {
    /// The final point.
    pub fn point(&self) -> &P {
        match self {
            Self::Point(point) => point,
            Self::WithLog(log) => &log.final_values.point,
        }
    }

    /// Consumes the result and returns the final point.
    pub fn into_point(self) -> P {
        match self {
            Self::Point(point) => point,
            Self::WithLog(log) => log.final_values.point,
        }
    }

    /// The completed log, if one was kept.
    pub fn log(&self) -> Option<&CompletedLog<T, P>> {
        match self {
            Self::Point(_) => None,
            Self::WithLog(log) => Some(log),
        }
    }

    /// Why the run stopped, if a log was kept.
    pub fn termination(&self) -> Option<&Termination> {
        self.log().map(|log| &log.final_values.termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopping::TerminationReason;
    use pretty_assertions::assert_eq;

    fn final_values(point: Vec<f64>) -> FinalValues<f64, Vec<f64>> {
        FinalValues {
            point,
            cost: 0.25,
            termination: Termination {
                reason: TerminationReason::MaxIterationsReached,
                iteration: 2,
                elapsed: Duration::from_millis(3),
            },
            elapsed: Duration::from_millis(3),
            step_size: 0.1,
            gradient_norm: 0.5,
            iterations: 2,
            cost_evaluations: 2,
        }
    }

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::None);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Final);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Iterations);
        assert_eq!(LogLevel::from_verbosity(9), LogLevel::Iterations);
        assert!(!LogLevel::Final.records_iterations());
    }

    #[test]
    fn test_finalize_keeps_records_in_order() {
        let mut log = OptimizationLog::new("StochasticGradient", LogLevel::Iterations)
            .with_parameter("step_size_rule", "Constant(0.1)");
        for i in 1..=3 {
            log.append(
                IterationRecord::new(i, 1.0 / i as f64, Duration::ZERO)
                    .with_extra("gradnorm", 0.5),
            );
        }
        assert_eq!(log.len(), 3);

        let completed = log.finalize(final_values(vec![1.0, 0.0]));
        let iterations: Vec<usize> = completed.iterations().iter().map(|r| r.iteration).collect();
        assert_eq!(iterations, vec![1, 2, 3]);
        assert_eq!(completed.iterations()[0].extra("gradnorm"), Some(0.5));
        assert_eq!(completed.iterations()[0].extra("missing"), None);
        assert_eq!(completed.solver(), "StochasticGradient");
        assert_eq!(completed.parameters()[0].1, "Constant(0.1)");
        assert_eq!(completed.final_values().iterations, 2);
    }

    #[test]
    fn test_result_accessors() {
        let bare: OptimizationResult<f64, Vec<f64>> = OptimizationResult::Point(vec![1.0]);
        assert!(bare.log().is_none());
        assert!(bare.termination().is_none());
        assert_eq!(bare.into_point(), vec![1.0]);

        let log = OptimizationLog::new("StochasticGradient", LogLevel::Final)
            .finalize(final_values(vec![0.0, 1.0]));
        let result = OptimizationResult::WithLog(log);
        assert_eq!(result.point(), &vec![0.0, 1.0]);
        assert_eq!(
            result.termination().map(|t| t.reason),
            Some(TerminationReason::MaxIterationsReached)
        );
        assert!(result.log().unwrap().iterations().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_completed_log_serialization() {
        let mut log = OptimizationLog::new("StochasticGradient", LogLevel::Iterations)
            .with_stopping_criteria("max_iterations = 2");
        log.append(IterationRecord::new(1, 0.5, Duration::ZERO).with_extra("gradnorm", 1.0));
        let completed = log.finalize(final_values(vec![0.0]));

        let json = serde_json::to_string(&completed).unwrap();
        assert!(json.contains("\"gradnorm\""));
        assert!(json.contains("MaxIterationsReached"));

        let restored: CompletedLog<f64, Vec<f64>> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, completed);
    }
}
