//! Riemannian stochastic gradient solver.
//!
//! The solver minimizes a cost over a manifold from gradient estimates that
//! may be formed from a mini-batch of samples. It does not know how the
//! estimate was formed: whatever the problem returns is "the gradient at
//! this point, this iteration".
//!
//! # Algorithm Overview
//!
//! Each iteration performs the following steps:
//! 1. Evaluate the cost and the gradient estimate at the current point and
//!    the gradient norm under the manifold metric
//! 2. Report progress (verbosity ≥ 2) and record the iteration (log level
//!    [`LogLevel::Iterations`])
//! 3. Take the steepest-descent direction d = −grad
//! 4. Ask the step-size rule for a step size and the moved point
//! 5. Ask the stopping policy whether to stop; if so, the moved point is
//!    the result
//!
//! The iteration counter starts at 0 and is incremented right after the
//! evaluations, so the first iteration is iteration 1. The wall-clock budget
//! is only checked between iterations.

use riemsgd_core::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    manifold::Manifold,
    observer::{NoOpObserver, SolverObserver},
    optimizer::{Solver, SolverConfig},
    optlog::{FinalValues, IterationRecord, LogLevel, OptimizationLog, OptimizationResult},
    problem::Problem,
    step_size::{ScheduledStep, StepRequest, StepSizeRule, StepSizeSchedule},
    stopping::{Progress, StoppingCriterion, StoppingPolicy, Termination},
    types::Scalar,
};
use num_traits::Float;
use std::fmt;
use std::marker::PhantomData;
use std::time::Instant;

/// Riemannian stochastic gradient solver.
///
/// The step-size rule and the stopping policy are injected collaborators;
/// the solver only runs the loop.
///
/// # Examples
///
/// ```rust,ignore
/// use riemsgd_optim::StochasticGradient;
/// use riemsgd_core::prelude::*;
///
/// // Decaying schedule 0.1 / (1 + k)^0.6, at most 500 iterations
/// let mut solver = StochasticGradient::with_schedule(StepSizeSchedule::decaying(0.1, 0.6))
///     .with_stopping_policy(StoppingCriterion::new().with_max_iterations(500))
///     .with_log_level(LogLevel::Iterations);
///
/// let result = solver.solve(&Problem::new(&manifold, &cost_fn), None)?;
/// ```
pub struct StochasticGradient<T, R, S = StoppingCriterion<T>>
where
    T: Scalar,
    R: StepSizeRule<T>,
    S: StoppingPolicy<T>,
{
    step_size_rule: R,
    stopping_policy: S,
    config: SolverConfig,
    observer: Box<dyn SolverObserver<T>>,
    _phantom: PhantomData<T>,
}

impl<T> StochasticGradient<T, ScheduledStep<T>>
where
    T: Scalar,
{
    /// Creates a solver following a step-size schedule.
    pub fn with_schedule(schedule: StepSizeSchedule<T>) -> Self {
        Self::new(ScheduledStep::new(schedule))
    }
}

impl<T, R> StochasticGradient<T, R>
where
    T: Scalar,
    R: StepSizeRule<T>,
{
    /// Creates a solver with the default stopping criterion, no log and no
    /// progress output.
    ///
    /// Attach a [`ConsoleObserver`](riemsgd_core::observer::ConsoleObserver)
    /// to print the iteration table when the problem's verbosity asks for it.
    pub fn new(step_size_rule: R) -> Self {
        Self {
            step_size_rule,
            stopping_policy: StoppingCriterion::default(),
            config: SolverConfig::default(),
            observer: Box::new(NoOpObserver),
            _phantom: PhantomData,
        }
    }
}

impl<T, R, S> StochasticGradient<T, R, S>
where
    T: Scalar,
    R: StepSizeRule<T>,
    S: StoppingPolicy<T>,
{
    /// Replaces the stopping policy.
    pub fn with_stopping_policy<S2: StoppingPolicy<T>>(
        self,
        stopping_policy: S2,
    ) -> StochasticGradient<T, R, S2> {
        StochasticGradient {
            step_size_rule: self.step_size_rule,
            stopping_policy,
            config: self.config,
            observer: self.observer,
            _phantom: PhantomData,
        }
    }

    /// Sets the shared solver settings.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the log level.
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.config.log_level = log_level;
        self
    }

    /// Replaces the progress observer.
    pub fn with_observer<O: SolverObserver<T> + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// The step-size rule.
    pub fn step_size_rule(&self) -> &R {
        &self.step_size_rule
    }

    /// The stopping policy.
    pub fn stopping_policy(&self) -> &S {
        &self.stopping_policy
    }

    /// The shared solver settings.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn start_log(&self) -> Option<OptimizationLog<T>> {
        (self.config.log_level > LogLevel::None).then(|| {
            OptimizationLog::new(self.name(), self.config.log_level)
                .with_stopping_criteria(format!("{:?}", self.stopping_policy))
                .with_parameter("step_size_rule", self.step_size_rule.describe())
        })
    }

    /// Builds the result once the stopping policy has fired.
    #[allow(clippy::too_many_arguments)]
    fn finish<M, C>(
        problem: &Problem<'_, T, M, C>,
        log: Option<OptimizationLog<T>>,
        point: M::Point,
        termination: Termination,
        start: Instant,
        step_size: T,
        gradient_norm: T,
        cost_evaluations: usize,
    ) -> OptimizerResult<OptimizationResult<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
    {
        let Some(log) = log else {
            return Ok(OptimizationResult::Point(point));
        };

        let cost = problem
            .cost(&point)
            .map_err(|e| e.at_iteration(termination.iteration))?;

        let final_values = FinalValues {
            point,
            cost,
            termination,
            elapsed: start.elapsed(),
            step_size,
            gradient_norm,
            iterations: termination.iteration,
            cost_evaluations,
        };
        Ok(OptimizationResult::WithLog(log.finalize(final_values)))
    }
}

impl<T, R, S> fmt::Debug for StochasticGradient<T, R, S>
where
    T: Scalar,
    R: StepSizeRule<T>,
    S: StoppingPolicy<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StochasticGradient")
            .field("step_size_rule", &self.step_size_rule)
            .field("stopping_policy", &self.stopping_policy)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T, R, S> Solver<T> for StochasticGradient<T, R, S>
where
    T: Scalar,
    R: StepSizeRule<T>,
    S: StoppingPolicy<T>,
{
    fn name(&self) -> &str {
        "StochasticGradient"
    }

    fn solve<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        initial_point: Option<M::Point>,
    ) -> OptimizerResult<OptimizationResult<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
    {
        self.stopping_policy.validate()?;
        self.step_size_rule.validate()?;
        self.step_size_rule.reset();

        let manifold = problem.manifold();
        let verbosity = problem.verbosity();

        let mut point = match initial_point {
            Some(point) => point,
            None => manifold.random_point()?,
        };

        let mut log = self.start_log();
        let start = Instant::now();
        let mut iteration = 0usize;
        let mut cost_evaluations = 0usize;

        if verbosity >= 2 {
            self.observer.on_start();
        }

        loop {
            let cost = problem
                .cost(&point)
                .map_err(|e| e.at_iteration(iteration + 1))?;
            cost_evaluations += 1;
            let gradient = problem
                .gradient(&point)
                .map_err(|e| e.at_iteration(iteration + 1))?;
            let gradient_norm = manifold.norm(&point, &gradient)?;
            iteration += 1;

            if !<T as Float>::is_finite(gradient_norm) {
                return Err(OptimizerError::undefined_cost(
                    iteration,
                    format!("gradient norm is {gradient_norm}"),
                ));
            }
            if <T as Float>::is_nan(cost) {
                tracing::warn!(iteration, "cost evaluated to NaN");
            }

            if verbosity >= 2 {
                self.observer.on_iteration(iteration, cost, gradient_norm);
            }

            if let Some(log) = log.as_mut() {
                if log.level().records_iterations() {
                    log.append(
                        IterationRecord::new(iteration, cost, start.elapsed())
                            .with_extra("gradnorm", gradient_norm),
                    );
                }
            }

            let direction = manifold.scale_tangent(&point, -T::one(), &gradient)?;

            let decision = self.step_size_rule.next_step(
                problem,
                StepRequest {
                    point: &point,
                    direction: &direction,
                    iteration,
                    cost,
                },
            )
            .map_err(|e| e.at_iteration(iteration))?;
            cost_evaluations += decision.cost_evaluations;

            tracing::debug!(
                iteration,
                cost = <T as Scalar>::to_f64(cost),
                gradient_norm = <T as Scalar>::to_f64(gradient_norm),
                step_size = <T as Scalar>::to_f64(decision.step_size),
                "stochastic gradient iteration"
            );

            let progress = Progress::new(
                start.elapsed(),
                decision.step_size,
                gradient_norm,
                iteration,
            )
            .with_cost_evaluations(cost_evaluations);

            if let Some(reason) = self.stopping_policy.evaluate(&progress) {
                let termination = Termination {
                    reason,
                    iteration,
                    elapsed: progress.elapsed,
                };
                tracing::info!(
                    ?reason,
                    iteration,
                    elapsed_secs = progress.elapsed.as_secs_f64(),
                    "stochastic gradient terminated"
                );
                if verbosity >= 1 {
                    self.observer.on_termination(&termination);
                }

                return Self::finish(
                    problem,
                    log,
                    decision.new_point,
                    termination,
                    start,
                    decision.step_size,
                    gradient_norm,
                    cost_evaluations,
                );
            }

            point = decision.new_point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riemsgd_core::{
        line_search::BacktrackingLineSearch,
        step_size::LineSearchStep,
        stopping::TerminationReason,
        test_manifolds::TestEuclideanManifold,
        test_utils::QuadraticCost,
        types::DVector,
    };
    use approx::assert_relative_eq;

    #[test]
    fn test_solver_creation() {
        let solver = StochasticGradient::with_schedule(StepSizeSchedule::constant(0.1_f64));
        assert_eq!(solver.name(), "StochasticGradient");
        assert_eq!(solver.config().log_level, LogLevel::None);
        assert_eq!(solver.stopping_policy().max_iterations, Some(1000));
        assert_eq!(
            solver.step_size_rule().schedule(),
            &StepSizeSchedule::Constant(0.1)
        );
    }

    #[test]
    fn test_constant_step_converges_on_quadratic() {
        let manifold = TestEuclideanManifold::new(3);
        let cost_fn = QuadraticCost::new(DVector::from_vec(vec![1.0, -2.0, 0.5]));
        let problem = Problem::new(&manifold, &cost_fn);

        let mut solver = StochasticGradient::with_schedule(StepSizeSchedule::constant(0.5));
        let result = solver
            .solve(&problem, Some(DVector::zeros(3)))
            .unwrap();

        assert_relative_eq!(
            result.point().clone(),
            DVector::from_vec(vec![1.0, -2.0, 0.5]),
            epsilon = 1e-5
        );
        assert!(result.log().is_none());
    }

    #[test]
    fn test_line_search_rule_reports_final_values() {
        let manifold = TestEuclideanManifold::new(2);
        let cost_fn = QuadraticCost::<f64>::centered(2);
        let problem = Problem::new(&manifold, &cost_fn);

        let mut solver = StochasticGradient::new(LineSearchStep::new(BacktrackingLineSearch::new()))
            .with_log_level(LogLevel::Final);
        let result = solver
            .solve(&problem, Some(DVector::from_vec(vec![2.0, 0.0])))
            .unwrap();

        let log = result.log().unwrap();
        let final_values = log.final_values();
        assert!(log.iterations().is_empty());
        assert_eq!(
            final_values.termination.reason,
            TerminationReason::GradientNormBelowThreshold
        );
        assert!(final_values.cost_evaluations > final_values.iterations);
        assert!(final_values.gradient_norm <= 1e-6);
        assert!(log.parameters()[0].1.starts_with("Backtracking"));
    }
}
