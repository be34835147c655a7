//! Step size schedules and the step-size rules consumed by the solvers.
//!
//! A [`StepSizeRule`] turns the current iterate and a descent direction into
//! a step size and the point reached by moving along that direction. The
//! movement itself is always delegated to [`Manifold::move_along`].
//!
//! Two rules are provided:
//! - [`ScheduledStep`]: a deterministic [`StepSizeSchedule`] evaluated at
//!   the iteration index, without touching the cost
//! - [`LineSearchStep`]: delegates to a [`LineSearch`] and reports the cost
//!   evaluations the search performed
//!
//! Both rules report the step size as the length α‖d‖ of the move, so a
//! `min_step_size` threshold means the same thing whichever rule is used.
//!
//! # Schedules
//!
//! With k the index the schedule is evaluated at ([`ScheduledStep`] passes
//! the iteration index, 1 on the first iteration):
//! - **Constant**: αₖ = α₀
//! - **Exponential**: αₖ = α₀ · γᵏ
//! - **Polynomial**: αₖ = α₀ / (1 + βk)ᵖ
//! - **Square root**: αₖ = α₀ / √(1 + k)
//!
//! The usual stochastic-approximation choice `base / (1 + iteration)^p` is
//! [`StepSizeSchedule::decaying`]; p ∈ (0.5, 1] gives Σ αₖ = ∞ and
//! Σ αₖ² < ∞.
//!
//! # Examples
//!
//! ```rust,ignore
//! # use riemsgd_core::prelude::*;
//! let rule = ScheduledStep::new(StepSizeSchedule::decaying(0.1, 0.6));
//! let rule = LineSearchStep::new(BacktrackingLineSearch::new());
//! ```

use crate::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    line_search::LineSearch,
    manifold::Manifold,
    problem::Problem,
    types::Scalar,
};
use num_traits::Float;
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Deterministic step size schedules.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepSizeSchedule<T: Scalar> {
    /// Fixed step size αₖ = α₀ for all iterations
    Constant(T),

    /// Exponential decay: αₖ = α₀ · γᵏ where 0 < γ < 1
    ExponentialDecay {
        /// Initial step size α₀
        initial: T,
        /// Decay factor γ ∈ (0, 1), typically 0.9-0.99
        decay_rate: T,
    },

    /// Polynomial decay: αₖ = α₀ / (1 + βk)ᵖ
    PolynomialDecay {
        /// Initial step size α₀
        initial: T,
        /// Decay coefficient β ≥ 0
        decay_rate: T,
        /// Decay power p ≥ 0
        power: T,
    },

    /// Square root decay: αₖ = α₀ / √(1 + k)
    SquareRootDecay {
        /// Initial step size α₀
        initial: T,
    },
}

impl<T: Scalar> StepSizeSchedule<T> {
    /// Computes the step size αₖ at index `iteration`.
    pub fn get_step_size(&self, iteration: usize) -> T {
        let k = <T as Scalar>::from_usize(iteration);

        match *self {
            Self::Constant(alpha) => alpha,
            Self::ExponentialDecay {
                initial,
                decay_rate,
            } => initial * <T as Float>::powf(decay_rate, k),
            Self::PolynomialDecay {
                initial,
                decay_rate,
                power,
            } => initial / <T as Float>::powf(T::one() + decay_rate * k, power),
            Self::SquareRootDecay { initial } => initial / <T as Float>::sqrt(T::one() + k),
        }
    }

    /// Creates a constant step size schedule αₖ = α₀.
    pub fn constant(step_size: T) -> Self {
        Self::Constant(step_size)
    }

    /// Creates an exponential decay schedule αₖ = α₀ · γᵏ.
    pub fn exponential_decay(initial: T, decay_rate: T) -> Self {
        Self::ExponentialDecay {
            initial,
            decay_rate,
        }
    }

    /// Creates a polynomial decay schedule αₖ = α₀ / (1 + βk)ᵖ.
    pub fn polynomial_decay(initial: T, decay_rate: T, power: T) -> Self {
        Self::PolynomialDecay {
            initial,
            decay_rate,
            power,
        }
    }

    /// Creates the schedule αₖ = base / (1 + k)ᵖ.
    ///
    /// A power of zero gives a constant step.
    pub fn decaying(base: T, power: T) -> Self {
        Self::polynomial_decay(base, T::one(), power)
    }

    /// Creates a square root decay schedule αₖ = α₀ / √(1 + k).
    pub fn sqrt_decay(initial: T) -> Self {
        Self::SquareRootDecay { initial }
    }

    /// Rejects negative or non-finite parameters.
    ///
    /// A zero base step is allowed: it never moves the iterate and lets the
    /// step-size threshold end the run.
    pub fn validate(&self) -> OptimizerResult<()> {
        let check = |value: T, parameter: &str| {
            if <T as Float>::is_finite(value) && value >= T::zero() {
                Ok(())
            } else {
                Err(OptimizerError::invalid_configuration(
                    "schedule parameters must be finite and non-negative",
                    parameter,
                    value.to_string(),
                ))
            }
        };

        match *self {
            Self::Constant(alpha) => check(alpha, "step_size"),
            Self::ExponentialDecay {
                initial,
                decay_rate,
            } => {
                check(initial, "initial")?;
                check(decay_rate, "decay_rate")
            }
            Self::PolynomialDecay {
                initial,
                decay_rate,
                power,
            } => {
                check(initial, "initial")?;
                check(decay_rate, "decay_rate")?;
                check(power, "power")
            }
            Self::SquareRootDecay { initial } => check(initial, "initial"),
        }
    }
}

/// Inputs of one step-size decision.
#[derive(Debug, Clone, Copy)]
pub struct StepRequest<'a, T, P, V>
where
    T: Scalar,
{
    /// Current iterate
    pub point: &'a P,
    /// Descent direction at `point`
    pub direction: &'a V,
    /// Iteration index, 1 on the first iteration
    pub iteration: usize,
    /// Cost at `point`, already evaluated by the solver
    pub cost: T,
}

/// A step size and the point it leads to.
///
/// `step_size` is the length α‖d‖ of the move under the manifold norm. It is
/// never negative; zero means the iterate did not move.
#[derive(Debug, Clone)]
pub struct StepSizeDecision<T, P>
where
    T: Scalar,
{
    /// Length of the move
    pub step_size: T,
    /// Point reached by moving along the direction
    pub new_point: P,
    /// Cost evaluations made by the rule
    pub cost_evaluations: usize,
}

/// Decides how far a solver moves along its descent direction.
///
/// A rule is deterministic given its inputs and its own state. Extra cost
/// evaluations it makes are reported in the decision and are not part of the
/// solver's per-iteration evaluation.
pub trait StepSizeRule<T>: Debug
where
    T: Scalar,
{
    /// Computes the step size and the moved point for one iteration.
    fn next_step<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        request: StepRequest<'_, T, M::Point, M::TangentVector>,
    ) -> OptimizerResult<StepSizeDecision<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>;

    /// Clears state carried between solves.
    fn reset(&mut self) {}

    /// Rejects parameters that cannot produce a valid step.
    fn validate(&self) -> OptimizerResult<()> {
        Ok(())
    }

    /// Short description recorded in the optimization log.
    fn describe(&self) -> String;
}

/// Step-size rule following a fixed schedule.
///
/// The schedule is evaluated at the iteration index, so
/// [`StepSizeSchedule::decaying`] gives `base / (1 + iteration)^p`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledStep<T: Scalar> {
    schedule: StepSizeSchedule<T>,
}

impl<T: Scalar> ScheduledStep<T> {
    /// Creates a rule from a schedule.
    pub fn new(schedule: StepSizeSchedule<T>) -> Self {
        Self { schedule }
    }

    /// Fixed step size.
    pub fn constant(step_size: T) -> Self {
        Self::new(StepSizeSchedule::constant(step_size))
    }

    /// The underlying schedule.
    pub fn schedule(&self) -> &StepSizeSchedule<T> {
        &self.schedule
    }
}

impl<T: Scalar> StepSizeRule<T> for ScheduledStep<T> {
    fn next_step<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        request: StepRequest<'_, T, M::Point, M::TangentVector>,
    ) -> OptimizerResult<StepSizeDecision<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
    {
        let manifold = problem.manifold();
        let alpha = self.schedule.get_step_size(request.iteration);
        let new_point = manifold.move_along(request.point, request.direction, alpha)?;
        let step_size = alpha * manifold.norm(request.point, request.direction)?;

        Ok(StepSizeDecision {
            step_size,
            new_point,
            cost_evaluations: 0,
        })
    }

    fn validate(&self) -> OptimizerResult<()> {
        self.schedule.validate()
    }

    fn describe(&self) -> String {
        format!("{:?}", self.schedule)
    }
}

/// Step-size rule backed by a line search along the descent direction.
#[derive(Debug, Clone)]
pub struct LineSearchStep<L> {
    line_search: L,
}

impl<L> LineSearchStep<L> {
    /// Wraps a line search.
    pub fn new(line_search: L) -> Self {
        Self { line_search }
    }

    /// The wrapped line search.
    pub fn line_search(&self) -> &L {
        &self.line_search
    }
}

impl<T, L> StepSizeRule<T> for LineSearchStep<L>
where
    T: Scalar,
    L: LineSearch<T>,
{
    fn next_step<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        request: StepRequest<'_, T, M::Point, M::TangentVector>,
    ) -> OptimizerResult<StepSizeDecision<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
    {
        // Steepest descent: ⟨grad f, −grad f⟩ = −‖d‖².
        let directional_deriv = -problem.manifold().inner_product(
            request.point,
            request.direction,
            request.direction,
        )?;

        let result = self.line_search.search(
            problem,
            request.point,
            request.cost,
            request.direction,
            directional_deriv,
        )?;

        Ok(StepSizeDecision {
            step_size: result.step_size,
            new_point: result.new_point,
            cost_evaluations: result.function_evals,
        })
    }

    fn reset(&mut self) {
        self.line_search.reset();
    }

    fn validate(&self) -> OptimizerResult<()> {
        self.line_search.params().validate()
    }

    fn describe(&self) -> String {
        format!(
            "{} line search {:?}",
            self.line_search.name(),
            self.line_search.params()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_function::CountingCostFunction;
    use crate::line_search::BacktrackingLineSearch;
    use crate::test_manifolds::TestEuclideanManifold;
    use crate::test_utils::QuadraticCost;
    use crate::types::DVector;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_schedule() {
        let schedule = StepSizeSchedule::constant(0.1);
        assert_eq!(schedule.get_step_size(0), 0.1);
        assert_eq!(schedule.get_step_size(1000), 0.1);
    }

    #[test]
    fn test_exponential_decay() {
        let schedule = StepSizeSchedule::exponential_decay(1.0, 0.9);
        assert_relative_eq!(schedule.get_step_size(0), 1.0);
        assert_relative_eq!(schedule.get_step_size(1), 0.9);
        assert!(schedule.get_step_size(10) < 0.5);
    }

    #[test]
    fn test_polynomial_decay() {
        let schedule = StepSizeSchedule::polynomial_decay(1.0, 0.1, 2.0);
        assert_relative_eq!(schedule.get_step_size(0), 1.0);
        // 1.0 / (1 + 0.1 * 10)^2 = 0.25
        assert_relative_eq!(schedule.get_step_size(10), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_decaying_schedule() {
        let schedule = StepSizeSchedule::decaying(0.5, 1.0);
        assert_relative_eq!(schedule.get_step_size(0), 0.5);
        assert_relative_eq!(schedule.get_step_size(4), 0.1, epsilon = 1e-12);

        let flat = StepSizeSchedule::decaying(0.5, 0.0);
        assert_relative_eq!(flat.get_step_size(99), 0.5);
    }

    #[test]
    fn test_sqrt_decay() {
        let schedule = StepSizeSchedule::sqrt_decay(1.0);
        assert_relative_eq!(schedule.get_step_size(3), 0.5);
    }

    #[test]
    fn test_schedule_validation() {
        assert!(StepSizeSchedule::constant(0.0).validate().is_ok());
        assert!(StepSizeSchedule::decaying(1.0, 0.5).validate().is_ok());

        let err = StepSizeSchedule::decaying(-1.0, 0.5).validate().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(StepSizeSchedule::constant(f64::NAN).validate().is_err());
        assert!(StepSizeSchedule::decaying(1.0, -0.5).validate().is_err());
    }

    #[test]
    fn test_scheduled_step_uses_iteration_index() {
        let manifold = TestEuclideanManifold::new(2);
        let cost_fn = CountingCostFunction::new(QuadraticCost::<f64>::centered(2));
        let problem = Problem::new(&manifold, &cost_fn);
        let mut rule = ScheduledStep::new(StepSizeSchedule::decaying(1.0, 1.0));

        let point = DVector::from_vec(vec![1.0, 1.0]);
        let direction = DVector::from_vec(vec![-3.0, 4.0]);

        // alpha = 1 / (1 + 1), moved distance alpha * 5.
        let first = rule
            .next_step(
                &problem,
                StepRequest {
                    point: &point,
                    direction: &direction,
                    iteration: 1,
                    cost: 1.0,
                },
            )
            .unwrap();
        assert_relative_eq!(first.step_size, 2.5);
        assert_relative_eq!(first.new_point, DVector::from_vec(vec![-0.5, 3.0]));

        let second = rule
            .next_step(
                &problem,
                StepRequest {
                    point: &point,
                    direction: &direction,
                    iteration: 2,
                    cost: 1.0,
                },
            )
            .unwrap();
        assert_relative_eq!(second.step_size, 5.0 / 3.0, epsilon = 1e-12);
        assert_eq!(second.cost_evaluations, 0);
        assert_eq!(cost_fn.counts(), (0, 0));
    }

    #[test]
    fn test_line_search_step_reports_evaluations() {
        let manifold = TestEuclideanManifold::new(2);
        let cost_fn = CountingCostFunction::new(QuadraticCost::<f64>::centered(2));
        let problem = Problem::new(&manifold, &cost_fn);
        let mut rule = LineSearchStep::new(BacktrackingLineSearch::new());

        let point = DVector::from_vec(vec![2.0, 0.0]);
        let direction = DVector::from_vec(vec![-2.0, 0.0]);
        let decision = rule
            .next_step(
                &problem,
                StepRequest {
                    point: &point,
                    direction: &direction,
                    iteration: 1,
                    cost: 2.0,
                },
            )
            .unwrap();

        assert_relative_eq!(decision.step_size, 1.0);
        assert_relative_eq!(decision.new_point, DVector::from_vec(vec![1.0, 0.0]));
        assert_eq!(decision.cost_evaluations, 1);
        assert_eq!(cost_fn.counts(), (1, 0));
        assert!(StepSizeRule::<f64>::describe(&rule).starts_with("Backtracking"));
    }
}
