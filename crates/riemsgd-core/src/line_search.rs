//! Line search algorithms for Riemannian optimization.
//!
//! A line search picks a step along a search direction η ∈ T_x ℳ from the
//! current point x ∈ ℳ. Every trial point is produced by the manifold's
//! movement operator, y = R_x(α η), never computed by the search itself.
//!
//! # Sufficient decrease
//!
//! Both searches here accept a trial step α once the Armijo condition holds:
//!
//! f(R_x(α η)) ≤ f(x) + c₁ α d₀
//!
//! where d₀ is the directional derivative of f along η at x. For the
//! steepest-descent direction η = −grad f(x) this is d₀ = −‖η‖².
//! Failing trials are contracted by ρ ∈ (0, 1). If the final trial still
//! does not decrease the cost, the search gives up: the step is zero and the
//! point is kept, which the stopping criterion later sees as a vanishing
//! step size.
//!
//! # Variants
//!
//! ## Backtracking
//! - **First trial**: `initial / ‖η‖` on the first call; afterwards the
//!   quadratic-interpolation guess `2 (f(x) − f_prev) / d₀`, scaled by an
//!   optimism factor
//! - **Defaults**: ρ = 0.5, c₁ = 1e-4, optimism 2, 25 trials
//!
//! ## Adaptive
//! - **First trial**: the α accepted at the previous call, doubled unless
//!   that call needed a contraction
//! - **Defaults**: ρ = 0.5, c₁ = 0.5, 10 trials
//!
//! The reported step size is the length of the accepted step, α ‖η‖.
//!
//! # Example
//!
//! ```rust,ignore
//! # use riemsgd_core::prelude::*;
//! let mut line_search = BacktrackingLineSearch::new();
//! let norm = manifold.norm(&point, &direction)?;
//!
//! let result = line_search.search(&problem, &point, value, &direction, -norm * norm)?;
//! if result.success {
//!     println!("Step size: {}, New value: {}", result.step_size, result.new_value);
//! }
//! ```

use crate::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    manifold::Manifold,
    problem::Problem,
    types::Scalar,
};
use num_traits::Float;
use std::fmt::Debug;

/// Outcome of a single line search.
#[derive(Debug, Clone)]
pub struct LineSearchResult<T, P>
where
    T: Scalar,
{
    /// Length of the accepted step, α ‖η‖; zero when no decrease was found
    pub step_size: T,

    /// The accepted multiplier α of the search direction
    pub alpha: T,

    /// The new point y = R_x(α η), or x itself when the step is zero
    pub new_point: P,

    /// The objective value f(y) at the new point
    pub new_value: T,

    /// Number of objective evaluations performed by the search
    pub function_evals: usize,

    /// True if the accepted point decreases the cost
    pub success: bool,
}

/// Parameters shared by the line searches in this module.
///
/// # Parameter Guidelines
///
/// ```rust,ignore
/// # use riemsgd_core::prelude::*;
/// let params = LineSearchParams::<f64>::backtracking(); // c₁ = 1e-4, 25 trials
/// let params = LineSearchParams::<f64>::adaptive();     // c₁ = 0.5, 10 trials
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSearchParams<T>
where
    T: Scalar,
{
    /// Step length ‖α η‖ tried when no history is available
    pub initial_step_size: T,

    /// Maximum number of trial points evaluated, the first one included
    pub max_iterations: usize,

    /// Armijo parameter c₁ ∈ (0,1) for the sufficient decrease condition
    /// f(R_x(αη)) ≤ f(x) + c₁ α d₀
    pub c1: T,

    /// Contraction factor ρ ∈ (0,1): α_{i+1} = ρ α_i when Armijo fails
    pub rho: T,

    /// Scaling applied to the interpolated first trial of backtracking
    pub optimism: T,
}

impl<T> Default for LineSearchParams<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self::backtracking()
    }
}

impl<T> LineSearchParams<T>
where
    T: Scalar,
{
    /// Parameters of the backtracking search.
    pub fn backtracking() -> Self {
        Self {
            initial_step_size: T::one(),
            max_iterations: 25,
            c1: <T as Scalar>::from_f64(1e-4),
            rho: <T as Scalar>::from_f64(0.5),
            optimism: <T as Scalar>::from_f64(2.0),
        }
    }

    /// Parameters of the adaptive search.
    pub fn adaptive() -> Self {
        Self {
            initial_step_size: T::one(),
            max_iterations: 10,
            c1: <T as Scalar>::from_f64(0.5),
            rho: <T as Scalar>::from_f64(0.5),
            optimism: <T as Scalar>::from_f64(2.0),
        }
    }

    /// Checks that every parameter lies in its admissible range.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::InvalidConfiguration`] if:
    /// - the initial step size is not positive
    /// - c₁ ∉ (0, 1) or ρ ∉ (0, 1)
    /// - the optimism factor is not positive
    /// - the iteration budget is zero
    pub fn validate(&self) -> OptimizerResult<()> {
        let open_unit = |v: T| v > T::zero() && v < T::one();

        if !(self.initial_step_size > T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "initial step size must be positive",
                "initial_step_size",
                self.initial_step_size.to_string(),
            ));
        }

        if !open_unit(self.c1) {
            return Err(OptimizerError::invalid_configuration(
                "sufficient decrease constant must be in (0, 1)",
                "c1",
                self.c1.to_string(),
            ));
        }

        if !open_unit(self.rho) {
            return Err(OptimizerError::invalid_configuration(
                "contraction factor must be in (0, 1)",
                "rho",
                self.rho.to_string(),
            ));
        }

        if !(self.optimism > T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "optimism must be positive",
                "optimism",
                self.optimism.to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(OptimizerError::invalid_configuration(
                "at least one trial step is required",
                "max_iterations",
                "0",
            ));
        }

        Ok(())
    }
}

/// Interface for line searches on Riemannian manifolds.
///
/// Implementations may keep state between calls (the previous cost or the
/// previously accepted step); [`reset`](Self::reset) clears it and is called
/// at the start of every solve.
pub trait LineSearch<T>: Debug
where
    T: Scalar,
{
    /// Searches along `direction` from `point`.
    ///
    /// # Arguments
    ///
    /// * `problem` - Manifold and cost function
    /// * `point` - Current point x ∈ ℳ
    /// * `value` - Current cost f(x)
    /// * `direction` - Search direction η ∈ T_x ℳ
    /// * `directional_deriv` - d₀, negative for a descent direction
    ///
    /// # Errors
    ///
    /// Propagates failures of the movement operator, the norm and the cost.
    fn search<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        point: &M::Point,
        value: T,
        direction: &M::TangentVector,
        directional_deriv: T,
    ) -> OptimizerResult<LineSearchResult<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>;

    /// Forgets the state carried over from previous calls.
    fn reset(&mut self);

    /// Returns a human-readable name identifying the line search algorithm.
    fn name(&self) -> &str;

    /// The parameters the search runs with.
    fn params(&self) -> &LineSearchParams<T>;
}

/// Shared contraction loop of both searches.
///
/// Starts at `alpha`, contracts until the Armijo condition holds or the
/// trial budget is spent, and falls back to a zero step when the last trial
/// does not improve on `value`. A NaN trial cost counts as a failed trial.
#[allow(clippy::too_many_arguments)]
fn contract<T, M, C>(
    problem: &Problem<'_, T, M, C>,
    params: &LineSearchParams<T>,
    point: &M::Point,
    value: T,
    direction: &M::TangentVector,
    directional_deriv: T,
    norm: T,
    mut alpha: T,
) -> OptimizerResult<LineSearchResult<T, M::Point>>
where
    T: Scalar,
    M: Manifold<T>,
    C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
{
    let manifold = problem.manifold();

    let mut new_point = manifold.move_along(point, direction, alpha)?;
    let mut new_value = problem.cost(&new_point)?;
    let mut evals = 1;

    while !(new_value <= value + params.c1 * alpha * directional_deriv)
        && evals < params.max_iterations
    {
        tracing::trace!(
            alpha = <T as Scalar>::to_f64(alpha),
            trial_cost = <T as Scalar>::to_f64(new_value),
            evals,
            "line search trial rejected"
        );
        alpha = alpha * params.rho;
        new_point = manifold.move_along(point, direction, alpha)?;
        new_value = problem.cost(&new_point)?;
        evals += 1;
    }

    let success = new_value <= value;
    if !success {
        tracing::trace!(evals, "line search found no decrease; keeping the point");
        alpha = T::zero();
        new_point = point.clone();
        new_value = value;
    }

    Ok(LineSearchResult {
        step_size: alpha * norm,
        alpha,
        new_point,
        new_value,
        function_evals: evals,
        success,
    })
}

/// Zero-length result returned when the search direction vanishes.
fn null_step<T: Scalar, P: Clone>(point: &P, value: T) -> LineSearchResult<T, P> {
    LineSearchResult {
        step_size: T::zero(),
        alpha: T::zero(),
        new_point: point.clone(),
        new_value: value,
        function_evals: 0,
        success: false,
    }
}

/// Armijo backtracking with an interpolated first trial.
#[derive(Debug, Clone)]
pub struct BacktrackingLineSearch<T: Scalar> {
    params: LineSearchParams<T>,
    previous_value: Option<T>,
}

impl<T: Scalar> BacktrackingLineSearch<T> {
    /// Creates a backtracking search with its default parameters.
    pub fn new() -> Self {
        Self::with_params(LineSearchParams::backtracking())
    }

    /// Creates a backtracking search with custom parameters.
    pub fn with_params(params: LineSearchParams<T>) -> Self {
        Self {
            params,
            previous_value: None,
        }
    }

    fn first_trial(&self, value: T, directional_deriv: T, norm: T) -> T {
        let fallback = self.params.initial_step_size / norm;
        match self.previous_value {
            Some(previous) => {
                let two = <T as Scalar>::from_f64(2.0);
                let alpha = two * (value - previous) / directional_deriv * self.params.optimism;
                if <T as Float>::is_finite(alpha) && alpha > T::zero() {
                    alpha
                } else {
                    fallback
                }
            }
            None => fallback,
        }
    }
}

impl<T: Scalar> Default for BacktrackingLineSearch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> LineSearch<T> for BacktrackingLineSearch<T> {
    fn search<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        point: &M::Point,
        value: T,
        direction: &M::TangentVector,
        directional_deriv: T,
    ) -> OptimizerResult<LineSearchResult<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
    {
        let norm = problem.manifold().norm(point, direction)?;
        if norm == T::zero() {
            return Ok(null_step(point, value));
        }

        let alpha = self.first_trial(value, directional_deriv, norm);
        let result = contract(
            problem,
            &self.params,
            point,
            value,
            direction,
            directional_deriv,
            norm,
            alpha,
        )?;

        self.previous_value = Some(value);
        Ok(result)
    }

    fn reset(&mut self) {
        self.previous_value = None;
    }

    fn name(&self) -> &str {
        "Backtracking"
    }

    fn params(&self) -> &LineSearchParams<T> {
        &self.params
    }
}

/// Armijo search that starts from the previously accepted step.
#[derive(Debug, Clone)]
pub struct AdaptiveLineSearch<T: Scalar> {
    params: LineSearchParams<T>,
    previous_alpha: Option<T>,
}

impl<T: Scalar> AdaptiveLineSearch<T> {
    /// Creates an adaptive search with its default parameters.
    pub fn new() -> Self {
        Self::with_params(LineSearchParams::adaptive())
    }

    /// Creates an adaptive search with custom parameters.
    pub fn with_params(params: LineSearchParams<T>) -> Self {
        Self {
            params,
            previous_alpha: None,
        }
    }
}

impl<T: Scalar> Default for AdaptiveLineSearch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> LineSearch<T> for AdaptiveLineSearch<T> {
    fn search<M, C>(
        &mut self,
        problem: &Problem<'_, T, M, C>,
        point: &M::Point,
        value: T,
        direction: &M::TangentVector,
        directional_deriv: T,
    ) -> OptimizerResult<LineSearchResult<T, M::Point>>
    where
        M: Manifold<T>,
        C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
    {
        let norm = problem.manifold().norm(point, direction)?;
        if norm == T::zero() {
            return Ok(null_step(point, value));
        }

        // A zero step from a failed call would pin every later search at zero.
        let alpha = match self.previous_alpha {
            Some(alpha) if alpha > T::zero() => alpha,
            _ => self.params.initial_step_size / norm,
        };

        let result = contract(
            problem,
            &self.params,
            point,
            value,
            direction,
            directional_deriv,
            norm,
            alpha,
        )?;

        self.previous_alpha = Some(if result.function_evals == 2 {
            result.alpha
        } else {
            result.alpha * <T as Scalar>::from_f64(2.0)
        });
        Ok(result)
    }

    fn reset(&mut self) {
        self.previous_alpha = None;
    }

    fn name(&self) -> &str {
        "Adaptive"
    }

    fn params(&self) -> &LineSearchParams<T> {
        &self.params
    }
}
