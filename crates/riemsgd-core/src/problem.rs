//! Optimization problem: a manifold, a cost function and a verbosity level.
//!
//! [`Problem`] bundles the two external collaborators every solver needs so
//! they travel together through the solver loop and the step-size rules. It
//! is read-only: solvers and rules borrow it and never mutate it, so one
//! problem can back several independent solves.

use crate::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    manifold::Manifold,
    types::Scalar,
};
use std::fmt;
use std::marker::PhantomData;

/// An optimization problem over a Riemannian manifold.
///
/// Evaluation failures of the cost function are reported as
/// [`OptimizerError::UndefinedCost`]; failures of the manifold surface as
/// [`OptimizerError::InvalidManifoldOperation`].
///
/// # Example
///
/// ```rust,ignore
/// let problem = Problem::new(&sphere, &cost_fn).with_verbosity(2);
/// let point = solver.solve(&problem, None)?.into_point();
/// ```
pub struct Problem<'a, T, M, C>
where
    T: Scalar,
    M: Manifold<T>,
    C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
{
    manifold: &'a M,
    cost_fn: &'a C,
    verbosity: u8,
    _phantom: PhantomData<T>,
}

impl<'a, T, M, C> Problem<'a, T, M, C>
where
    T: Scalar,
    M: Manifold<T>,
    C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
{
    /// Creates a silent problem binding a cost function to a manifold.
    pub fn new(manifold: &'a M, cost_fn: &'a C) -> Self {
        Self {
            manifold,
            cost_fn,
            verbosity: 0,
            _phantom: PhantomData,
        }
    }

    /// Sets the console verbosity: 0 silent, 1 termination message,
    /// 2 and above one line per iteration.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The manifold the problem is posed on.
    pub fn manifold(&self) -> &'a M {
        self.manifold
    }

    /// The underlying cost function.
    pub fn cost_function(&self) -> &'a C {
        self.cost_fn
    }

    /// Console verbosity level.
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Evaluates the cost at `point`.
    pub fn cost(&self, point: &M::Point) -> OptimizerResult<T> {
        self.cost_fn
            .cost(point)
            .map_err(|e| OptimizerError::undefined_cost(0, format!("cost evaluation failed: {e}")))
    }

    /// Evaluates the (possibly stochastic) gradient estimate at `point`.
    pub fn gradient(&self, point: &M::Point) -> OptimizerResult<M::TangentVector> {
        self.cost_fn.gradient(point).map_err(|e| {
            OptimizerError::undefined_cost(0, format!("gradient evaluation failed: {e}"))
        })
    }
}

impl<T, M, C> Clone for Problem<'_, T, M, C>
where
    T: Scalar,
    M: Manifold<T>,
    C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, M, C> Copy for Problem<'_, T, M, C>
where
    T: Scalar,
    M: Manifold<T>,
    C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
{
}

impl<T, M, C> fmt::Debug for Problem<'_, T, M, C>
where
    T: Scalar,
    M: Manifold<T>,
    C: CostFunction<T, Point = M::Point, TangentVector = M::TangentVector>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("manifold", &self.manifold.name())
            .field("cost_fn", self.cost_fn)
            .field("verbosity", &self.verbosity)
            .finish()
    }
}
