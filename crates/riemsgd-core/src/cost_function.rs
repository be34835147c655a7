//! Cost function interface for optimization algorithms.
//!
//! A cost function supplies the objective value f(x) and an estimate of its
//! Riemannian gradient grad f(x) ∈ T_x M. The estimate may be exact or
//! formed from a mini-batch of samples; the solvers do not distinguish the
//! two and treat every returned vector as "the gradient estimate at this
//! point, this iteration".

use crate::{error::Result, types::Scalar};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for cost functions on Riemannian manifolds.
///
/// Implementations that sample mini-batches must manage their own sampler
/// state behind `&self` (for example with a mutex around the generator).
pub trait CostFunction<T>: Debug
where
    T: Scalar,
{
    /// Points on the manifold the cost is defined over.
    type Point;

    /// Tangent vectors returned as gradients.
    type TangentVector;

    /// Evaluates the cost function at a point.
    fn cost(&self, point: &Self::Point) -> Result<T>;

    /// Evaluates the Riemannian gradient (or a stochastic estimate of it) at a point.
    fn gradient(&self, point: &Self::Point) -> Result<Self::TangentVector>;
}

/// Wrapper that counts cost and gradient evaluations.
///
/// Useful to check how many evaluations a solver or a line search performs.
#[derive(Debug)]
pub struct CountingCostFunction<F> {
    /// The underlying cost function
    pub inner: F,
    cost_count: AtomicUsize,
    gradient_count: AtomicUsize,
}

impl<F> CountingCostFunction<F> {
    /// Creates a new counting wrapper around a cost function.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            cost_count: AtomicUsize::new(0),
            gradient_count: AtomicUsize::new(0),
        }
    }

    /// Resets all counters to zero.
    pub fn reset_counts(&self) {
        self.cost_count.store(0, Ordering::Relaxed);
        self.gradient_count.store(0, Ordering::Relaxed);
    }

    /// Returns the current `(cost, gradient)` evaluation counts.
    pub fn counts(&self) -> (usize, usize) {
        (
            self.cost_count.load(Ordering::Relaxed),
            self.gradient_count.load(Ordering::Relaxed),
        )
    }
}

impl<T, F> CostFunction<T> for CountingCostFunction<F>
where
    T: Scalar,
    F: CostFunction<T>,
{
    type Point = F::Point;
    type TangentVector = F::TangentVector;

    fn cost(&self, point: &Self::Point) -> Result<T> {
        self.cost_count.fetch_add(1, Ordering::Relaxed);
        self.inner.cost(point)
    }

    fn gradient(&self, point: &Self::Point) -> Result<Self::TangentVector> {
        self.gradient_count.fetch_add(1, Ordering::Relaxed);
        self.inner.gradient(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::QuadraticCost;
    use crate::types::DVector;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_cost_and_gradient() {
        let cost_fn = QuadraticCost::new(DVector::from_vec(vec![1.0, -1.0]));
        let point = DVector::from_vec(vec![2.0, 1.0]);

        assert_relative_eq!(cost_fn.cost(&point).unwrap(), 2.5);
        assert_relative_eq!(
            cost_fn.gradient(&point).unwrap(),
            DVector::from_vec(vec![1.0, 2.0])
        );
    }

    #[test]
    fn test_counting_cost_function() {
        let cost = CountingCostFunction::new(QuadraticCost::new(DVector::from_vec(vec![0.0, 0.0])));
        let point = DVector::from_vec(vec![1.0, 1.0]);

        assert_eq!(cost.counts(), (0, 0));

        let _: f64 = cost.cost(&point).unwrap();
        let _ = cost.gradient(&point).unwrap();
        let _ = cost.gradient(&point).unwrap();
        assert_eq!(cost.counts(), (1, 2));

        cost.reset_counts();
        assert_eq!(cost.counts(), (0, 0));
    }
}
