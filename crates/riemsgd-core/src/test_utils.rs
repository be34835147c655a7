//! Cost functions shared by the unit tests, integration tests and benches.

#![cfg(any(test, feature = "test-utils"))]

use crate::{
    cost_function::CostFunction,
    error::{ManifoldError, Result},
    types::{DVector, Scalar},
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Quadratic bowl f(x) = ½‖x − target‖² with gradient x − target.
///
/// On a flat manifold the Euclidean gradient is the Riemannian one.
#[derive(Debug, Clone)]
pub struct QuadraticCost<T: Scalar> {
    target: DVector<T>,
}

impl<T: Scalar> QuadraticCost<T> {
    pub fn new(target: DVector<T>) -> Self {
        Self { target }
    }

    /// Bowl centred at the origin of R^dim.
    pub fn centered(dim: usize) -> Self {
        Self::new(DVector::zeros(dim))
    }
}

impl<T: Scalar> CostFunction<T> for QuadraticCost<T> {
    type Point = DVector<T>;
    type TangentVector = DVector<T>;

    fn cost(&self, point: &DVector<T>) -> Result<T> {
        if point.len() != self.target.len() {
            return Err(ManifoldError::dimension_mismatch(
                self.target.len(),
                point.len(),
            ));
        }
        let diff = point - &self.target;
        Ok(diff.dot(&diff) * <T as Scalar>::from_f64(0.5))
    }

    fn gradient(&self, point: &DVector<T>) -> Result<DVector<T>> {
        if point.len() != self.target.len() {
            return Err(ManifoldError::dimension_mismatch(
                self.target.len(),
                point.len(),
            ));
        }
        Ok(point - &self.target)
    }
}

/// Constant cost with an identically zero gradient.
#[derive(Debug, Clone)]
pub struct ConstantCost<T: Scalar> {
    value: T,
    dim: usize,
}

impl<T: Scalar> ConstantCost<T> {
    pub fn new(value: T, dim: usize) -> Self {
        Self { value, dim }
    }
}

impl<T: Scalar> CostFunction<T> for ConstantCost<T> {
    type Point = DVector<T>;
    type TangentVector = DVector<T>;

    fn cost(&self, _point: &DVector<T>) -> Result<T> {
        Ok(self.value)
    }

    fn gradient(&self, _point: &DVector<T>) -> Result<DVector<T>> {
        Ok(DVector::zeros(self.dim))
    }
}

/// Wraps a cost function and makes the `n`-th gradient call (1-based) fail.
#[derive(Debug)]
pub struct FailingGradient<F> {
    inner: F,
    fail_on_call: usize,
    calls: AtomicUsize,
}

impl<F> FailingGradient<F> {
    pub fn new(inner: F, fail_on_call: usize) -> Self {
        Self {
            inner,
            fail_on_call,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of gradient calls made so far, including the failing one.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<T: Scalar, F: CostFunction<T>> CostFunction<T> for FailingGradient<F> {
    type Point = F::Point;
    type TangentVector = F::TangentVector;

    fn cost(&self, point: &Self::Point) -> Result<T> {
        self.inner.cost(point)
    }

    fn gradient(&self, point: &Self::Point) -> Result<Self::TangentVector> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if call == self.fail_on_call {
            return Err(ManifoldError::numerical_error(format!(
                "gradient evaluation {call} failed"
            )));
        }
        self.inner.gradient(point)
    }
}

/// Wraps a cost function and makes the `n`-th cost call (1-based) fail.
#[derive(Debug)]
pub struct FailingCost<F> {
    inner: F,
    fail_on_call: usize,
    calls: AtomicUsize,
}

impl<F> FailingCost<F> {
    pub fn new(inner: F, fail_on_call: usize) -> Self {
        Self {
            inner,
            fail_on_call,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of cost calls made so far, including the failing one.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<T: Scalar, F: CostFunction<T>> CostFunction<T> for FailingCost<F> {
    type Point = F::Point;
    type TangentVector = F::TangentVector;

    fn cost(&self, point: &Self::Point) -> Result<T> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if call == self.fail_on_call {
            return Err(ManifoldError::numerical_error(format!(
                "cost evaluation {call} failed"
            )));
        }
        self.inner.cost(point)
    }

    fn gradient(&self, point: &Self::Point) -> Result<Self::TangentVector> {
        self.inner.gradient(point)
    }
}

/// Cost whose gradient is a fixed vector regardless of the point.
///
/// Keeps the gradient norm constant, which is handy when a test must make
/// sure the gradient threshold never fires.
#[derive(Debug, Clone)]
pub struct ConstantGradientCost<T: Scalar> {
    gradient: DVector<T>,
}

impl<T: Scalar> ConstantGradientCost<T> {
    pub fn new(gradient: DVector<T>) -> Self {
        Self { gradient }
    }
}

impl<T: Scalar> CostFunction<T> for ConstantGradientCost<T> {
    type Point = DVector<T>;
    type TangentVector = DVector<T>;

    fn cost(&self, point: &DVector<T>) -> Result<T> {
        Ok(self.gradient.dot(point))
    }

    fn gradient(&self, _point: &DVector<T>) -> Result<DVector<T>> {
        Ok(self.gradient.clone())
    }
}
