//! Manifold capability set consumed by the solvers.
//!
//! A Riemannian manifold (M, g) is a smooth manifold M equipped with a metric
//! g that assigns an inner product to each tangent space T_p M. The solvers
//! in this workspace never look inside points or tangent vectors: they only
//! use the operations listed here.
//!
//! Key concepts:
//! - **Tangent space**: T_p M is the linear approximation of M at point p
//! - **Retraction**: A smooth map R_p: T_p M → M that approximates the exponential map
//! - **Movement**: `move_along(p, η, α) = R_p(α η)`, the step operator used by
//!   every step-size rule

use crate::{error::Result, types::Scalar};
use num_traits::Float;
use std::fmt::Debug;

/// Trait for Riemannian manifolds.
///
/// Implementations must be safe to share read-only between independent
/// solves, hence the `Send + Sync` bound.
///
/// # Required properties
///
/// 1. **Retraction at zero**: `retract(p, 0) = p`, so that
///    `move_along(p, η, 0) = p`
/// 2. **Metric**: `inner_product` is symmetric, bilinear and positive definite
///
/// # Example
///
/// ```rust,ignore
/// use riemsgd_core::prelude::*;
///
/// #[derive(Debug)]
/// struct Euclidean { dim: usize }
///
/// impl Manifold<f64> for Euclidean {
///     type Point = DVector<f64>;
///     type TangentVector = DVector<f64>;
///
///     fn name(&self) -> &str { "Euclidean" }
///     fn dimension(&self) -> usize { self.dim }
///     fn random_point(&self) -> Result<DVector<f64>> { Ok(DVector::zeros(self.dim)) }
///     fn inner_product(&self, _p: &DVector<f64>, u: &DVector<f64>, v: &DVector<f64>) -> Result<f64> {
///         Ok(u.dot(v))
///     }
///     fn retract(&self, p: &DVector<f64>, v: &DVector<f64>) -> Result<DVector<f64>> { Ok(p + v) }
///     fn scale_tangent(&self, _p: &DVector<f64>, s: f64, v: &DVector<f64>) -> Result<DVector<f64>> {
///         Ok(v * s)
///     }
/// }
/// ```
pub trait Manifold<T>: Debug + Send + Sync
where
    T: Scalar,
{
    /// Points on the manifold.
    type Point: Clone + Debug;

    /// Elements of a tangent space.
    type TangentVector: Clone + Debug;

    /// Returns a human-readable name for the manifold.
    fn name(&self) -> &str;

    /// Returns the intrinsic dimension of the manifold.
    fn dimension(&self) -> usize;

    /// Generates a random point on the manifold.
    ///
    /// Used by the solvers when no starting point is supplied.
    fn random_point(&self) -> Result<Self::Point>;

    /// Computes the Riemannian inner product ⟨u, v⟩_p of two tangent vectors at `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if `u` or `v` cannot be tangent vectors at `point`
    /// (e.g. mismatched dimensions).
    fn inner_product(
        &self,
        point: &Self::Point,
        u: &Self::TangentVector,
        v: &Self::TangentVector,
    ) -> Result<T>;

    /// Computes the norm ‖v‖_p induced by the metric.
    fn norm(&self, point: &Self::Point, vector: &Self::TangentVector) -> Result<T> {
        self.inner_product(point, vector, vector)
            .map(<T as Float>::sqrt)
    }

    /// Performs a retraction R_p(v) from the tangent space back to the manifold.
    fn retract(&self, point: &Self::Point, tangent: &Self::TangentVector) -> Result<Self::Point>;

    /// Multiplies a tangent vector at `point` by a scalar.
    fn scale_tangent(
        &self,
        point: &Self::Point,
        scalar: T,
        tangent: &Self::TangentVector,
    ) -> Result<Self::TangentVector>;

    /// Advances `point` along `direction` by `step_size`: R_p(α η).
    ///
    /// A zero step returns the point itself without calling the retraction.
    fn move_along(
        &self,
        point: &Self::Point,
        direction: &Self::TangentVector,
        step_size: T,
    ) -> Result<Self::Point> {
        if step_size == T::zero() {
            return Ok(point.clone());
        }
        let step = self.scale_tangent(point, step_size, direction)?;
        self.retract(point, &step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_manifolds::{TestEuclideanManifold, TestSphereManifold};
    use crate::types::DVector;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_norm_uses_inner_product() {
        let manifold = TestEuclideanManifold::new(3);
        let point = DVector::zeros(3);
        let vector = DVector::from_vec(vec![3.0, 4.0, 0.0]);

        let norm: f64 = manifold.norm(&point, &vector).unwrap();
        assert_relative_eq!(norm, 5.0);
    }

    #[test]
    fn test_move_along_scales_direction() {
        let manifold = TestEuclideanManifold::new(2);
        let point = DVector::from_vec(vec![1.0, 1.0]);
        let direction = DVector::from_vec(vec![-2.0, 4.0]);

        let moved = manifold.move_along(&point, &direction, 0.5).unwrap();
        assert_relative_eq!(moved, DVector::from_vec(vec![0.0, 3.0]));
    }

    #[test]
    fn test_zero_step_keeps_point() {
        let manifold = TestSphereManifold::new(4);
        let point: DVector<f64> = manifold.random_point().unwrap();
        let direction = DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0]);

        let moved = manifold.move_along(&point, &direction, 0.0).unwrap();
        assert_eq!(moved, point);
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let manifold = TestEuclideanManifold::new(3);
        let point = DVector::zeros(3);
        let short = DVector::from_vec(vec![1.0, 2.0]);

        let result: Result<f64> = manifold.norm(&point, &short);
        assert!(matches!(
            result,
            Err(crate::error::ManifoldError::DimensionMismatch { .. })
        ));
    }
}
