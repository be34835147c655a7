//! Common test manifolds for use in unit tests, integration tests and benches.
//!
//! This module provides small reference manifolds so that solver tests do
//! not depend on a full geometry library.

#![cfg(any(test, feature = "test-utils"))]

use crate::{
    error::{ManifoldError, Result},
    manifold::Manifold,
    types::{DVector, Scalar},
};
use num_traits::Float;
use rand::thread_rng;
use rand_distr::{Distribution, StandardNormal};

fn check_len<T: Scalar>(expected: usize, vector: &DVector<T>) -> Result<()> {
    if vector.len() == expected {
        Ok(())
    } else {
        Err(ManifoldError::dimension_mismatch(expected, vector.len()))
    }
}

fn gaussian_vector<T: Scalar>(dim: usize) -> DVector<T> {
    let mut rng = thread_rng();
    DVector::from_fn(dim, |_, _| {
        let sample: f64 = StandardNormal.sample(&mut rng);
        <T as Scalar>::from_f64(sample)
    })
}

/// A simple Euclidean manifold for testing.
///
/// Flat space R^n where the retraction is vector addition and the metric is
/// the dot product. Operands of the wrong length are rejected with
/// [`ManifoldError::DimensionMismatch`].
#[derive(Debug, Clone)]
pub struct TestEuclideanManifold {
    dim: usize,
}

impl TestEuclideanManifold {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl<T: Scalar> Manifold<T> for TestEuclideanManifold {
    type Point = DVector<T>;
    type TangentVector = DVector<T>;

    fn name(&self) -> &str {
        "TestEuclidean"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn random_point(&self) -> Result<Self::Point> {
        Ok(gaussian_vector(self.dim))
    }

    fn inner_product(
        &self,
        point: &Self::Point,
        u: &Self::TangentVector,
        v: &Self::TangentVector,
    ) -> Result<T> {
        check_len(self.dim, point)?;
        check_len(self.dim, u)?;
        check_len(self.dim, v)?;
        Ok(u.dot(v))
    }

    fn retract(&self, point: &Self::Point, tangent: &Self::TangentVector) -> Result<Self::Point> {
        check_len(self.dim, point)?;
        check_len(self.dim, tangent)?;
        Ok(point + tangent)
    }

    fn scale_tangent(
        &self,
        _point: &Self::Point,
        scalar: T,
        tangent: &Self::TangentVector,
    ) -> Result<Self::TangentVector> {
        Ok(tangent * scalar)
    }
}

/// A simple sphere manifold for testing.
///
/// This represents the unit sphere S^{n-1} in R^n with the metric inherited
/// from R^n and the projection retraction R_p(v) = (p + v) / ‖p + v‖.
#[derive(Debug, Clone)]
pub struct TestSphereManifold {
    dim: usize,
}

impl TestSphereManifold {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Projects an ambient vector onto the tangent space at `point`.
    pub fn project_tangent<T: Scalar>(&self, point: &DVector<T>, vector: &DVector<T>) -> DVector<T> {
        vector - point * point.dot(vector)
    }
}

impl<T: Scalar> Manifold<T> for TestSphereManifold {
    type Point = DVector<T>;
    type TangentVector = DVector<T>;

    fn name(&self) -> &str {
        "TestSphere"
    }

    fn dimension(&self) -> usize {
        self.dim - 1
    }

    fn random_point(&self) -> Result<Self::Point> {
        let v: DVector<T> = gaussian_vector(self.dim);
        let norm = v.norm();
        if norm < <T as Scalar>::EPSILON {
            return Err(ManifoldError::numerical_error(
                "random sample has vanishing norm",
            ));
        }
        Ok(v / norm)
    }

    fn inner_product(
        &self,
        point: &Self::Point,
        u: &Self::TangentVector,
        v: &Self::TangentVector,
    ) -> Result<T> {
        check_len(self.dim, point)?;
        check_len(self.dim, u)?;
        check_len(self.dim, v)?;
        Ok(u.dot(v))
    }

    fn retract(&self, point: &Self::Point, tangent: &Self::TangentVector) -> Result<Self::Point> {
        check_len(self.dim, point)?;
        check_len(self.dim, tangent)?;
        let moved = point + tangent;
        let norm = moved.norm();
        if !<T as Float>::is_finite(norm) || norm < <T as Scalar>::EPSILON {
            return Err(ManifoldError::numerical_error(
                "retraction left the sphere neighbourhood",
            ));
        }
        Ok(moved / norm)
    }

    fn scale_tangent(
        &self,
        _point: &Self::Point,
        scalar: T,
        tangent: &Self::TangentVector,
    ) -> Result<Self::TangentVector> {
        Ok(tangent * scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_random_point_has_unit_norm() {
        let sphere = TestSphereManifold::new(6);
        let point: DVector<f64> = sphere.random_point().unwrap();
        assert_relative_eq!(point.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_retraction_stays_on_sphere() {
        let sphere = TestSphereManifold::new(3);
        let point = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        let tangent = sphere.project_tangent(&point, &DVector::from_vec(vec![0.3, 0.5, -0.2]));

        let moved: DVector<f64> = sphere.retract(&point, &tangent).unwrap();
        assert_relative_eq!(moved.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_euclidean_rejects_wrong_length() {
        let euclidean = TestEuclideanManifold::new(2);
        let point = DVector::from_vec(vec![0.0, 0.0]);
        let tangent = DVector::from_vec(vec![1.0, 1.0, 1.0]);

        let result: Result<DVector<f64>> = euclidean.retract(&point, &tangent);
        assert!(result.is_err());
    }
}
