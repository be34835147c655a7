//! Type definitions and aliases for stochastic Riemannian optimization.
//!
//! This module provides the scalar trait shared by every solver component,
//! the vector aliases used by the test manifolds and the default stopping
//! thresholds for each precision.

use nalgebra::{Dyn, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines all the numeric traits required by the solver loop,
/// the step-size rules and the stopping criteria.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default threshold on the gradient norm below which a solve stops.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Default threshold on the step size below which a solve stops.
    const MIN_STEP_SIZE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Convert from usize (for iteration counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-4;
    const MIN_STEP_SIZE: Self = 1e-7;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-6;
    const MIN_STEP_SIZE: Self = 1e-10;
}

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_trait_f32() {
        assert_eq!(<f32 as Scalar>::EPSILON, f32::EPSILON);
        assert!(<f32 as Scalar>::DEFAULT_GRADIENT_TOLERANCE > 0.0);
        assert!(<f32 as Scalar>::MIN_STEP_SIZE > 0.0);
    }

    #[test]
    fn test_scalar_trait_f64() {
        assert_eq!(<f64 as Scalar>::EPSILON, f64::EPSILON);
        assert_eq!(<f64 as Scalar>::DEFAULT_GRADIENT_TOLERANCE, 1e-6);
        assert_eq!(<f64 as Scalar>::MIN_STEP_SIZE, 1e-10);
    }

    #[test]
    fn test_scalar_conversions() {
        let val_f64 = 1.234_567;
        let val_f32 = <f32 as Scalar>::from_f64(val_f64);
        assert_relative_eq!(val_f32 as f64, val_f64, epsilon = 1e-6);

        let back_f64 = <f32 as Scalar>::to_f64(val_f32);
        assert_relative_eq!(back_f64, val_f32 as f64);

        assert_eq!(<f64 as Scalar>::from_usize(42), 42.0);
        assert!(<f64 as Scalar>::to_f64(f64::NAN).is_nan());
    }
}
