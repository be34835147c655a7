//! Error types for manifold operations and solver runs.
//!
//! Geometric operations and user cost functions report [`ManifoldError`].
//! The solver surfaces [`OptimizerError`], which classifies every failure
//! as an invalid manifold operation, an undefined cost or an invalid
//! configuration.

use thiserror::Error;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Dimension mismatch between operands.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Numerical failure, such as a division by a vanishing norm or an
    /// evaluation that could not be carried out.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl ManifoldError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Errors that abort a solver run.
///
/// None of these are retried: the iterate that produced them is discarded
/// together with any partially built log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// A geometric operation (movement, inner product, random point)
    /// rejected its inputs.
    #[error("Manifold operation failed: {0}")]
    InvalidManifoldOperation(#[from] ManifoldError),

    /// Cost or gradient evaluation failed, or produced a value that cannot
    /// drive the iteration (e.g. a non-finite gradient norm).
    #[error("Cost or gradient is undefined at iteration {iteration}: {reason}")]
    UndefinedCost {
        /// Iteration during which the evaluation failed (0 before the first
        /// iteration completes)
        iteration: usize,
        /// Description of the failure
        reason: String,
    },

    /// Invalid solver configuration.
    ///
    /// Raised before the first iteration, e.g. when no stopping threshold can
    /// ever be reached or a parameter is out of range.
    #[error("Invalid optimizer configuration: {reason} ({parameter} = {value})")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },
}

impl OptimizerError {
    /// Create an UndefinedCost error.
    pub fn undefined_cost<S: Into<String>>(iteration: usize, reason: S) -> Self {
        Self::UndefinedCost {
            iteration,
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Attaches the iteration in progress to an UndefinedCost error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn at_iteration(self, iteration: usize) -> Self {
        match self {
            Self::UndefinedCost { reason, .. } => Self::UndefinedCost { iteration, reason },
            other => other,
        }
    }

    /// Returns `true` for failures of cost or gradient evaluation.
    pub fn is_undefined_cost(&self) -> bool {
        matches!(self, Self::UndefinedCost { .. })
    }

    /// Returns `true` for failures of a geometric operation.
    pub fn is_manifold_error(&self) -> bool {
        matches!(self, Self::InvalidManifoldOperation(_))
    }

    /// Returns `true` for configuration errors detected before iterating.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

/// Result type alias for operations that can produce ManifoldError.
pub type Result<T> = std::result::Result<T, ManifoldError>;

/// Result type alias for solver operations.
pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;
