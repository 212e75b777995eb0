// src/optimization/error.rs

use thiserror::Error;

/// Failures reported by the box-constrained solver.
///
/// The first five variants are validity errors detected before any objective
/// evaluation. [`OptimizationError::NotConverged`] and
/// [`OptimizationError::InnerSolver`] are terminal for the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizationError {
    #[error("no initial guess defined")]
    NoInitialGuess,

    #[error("lower bounds size does not match the problem: expected {expected}, got {actual}")]
    LowerBoundCount { expected: usize, actual: usize },

    #[error("upper bounds size does not match the problem: expected {expected}, got {actual}")]
    UpperBoundCount { expected: usize, actual: usize },

    #[error("incompatible bounds at coordinate {index}: lower {lower} >= upper {upper}")]
    IncompatibleBounds { index: usize, lower: f64, upper: f64 },

    #[error("initial guess out of the domain at coordinate {index}: {value} not in [{lower}, {upper}]")]
    InitialGuessOutOfDomain {
        index: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("optimization failed to converge in {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("inner simplex search failed: {message}")]
    InnerSolver { message: String },
}

impl OptimizationError {
    /// True for errors raised while validating the problem definition.
    pub fn is_validity_error(&self) -> bool {
        !matches!(self, Self::NotConverged { .. } | Self::InnerSolver { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = OptimizationError::NotConverged { iterations: 4 };
        assert_eq!(err.to_string(), "optimization failed to converge in 4 iterations");
        assert!(!err.is_validity_error());

        let err = OptimizationError::IncompatibleBounds {
            index: 1,
            lower: 2.0,
            upper: 1.0,
        };
        assert!(err.to_string().contains("coordinate 1"));
        assert!(err.is_validity_error());
    }
}
