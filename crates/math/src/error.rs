//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Invalid quantile limits.
    #[error("invalid quantile limits: ({0}, {1}) (must satisfy 0 <= lower < upper <= 1)")]
    InvalidLimits(f64, f64),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Unrecognized method name.
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}
