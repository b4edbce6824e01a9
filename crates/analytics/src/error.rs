//! Error types for factor analytics.

use factorlab_math::MathError;
use factorlab_primitives::PrimitivesError;

/// Errors that can occur during analytics.
///
/// Insufficient data is never an error: it surfaces as `NaN` metrics or dropped dates.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Long-short percentiles must be positive and sum to less than one.
    #[error("invalid long-short split: top {top}, bottom {bottom} (each must be > 0, sum < 1)")]
    InvalidSplit {
        /// Top percentile.
        top: f64,
        /// Bottom percentile.
        bottom: f64,
    },

    /// Bucket count must be positive.
    #[error("bucket count must be positive")]
    InvalidBuckets,

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// A series or panel invariant was violated.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
