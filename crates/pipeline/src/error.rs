//! Error types for pipeline runs.

use factorlab_analytics::AnalyticsError;
use factorlab_composite::CompositeError;
use factorlab_config::ConfigError;
use factorlab_store::StoreError;
use factorlab_traits::{DataError, FactorError};

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input data could not be loaded.
    #[error(transparent)]
    Data(#[from] DataError),

    /// A factor failed to compute.
    #[error("factor {name} failed: {source}")]
    Factor {
        /// Factor name.
        name: String,
        /// Underlying error.
        source: FactorError,
    },

    /// Two configured factors share a name.
    #[error("duplicate factor name: {0}")]
    DuplicateFactor(String),

    /// Analytics configuration was rejected.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Composite construction failed.
    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// Artifacts could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PipelineError::Factor {
            name: "momentum_12_1".to_string(),
            source: FactorError::Computation { factor: "momentum_12_1".to_string(), reason: "boom".to_string() },
        };
        assert_eq!(err.to_string(), "factor momentum_12_1 failed: factor momentum_12_1 failed: boom");

        let err = PipelineError::DuplicateFactor("size".to_string());
        assert_eq!(err.to_string(), "duplicate factor name: size");
    }
}
