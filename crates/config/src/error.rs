//! Configuration errors.

use std::path::PathBuf;

/// Errors raised while loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but cannot be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A setting is present but malformed.
    #[error("invalid value for {key} ({scope}): {reason}")]
    InvalidValue {
        /// Setting key.
        key: String,
        /// Where it was resolved from.
        scope: String,
        /// Description.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ConfigError::InvalidValue {
            key: "lag_days".to_string(),
            scope: "override momentum_12_1".to_string(),
            reason: "expected an unsigned integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for lag_days (override momentum_12_1): expected an unsigned integer"
        );
    }
}
