//! Error types for primitive construction.

use crate::Date;

/// Errors raised when a panel or series violates its structural invariants.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// Value matrix does not match the axis lengths.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected (rows, cols).
        expected: (usize, usize),
        /// Actual (rows, cols).
        actual: (usize, usize),
    },

    /// Dates are not strictly increasing.
    #[error("dates must be strictly increasing (offending date: {0})")]
    UnorderedDates(Date),

    /// The same entity appears twice on the column axis.
    #[error("duplicate entity: {0}")]
    DuplicateEntity(String),

    /// The same column name appears twice.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// The same (date, entity) pair was supplied twice.
    #[error("duplicate observation for {entity} on {date}")]
    DuplicateObservation {
        /// Date of the observation.
        date: Date,
        /// Entity of the observation.
        entity: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PrimitivesError::ShapeMismatch { expected: (2, 3), actual: (3, 2) };
        assert!(err.to_string().contains("(2, 3)"));

        let date = Date::from_ymd_opt(2024, 1, 2).unwrap();
        let err = PrimitivesError::DuplicateObservation { date, entity: "AAPL".to_string() };
        assert!(err.to_string().contains("AAPL") && err.to_string().contains("2024-01-02"));
    }
}
