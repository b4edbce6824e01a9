//! Error types for persistence.

use std::path::PathBuf;

use factorlab_primitives::PrimitivesError;
use factorlab_traits::DataError;
use polars::prelude::PolarsError;

/// Errors raised while reading or writing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Artifact does not exist.
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A stored frame does not have the expected layout.
    #[error(transparent)]
    Data(#[from] DataError),

    /// A panel or series invariant was violated.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
