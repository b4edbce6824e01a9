//! Error types for composite construction.

use factorlab_primitives::PrimitivesError;

/// Errors that can occur while building composites.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    /// Weighting method name not recognized.
    #[error("unknown weight method: {0} (expected equal, inv_vol or ic_ir)")]
    UnknownWeightMethod(String),

    /// A panel invariant was violated.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
