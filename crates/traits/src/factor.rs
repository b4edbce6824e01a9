//! Factor contract and the shared compute template.

use std::fmt;

use factorlab_primitives::{Panel, PrimitivesError};

use crate::{CleaningConfig, CleaningError, CleaningTransform, DataAccess, DataError, NeutralizeMethod};

/// Errors raised while computing a factor.
#[derive(Debug, thiserror::Error)]
pub enum FactorError {
    /// Input data could not be loaded.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Cleaning failed.
    #[error("cleaning error: {0}")]
    Cleaning(#[from] CleaningError),

    /// A panel invariant was violated.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// The factor formula itself failed.
    #[error("factor {factor} failed: {reason}")]
    Computation {
        /// Factor name.
        factor: String,
        /// Description.
        reason: String,
    },
}

/// Resolved per-factor parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorParams {
    /// Rows to lag scores by so a date only reflects information known before it.
    pub lag_days: usize,
    /// Forward fill scores along the date axis before cleaning.
    pub forward_fill: bool,
    /// Cleaning parameters.
    pub cleaning: CleaningConfig,
}

impl Default for FactorParams {
    fn default() -> Self {
        Self { lag_days: 1, forward_fill: false, cleaning: CleaningConfig::default() }
    }
}

/// A factor: a deterministic transform of input data into a `date x entity` score panel.
pub trait Factor: Send + Sync + fmt::Debug {
    /// Instance name, unique within a run.
    fn name(&self) -> &str;

    /// Type name, shared by every instance of the same formula.
    fn type_name(&self) -> &str;

    /// Compute raw scores.
    ///
    /// # Errors
    /// Returns `FactorError` if data cannot be loaded or the formula fails.
    fn compute_raw(&self, data: &dyn DataAccess) -> Result<Panel, FactorError>;

    /// Post-process raw scores, applying at least the `lag_days` shift.
    ///
    /// # Errors
    /// Returns `FactorError` if post-processing fails.
    fn post_process(&self, raw: Panel, params: &FactorParams) -> Result<Panel, FactorError>;
}

/// Compute a cleaned factor panel: raw, post-process, optional forward fill, clean.
///
/// The sector map is only loaded when sector neutralization is requested. When it is
/// unavailable the cleaner runs without it.
///
/// # Errors
/// Returns `FactorError` if any step fails.
pub fn compute_factor(
    factor: &dyn Factor,
    data: &dyn DataAccess,
    params: &FactorParams,
    cleaner: &dyn CleaningTransform,
) -> Result<Panel, FactorError> {
    let raw = factor.compute_raw(data)?;
    let mut processed = factor.post_process(raw, params)?;
    if params.forward_fill {
        processed = processed.forward_fill();
    }

    let sectors = match params.cleaning.neutralize_method {
        NeutralizeMethod::Sector => {
            let sectors = data.load_sector_map()?;
            if sectors.is_none() {
                tracing::warn!(factor = factor.name(), "sector map unavailable, skipping neutralization");
            }
            sectors
        }
        NeutralizeMethod::None => None,
    };

    let cleaned = cleaner.clean(&processed, sectors.as_ref(), &params.cleaning)?;
    tracing::debug!(
        factor = factor.name(),
        dates = cleaned.n_dates(),
        entities = cleaned.n_entities(),
        "computed factor"
    );
    Ok(cleaned)
}
