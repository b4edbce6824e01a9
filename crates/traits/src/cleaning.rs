//! Cross-sectional cleaning contract.

use derive_more::Display;
use factorlab_primitives::{Panel, PrimitivesError, SectorMap};
use serde::{Deserialize, Serialize};

/// Errors raised by a cleaning transform.
#[derive(Debug, thiserror::Error)]
pub enum CleaningError {
    /// Invalid cleaning parameter.
    #[error("invalid cleaning parameter: {0}")]
    InvalidParameter(String),

    /// Numerical failure.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Output violated a panel invariant.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

/// How gaps left in a cross-section are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// Leave gaps missing.
    #[display("none")]
    None,
    /// Fill with the cross-sectional median.
    #[default]
    #[display("median")]
    Median,
    /// Fill with zero.
    #[display("zero")]
    Zero,
}

/// How a cross-section is neutralized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeutralizeMethod {
    /// No neutralization.
    #[display("none")]
    None,
    /// Demean within each sector.
    #[default]
    #[display("sector")]
    Sector,
}

/// Parameters of the cleaning step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleaningConfig {
    /// Lower and upper winsorization quantiles.
    pub winsor_limits: (f64, f64),
    /// Minimum fraction of non-missing entities for a date to be kept.
    pub min_coverage: f64,
    /// Gap fill method.
    pub fill_method: FillMethod,
    /// Neutralization method.
    pub neutralize_method: NeutralizeMethod,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            winsor_limits: (0.01, 0.99),
            min_coverage: 0.3,
            fill_method: FillMethod::Median,
            neutralize_method: NeutralizeMethod::Sector,
        }
    }
}

/// A transform that turns a raw score panel into a cleaned one.
pub trait CleaningTransform: Send + Sync {
    /// Clean `raw`. `sectors` is `None` when no sector map is available.
    ///
    /// # Errors
    /// Returns `CleaningError` on invalid parameters.
    fn clean(
        &self,
        raw: &Panel,
        sectors: Option<&SectorMap>,
        config: &CleaningConfig,
    ) -> Result<Panel, CleaningError>;
}
