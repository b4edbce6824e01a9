//! Data access contracts.

use factorlab_primitives::{Panel, PrimitivesError, RiskFactorMatrix, SectorMap};
use polars::prelude::*;

/// Errors raised by data access.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Requested dataset does not exist.
    #[error("dataset not found: {0}")]
    MissingDataset(String),

    /// A required column is absent from a dataset.
    #[error("dataset {dataset} is missing required column: {column}")]
    MissingColumn {
        /// Dataset name.
        dataset: String,
        /// Column name.
        column: String,
    },

    /// Dataset contents are structurally invalid.
    #[error("invalid dataset {dataset}: {reason}")]
    Invalid {
        /// Dataset name.
        dataset: String,
        /// Description.
        reason: String,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Pivoted data violated a panel invariant.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

/// A handle for reading input data.
///
/// Handles are not shared between concurrent units of work; each one opens its own
/// through a [`DataSource`].
pub trait DataAccess: Send {
    /// Long-format records of a named dataset.
    ///
    /// # Errors
    /// Returns `DataError` if the dataset cannot be read.
    fn load_long(&self, dataset: &str) -> Result<DataFrame, DataError>;

    /// Wide `date x entity` price panel of a named dataset.
    ///
    /// # Errors
    /// Returns `DataError` if the dataset cannot be read or lacks required columns.
    fn load_price_wide(&self, dataset: &str) -> Result<Panel, DataError>;

    /// Risk-factor returns, or `None` when unavailable.
    ///
    /// # Errors
    /// Returns `DataError` if the data exists but cannot be read.
    fn load_risk_factors(&self) -> Result<Option<RiskFactorMatrix>, DataError>;

    /// Entity-to-sector mapping, or `None` when unavailable.
    ///
    /// # Errors
    /// Returns `DataError` if the data exists but cannot be read.
    fn load_sector_map(&self) -> Result<Option<SectorMap>, DataError>;
}

/// Factory of independent [`DataAccess`] handles.
pub trait DataSource: Send + Sync {
    /// Open a new handle.
    ///
    /// # Errors
    /// Returns `DataError` if the underlying store cannot be opened.
    fn open(&self) -> Result<Box<dyn DataAccess>, DataError>;
}
