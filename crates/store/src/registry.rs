//! Cumulative metric registries.

use tracing::info;

use crate::{ArtifactStore, MetricTable, StoreError};

/// Registry of per-factor analytics summaries, keyed by `factor`.
pub const FACTOR_SUMMARY: &str = "factor_analytics_summary";

/// Registry of per-step diagnostics, keyed by `name`.
pub const STEP_DIAGNOSTICS: &str = "factor_step_diagnostics";

/// Registry of composite analytics summaries, keyed by `factor`.
pub const COMPOSITE_SUMMARY: &str = "composite_analytics_summary";

/// Sole writer of the cumulative registries under an artifact store.
///
/// Every update reads the persisted table, replaces rows by key and writes the result
/// back, so repeated runs never duplicate a name.
#[derive(Debug, Clone)]
pub struct Registry {
    store: ArtifactStore,
}

impl Registry {
    /// Registry over `store`.
    pub const fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    /// Load a registry, or an empty table if it has never been written.
    ///
    /// # Errors
    /// Returns an error if the persisted table cannot be read.
    pub fn load(&self, stem: &str, key_column: &str) -> Result<MetricTable, StoreError> {
        if !self.store.exists(stem) {
            return Ok(MetricTable::new(key_column));
        }
        let df = self.store.read_frame(stem)?;
        Ok(MetricTable::from_frame(&df, stem, key_column)?)
    }

    /// Merge rows into a registry and persist it.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read or written.
    pub fn merge<I, M>(&self, stem: &str, key_column: &str, rows: I) -> Result<MetricTable, StoreError>
    where
        I: IntoIterator<Item = (String, M)>,
        M: IntoIterator<Item = (String, f64)>,
    {
        let mut table = self.load(stem, key_column)?;
        let mut merged = 0;
        for (key, metrics) in rows {
            table.upsert(key, metrics);
            merged += 1;
        }
        self.store.write_frame(stem, &mut table.to_frame()?)?;
        info!(registry = stem, merged, total = table.len(), "updated registry");
        Ok(table)
    }
}
