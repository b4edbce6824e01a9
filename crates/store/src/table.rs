//! Name-keyed metric tables.

use std::collections::HashMap;

use factorlab_traits::DataError;
use polars::prelude::*;

use crate::frames::{read_f64, read_strings};

/// A table of float metrics keyed by a name column.
///
/// Columns keep first-seen order. Upserting an existing key replaces its row and
/// moves it to the end, so every key appears exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    key_column: String,
    columns: Vec<String>,
    rows: Vec<(String, HashMap<String, f64>)>,
}

impl MetricTable {
    /// Empty table keyed by `key_column`.
    #[must_use]
    pub fn new(key_column: impl Into<String>) -> Self {
        Self { key_column: key_column.into(), columns: Vec::new(), rows: Vec::new() }
    }

    /// Name of the key column.
    #[must_use]
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Metric columns in first-seen order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Keys in row order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(k, _)| k.as_str())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A metric of a row, `None` if the row or the metric is absent.
    #[must_use]
    pub fn get(&self, key: &str, column: &str) -> Option<f64> {
        self.rows.iter().find(|(k, _)| k == key).and_then(|(_, m)| m.get(column).copied())
    }

    /// Insert or replace the row for `key`.
    pub fn upsert(&mut self, key: impl Into<String>, metrics: impl IntoIterator<Item = (String, f64)>) {
        let key = key.into();
        self.rows.retain(|(k, _)| *k != key);
        let mut row = HashMap::new();
        for (column, value) in metrics {
            if !self.columns.contains(&column) {
                self.columns.push(column.clone());
            }
            row.insert(column, value);
        }
        self.rows.push((key, row));
    }

    /// Upsert every row of `other`.
    pub fn merge(&mut self, other: Self) {
        for column in &other.columns {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        for (key, row) in other.rows {
            self.rows.retain(|(k, _)| *k != key);
            self.rows.push((key, row));
        }
    }

    /// Polars frame with the key column first; absent metrics are null.
    ///
    /// # Errors
    /// Returns a polars error if the frame cannot be built.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        let keys: Vec<String> = self.rows.iter().map(|(k, _)| k.clone()).collect();
        columns.push(Column::new(self.key_column.as_str().into(), keys));
        for name in &self.columns {
            let values: Vec<Option<f64>> = self.rows.iter().map(|(_, m)| m.get(name).copied()).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        DataFrame::new(columns)
    }

    /// Read a frame written by [`Self::to_frame`]. Null cells are left out of their row.
    ///
    /// # Errors
    /// Returns `MissingColumn` if the key column is absent, or a polars error if a
    /// metric column is not numeric.
    pub fn from_frame(df: &DataFrame, dataset: &str, key_column: &str) -> Result<Self, DataError> {
        let keys = read_strings(df, dataset, key_column)?;
        let mut table = Self::new(key_column);
        let mut metric_columns = Vec::new();
        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == key_column {
                continue;
            }
            let nulls: Vec<bool> = column.is_null().into_iter().map(|n| n.unwrap_or(true)).collect();
            let values = read_f64(df, dataset, name)?;
            metric_columns.push((name.to_string(), values, nulls));
        }

        for (i, key) in keys.into_iter().enumerate() {
            let Some(key) = key else { continue };
            let metrics = metric_columns
                .iter()
                .filter(|(_, _, nulls)| !nulls[i])
                .map(|(name, values, _)| (name.clone(), values[i]));
            table.upsert(key, metrics);
        }
        for (name, _, _) in metric_columns {
            if !table.columns.contains(&name) {
                table.columns.push(name);
            }
        }
        Ok(table)
    }
}
