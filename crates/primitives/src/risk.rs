//! Risk-factor return matrices.

use std::collections::HashSet;

use ndarray::Array2;

use crate::{Date, DateSeries, PrimitivesError};

/// Date-indexed returns of a small set of named risk premia (market, size, value, ...)
/// plus, optionally, the risk-free rate.
///
/// Column names are normalized to lower case.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskFactorMatrix {
    dates: Vec<Date>,
    columns: Vec<String>,
    values: Array2<f64>,
}

/// Rows of a target series and a subset of risk-factor columns, aligned on common
/// dates with every row fully observed.
#[derive(Debug, Clone)]
pub struct AlignedRows {
    /// Common dates.
    pub dates: Vec<Date>,
    /// Target values (n,).
    pub target: Vec<f64>,
    /// Selected risk-factor values (n x k).
    pub factors: Array2<f64>,
}

impl RiskFactorMatrix {
    /// Create a risk-factor matrix.
    ///
    /// # Errors
    /// Returns an error on shape mismatch, unordered dates or duplicate columns.
    pub fn new(
        dates: Vec<Date>,
        columns: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, PrimitivesError> {
        let expected = (dates.len(), columns.len());
        if values.dim() != expected {
            return Err(PrimitivesError::ShapeMismatch { expected, actual: values.dim() });
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PrimitivesError::UnorderedDates(pair[1]));
        }
        let columns: Vec<String> = columns.into_iter().map(|c| c.to_lowercase()).collect();
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(PrimitivesError::DuplicateColumn(c.clone()));
            }
        }
        Ok(Self { dates, columns, values })
    }

    /// Dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Lower-cased column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values (`n_dates x n_columns`).
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Whether there are no rows or no columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    /// Position of a column (case-insensitive).
    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.columns.iter().position(|c| *c == name)
    }

    /// Names from `wanted` that exist in this matrix, in `wanted` order.
    #[must_use]
    pub fn available<'a>(&self, wanted: &[&'a str]) -> Vec<&'a str> {
        wanted.iter().copied().filter(|w| self.column_position(w).is_some()).collect()
    }

    /// Inner-join `series` with the named columns on date and drop every row that has a
    /// missing value in the target or any selected column.
    #[must_use]
    pub fn align(&self, series: &DateSeries, columns: &[&str]) -> AlignedRows {
        let positions: Vec<usize> = columns.iter().filter_map(|c| self.column_position(c)).collect();
        let mut dates = Vec::new();
        let mut target = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();

        for (date, y) in series.iter() {
            let Ok(i) = self.dates.binary_search(&date) else { continue };
            if !y.is_finite() {
                continue;
            }
            let row: Vec<f64> = positions.iter().map(|&j| self.values[[i, j]]).collect();
            if row.iter().any(|v| !v.is_finite()) {
                continue;
            }
            dates.push(date);
            target.push(y);
            rows.push(row);
        }

        let factors = Array2::from_shape_fn((rows.len(), positions.len()), |(i, j)| rows[i][j]);
        AlignedRows { dates, target, factors }
    }
}
