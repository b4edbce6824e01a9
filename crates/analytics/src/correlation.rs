//! Correlation between factors, and between long-short returns and risk premia.

use std::collections::BTreeMap;

use factorlab_math::CorrelationMethod;
use factorlab_primitives::{DateSeries, Panel, RiskFactorMatrix};
use ndarray::{Array2, Axis};

/// Risk-premia columns correlated against long-short returns: the regressors plus the
/// risk-free rate.
pub const CORRELATION_COLUMNS: [&str; 7] = ["mktrf", "smb", "hml", "rmw", "cma", "umd", "rf"];

/// A labelled correlation matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Empty matrix.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Row labels.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column labels.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values (`rows x columns`).
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Whether the matrix has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at a labelled cell.
    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[[i, j]])
    }
}

/// Pairwise correlation between factors over their stacked `(date, entity)` observations.
///
/// Panels are projected onto the union grid; each pair is correlated over the cells
/// observed in both. Returns an empty matrix when nothing is observed.
#[must_use]
pub fn factor_correlation(scores: &BTreeMap<String, Panel>, method: CorrelationMethod) -> CorrelationMatrix {
    if scores.is_empty() {
        return CorrelationMatrix::empty();
    }
    let (dates, entities) = Panel::union_axes(scores.values());
    let stacked: Vec<Vec<f64>> = scores
        .values()
        .map(|p| p.reindex(&dates, &entities).values().iter().copied().collect())
        .collect();

    let any_observed = stacked.iter().any(|s| s.iter().any(|v| !v.is_nan()));
    if !any_observed {
        return CorrelationMatrix::empty();
    }

    let names: Vec<String> = scores.keys().cloned().collect();
    let k = names.len();
    let mut values = Array2::from_elem((k, k), f64::NAN);
    for a in 0..k {
        for b in a..k {
            let (x, y): (Vec<f64>, Vec<f64>) = stacked[a]
                .iter()
                .zip(&stacked[b])
                .filter(|(x, y)| !x.is_nan() && !y.is_nan())
                .map(|(x, y)| (*x, *y))
                .unzip();
            let c = method.correlate(&x, &y);
            values[[a, b]] = c;
            values[[b, a]] = c;
        }
    }
    CorrelationMatrix { rows: names.clone(), columns: names, values }
}

/// Correlation of each long-short series with each available risk premium.
///
/// Each series is inner-joined with the risk-factor dates and incomplete rows dropped.
/// Series without overlap are omitted.
#[must_use]
pub fn corr_with_ff(
    ls_returns: &BTreeMap<String, DateSeries>,
    risk_factors: &RiskFactorMatrix,
    method: CorrelationMethod,
) -> CorrelationMatrix {
    let columns = risk_factors.available(&CORRELATION_COLUMNS);
    if ls_returns.is_empty() || columns.is_empty() {
        return CorrelationMatrix::empty();
    }

    let mut rows = Vec::new();
    let mut cells: Vec<Vec<f64>> = Vec::new();
    for (name, series) in ls_returns {
        let aligned = risk_factors.align(series, &columns);
        if aligned.target.is_empty() {
            continue;
        }
        rows.push(name.clone());
        cells.push(
            aligned.factors.axis_iter(Axis(1)).map(|column| method.correlate(&aligned.target, &column.to_vec())).collect(),
        );
    }
    if rows.is_empty() {
        return CorrelationMatrix::empty();
    }

    let values = Array2::from_shape_fn((rows.len(), columns.len()), |(i, j)| cells[i][j]);
    CorrelationMatrix { rows, columns: columns.iter().map(|c| (*c).to_string()).collect(), values }
}
