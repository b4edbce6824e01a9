//! Trailing-window kernels applied per entity column.

use ndarray::{Array2, ArrayView1, Axis};

/// Simple returns `x[t] / x[t-1] - 1`, missing on the first row.
pub(crate) fn pct_change(prices: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::from_elem(prices.dim(), f64::NAN);
    for t in 1..prices.nrows() {
        for j in 0..prices.ncols() {
            out[[t, j]] = prices[[t, j]] / prices[[t - 1, j]] - 1.0;
        }
    }
    out
}

/// Apply `f` to the observed values of each trailing window of `window` rows.
///
/// Leading rows use the partial window. Windows with fewer than `min_periods` observed values produce `NaN`.
pub(crate) fn rolling_apply(
    values: &Array2<f64>,
    window: usize,
    min_periods: usize,
    f: impl Fn(&[f64]) -> f64,
) -> Array2<f64> {
    let mut out = Array2::from_elem(values.dim(), f64::NAN);
    if window == 0 {
        return out;
    }
    for (j, column) in values.axis_iter(Axis(1)).enumerate() {
        for t in 0..column.len() {
            let observed = observed(column, (t + 1).saturating_sub(window), t + 1);
            if observed.len() >= min_periods.max(1) {
                out[[t, j]] = f(&observed);
            }
        }
    }
    out
}

fn observed(column: ArrayView1<'_, f64>, start: usize, end: usize) -> Vec<f64> {
    column.slice(ndarray::s![start..end]).iter().copied().filter(|x| !x.is_nan()).collect()
}

pub(crate) fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
