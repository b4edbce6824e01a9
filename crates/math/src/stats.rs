//! Point statistics over numeric slices.

/// Arithmetic mean, `NaN` when empty.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n - 1) standard deviation.
///
/// `NaN` for fewer than two values. A constant series returns exactly `0.0`.
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    if values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n as f64 - 1.0)).sqrt()
}

/// Mean over the non-`NaN` values, `NaN` when there are none.
#[must_use]
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Population (n) standard deviation over the non-`NaN` values.
#[must_use]
pub fn nan_std(values: impl IntoIterator<Item = f64>) -> f64 {
    let finite: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    let m = mean(&finite);
    (finite.iter().map(|v| (v - m).powi(2)).sum::<f64>() / finite.len() as f64).sqrt()
}

/// Median over the non-`NaN` values, `NaN` when there are none.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_by(f64::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 { (finite[mid - 1] + finite[mid]) / 2.0 } else { finite[mid] }
}
