//! Trailing window statistics.

use crate::stats::{mean, sample_std};

fn rolling(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for end in window..=values.len() {
        let slice = &values[end - window..end];
        if slice.iter().all(|v| !v.is_nan()) {
            out[end - 1] = f(slice);
        }
    }
    out
}

/// Trailing mean over full windows; `NaN` until `window` values exist or when the
/// window contains a missing value.
#[must_use]
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, mean)
}

/// Trailing sample standard deviation over full windows.
#[must_use]
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, sample_std)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn rolling_mean_full_windows_only() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(out[0].is_nan());
        assert_relative_eq!(out[1], 1.5);
        assert_relative_eq!(out[3], 3.5);
    }

    #[test]
    fn rolling_std_window() {
        let out = rolling_std(&[1.0, 3.0, 5.0], 3);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 2.0);
    }

    #[test]
    fn window_longer_than_series() {
        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
    }
}
