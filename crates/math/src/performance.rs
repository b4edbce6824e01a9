//! Return-series performance measures.

use crate::stats::{mean, sample_std};

/// Trading days per year, the default annualization factor.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized Sharpe ratio `sqrt(annualization) * mean / std` of a return series.
///
/// Missing values are dropped first. `NaN` when nothing remains or the sample standard
/// deviation is zero or undefined.
#[must_use]
pub fn sharpe_ratio(returns: &[f64], annualization: f64) -> f64 {
    let r: Vec<f64> = returns.iter().copied().filter(|v| !v.is_nan()).collect();
    if r.is_empty() {
        return f64::NAN;
    }
    let vol = sample_std(&r);
    if vol.is_nan() || vol == 0.0 {
        return f64::NAN;
    }
    annualization.sqrt() * mean(&r) / vol
}

/// Most negative peak-to-trough decline of the compounded value `prod(1 + r)`.
///
/// Missing values are dropped first; `NaN` when nothing remains.
#[must_use]
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = f64::NAN;
    for r in returns.iter().filter(|v| !v.is_nan()) {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        let dd = cumulative / peak - 1.0;
        worst = if worst.is_nan() { dd } else { worst.min(dd) };
    }
    worst
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn sharpe_of_constant_series_is_undefined() {
        assert!(sharpe_ratio(&[0.01; 50], TRADING_DAYS_PER_YEAR).is_nan());
    }

    #[test]
    fn sharpe_of_empty_series_is_undefined() {
        assert!(sharpe_ratio(&[], TRADING_DAYS_PER_YEAR).is_nan());
        assert!(sharpe_ratio(&[f64::NAN, f64::NAN], TRADING_DAYS_PER_YEAR).is_nan());
        assert!(sharpe_ratio(&[0.02], TRADING_DAYS_PER_YEAR).is_nan());
    }

    #[test]
    fn sharpe_known_value() {
        let r = [0.01, -0.01, 0.02, 0.0];
        let expected = 252f64.sqrt() * 0.005 / sample_std(&r);
        assert_relative_eq!(sharpe_ratio(&r, 252.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_of_rising_series_is_zero() {
        assert_relative_eq!(max_drawdown(&[0.01, 0.02, 0.005, 0.03]), 0.0);
    }

    #[test]
    fn drawdown_known_decline() {
        // 1.0 -> 1.1 -> 0.88 -> 0.924: a 20% decline from the 1.1 peak
        assert_relative_eq!(max_drawdown(&[0.1, -0.2, 0.05]), -0.20, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_empty_is_undefined() {
        assert!(max_drawdown(&[]).is_nan());
    }
}
