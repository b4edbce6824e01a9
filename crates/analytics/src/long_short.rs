//! Top-minus-bottom percentile long-short portfolios.

use factorlab_math::{max_drawdown, mean, quantile_sorted, sample_std, sharpe_ratio};
use factorlab_primitives::{DateSeries, Panel, RiskFactorMatrix};

use crate::{AnalyticsError, RegressionResult, cross_section::paired, regress_on_ff};

pub(crate) fn validate_split(top_pct: f64, bottom_pct: f64) -> Result<(), AnalyticsError> {
    let malformed = top_pct.is_nan()
        || bottom_pct.is_nan()
        || top_pct <= 0.0
        || bottom_pct <= 0.0
        || top_pct + bottom_pct >= 1.0;
    if malformed {
        return Err(AnalyticsError::InvalidSplit { top: top_pct, bottom: bottom_pct });
    }
    Ok(())
}

/// Equal-weighted long-short returns: mean forward return of entities scoring at or
/// above the `1 - top_pct` quantile minus that of entities at or below the `bottom_pct`
/// quantile.
///
/// Dates where either side is empty are skipped.
///
/// # Errors
/// Returns `InvalidSplit` unless both percentiles are positive and sum to less than one.
pub fn long_short_returns(
    scores: &Panel,
    fwd_returns: &Panel,
    top_pct: f64,
    bottom_pct: f64,
) -> Result<DateSeries, AnalyticsError> {
    validate_split(top_pct, bottom_pct)?;

    let columns = scores.common_entities(fwd_returns);
    let mut out = Vec::new();
    for (date, i, k) in scores.common_dates(fwd_returns) {
        let (x, y) = paired(scores.row(i), fwd_returns.row(k), &columns);
        if x.is_empty() {
            continue;
        }
        let mut sorted = x.clone();
        sorted.sort_by(f64::total_cmp);
        let long_cut = quantile_sorted(&sorted, 1.0 - top_pct);
        let short_cut = quantile_sorted(&sorted, bottom_pct);

        let (mut long_sum, mut long_n, mut short_sum, mut short_n) = (0.0, 0usize, 0.0, 0usize);
        for (score, ret) in x.iter().zip(&y) {
            if *score >= long_cut {
                long_sum += ret;
                long_n += 1;
            }
            if *score <= short_cut {
                short_sum += ret;
                short_n += 1;
            }
        }
        if long_n == 0 || short_n == 0 {
            continue;
        }
        out.push((date, long_sum / long_n as f64 - short_sum / short_n as f64));
    }
    Ok(DateSeries::from_pairs(out)?)
}

/// Scalar statistics of a long-short return series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongShortStats {
    /// Mean return.
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    /// Annualized Sharpe ratio.
    pub sharpe: f64,
    /// Maximum drawdown.
    pub max_drawdown: f64,
    /// Sharpe ratio over the trailing window.
    pub sharpe_last_yr: f64,
    /// Maximum drawdown over the trailing window.
    pub max_drawdown_last_yr: f64,
}

impl LongShortStats {
    /// Compute statistics for `returns`, with the trailing window of `trailing` points.
    #[must_use]
    pub fn from_returns(returns: &DateSeries, annualization: f64, trailing: usize) -> Self {
        let finite = returns.finite();
        let recent = finite.tail(trailing);
        Self {
            mean: mean(finite.values()),
            std: sample_std(finite.values()),
            sharpe: sharpe_ratio(finite.values(), annualization),
            max_drawdown: max_drawdown(finite.values()),
            sharpe_last_yr: sharpe_ratio(recent.values(), annualization),
            max_drawdown_last_yr: max_drawdown(recent.values()),
        }
    }
}

/// Output of [`diagnostic_ls_backtest`].
#[derive(Debug, Clone, PartialEq)]
pub struct LongShortDiagnostics {
    /// Long-short return series.
    pub returns: DateSeries,
    /// Summary statistics.
    pub stats: LongShortStats,
    /// Regression on risk premia, when risk factors were supplied and usable.
    pub regression: Option<RegressionResult>,
}

/// Long-short backtest with statistics and optional risk-premia regression.
///
/// # Errors
/// Returns `InvalidSplit` for a malformed percentile split.
pub fn diagnostic_ls_backtest(
    scores: &Panel,
    fwd_returns: &Panel,
    top_pct: f64,
    bottom_pct: f64,
    annualization: f64,
    trailing: usize,
    risk_factors: Option<&RiskFactorMatrix>,
) -> Result<LongShortDiagnostics, AnalyticsError> {
    let returns = long_short_returns(scores, fwd_returns, top_pct, bottom_pct)?;
    let stats = LongShortStats::from_returns(&returns, annualization, trailing);
    let regression = risk_factors.and_then(|rf| regress_on_ff(&returns, rf));
    Ok(LongShortDiagnostics { returns, stats, regression })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use factorlab_math::TRADING_DAYS_PER_YEAR;
    use ndarray::{Array2, array};
    use rstest::rstest;

    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
    }

    fn entities(n: usize) -> Vec<String> {
        (0..n).map(|j| format!("E{j:02}")).collect()
    }

    #[rstest]
    #[case(0.5, 0.5)]
    #[case(0.0, 0.1)]
    #[case(0.1, -0.1)]
    #[case(0.6, 0.5)]
    #[case(f64::NAN, 0.1)]
    fn malformed_split_is_an_error(#[case] top: f64, #[case] bottom: f64) {
        let p = Panel::empty();
        assert!(matches!(
            long_short_returns(&p, &p, top, bottom),
            Err(AnalyticsError::InvalidSplit { .. })
        ));
    }

    #[test]
    fn top_minus_bottom() {
        let scores = Panel::new(dates(1), entities(10), Array2::from_shape_fn((1, 10), |(_, j)| j as f64)).unwrap();
        let fwd = scores.map(|v| v / 100.0);
        let ls = long_short_returns(&scores, &fwd, 0.2, 0.2).unwrap();

        // cutpoints at 7.2 and 1.8: long {8, 9}, short {0, 1}
        assert_eq!(ls.len(), 1);
        assert_relative_eq!(ls.values()[0], 0.085 - 0.005, epsilon = 1e-12);
    }

    #[test]
    fn empty_dates_skipped() {
        let scores = Panel::new(dates(2), entities(3), array![[f64::NAN, f64::NAN, f64::NAN], [1.0, 2.0, 3.0]]).unwrap();
        let fwd = Panel::new(dates(2), entities(3), array![[0.1, 0.2, 0.3], [0.1, 0.2, 0.3]]).unwrap();
        let ls = long_short_returns(&scores, &fwd, 0.1, 0.1).unwrap();
        assert_eq!(ls.dates(), &dates(2)[1..]);
        assert_relative_eq!(ls.values()[0], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn diagnostics_without_risk_factors() {
        let n = 10;
        let scores = Panel::new(dates(30), entities(n), Array2::from_shape_fn((30, n), |(_, j)| j as f64)).unwrap();
        let fwd = Panel::new(
            dates(30),
            entities(n),
            Array2::from_shape_fn((30, n), |(i, j)| j as f64 / 1000.0 + if i % 2 == 0 { 0.001 } else { -0.001 } * j as f64),
        )
        .unwrap();
        let diag = diagnostic_ls_backtest(&scores, &fwd, 0.1, 0.1, TRADING_DAYS_PER_YEAR, 252, None).unwrap();

        assert_eq!(diag.returns.len(), 30);
        assert!(diag.stats.mean > 0.0);
        assert!(diag.stats.std > 0.0);
        assert!(diag.stats.sharpe.is_finite());
        assert_relative_eq!(diag.stats.sharpe, diag.stats.sharpe_last_yr, epsilon = 1e-12);
        assert!(diag.regression.is_none());
    }

    #[test]
    fn stats_of_empty_series_are_undefined() {
        let stats = LongShortStats::from_returns(&DateSeries::empty(), TRADING_DAYS_PER_YEAR, 252);
        assert!(stats.mean.is_nan());
        assert!(stats.std.is_nan());
        assert!(stats.sharpe.is_nan());
        assert!(stats.max_drawdown.is_nan());
    }
}
