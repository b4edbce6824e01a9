//! The full analytics bundle for one score panel.

use factorlab_math::TRADING_DAYS_PER_YEAR;
use factorlab_primitives::{DateSeries, Panel, RiskFactorMatrix};

use crate::{
    AnalyticsError, LongShortDiagnostics, Monotonicity, SummaryRecord, autocorrelation,
    diagnostic_ls_backtest, information_coefficient, long_short::validate_split, monotonicity,
    summarize,
};

/// Parameters of [`compute_all_analytics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsConfig {
    /// Number of monotonicity buckets.
    pub buckets: usize,
    /// Run the long-short backtest.
    pub run_long_short: bool,
    /// Long leg percentile.
    pub top_pct: f64,
    /// Short leg percentile.
    pub bottom_pct: f64,
    /// Periods per year for Sharpe annualization.
    pub annualization: f64,
    /// Trailing observations for the last-year statistics.
    pub trailing_window: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            buckets: 10,
            run_long_short: true,
            top_pct: 0.1,
            bottom_pct: 0.1,
            annualization: TRADING_DAYS_PER_YEAR,
            trailing_window: 252,
        }
    }
}

impl AnalyticsConfig {
    /// Check the long-short split without computing anything.
    ///
    /// # Errors
    /// Returns `InvalidSplit` if the backtest is enabled and the percentiles are not
    /// positive or sum to one or more.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.run_long_short { validate_split(self.top_pct, self.bottom_pct) } else { Ok(()) }
    }
}

/// Everything computed for one factor or composite.
#[derive(Debug, Clone)]
pub struct AnalyticsBundle {
    /// Information coefficient per date.
    pub ic: DateSeries,
    /// Rank autocorrelation per date.
    pub autocorr: DateSeries,
    /// Decile spreads and per-bucket averages.
    pub monotonicity: Monotonicity,
    /// Scalar summary.
    pub summary: SummaryRecord,
    /// Long-short backtest, when enabled.
    pub long_short: Option<LongShortDiagnostics>,
}

impl AnalyticsBundle {
    /// Long-short return series, when the backtest ran.
    #[must_use]
    pub fn ls_returns(&self) -> Option<&DateSeries> {
        self.long_short.as_ref().map(|ls| &ls.returns)
    }
}

/// Compute IC, autocorrelation, monotonicity, the summary and, if enabled, the
/// long-short backtest with risk-premia regression.
///
/// # Errors
/// Returns `InvalidSplit` or `InvalidBuckets` for malformed configuration.
pub fn compute_all_analytics(
    name: &str,
    scores: &Panel,
    fwd_returns: &Panel,
    risk_factors: Option<&RiskFactorMatrix>,
    config: &AnalyticsConfig,
) -> Result<AnalyticsBundle, AnalyticsError> {
    let ic = information_coefficient(scores, fwd_returns)?;
    let autocorr = autocorrelation(scores)?;
    let monotonicity = monotonicity(scores, fwd_returns, config.buckets)?;
    let ic_summary =
        summarize(&ic, &autocorr, &monotonicity.spread, &monotonicity.avg_bucket_returns);

    let long_short = if config.run_long_short {
        Some(diagnostic_ls_backtest(
            scores,
            fwd_returns,
            config.top_pct,
            config.bottom_pct,
            config.annualization,
            config.trailing_window,
            risk_factors,
        )?)
    } else {
        None
    };

    let summary = SummaryRecord {
        name: name.to_string(),
        ic: ic_summary,
        long_short: long_short.as_ref().map(|ls| ls.stats),
        regression: long_short.as_ref().and_then(|ls| ls.regression.clone()),
    };
    tracing::debug!(
        factor = name,
        ic_dates = ic.len(),
        mean_ic = summary.ic.mean_ic,
        "computed analytics"
    );

    Ok(AnalyticsBundle { ic, autocorr, monotonicity, summary, long_short })
}
