//! Time-series summaries of per-date analytics.

use factorlab_math::{mean, sample_std};
use factorlab_primitives::DateSeries;

use crate::{LongShortStats, RegressionResult};

/// Number of trailing IC observations averaged into the recent-IC metric.
pub const RECENT_IC_WINDOW: usize = 60;

/// Scalar aggregates of the IC, autocorrelation and monotonicity series.
#[derive(Debug, Clone, PartialEq)]
pub struct IcSummary {
    /// Mean IC.
    pub mean_ic: f64,
    /// t-statistic of the mean IC.
    pub ic_tstat: f64,
    /// Mean IC over its sample standard deviation.
    pub ic_ir: f64,
    /// Fraction of dates with positive IC.
    pub ic_hit_rate: f64,
    /// Mean of the most recent [`RECENT_IC_WINDOW`] IC values.
    pub recent_ic_mean: f64,
    /// Mean rank autocorrelation.
    pub mean_autocorr: f64,
    /// Mean decile spread.
    pub avg_decile_spread: f64,
    /// Average forward return per bucket.
    pub avg_decile: Vec<f64>,
}

/// Aggregate per-date series into an [`IcSummary`].
///
/// Every statistic is `NaN` when its inputs are too short or its denominator is zero
/// or undefined.
#[must_use]
pub fn summarize(
    ic: &DateSeries,
    autocorr: &DateSeries,
    decile_spread: &DateSeries,
    avg_decile: &[f64],
) -> IcSummary {
    let values = ic.values();
    let n = values.len();
    let mean_ic = mean(values);
    let ic_std = sample_std(values);
    let has_dispersion = n > 1 && ic_std > 0.0;

    let ic_tstat =
        if has_dispersion { mean_ic / (ic_std / (n as f64).sqrt()) } else { f64::NAN };
    let ic_ir = if has_dispersion { mean_ic / ic_std } else { f64::NAN };
    let ic_hit_rate = if n == 0 {
        f64::NAN
    } else {
        values.iter().filter(|v| **v > 0.0).count() as f64 / n as f64
    };

    IcSummary {
        mean_ic,
        ic_tstat,
        ic_ir,
        ic_hit_rate,
        recent_ic_mean: mean(ic.tail(RECENT_IC_WINDOW).values()),
        mean_autocorr: mean(autocorr.values()),
        avg_decile_spread: mean(decile_spread.values()),
        avg_decile: avg_decile.to_vec(),
    }
}

/// One registry row: every scalar metric of a factor or composite.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    /// Factor or composite name.
    pub name: String,
    /// IC and monotonicity aggregates.
    pub ic: IcSummary,
    /// Long-short statistics, when the backtest ran.
    pub long_short: Option<LongShortStats>,
    /// Risk-premia regression, when risk factors were available.
    pub regression: Option<RegressionResult>,
}

impl SummaryRecord {
    /// Flatten into `(column, value)` pairs in registry column order.
    #[must_use]
    pub fn metrics(&self) -> Vec<(String, f64)> {
        let ic = &self.ic;
        let mut out = vec![
            ("mean_ic".to_string(), ic.mean_ic),
            ("ic_tstat".to_string(), ic.ic_tstat),
            ("ic_ir".to_string(), ic.ic_ir),
            ("ic_hit_rate".to_string(), ic.ic_hit_rate),
            (format!("recent_ic_mean_{RECENT_IC_WINDOW}d"), ic.recent_ic_mean),
            ("mean_autocorr".to_string(), ic.mean_autocorr),
            ("avg_decile_spread".to_string(), ic.avg_decile_spread),
        ];
        out.extend(ic.avg_decile.iter().enumerate().map(|(i, v)| (format!("avg_decile_{i}"), *v)));

        if let Some(ls) = &self.long_short {
            out.extend([
                ("ls_return_mean".to_string(), ls.mean),
                ("ls_return_std".to_string(), ls.std),
                ("ls_sharpe".to_string(), ls.sharpe),
                ("ls_max_drawdown".to_string(), ls.max_drawdown),
                ("ls_sharpe_last_yr".to_string(), ls.sharpe_last_yr),
                ("ls_max_drawdown_last_yr".to_string(), ls.max_drawdown_last_yr),
            ]);
        }

        if let Some(reg) = &self.regression {
            out.extend([
                ("ff_alpha".to_string(), reg.alpha),
                ("ff_t_alpha".to_string(), reg.t_alpha),
                ("ff_p_alpha".to_string(), reg.p_alpha),
            ]);
            for loading in &reg.loadings {
                out.push((format!("ff_beta_{}", loading.factor), loading.beta));
                out.push((format!("ff_t_{}", loading.factor), loading.t_stat));
                out.push((format!("ff_p_{}", loading.factor), loading.p_value));
            }
        }
        out
    }

    /// Look up one metric by column name.
    #[must_use]
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}
