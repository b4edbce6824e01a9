//! Attribution of long-short returns to standard risk premia.

use factorlab_math::ols;
use factorlab_primitives::{DateSeries, RiskFactorMatrix};
use ndarray::{Array1, Array2, s};

/// Risk premia used as regressors, in column order.
pub const RISK_PREMIA: [&str; 6] = ["mktrf", "smb", "hml", "rmw", "cma", "umd"];

/// Coefficient on one risk premium.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorLoading {
    /// Risk premium name.
    pub factor: String,
    /// Coefficient.
    pub beta: f64,
    /// t-statistic.
    pub t_stat: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
}

/// OLS of a return series on risk premia, with an intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResult {
    /// Intercept.
    pub alpha: f64,
    /// t-statistic of the intercept.
    pub t_alpha: f64,
    /// p-value of the intercept.
    pub p_alpha: f64,
    /// One loading per available premium.
    pub loadings: Vec<FactorLoading>,
    /// Observations used.
    pub n_obs: usize,
    /// R-squared.
    pub r_squared: f64,
}

/// Regress `returns` on whichever of [`RISK_PREMIA`] exist in `risk_factors`.
///
/// Rows are aligned on common dates with incomplete rows dropped. Returns `None` only
/// when no premium is available or nothing survives alignment. A rank-deficient design
/// (fewer rows than regressors, a constant premium) is still fitted; loadings that cannot
/// be identified come back as zero with undefined t-statistics.
#[must_use]
pub fn regress_on_ff(returns: &DateSeries, risk_factors: &RiskFactorMatrix) -> Option<RegressionResult> {
    let columns = risk_factors.available(&RISK_PREMIA);
    if columns.is_empty() || returns.is_empty() || risk_factors.is_empty() {
        return None;
    }

    let aligned = risk_factors.align(returns, &columns);
    let n = aligned.target.len();
    if n == 0 {
        return None;
    }

    let mut design = Array2::ones((n, columns.len() + 1));
    design.slice_mut(s![.., 1..]).assign(&aligned.factors);
    let y = Array1::from(aligned.target);

    let fit = match ols(&y, &design) {
        Ok(fit) => fit,
        Err(err) => {
            tracing::warn!(%err, observations = n, "risk-premia regression skipped");
            return None;
        }
    };
    if !fit.full_rank {
        tracing::debug!(observations = n, regressors = columns.len() + 1, "rank-deficient risk-premia design");
    }

    let loadings = columns
        .iter()
        .enumerate()
        .map(|(i, name)| FactorLoading {
            factor: (*name).to_string(),
            beta: fit.coefficients[i + 1],
            t_stat: fit.t_stats[i + 1],
            p_value: fit.p_values[i + 1],
        })
        .collect();

    Some(RegressionResult {
        alpha: fit.coefficients[0],
        t_alpha: fit.t_stats[0],
        p_alpha: fit.p_values[0],
        loadings,
        n_obs: n,
        r_squared: fit.r_squared,
    })
}
