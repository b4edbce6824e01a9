//! Price momentum skipping the most recent month.

use factorlab_primitives::Panel;
use factorlab_traits::{DataAccess, Factor, FactorError, FactorParams};
use ndarray::Array2;

use crate::PRICE_DATASET;

/// Configuration for the momentum factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumConfig {
    /// Look-back period in trading days.
    pub lookback: usize,
    /// Most recent days excluded, to avoid short-term reversal.
    pub skip: usize,
    /// Price dataset.
    pub dataset: String,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 252, // ~12 months
            skip: 21,      // ~1 month
            dataset: PRICE_DATASET.to_string(),
        }
    }
}

/// 12-1 momentum: return from `lookback` days ago to `skip` days ago.
#[derive(Debug, Clone)]
pub struct MomentumFactor {
    name: String,
    config: MomentumConfig,
}

impl MomentumFactor {
    /// Create a momentum factor with the given configuration.
    #[must_use]
    pub fn with_config(config: MomentumConfig) -> Self {
        let name = if config.lookback == 252 && config.skip == 21 {
            "momentum_12_1".to_string()
        } else {
            format!("momentum_{}_{}d", config.lookback, config.skip)
        };
        Self { name, config }
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &MomentumConfig {
        &self.config
    }
}

impl Default for MomentumFactor {
    fn default() -> Self {
        Self::with_config(MomentumConfig::default())
    }
}

impl Factor for MomentumFactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        "Momentum"
    }

    fn compute_raw(&self, data: &dyn DataAccess) -> Result<Panel, FactorError> {
        let MomentumConfig { lookback, skip, ref dataset } = self.config;
        if skip >= lookback {
            return Err(FactorError::Computation {
                factor: self.name.clone(),
                reason: format!("skip ({skip}) must be shorter than lookback ({lookback})"),
            });
        }
        let prices = data.load_price_wide(dataset)?;
        let close = prices.values();
        let mut raw = Array2::from_elem(close.dim(), f64::NAN);
        for t in lookback..close.nrows() {
            for j in 0..close.ncols() {
                raw[[t, j]] = close[[t - skip, j]] / close[[t - lookback, j]] - 1.0;
            }
        }
        Ok(prices.with_values(raw)?)
    }

    fn post_process(&self, raw: Panel, params: &FactorParams) -> Result<Panel, FactorError> {
        Ok(raw.shift(params.lag_days))
    }
}
