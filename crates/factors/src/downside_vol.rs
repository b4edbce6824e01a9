//! Downside volatility.

use factorlab_math::sample_std;
use factorlab_primitives::Panel;
use factorlab_traits::{DataAccess, Factor, FactorError, FactorParams};

use crate::{PRICE_DATASET, window};

/// Configuration for the downside volatility factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownsideVolConfig {
    /// Rolling window in trading days.
    pub window: usize,
    /// Minimum observed returns per window.
    pub min_periods: usize,
    /// Price dataset.
    pub dataset: String,
}

impl DownsideVolConfig {
    /// Configuration for a window, with the default `max(20, window / 2)` minimum.
    #[must_use]
    pub fn with_window(window: usize) -> Self {
        Self { window, min_periods: (window / 2).max(20), dataset: PRICE_DATASET.to_string() }
    }
}

impl Default for DownsideVolConfig {
    fn default() -> Self {
        Self::with_window(60)
    }
}

/// Rolling sample standard deviation of daily returns with gains set to zero.
#[derive(Debug, Clone)]
pub struct DownsideVolFactor {
    name: String,
    config: DownsideVolConfig,
}

impl DownsideVolFactor {
    /// Create the factor with the given configuration.
    #[must_use]
    pub fn with_config(config: DownsideVolConfig) -> Self {
        Self { name: format!("downside_vol_{}d", config.window), config }
    }
}

impl Default for DownsideVolFactor {
    fn default() -> Self {
        Self::with_config(DownsideVolConfig::default())
    }
}

impl Factor for DownsideVolFactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        "DownsideVol"
    }

    fn compute_raw(&self, data: &dyn DataAccess) -> Result<Panel, FactorError> {
        let prices = data.load_price_wide(&self.config.dataset)?;
        // missing returns stay missing
        let losses = window::pct_change(prices.values()).mapv(|r| if r > 0.0 { 0.0 } else { r });
        let vol = window::rolling_apply(&losses, self.config.window, self.config.min_periods, sample_std);
        Ok(prices.with_values(vol)?)
    }

    fn post_process(&self, raw: Panel, params: &FactorParams) -> Result<Panel, FactorError> {
        Ok(raw.shift(params.lag_days))
    }
}
