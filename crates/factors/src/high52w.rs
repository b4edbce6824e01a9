//! Proximity to the trailing 52-week high.

use factorlab_primitives::Panel;
use factorlab_traits::{DataAccess, Factor, FactorError, FactorParams};

use crate::{PRICE_DATASET, window};

/// Configuration for the 52-week-high proximity factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct High52wProximityConfig {
    /// Rolling window in trading days.
    pub window: usize,
    /// Price dataset.
    pub dataset: String,
}

impl Default for High52wProximityConfig {
    fn default() -> Self {
        Self { window: 252, dataset: PRICE_DATASET.to_string() }
    }
}

/// `close / rolling_max(close) - 1`; zero at a new high, negative below it.
///
/// The rolling max needs at least half a window of observed prices.
#[derive(Debug, Clone, Default)]
pub struct High52wProximityFactor {
    config: High52wProximityConfig,
}

impl High52wProximityFactor {
    /// Create the factor with the given configuration.
    #[must_use]
    pub const fn with_config(config: High52wProximityConfig) -> Self {
        Self { config }
    }
}

impl Factor for High52wProximityFactor {
    fn name(&self) -> &str {
        "high52w_proximity"
    }

    fn type_name(&self) -> &str {
        "High52wProximity"
    }

    fn compute_raw(&self, data: &dyn DataAccess) -> Result<Panel, FactorError> {
        let prices = data.load_price_wide(&self.config.dataset)?;
        let window = self.config.window;
        let rolling_max = window::rolling_apply(prices.values(), window, window / 2, window::max);
        let proximity = prices.values() / &rolling_max - 1.0;
        Ok(prices.with_values(proximity)?)
    }

    fn post_process(&self, raw: Panel, params: &FactorParams) -> Result<Panel, FactorError> {
        Ok(raw.shift(params.lag_days))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::testing::Prices;

    #[test]
    fn proximity_relative_to_running_high() {
        let data = Prices::from_fns(6, &[|i| [10.0, 12.0, 11.0, 9.0, 13.0, 6.5][i]]);
        let factor = High52wProximityFactor::with_config(High52wProximityConfig {
            window: 4,
            ..Default::default()
        });
        let raw = factor.compute_raw(&data).unwrap();
        let v = raw.values();

        // fewer than window / 2 observations
        assert!(v[[0, 0]].is_nan());
        assert_relative_eq!(v[[1, 0]], 0.0);
        assert_relative_eq!(v[[3, 0]], 9.0 / 12.0 - 1.0);
        assert_relative_eq!(v[[4, 0]], 0.0);
        assert_relative_eq!(v[[5, 0]], -0.5);
        assert!(v.iter().filter(|x| x.is_finite()).all(|x| *x <= 0.0));
    }
}
