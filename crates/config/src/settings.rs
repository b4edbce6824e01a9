//! Settings file and the layered factor-setting resolver.

use std::{collections::BTreeMap, path::Path};

use factorlab_composite::CompositeSpec;
use factorlab_math::CorrelationMethod;
use factorlab_traits::{CleaningConfig, FactorParams, FillMethod, NeutralizeMethod};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::ConfigError;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Pipeline-wide parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Dataset holding daily prices.
    pub price_dataset: String,
    /// Monotonicity buckets.
    pub buckets: usize,
    /// Run the long-short backtest.
    pub run_long_short: bool,
    /// Long leg percentile.
    pub top_pct: f64,
    /// Short leg percentile.
    pub bottom_pct: f64,
    /// Forward return horizon in rows.
    pub forward_horizon: usize,
    /// Rolling IC window.
    pub rolling_window: usize,
    /// Rolling IC sampling stride.
    pub rolling_step: usize,
    /// Minimum valid dates for a composite to be analyzed.
    pub min_composite_dates: usize,
    /// Correlation estimator for correlation matrices.
    pub correlation_method: CorrelationMethod,
    /// Compute factors concurrently.
    pub parallel: bool,
    /// Worker count; `None` uses the available parallelism.
    pub max_workers: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            price_dataset: "price_daily".to_string(),
            buckets: 10,
            run_long_short: true,
            top_pct: 0.1,
            bottom_pct: 0.1,
            forward_horizon: 1,
            rolling_window: 252,
            rolling_step: 21,
            min_composite_dates: 60,
            correlation_method: CorrelationMethod::Pearson,
            parallel: false,
            max_workers: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    factor_defaults: Map<String, Value>,
    #[serde(default)]
    factor_overrides: BTreeMap<String, Map<String, Value>>,
    #[serde(default)]
    composites: BTreeMap<String, CompositeSpec>,
    #[serde(default)]
    pipeline: PipelineSettings,
}

impl Settings {
    /// Load from `path`. A missing file yields default settings.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let settings = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            overrides = settings.factor_overrides.len(),
            composites = settings.composites.len(),
            "loaded config"
        );
        Ok(settings)
    }

    /// Parse from a JSON string.
    ///
    /// # Errors
    /// Returns `Parse` for malformed JSON or an unknown weighting method.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Declared composites.
    #[must_use]
    pub const fn composites(&self) -> &BTreeMap<String, CompositeSpec> {
        &self.composites
    }

    /// Pipeline parameters.
    #[must_use]
    pub const fn pipeline(&self) -> &PipelineSettings {
        &self.pipeline
    }

    /// Resolve one factor setting: override by `instance`, then override by
    /// `type_name`, then `factor_defaults`. `None` when no layer sets it.
    ///
    /// # Errors
    /// Returns `InvalidValue` if the resolved value does not deserialize as `T`.
    pub fn setting<T: DeserializeOwned>(
        &self,
        instance: &str,
        type_name: &str,
        key: &str,
    ) -> Result<Option<T>, ConfigError> {
        let layers = [
            (self.factor_overrides.get(instance), format!("override {instance}")),
            (self.factor_overrides.get(type_name), format!("override {type_name}")),
            (Some(&self.factor_defaults), "factor_defaults".to_string()),
        ];
        for (layer, scope) in layers {
            let Some(value) = layer.and_then(|m| m.get(key)) else { continue };
            return T::deserialize(value).map(Some).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                scope,
                reason: e.to_string(),
            });
        }
        Ok(None)
    }

    /// Resolve every factor parameter, falling back to built-in defaults.
    ///
    /// # Errors
    /// Returns `InvalidValue` for malformed or out-of-range values.
    pub fn factor_params(&self, instance: &str, type_name: &str) -> Result<FactorParams, ConfigError> {
        let builtin = FactorParams::default();
        let winsor_limits: (f64, f64) = self
            .setting(instance, type_name, "winsor_limits")?
            .unwrap_or(builtin.cleaning.winsor_limits);
        let min_coverage: f64 =
            self.setting(instance, type_name, "min_coverage")?.unwrap_or(builtin.cleaning.min_coverage);
        let fill_method: FillMethod =
            self.setting(instance, type_name, "fill_method")?.unwrap_or(builtin.cleaning.fill_method);
        let neutralize_method: NeutralizeMethod = self
            .setting(instance, type_name, "neutralize_method")?
            .unwrap_or(builtin.cleaning.neutralize_method);
        let forward_fill: bool =
            self.setting(instance, type_name, "forward_fill")?.unwrap_or(builtin.forward_fill);
        let lag_days: usize = self.setting(instance, type_name, "lag_days")?.unwrap_or(builtin.lag_days);

        let (lower, upper) = winsor_limits;
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            return Err(invalid(instance, "winsor_limits", "expected 0 <= lower < upper <= 1"));
        }
        if !(0.0..=1.0).contains(&min_coverage) {
            return Err(invalid(instance, "min_coverage", "expected a fraction in [0, 1]"));
        }

        Ok(FactorParams {
            lag_days,
            forward_fill,
            cleaning: CleaningConfig { winsor_limits, min_coverage, fill_method, neutralize_method },
        })
    }
}

fn invalid(instance: &str, key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        scope: format!("factor {instance}"),
        reason: reason.to_string(),
    }
}
