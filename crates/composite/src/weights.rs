//! Weighting schemes.

use std::{collections::BTreeMap, str::FromStr};

use derive_more::Display;
use factorlab_analytics::SummaryRecord;
use factorlab_math::nan_std;
use factorlab_primitives::Panel;
use serde::{Deserialize, Serialize};

use crate::CompositeError;

/// Factor name to weight.
pub type WeightMap = BTreeMap<String, f64>;

/// How constituents of a composite are weighted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum WeightScheme {
    /// Uniform weights.
    #[default]
    #[display("equal")]
    Equal,
    /// Inverse volatility.
    #[display("inv_vol")]
    InverseVolatility,
    /// Proportional to the IC information ratio.
    #[display("ic_ir")]
    IcIrProportional,
}

impl WeightScheme {
    /// Every scheme, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Equal, Self::InverseVolatility, Self::IcIrProportional];
}

impl FromStr for WeightScheme {
    type Err = CompositeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "inv_vol" | "inverse_volatility" => Ok(Self::InverseVolatility),
            "ic_ir" | "ic_ir_proportional" => Ok(Self::IcIrProportional),
            other => Err(CompositeError::UnknownWeightMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for WeightScheme {
    type Error = CompositeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeightScheme> for String {
    fn from(value: WeightScheme) -> Self {
        value.to_string()
    }
}

/// Compute normalized weights for `names` under `scheme`.
///
/// Constituents whose volatility or IC/IR is unusable are dropped; if none remain the
/// scheme falls back to equal weights. Weights are divided by their absolute sum, and a
/// zero sum falls back to uniform weights.
#[must_use]
pub fn compute_weights(
    names: &[String],
    panels: &BTreeMap<String, Panel>,
    scheme: WeightScheme,
    ic_map: Option<&WeightMap>,
    ls_vol_map: Option<&WeightMap>,
) -> WeightMap {
    if names.is_empty() {
        return WeightMap::new();
    }

    let mut weights = WeightMap::new();
    match scheme {
        WeightScheme::Equal => {}
        WeightScheme::InverseVolatility => {
            for name in names {
                // a supplied long-short vol is used as is, even when undefined
                let vol = ls_vol_map
                    .and_then(|m| m.get(name).copied())
                    .or_else(|| panels.get(name).map(|p| nan_std(p.values().iter().copied())));
                if let Some(vol) = vol.filter(|v| v.is_finite() && *v > 0.0) {
                    weights.insert(name.clone(), 1.0 / vol);
                }
            }
        }
        WeightScheme::IcIrProportional => {
            for name in names {
                if let Some(ir) = ic_map.and_then(|m| m.get(name).copied()).filter(|v| v.is_finite()) {
                    weights.insert(name.clone(), ir);
                }
            }
        }
    }

    if weights.is_empty() {
        if scheme != WeightScheme::Equal {
            tracing::debug!(%scheme, "no usable inputs, falling back to equal weights");
        }
        weights = names.iter().map(|n| (n.clone(), 1.0)).collect();
    }

    let total: f64 = weights.values().map(|w| w.abs()).sum();
    if total == 0.0 {
        let uniform = 1.0 / weights.len() as f64;
        return weights.into_keys().map(|k| (k, uniform)).collect();
    }
    weights.into_iter().map(|(k, v)| (k, v / total)).collect()
}

/// IC information ratio per summary.
#[must_use]
pub fn ic_ir_map<'a>(summaries: impl IntoIterator<Item = &'a SummaryRecord>) -> WeightMap {
    summaries.into_iter().map(|s| (s.name.clone(), s.ic.ic_ir)).collect()
}

/// Long-short return volatility per summary, for summaries with a backtest.
#[must_use]
pub fn ls_vol_map<'a>(summaries: impl IntoIterator<Item = &'a SummaryRecord>) -> WeightMap {
    summaries
        .into_iter()
        .filter_map(|s| s.long_short.as_ref().map(|ls| (s.name.clone(), ls.std)))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| (*s).to_string()).collect()
    }

    fn panel(values: ndarray::Array2<f64>) -> Panel {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.nrows()).map(|i| d + chrono::Days::new(i as u64)).collect();
        let entities = (0..values.ncols()).map(|j| format!("E{j}")).collect();
        Panel::new(dates, entities, values).unwrap()
    }

    #[test]
    fn equal_weights_sum_to_one() {
        let w = compute_weights(&names(&["a", "b", "c"]), &BTreeMap::new(), WeightScheme::Equal, None, None);
        assert_eq!(w.len(), 3);
        for v in w.values() {
            assert_relative_eq!(*v, 1.0 / 3.0, epsilon = 1e-12);
        }
        assert_relative_eq!(w.values().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ic_ir_drops_undefined_constituent() {
        let ic: WeightMap = [("a".to_string(), 0.6), ("b".to_string(), f64::NAN), ("c".to_string(), -0.2)]
            .into_iter()
            .collect();
        let w = compute_weights(&names(&["a", "b", "c"]), &BTreeMap::new(), WeightScheme::IcIrProportional, Some(&ic), None);
        assert!(!w.contains_key("b"));
        assert_relative_eq!(w["a"], 0.75, epsilon = 1e-12);
        assert_relative_eq!(w["c"], -0.25, epsilon = 1e-12);
    }

    #[test]
    fn ic_ir_all_undefined_falls_back_to_uniform() {
        let ic: WeightMap = [("a".to_string(), f64::NAN)].into_iter().collect();
        let w = compute_weights(&names(&["a", "b"]), &BTreeMap::new(), WeightScheme::IcIrProportional, Some(&ic), None);
        assert_relative_eq!(w["a"], 0.5);
        assert_relative_eq!(w["b"], 0.5);
    }

    #[test]
    fn inverse_volatility_prefers_long_short_vol() {
        let mut panels = BTreeMap::new();
        panels.insert("a".to_string(), panel(array![[0.0, 2.0], [0.0, 2.0]]));
        panels.insert("b".to_string(), panel(array![[0.0, 4.0], [0.0, 4.0]]));
        let vols: WeightMap = [("a".to_string(), 0.01)].into_iter().collect();

        // a: ls vol 0.01 -> 100; b: score std 2.0 -> 0.5
        let w = compute_weights(&names(&["a", "b"]), &panels, WeightScheme::InverseVolatility, None, Some(&vols));
        assert_relative_eq!(w["a"], 100.0 / 100.5, epsilon = 1e-12);
        assert_relative_eq!(w["b"], 0.5 / 100.5, epsilon = 1e-12);
    }

    #[test]
    fn inverse_volatility_drops_undefined_long_short_vol() {
        let mut panels = BTreeMap::new();
        panels.insert("a".to_string(), panel(array![[0.0, 2.0], [0.0, 2.0]]));
        panels.insert("b".to_string(), panel(array![[0.0, 4.0], [0.0, 4.0]]));
        let vols: WeightMap = [("a".to_string(), f64::NAN)].into_iter().collect();

        let w = compute_weights(&names(&["a", "b"]), &panels, WeightScheme::InverseVolatility, None, Some(&vols));
        assert_eq!(w.len(), 1);
        assert_relative_eq!(w["b"], 1.0);
    }

    #[test]
    fn inverse_volatility_drops_flat_constituent() {
        let mut panels = BTreeMap::new();
        panels.insert("flat".to_string(), panel(array![[1.0, 1.0]]));
        panels.insert("b".to_string(), panel(array![[0.0, 4.0]]));
        let w = compute_weights(&names(&["flat", "b"]), &panels, WeightScheme::InverseVolatility, None, None);
        assert_eq!(w.len(), 1);
        assert_relative_eq!(w["b"], 1.0);
    }

    #[test]
    fn zero_total_falls_back_to_uniform() {
        let ic: WeightMap = [("a".to_string(), 0.0), ("b".to_string(), 0.0)].into_iter().collect();
        let w = compute_weights(&names(&["a", "b"]), &BTreeMap::new(), WeightScheme::IcIrProportional, Some(&ic), None);
        assert_relative_eq!(w["a"], 0.5);
    }

    #[rstest]
    #[case("equal", WeightScheme::Equal)]
    #[case("inv_vol", WeightScheme::InverseVolatility)]
    #[case("IC_IR", WeightScheme::IcIrProportional)]
    #[case("inverse_volatility", WeightScheme::InverseVolatility)]
    fn scheme_parses(#[case] text: &str, #[case] expected: WeightScheme) {
        assert_eq!(text.parse::<WeightScheme>().unwrap(), expected);
    }

    #[test]
    fn unknown_scheme_rejected() {
        assert!(matches!("risk_parity".parse::<WeightScheme>(), Err(CompositeError::UnknownWeightMethod(_))));
        assert!(serde_json::from_str::<WeightScheme>("\"risk_parity\"").is_err());
        assert_eq!(serde_json::to_string(&WeightScheme::InverseVolatility).unwrap(), "\"inv_vol\"");
    }
}
