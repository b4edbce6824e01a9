//! Coverage-normalized composite construction.

use std::collections::BTreeMap;

use factorlab_primitives::Panel;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::{CompositeError, WeightMap, WeightScheme, compute_weights};

/// Event-driven composite that is sparse by construction. After aggregation it is
/// forward filled and then zero filled so every cross-section is fully populated.
pub const SPARSE_EVENT_COMPOSITE: &str = "theta_info_forensic_drift";

/// Declarative description of a composite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeSpec {
    /// Constituent factor names.
    #[serde(default)]
    pub factors: Vec<String>,
    /// Per-constituent sign; constituents not listed use `+1`.
    #[serde(default)]
    pub sign: BTreeMap<String, f64>,
    /// Weighting scheme; `equal` when absent.
    #[serde(default)]
    pub weight_method: Option<WeightScheme>,
}

/// Build one composite from the constituents of `spec` that exist in `panels`.
///
/// Returns `None` when no constituent resolves.
///
/// # Errors
/// Returns an error only if the aggregated panel cannot be constructed.
pub fn build_composite(
    name: &str,
    spec: &CompositeSpec,
    panels: &BTreeMap<String, Panel>,
    ic_map: Option<&WeightMap>,
    ls_vol_map: Option<&WeightMap>,
) -> Result<Option<Panel>, CompositeError> {
    let present: Vec<String> = spec.factors.iter().filter(|f| panels.contains_key(*f)).cloned().collect();
    if present.is_empty() {
        return Ok(None);
    }
    let missing = spec.factors.len() - present.len();
    if missing > 0 {
        tracing::debug!(composite = name, missing, "some constituents unavailable");
    }

    let (dates, entities) = Panel::union_axes(present.iter().filter_map(|f| panels.get(f)));
    let scheme = spec.weight_method.unwrap_or_default();
    let weights = compute_weights(&present, panels, scheme, ic_map, ls_vol_map);

    let shape = (dates.len(), entities.len());
    let mut numerator = Array2::<f64>::zeros(shape);
    let mut denominator = Array2::<f64>::zeros(shape);
    for factor in &present {
        let Some(panel) = panels.get(factor) else { continue };
        let sign = spec.sign.get(factor).copied().unwrap_or(1.0);
        let weight = weights.get(factor).copied().unwrap_or(0.0);
        let aligned = panel.reindex(&dates, &entities);
        Zip::from(&mut numerator).and(&mut denominator).and(aligned.values()).for_each(|num, den, &v| {
            if !v.is_nan() {
                *num += v * sign * weight;
                *den += weight;
            }
        });
    }

    let values = Zip::from(&numerator)
        .and(&denominator)
        .map_collect(|&num, &den| if den != 0.0 { num / den } else { f64::NAN });
    let mut composite = Panel::new(dates, entities, values)?;

    if name == SPARSE_EVENT_COMPOSITE {
        composite = composite.forward_fill().fill_missing(0.0);
    }
    Ok(Some(composite))
}

/// Build every declared composite independently.
///
/// `override_method` replaces each spec's weighting scheme. Composites with no resolvable
/// constituents are omitted.
///
/// # Errors
/// Returns an error only if an aggregated panel cannot be constructed.
pub fn build_composites(
    specs: &BTreeMap<String, CompositeSpec>,
    panels: &BTreeMap<String, Panel>,
    ic_map: Option<&WeightMap>,
    ls_vol_map: Option<&WeightMap>,
    override_method: Option<WeightScheme>,
) -> Result<BTreeMap<String, Panel>, CompositeError> {
    let mut out = BTreeMap::new();
    for (name, spec) in specs {
        let spec = match override_method {
            Some(method) => CompositeSpec { weight_method: Some(method), ..spec.clone() },
            None => spec.clone(),
        };
        match build_composite(name, &spec, panels, ic_map, ls_vol_map)? {
            Some(panel) if !panel.is_empty() => {
                out.insert(name.clone(), panel);
            }
            _ => tracing::warn!(composite = %name, "no constituents available, composite omitted"),
        }
    }
    Ok(out)
}
