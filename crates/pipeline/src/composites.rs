//! Composite construction, analysis and weighting-scheme selection.

use std::collections::BTreeMap;

use factorlab_analytics::{
    AnalyticsBundle, CorrelationMatrix, SummaryRecord, compute_all_analytics, corr_with_ff,
    factor_correlation,
};
use factorlab_composite::{
    WeightMap, WeightScheme, build_composites, ic_ir_map, ls_vol_map, select_best_weights,
};
use factorlab_primitives::{DateSeries, Panel};
use factorlab_store::{COMPOSITE_SUMMARY, FACTOR_SUMMARY, MetricTable};
use tracing::{info, warn};

use crate::{FactorRun, Orchestrator, PipelineError, analytics_config};

const COMPOSITE_CORRELATION: &str = "composite_correlation";
const COMPOSITE_RISK_CORRELATION: &str = "composite_ff_correlation";

/// Per-constituent inputs of the non-equal weighting schemes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightInputs {
    /// IC information ratio per factor.
    pub ic_ir: WeightMap,
    /// Long-short return volatility per factor.
    pub ls_vol: WeightMap,
}

impl WeightInputs {
    /// Inputs taken from freshly computed analytics.
    #[must_use]
    pub fn from_bundles(bundles: &BTreeMap<String, AnalyticsBundle>) -> Self {
        Self {
            ic_ir: ic_ir_map(bundles.values().map(|b| &b.summary)),
            ls_vol: ls_vol_map(bundles.values().map(|b| &b.summary)),
        }
    }

    /// Inputs taken from a persisted summary registry.
    #[must_use]
    pub fn from_registry(table: &MetricTable) -> Self {
        let column = |metric: &str| -> WeightMap {
            table.keys().filter_map(|k| table.get(k, metric).map(|v| (k.to_string(), v))).collect()
        };
        Self { ic_ir: column("ic_ir"), ls_vol: column("ls_return_std") }
    }
}

/// Output of one composite pass.
#[derive(Debug, Clone)]
pub struct CompositeRun {
    /// Every composite that could be built.
    pub composites: BTreeMap<String, Panel>,
    /// Analytics of composites with enough valid dates.
    pub analytics: BTreeMap<String, AnalyticsBundle>,
    /// Composites skipped for too few valid dates.
    pub skipped: Vec<String>,
    /// Composite-vs-composite correlation.
    pub correlation: CorrelationMatrix,
    /// Composite long-short vs risk-premia correlation, when risk-factor data exists.
    pub risk_correlation: Option<CorrelationMatrix>,
}

impl CompositeRun {
    /// Summary per analyzed composite.
    #[must_use]
    pub fn summaries(&self) -> BTreeMap<String, SummaryRecord> {
        self.analytics.iter().map(|(name, b)| (name.clone(), b.summary.clone())).collect()
    }
}

/// One composite pass per weighting scheme and the winner per composite.
#[derive(Debug, Clone)]
pub struct WeightSelection {
    /// Composite pass per scheme.
    pub runs: BTreeMap<WeightScheme, CompositeRun>,
    /// Best scheme per composite.
    pub best: BTreeMap<String, WeightScheme>,
}

impl Orchestrator {
    /// Weighting inputs from the persisted factor summary registry.
    ///
    /// # Errors
    /// Returns an error if the registry exists but cannot be read.
    pub fn registry_weight_inputs(&self) -> Result<WeightInputs, PipelineError> {
        Ok(WeightInputs::from_registry(&self.registry.load(FACTOR_SUMMARY, "factor")?))
    }

    /// Build the configured composites, analyze every composite with at least
    /// `min_composite_dates` valid dates, and persist them like raw factors.
    ///
    /// `override_method` replaces each composite's configured weighting scheme.
    ///
    /// # Errors
    /// Returns an error for malformed analytics settings or a failed write.
    pub fn run_composites(
        &self,
        run: &FactorRun,
        inputs: &WeightInputs,
        override_method: Option<WeightScheme>,
    ) -> Result<CompositeRun, PipelineError> {
        let pipeline = self.settings.pipeline();
        let config = analytics_config(pipeline);
        let composites = build_composites(
            self.settings.composites(),
            &run.factors,
            Some(&inputs.ic_ir),
            Some(&inputs.ls_vol),
            override_method,
        )?;

        let mut analytics = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut ls_returns: BTreeMap<String, DateSeries> = BTreeMap::new();
        for (name, scores) in &composites {
            let valid_dates = scores.valid_dates();
            if valid_dates < pipeline.min_composite_dates {
                warn!(
                    composite = %name,
                    valid_dates,
                    min = pipeline.min_composite_dates,
                    "too few valid dates, composite analytics skipped"
                );
                skipped.push(name.clone());
                continue;
            }
            let bundle =
                compute_all_analytics(name, scores, &run.fwd_returns, run.risk_factors.as_ref(), &config)?;
            self.store.save_factor(name, scores)?;
            if let Some(ls) = bundle.ls_returns().filter(|ls| !ls.is_empty()) {
                self.store.save_ls_returns(name, ls)?;
                ls_returns.insert(name.clone(), ls.clone());
            }
            analytics.insert(name.clone(), bundle);
        }

        if !analytics.is_empty() {
            self.registry.merge(
                COMPOSITE_SUMMARY,
                "factor",
                analytics.iter().map(|(name, b)| (name.clone(), b.summary.metrics())),
            )?;
        }

        let method = pipeline.correlation_method;
        let correlation = factor_correlation(&composites, method);
        if !correlation.is_empty() {
            self.store.save_correlation(COMPOSITE_CORRELATION, &correlation)?;
        }
        let risk_correlation = match &run.risk_factors {
            Some(risk) if !ls_returns.is_empty() => {
                let matrix = corr_with_ff(&ls_returns, risk, method);
                if !matrix.is_empty() {
                    self.store.save_correlation(COMPOSITE_RISK_CORRELATION, &matrix)?;
                }
                Some(matrix)
            }
            _ => None,
        };

        info!(
            built = composites.len(),
            analyzed = analytics.len(),
            skipped = skipped.len(),
            scheme = ?override_method,
            "composite pass complete"
        );
        Ok(CompositeRun { composites, analytics, skipped, correlation, risk_correlation })
    }

    /// Run the composite pass once per scheme and pick, per composite, the scheme with
    /// the highest `criterion` metric.
    ///
    /// Each pass overwrites the composite artifacts, so the files on disk belong to the
    /// last scheme in `schemes`.
    ///
    /// # Errors
    /// Returns the first composite pass error.
    pub fn select_weights(
        &self,
        run: &FactorRun,
        inputs: &WeightInputs,
        schemes: &[WeightScheme],
        criterion: &str,
    ) -> Result<WeightSelection, PipelineError> {
        let mut runs = BTreeMap::new();
        for scheme in schemes {
            runs.insert(*scheme, self.run_composites(run, inputs, Some(*scheme))?);
        }
        let summaries: BTreeMap<WeightScheme, BTreeMap<String, SummaryRecord>> =
            runs.iter().map(|(scheme, r)| (*scheme, r.summaries())).collect();
        let best = select_best_weights(&summaries, criterion);
        for (composite, scheme) in &best {
            info!(%composite, %scheme, criterion, "selected weighting scheme");
        }
        Ok(WeightSelection { runs, best })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use factorlab_config::Settings;
    use factorlab_store::ArtifactStore;

    use super::*;
    use crate::testing::{Level, MemorySource, Reversal, risk_factors, scratch, synthetic_prices};

    fn orchestrator(name: &str, min_dates: usize) -> Orchestrator {
        let json = format!(
            r#"{{
                "factor_defaults": {{ "neutralize_method": "none" }},
                "composites": {{
                    "blend": {{ "factors": ["level", "reversal"], "sign": {{ "reversal": -1 }} }},
                    "ghost": {{ "factors": ["not_computed"] }}
                }},
                "pipeline": {{ "buckets": 4, "min_composite_dates": {min_dates} }}
            }}"#
        );
        let settings = Settings::from_json(&json).unwrap();
        let source = MemorySource::new(synthetic_prices(40, 12)).with_risk(risk_factors(40));
        Orchestrator::new(Arc::new(settings), Arc::new(source), ArtifactStore::new(scratch(name)))
            .with_factors(vec![Box::new(Level), Box::new(Reversal)])
    }

    #[test]
    fn composites_analyzed_and_persisted() {
        let orch = orchestrator("composites", 10);
        let run = orch.compute_factors().unwrap();
        let bundles = orch.run_analytics(&run).unwrap();
        let inputs = WeightInputs::from_bundles(&bundles);
        let pass = orch.run_composites(&run, &inputs, None).unwrap();

        assert_eq!(pass.composites.keys().collect::<Vec<_>>(), vec!["blend"]);
        assert!(pass.analytics.contains_key("blend"));
        assert!(orch.store().exists("factor_blend"));
        assert!(orch.store().exists("ls_blend"));
        assert!(orch.store().exists("composite_correlation"));
        assert!(orch.store().exists("composite_ff_correlation"));

        let table = orch.registry.load(COMPOSITE_SUMMARY, "factor").unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("blend", "mean_ic").is_some());
    }

    #[test]
    fn sparse_composites_skipped() {
        let orch = orchestrator("composites-sparse", 1_000);
        let run = orch.compute_factors().unwrap();
        let pass = orch.run_composites(&run, &WeightInputs::default(), None).unwrap();

        assert_eq!(pass.skipped, vec!["blend".to_string()]);
        assert!(pass.analytics.is_empty());
        assert!(!orch.store().exists("factor_blend"));
        assert!(orch.registry.load(COMPOSITE_SUMMARY, "factor").unwrap().is_empty());
    }

    #[test]
    fn best_scheme_selected_per_composite() {
        let orch = orchestrator("composites-select", 10);
        let run = orch.compute_factors().unwrap();
        orch.run_analytics(&run).unwrap();
        let inputs = orch.registry_weight_inputs().unwrap();
        assert_eq!(inputs.ic_ir.len(), 2);
        assert_eq!(inputs.ls_vol.len(), 2);

        let selection = orch.select_weights(&run, &inputs, &WeightScheme::ALL, "mean_ic").unwrap();
        assert_eq!(selection.runs.len(), 3);
        let best = selection.best["blend"];
        let best_ic = selection.runs[&best].analytics["blend"].summary.ic.mean_ic;
        for pass in selection.runs.values() {
            assert!(pass.analytics["blend"].summary.ic.mean_ic <= best_ic);
        }

        // three passes, one registry row
        assert_eq!(orch.registry.load(COMPOSITE_SUMMARY, "factor").unwrap().len(), 1);
    }

    #[test]
    fn registry_inputs_skip_missing_metrics() {
        let mut table = MetricTable::new("factor");
        table.upsert("a", vec![("ic_ir".to_string(), 0.4)]);
        table.upsert("b", vec![("ic_ir".to_string(), 0.1), ("ls_return_std".to_string(), 0.02)]);
        let inputs = WeightInputs::from_registry(&table);
        assert_eq!(inputs.ic_ir.len(), 2);
        assert_eq!(inputs.ls_vol.get("b"), Some(&0.02));
        assert!(!inputs.ls_vol.contains_key("a"));
    }
}
