//! Stages 1-4 of a factor research run.

use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    sync::Arc,
};

use factorlab_analytics::{
    AnalyticsBundle, AnalyticsConfig, CorrelationMatrix, RollingIcRow, compute_all_analytics,
    corr_with_ff, factor_correlation, information_coefficient, long_short_returns, rolling_ic,
};
use factorlab_config::{PipelineSettings, Settings};
use factorlab_primitives::{DateSeries, Panel, RiskFactorMatrix};
use factorlab_store::{ArtifactStore, FACTOR_SUMMARY, Registry, STEP_DIAGNOSTICS};
use factorlab_traits::{CleaningTransform, DataSource, Factor, FactorParams, compute_factor};
use factorlab_utils::StandardCleaner;
use tracing::{debug, info, warn};

use crate::{PipelineError, WorkerPool, step_diagnostics};

/// Artifact holding the factor-vs-factor correlation matrix.
const FACTOR_CORRELATION: &str = "factor_correlation";
/// Artifact holding the long-short-vs-risk-premia correlation matrix.
const FACTOR_RISK_CORRELATION: &str = "factor_ff_correlation";

/// Analytics parameters taken from the pipeline settings.
#[must_use]
pub fn analytics_config(pipeline: &PipelineSettings) -> AnalyticsConfig {
    AnalyticsConfig {
        buckets: pipeline.buckets,
        run_long_short: pipeline.run_long_short,
        top_pct: pipeline.top_pct,
        bottom_pct: pipeline.bottom_pct,
        ..AnalyticsConfig::default()
    }
}

/// Output of stage 1, the input of every later stage.
#[derive(Debug, Clone)]
pub struct FactorRun {
    /// Cleaned score panel per factor.
    pub factors: BTreeMap<String, Panel>,
    /// Long-short returns per factor, for factors that produced any.
    pub ls_returns: BTreeMap<String, DateSeries>,
    /// Forward returns the factors are evaluated against.
    pub fwd_returns: Panel,
    /// Risk-factor returns, when available.
    pub risk_factors: Option<RiskFactorMatrix>,
}

/// Output of stage 3.
#[derive(Debug, Clone)]
pub struct Correlations {
    /// Factor-vs-factor correlation.
    pub factors: CorrelationMatrix,
    /// Long-short-vs-risk-premia correlation; `None` without risk-factor data or
    /// long-short returns.
    pub risk: Option<CorrelationMatrix>,
}

/// Everything produced by [`Orchestrator::run_all`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Stage 1.
    pub run: FactorRun,
    /// Stage 2.
    pub analytics: BTreeMap<String, AnalyticsBundle>,
    /// Stage 3.
    pub correlations: Correlations,
    /// Stage 4.
    pub rolling: Vec<RollingIcRow>,
}

/// Coordinates factor computation, analytics and persistence.
///
/// Tasks on the worker pool only compute. Every write to the artifact store and the
/// registries happens afterwards on the calling thread.
pub struct Orchestrator {
    pub(crate) settings: Arc<Settings>,
    source: Arc<dyn DataSource>,
    cleaner: Arc<dyn CleaningTransform>,
    factors: Vec<Box<dyn Factor>>,
    pub(crate) store: ArtifactStore,
    pub(crate) registry: Registry,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("factors", &self.factor_names())
            .field("store", &self.store)
            .field("pipeline", self.settings.pipeline())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator over the default factor set and the standard cleaner.
    pub fn new(settings: Arc<Settings>, source: Arc<dyn DataSource>, store: ArtifactStore) -> Self {
        Self {
            settings,
            source,
            cleaner: Arc::new(StandardCleaner::new()),
            factors: factorlab_factors::default_factors(),
            registry: Registry::new(store.clone()),
            store,
        }
    }

    /// Replace the factor set.
    #[must_use]
    pub fn with_factors(mut self, factors: Vec<Box<dyn Factor>>) -> Self {
        self.factors = factors;
        self
    }

    /// Replace the cleaning transform.
    #[must_use]
    pub fn with_cleaner(mut self, cleaner: Arc<dyn CleaningTransform>) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Names of the configured factors.
    #[must_use]
    pub fn factor_names(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.name()).collect()
    }

    /// Artifact store.
    #[must_use]
    pub const fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn pool(&self) -> Result<WorkerPool, PipelineError> {
        let pipeline = self.settings.pipeline();
        WorkerPool::from_settings(pipeline.parallel, pipeline.max_workers)
    }

    fn factor_jobs(&self) -> Result<Vec<(&dyn Factor, FactorParams)>, PipelineError> {
        let mut seen = HashSet::new();
        self.factors
            .iter()
            .map(|factor| {
                if !seen.insert(factor.name()) {
                    return Err(PipelineError::DuplicateFactor(factor.name().to_string()));
                }
                let params = self.settings.factor_params(factor.name(), factor.type_name())?;
                Ok((factor.as_ref(), params))
            })
            .collect()
    }

    /// Forward returns and risk-factor data for the configured price dataset.
    fn load_market(&self) -> Result<(Panel, Option<RiskFactorMatrix>), PipelineError> {
        let pipeline = self.settings.pipeline();
        let data = self.source.open()?;
        let risk_factors = data.load_risk_factors()?;
        if risk_factors.is_none() {
            warn!("risk-factor data unavailable, regression and attribution disabled");
        }
        let prices = data.load_price_wide(&pipeline.price_dataset)?;
        Ok((prices.forward_returns(pipeline.forward_horizon), risk_factors))
    }

    /// Stage 1: compute and clean every factor, then persist factor panels, long-short
    /// returns and the risk-factor timeseries.
    ///
    /// # Errors
    /// Returns the first factor failure, or any configuration, data or store error.
    pub fn compute_factors(&self) -> Result<FactorRun, PipelineError> {
        let config = analytics_config(self.settings.pipeline());
        config.validate()?;
        let (fwd_returns, risk_factors) = self.load_market()?;
        if let Some(risk) = &risk_factors {
            let path = self.store.save_risk_factors(risk)?;
            info!(path = %path.display(), "saved risk-factor timeseries");
        }

        let jobs = self.factor_jobs()?;
        let pool = self.pool()?;
        info!(factors = jobs.len(), workers = pool.workers(), "computing factors");
        let computed = pool.try_map(&jobs, |(factor, params)| {
            let data = self.source.open()?;
            compute_factor(*factor, data.as_ref(), params, self.cleaner.as_ref())
                .map(|scores| (factor.name().to_string(), scores))
                .map_err(|source| PipelineError::Factor { name: factor.name().to_string(), source })
        })?;

        let mut factors = BTreeMap::new();
        let mut ls_returns = BTreeMap::new();
        for (name, scores) in computed {
            let path = self.store.save_factor(&name, &scores)?;
            info!(factor = %name, path = %path.display(), "saved factor");
            if config.run_long_short {
                let ls = long_short_returns(&scores, &fwd_returns, config.top_pct, config.bottom_pct)?;
                if ls.is_empty() {
                    debug!(factor = %name, "no long-short returns");
                } else {
                    self.store.save_ls_returns(&name, &ls)?;
                    ls_returns.insert(name.clone(), ls);
                }
            }
            factors.insert(name, scores);
        }

        Ok(FactorRun { factors, ls_returns, fwd_returns, risk_factors })
    }

    /// Rebuild a stage-1 result from persisted artifacts instead of recomputing.
    ///
    /// # Errors
    /// Returns `NotFound` if a configured factor has not been persisted.
    pub fn load_factors(&self) -> Result<FactorRun, PipelineError> {
        let (fwd_returns, risk_factors) = self.load_market()?;
        let mut factors = BTreeMap::new();
        let mut ls_returns = BTreeMap::new();
        for name in self.factor_names() {
            factors.insert(name.to_string(), self.store.load_factor(name)?);
            if self.store.exists(&format!("ls_{name}")) {
                ls_returns.insert(name.to_string(), self.store.load_ls_returns(name)?);
            }
        }
        info!(factors = factors.len(), "loaded persisted factors");
        Ok(FactorRun { factors, ls_returns, fwd_returns, risk_factors })
    }

    /// Stage 2: the analytics bundle per factor, merged into the summary and step
    /// diagnostics registries.
    ///
    /// # Errors
    /// Returns an error for malformed analytics settings or a failed registry write.
    pub fn run_analytics(&self, run: &FactorRun) -> Result<BTreeMap<String, AnalyticsBundle>, PipelineError> {
        let config = analytics_config(self.settings.pipeline());
        let items: Vec<(&String, &Panel)> = run.factors.iter().collect();
        let bundles = self.pool()?.try_map(&items, |(name, scores)| {
            compute_all_analytics(name, scores, &run.fwd_returns, run.risk_factors.as_ref(), &config)
                .map(|bundle| ((*name).clone(), bundle))
        })?;
        let bundles: BTreeMap<String, AnalyticsBundle> = bundles.into_iter().collect();
        if bundles.is_empty() {
            return Ok(bundles);
        }

        self.registry.merge(
            FACTOR_SUMMARY,
            "factor",
            bundles.iter().map(|(name, b)| (name.clone(), b.summary.metrics())),
        )?;
        self.registry.merge(
            STEP_DIAGNOSTICS,
            "name",
            bundles.iter().map(|(name, b)| (name.clone(), step_diagnostics(&run.factors[name], b))),
        )?;
        Ok(bundles)
    }

    /// Stage 3: factor-vs-factor correlation, and long-short-vs-risk-premia correlation
    /// when risk-factor data is available. Empty matrices are not persisted.
    ///
    /// # Errors
    /// Returns an error if a matrix cannot be written.
    pub fn compute_correlations(&self, run: &FactorRun) -> Result<Correlations, PipelineError> {
        let method = self.settings.pipeline().correlation_method;
        let factors = factor_correlation(&run.factors, method);
        if factors.is_empty() {
            warn!("no overlapping factor observations, factor correlation skipped");
        } else {
            self.store.save_correlation(FACTOR_CORRELATION, &factors)?;
        }

        let risk = match &run.risk_factors {
            Some(risk) if !run.ls_returns.is_empty() => {
                let matrix = corr_with_ff(&run.ls_returns, risk, method);
                if !matrix.is_empty() {
                    self.store.save_correlation(FACTOR_RISK_CORRELATION, &matrix)?;
                }
                Some(matrix)
            }
            _ => None,
        };
        info!(factors = factors.rows().len(), "computed correlations");
        Ok(Correlations { factors, risk })
    }

    /// Stage 4: rolling IC mean and IC IR per factor, sampled every `rolling_step`
    /// dates.
    ///
    /// # Errors
    /// Returns an error if the table cannot be written.
    pub fn run_time_effects(&self, run: &FactorRun) -> Result<Vec<RollingIcRow>, PipelineError> {
        let pipeline = self.settings.pipeline();
        let mut rows = Vec::new();
        for (name, scores) in &run.factors {
            let ic = information_coefficient(scores, &run.fwd_returns)?;
            rows.extend(rolling_ic(name, &ic, pipeline.rolling_window, pipeline.rolling_step));
        }
        if rows.is_empty() {
            debug!(window = pipeline.rolling_window, "too few IC dates for a rolling window");
        } else {
            let path = self.store.save_rolling(&rows)?;
            info!(rows = rows.len(), path = %path.display(), "saved rolling analytics");
        }
        Ok(rows)
    }

    /// Stages 1-4 in order.
    ///
    /// # Errors
    /// Returns the first stage error.
    pub fn run_all(&self) -> Result<RunReport, PipelineError> {
        let run = self.compute_factors()?;
        let analytics = self.run_analytics(&run)?;
        let correlations = self.compute_correlations(&run)?;
        let rolling = self.run_time_effects(&run)?;
        info!(factors = run.factors.len(), "run complete");
        Ok(RunReport { run, analytics, correlations, rolling })
    }
}
