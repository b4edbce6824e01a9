//! In-memory collaborators for pipeline tests.

use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use chrono::NaiveDate;
use factorlab_primitives::{Panel, RiskFactorMatrix, SectorMap};
use factorlab_traits::{DataAccess, DataError, DataSource, Factor, FactorError, FactorParams};
use ndarray::Array2;
use polars::prelude::DataFrame;

pub(crate) fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
}

/// Deterministic, cross-sectionally dispersed price paths.
pub(crate) fn synthetic_prices(n_dates: usize, n_entities: usize) -> Panel {
    let mut values = Array2::zeros((n_dates, n_entities));
    for j in 0..n_entities {
        let mut price = 100.0 + j as f64;
        for i in 0..n_dates {
            let drift = 0.001 * (j as f64 - n_entities as f64 / 2.0);
            let noise = 0.01 * ((i * 7 + j * 13) as f64 * 0.37).sin();
            price *= 1.0 + drift + noise;
            values[[i, j]] = price;
        }
    }
    let entities = (0..n_entities).map(|j| format!("T{j:02}")).collect();
    Panel::new(dates(n_dates), entities, values).unwrap()
}

pub(crate) fn risk_factors(n_dates: usize) -> RiskFactorMatrix {
    let values = Array2::from_shape_fn((n_dates, 3), |(i, j)| match j {
        0 => 0.004 * ((i as f64) * 0.9).sin(),
        1 => 0.003 * ((i as f64) * 1.7).cos(),
        _ => 0.0001,
    });
    RiskFactorMatrix::new(dates(n_dates), vec!["mktrf".into(), "smb".into(), "rf".into()], values).unwrap()
}

pub(crate) fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("factorlab-pipeline-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Serves fixed inputs and counts how many handles were opened.
pub(crate) struct MemorySource {
    pub(crate) prices: Panel,
    pub(crate) risk: Option<RiskFactorMatrix>,
    pub(crate) sectors: Option<SectorMap>,
    pub(crate) opened: AtomicUsize,
}

impl MemorySource {
    pub(crate) fn new(prices: Panel) -> Self {
        Self { prices, risk: None, sectors: None, opened: AtomicUsize::new(0) }
    }

    pub(crate) fn with_risk(mut self, risk: RiskFactorMatrix) -> Self {
        self.risk = Some(risk);
        self
    }

    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl DataSource for MemorySource {
    fn open(&self) -> Result<Box<dyn DataAccess>, DataError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryAccess {
            prices: self.prices.clone(),
            risk: self.risk.clone(),
            sectors: self.sectors.clone(),
        }))
    }
}

struct MemoryAccess {
    prices: Panel,
    risk: Option<RiskFactorMatrix>,
    sectors: Option<SectorMap>,
}

impl DataAccess for MemoryAccess {
    fn load_long(&self, dataset: &str) -> Result<DataFrame, DataError> {
        Err(DataError::MissingDataset(dataset.to_string()))
    }

    fn load_price_wide(&self, dataset: &str) -> Result<Panel, DataError> {
        if dataset == "price_daily" {
            Ok(self.prices.clone())
        } else {
            Err(DataError::MissingDataset(dataset.to_string()))
        }
    }

    fn load_risk_factors(&self) -> Result<Option<RiskFactorMatrix>, DataError> {
        Ok(self.risk.clone())
    }

    fn load_sector_map(&self) -> Result<Option<SectorMap>, DataError> {
        Ok(self.sectors.clone())
    }
}

/// Scores each entity by its price level.
#[derive(Debug)]
pub(crate) struct Level;

impl Factor for Level {
    fn name(&self) -> &str {
        "level"
    }

    fn type_name(&self) -> &str {
        "Level"
    }

    fn compute_raw(&self, data: &dyn DataAccess) -> Result<Panel, FactorError> {
        Ok(data.load_price_wide("price_daily")?)
    }

    fn post_process(&self, raw: Panel, params: &FactorParams) -> Result<Panel, FactorError> {
        Ok(raw.shift(params.lag_days))
    }
}

/// Scores each entity by minus its latest daily return.
#[derive(Debug)]
pub(crate) struct Reversal;

impl Factor for Reversal {
    fn name(&self) -> &str {
        "reversal"
    }

    fn type_name(&self) -> &str {
        "Reversal"
    }

    fn compute_raw(&self, data: &dyn DataAccess) -> Result<Panel, FactorError> {
        let prices = data.load_price_wide("price_daily")?;
        // backward return at t = forward return at t - 1, shifted down one row
        Ok(prices.forward_returns(1).shift(1).map(|r| -r))
    }

    fn post_process(&self, raw: Panel, params: &FactorParams) -> Result<Panel, FactorError> {
        Ok(raw.shift(params.lag_days))
    }
}

/// Always fails.
#[derive(Debug)]
pub(crate) struct Broken;

impl Factor for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn type_name(&self) -> &str {
        "Broken"
    }

    fn compute_raw(&self, _data: &dyn DataAccess) -> Result<Panel, FactorError> {
        Err(FactorError::Computation { factor: "broken".to_string(), reason: "no data".to_string() })
    }

    fn post_process(&self, raw: Panel, _params: &FactorParams) -> Result<Panel, FactorError> {
        Ok(raw)
    }
}
