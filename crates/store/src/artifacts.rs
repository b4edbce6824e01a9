//! Artifact files under a results root.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use factorlab_analytics::{CorrelationMatrix, RollingIcRow};
use factorlab_primitives::{DateSeries, Panel, RiskFactorMatrix};
use polars::prelude::*;
use tracing::debug;

use crate::{
    StoreError,
    frames::{date_column, frame_to_series, long_to_panel, panel_to_long, series_to_frame},
};

/// Directory holding the parquet primaries.
pub const FACTORS_DIR: &str = "factors";

/// Directory holding the CSV inspection copies.
pub const DIAGNOSTICS_DIR: &str = "diagnostics";

const FF_TIMESERIES: &str = "factor_ff_timeseries";
const ROLLING_ANALYTICS: &str = "factor_rolling_analytics";

/// Writes and reads artifacts under a results root.
///
/// Each artifact `<stem>` lives at `<root>/factors/<stem>.parquet`, with a CSV copy at
/// `<root>/diagnostics/<stem>.csv`. Writes replace the previous content.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `root`. Directories are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Results root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the parquet primary of an artifact.
    #[must_use]
    pub fn primary_path(&self, stem: &str) -> PathBuf {
        self.root.join(FACTORS_DIR).join(format!("{stem}.parquet"))
    }

    /// Path of the CSV copy of an artifact.
    #[must_use]
    pub fn inspection_path(&self, stem: &str) -> PathBuf {
        self.root.join(DIAGNOSTICS_DIR).join(format!("{stem}.csv"))
    }

    /// Whether the primary of an artifact exists.
    #[must_use]
    pub fn exists(&self, stem: &str) -> bool {
        self.primary_path(stem).is_file()
    }

    /// Write a frame as both copies of an artifact.
    ///
    /// # Errors
    /// Returns an error if a directory or file cannot be written.
    pub fn write_frame(&self, stem: &str, df: &mut DataFrame) -> Result<PathBuf, StoreError> {
        let primary = self.primary_path(stem);
        let inspection = self.inspection_path(stem);
        for path in [&primary, &inspection] {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
        }

        let mut file = File::create(&primary)?;
        ParquetWriter::new(&mut file).finish(df)?;
        let mut file = File::create(&inspection)?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;

        debug!(artifact = stem, rows = df.height(), path = %primary.display(), "wrote artifact");
        Ok(primary)
    }

    /// Read the parquet primary of an artifact.
    ///
    /// # Errors
    /// Returns `NotFound` if the artifact has never been written.
    pub fn read_frame(&self, stem: &str) -> Result<DataFrame, StoreError> {
        let path = self.primary_path(stem);
        if !path.is_file() {
            return Err(StoreError::NotFound(path));
        }
        Ok(ParquetReader::new(File::open(&path)?).finish()?)
    }

    /// Persist a cleaned factor panel as `factor_<name>`.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be written.
    pub fn save_factor(&self, name: &str, scores: &Panel) -> Result<PathBuf, StoreError> {
        self.write_frame(&factor_stem(name), &mut panel_to_long(scores, "value")?)
    }

    /// Load a panel written by [`Self::save_factor`].
    ///
    /// # Errors
    /// Returns `NotFound` if the factor has not been persisted.
    pub fn load_factor(&self, name: &str) -> Result<Panel, StoreError> {
        let stem = factor_stem(name);
        let df = self.read_frame(&stem)?;
        Ok(long_to_panel(&df, &stem, "date", "ticker", "value")?)
    }

    /// Persist long-short returns as `ls_<name>`.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be written.
    pub fn save_ls_returns(&self, name: &str, returns: &DateSeries) -> Result<PathBuf, StoreError> {
        self.write_frame(&ls_stem(name), &mut series_to_frame(returns, "ls_return")?)
    }

    /// Load returns written by [`Self::save_ls_returns`].
    ///
    /// # Errors
    /// Returns `NotFound` if the returns have not been persisted.
    pub fn load_ls_returns(&self, name: &str) -> Result<DateSeries, StoreError> {
        let stem = ls_stem(name);
        let df = self.read_frame(&stem)?;
        Ok(frame_to_series(&df, &stem, "ls_return")?)
    }

    /// Persist a correlation matrix with its row labels in a leading `name` column.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be written.
    pub fn save_correlation(&self, stem: &str, matrix: &CorrelationMatrix) -> Result<PathBuf, StoreError> {
        let mut columns = vec![Column::new("name".into(), matrix.rows().to_vec())];
        for (j, name) in matrix.columns().iter().enumerate() {
            columns.push(Column::new(name.as_str().into(), matrix.values().column(j).to_vec()));
        }
        self.write_frame(stem, &mut DataFrame::new(columns)?)
    }

    /// Persist the risk-factor timeseries used by a run.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be written.
    pub fn save_risk_factors(&self, risk: &RiskFactorMatrix) -> Result<PathBuf, StoreError> {
        let mut columns = vec![date_column("date", risk.dates().iter().copied())?];
        for (j, name) in risk.columns().iter().enumerate() {
            columns.push(Column::new(name.as_str().into(), risk.values().column(j).to_vec()));
        }
        self.write_frame(FF_TIMESERIES, &mut DataFrame::new(columns)?)
    }

    /// Persist rolling IC rows.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be written.
    pub fn save_rolling(&self, rows: &[RollingIcRow]) -> Result<PathBuf, StoreError> {
        let mut df = DataFrame::new(vec![
            Column::new("factor".into(), rows.iter().map(|r| r.factor.clone()).collect::<Vec<_>>()),
            date_column("date", rows.iter().map(|r| r.date))?,
            Column::new("rolling_mean_ic".into(), rows.iter().map(|r| r.rolling_mean_ic).collect::<Vec<_>>()),
            Column::new("rolling_ic_ir".into(), rows.iter().map(|r| r.rolling_ic_ir).collect::<Vec<_>>()),
        ])?;
        self.write_frame(ROLLING_ANALYTICS, &mut df)
    }
}

fn factor_stem(name: &str) -> String {
    format!("factor_{name}")
}

fn ls_stem(name: &str) -> String {
    format!("ls_{name}")
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;
    use factorlab_primitives::Date;
    use ndarray::array;

    use super::*;

    pub(crate) fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("factorlab-store-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn factor_round_trip_writes_both_copies() {
        let store = ArtifactStore::new(scratch("factor"));
        let panel = Panel::new(
            vec![d(2), d(3)],
            vec!["AAA".into(), "BBB".into()],
            array![[0.5, -0.5], [f64::NAN, 1.0]],
        )
        .unwrap();

        let path = store.save_factor("momentum", &panel).unwrap();
        assert!(path.ends_with("factors/factor_momentum.parquet"));
        assert!(store.inspection_path("factor_momentum").is_file());

        let back = store.load_factor("momentum").unwrap();
        assert_eq!(back.dates(), panel.dates());
        assert_eq!(back.get(d(3), "BBB"), Some(1.0));
        assert_eq!(back.get(d(3), "AAA"), None);
    }

    #[test]
    fn ls_returns_round_trip() {
        let store = ArtifactStore::new(scratch("ls"));
        let returns = DateSeries::new(vec![d(2), d(3), d(4)], vec![0.01, -0.02, 0.005]).unwrap();
        store.save_ls_returns("momentum", &returns).unwrap();
        let back = store.load_ls_returns("momentum").unwrap();
        assert_eq!(back.dates(), returns.dates());
        assert_relative_eq!(back.values()[1], -0.02);
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let store = ArtifactStore::new(scratch("missing"));
        assert!(matches!(store.load_factor("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn rewrite_overwrites() {
        let store = ArtifactStore::new(scratch("overwrite"));
        let first = DateSeries::new(vec![d(2), d(3)], vec![0.1, 0.2]).unwrap();
        let second = DateSeries::new(vec![d(5)], vec![0.3]).unwrap();
        store.save_ls_returns("x", &first).unwrap();
        store.save_ls_returns("x", &second).unwrap();
        assert_eq!(store.load_ls_returns("x").unwrap(), second);
    }

    #[test]
    fn risk_factors_written_with_date_column() {
        let store = ArtifactStore::new(scratch("risk"));
        let risk = RiskFactorMatrix::new(
            vec![d(2), d(3)],
            vec!["MktRF".into(), "rf".into()],
            array![[0.01, 0.0001], [-0.02, 0.0001]],
        )
        .unwrap();
        store.save_risk_factors(&risk).unwrap();
        let df = store.read_frame("factor_ff_timeseries").unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("date").is_ok());
        assert!(df.column("mktrf").is_ok());
    }
}
