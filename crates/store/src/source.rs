//! Directory-backed data access.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use factorlab_primitives::{Date, Panel, RiskFactorMatrix, SectorMap};
use factorlab_traits::{DataAccess, DataError, DataSource};
use ndarray::Array2;
use polars::prelude::*;
use tracing::debug;

use crate::frames::{long_to_panel, read_dates, read_f64, read_strings};

/// Dataset holding daily risk-factor returns: a `date` column plus one column per factor.
pub const RISK_FACTORS_DATASET: &str = "risk_factors";

/// Dataset mapping `ticker` to `sector`.
pub const SECTOR_MAP_DATASET: &str = "sector_map";

/// A [`DataSource`] over a directory of `<dataset>.parquet` files.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    dir: PathBuf,
}

impl FileDataSource {
    /// Source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DataSource for FileDataSource {
    fn open(&self) -> Result<Box<dyn DataAccess>, DataError> {
        if !self.dir.is_dir() {
            return Err(DataError::MissingDataset(self.dir.display().to_string()));
        }
        Ok(Box::new(FileDataAccess { dir: self.dir.clone() }))
    }
}

/// Handle opened by [`FileDataSource`].
#[derive(Debug)]
pub struct FileDataAccess {
    dir: PathBuf,
}

impl FileDataAccess {
    fn path(&self, dataset: &str) -> PathBuf {
        self.dir.join(format!("{dataset}.parquet"))
    }

    fn load_optional(&self, dataset: &str) -> Result<Option<DataFrame>, DataError> {
        if self.path(dataset).is_file() { self.load_long(dataset).map(Some) } else { Ok(None) }
    }
}

impl DataAccess for FileDataAccess {
    fn load_long(&self, dataset: &str) -> Result<DataFrame, DataError> {
        let path = self.path(dataset);
        if !path.is_file() {
            return Err(DataError::MissingDataset(dataset.to_string()));
        }
        let df = ParquetReader::new(File::open(&path)?).finish()?;
        debug!(dataset, rows = df.height(), "loaded dataset");
        Ok(df)
    }

    fn load_price_wide(&self, dataset: &str) -> Result<Panel, DataError> {
        let df = self.load_long(dataset)?;
        long_to_panel(&df, dataset, "date", "ticker", "close")
    }

    fn load_risk_factors(&self) -> Result<Option<RiskFactorMatrix>, DataError> {
        let Some(df) = self.load_optional(RISK_FACTORS_DATASET)? else {
            return Ok(None);
        };
        let dates = read_dates(&df, RISK_FACTORS_DATASET, "date")?;
        let columns: Vec<String> = df
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .filter(|name| name != "date")
            .collect();
        let data: Vec<Vec<f64>> = columns
            .iter()
            .map(|c| read_f64(&df, RISK_FACTORS_DATASET, c))
            .collect::<Result<_, _>>()?;

        let mut rows: Vec<(Date, usize)> =
            dates.iter().enumerate().filter_map(|(i, d)| Some(((*d)?, i))).collect();
        rows.sort_by_key(|(d, _)| *d);
        let values = Array2::from_shape_fn((rows.len(), columns.len()), |(i, j)| data[j][rows[i].1]);
        let dates = rows.into_iter().map(|(d, _)| d).collect();
        Ok(Some(RiskFactorMatrix::new(dates, columns, values)?))
    }

    fn load_sector_map(&self) -> Result<Option<SectorMap>, DataError> {
        let Some(df) = self.load_optional(SECTOR_MAP_DATASET)? else {
            return Ok(None);
        };
        let tickers = read_strings(&df, SECTOR_MAP_DATASET, "ticker")?;
        let sectors = read_strings(&df, SECTOR_MAP_DATASET, "sector")?;
        Ok(Some(
            tickers.into_iter().zip(sectors).filter_map(|(t, s)| Some((t?, s?))).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{artifacts::tests::scratch, frames::date_column};

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn write(dir: &Path, dataset: &str, mut df: DataFrame) {
        fs::create_dir_all(dir).unwrap();
        let mut file = File::create(dir.join(format!("{dataset}.parquet"))).unwrap();
        ParquetWriter::new(&mut file).finish(&mut df).unwrap();
    }

    #[test]
    fn loads_prices_wide() {
        let dir = scratch("source-prices");
        write(
            &dir,
            "price_daily",
            DataFrame::new(vec![
                date_column("date", [d(1), d(1), d(2)]).unwrap(),
                Column::new("ticker".into(), vec!["B".to_string(), "A".to_string(), "A".to_string()]),
                Column::new("close".into(), vec![20.0, 10.0, 11.0]),
            ])
            .unwrap(),
        );
        let access = FileDataSource::new(&dir).open().unwrap();
        let prices = access.load_price_wide("price_daily").unwrap();
        assert_eq!(prices.entities(), &["A".to_string(), "B".to_string()]);
        assert_eq!(prices.get(d(2), "A"), Some(11.0));
        assert_eq!(prices.get(d(2), "B"), None);
        assert!(access.load_risk_factors().unwrap().is_none());
        assert!(access.load_sector_map().unwrap().is_none());
    }

    #[test]
    fn missing_close_column() {
        let dir = scratch("source-noclose");
        write(
            &dir,
            "price_daily",
            DataFrame::new(vec![
                date_column("date", [d(1)]).unwrap(),
                Column::new("ticker".into(), vec!["A".to_string()]),
                Column::new("price".into(), vec![1.0]),
            ])
            .unwrap(),
        );
        let access = FileDataSource::new(&dir).open().unwrap();
        let err = access.load_price_wide("price_daily").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "close"));
        assert!(matches!(access.load_long("nope"), Err(DataError::MissingDataset(_))));
    }

    #[test]
    fn loads_risk_factors_sorted_and_sectors() {
        let dir = scratch("source-risk");
        write(
            &dir,
            RISK_FACTORS_DATASET,
            DataFrame::new(vec![
                date_column("date", [d(2), d(1)]).unwrap(),
                Column::new("MktRF".into(), vec![0.02, 0.01]),
                Column::new("RF".into(), vec![0.0001, 0.0001]),
            ])
            .unwrap(),
        );
        write(
            &dir,
            SECTOR_MAP_DATASET,
            DataFrame::new(vec![
                Column::new("ticker".into(), vec!["A".to_string(), "B".to_string()]),
                Column::new("sector".into(), vec!["Tech".to_string(), "Energy".to_string()]),
            ])
            .unwrap(),
        );
        let access = FileDataSource::new(&dir).open().unwrap();
        let risk = access.load_risk_factors().unwrap().unwrap();
        assert_eq!(risk.dates(), &[d(1), d(2)]);
        assert_eq!(risk.columns(), &["mktrf".to_string(), "rf".to_string()]);
        assert_eq!(risk.values()[[0, 0]], 0.01);

        let sectors = access.load_sector_map().unwrap().unwrap();
        assert_eq!(sectors.get("B").map(String::as_str), Some("Energy"));
    }

    #[test]
    fn missing_directory_fails_to_open() {
        assert!(FileDataSource::new(scratch("source-absent")).open().is_err());
    }
}
