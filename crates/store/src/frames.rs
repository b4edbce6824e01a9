//! Conversion between polars frames and panels or series.

use chrono::Datelike;
use factorlab_primitives::{Date, DateSeries, Panel};
use factorlab_traits::DataError;
use polars::prelude::*;

/// Days from 0001-01-01 to 1970-01-01, the polars `Date` epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A polars `Date` column.
pub(crate) fn date_column(name: &str, dates: impl IntoIterator<Item = Date>) -> PolarsResult<Column> {
    let days: Vec<i32> = dates.into_iter().map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE).collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}

pub(crate) fn require<'a>(df: &'a DataFrame, dataset: &str, column: &str) -> Result<&'a Column, DataError> {
    df.column(column).map_err(|_| DataError::MissingColumn {
        dataset: dataset.to_string(),
        column: column.to_string(),
    })
}

/// Dates of a `Date` or `Datetime` column; nulls stay `None`.
pub(crate) fn read_dates(df: &DataFrame, dataset: &str, column: &str) -> Result<Vec<Option<Date>>, DataError> {
    let days = require(df, dataset, column)?.cast(&DataType::Date)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(|d| Date::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)))
        .collect())
}

/// Float values of a numeric column; nulls become `NaN`.
pub(crate) fn read_f64(df: &DataFrame, dataset: &str, column: &str) -> Result<Vec<f64>, DataError> {
    let values = require(df, dataset, column)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// String values of a column; nulls stay `None`.
pub(crate) fn read_strings(df: &DataFrame, dataset: &str, column: &str) -> Result<Vec<Option<String>>, DataError> {
    let values = require(df, dataset, column)?.cast(&DataType::String)?;
    Ok(values.str()?.into_iter().map(|s| s.map(str::to_string)).collect())
}

/// Long `date, ticker, value` frame of the observed cells of a panel.
///
/// # Errors
/// Returns a polars error if the frame cannot be built.
pub fn panel_to_long(panel: &Panel, value_column: &str) -> PolarsResult<DataFrame> {
    let n = panel.n_observations();
    let mut dates = Vec::with_capacity(n);
    let mut tickers = Vec::with_capacity(n);
    let mut values = Vec::with_capacity(n);
    for (date, ticker, value) in panel.observations() {
        dates.push(date);
        tickers.push(ticker.to_string());
        values.push(value);
    }
    DataFrame::new(vec![
        date_column("date", dates)?,
        Column::new("ticker".into(), tickers),
        Column::new(value_column.into(), values),
    ])
}

/// Pivot a long frame into a panel. Rows with a null date or entity are ignored.
///
/// # Errors
/// Returns `MissingColumn` if a column is absent, or a panel error on a repeated
/// `(date, entity)` pair.
pub fn long_to_panel(
    df: &DataFrame,
    dataset: &str,
    date_column: &str,
    entity_column: &str,
    value_column: &str,
) -> Result<Panel, DataError> {
    let dates = read_dates(df, dataset, date_column)?;
    let entities = read_strings(df, dataset, entity_column)?;
    let values = read_f64(df, dataset, value_column)?;
    let records = dates
        .into_iter()
        .zip(entities)
        .zip(values)
        .filter_map(|((d, e), v)| Some((d?, e?, v)));
    Ok(Panel::from_records(records)?)
}

/// Two-column `date, <value_column>` frame.
///
/// # Errors
/// Returns a polars error if the frame cannot be built.
pub fn series_to_frame(series: &DateSeries, value_column: &str) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        date_column("date", series.dates().iter().copied())?,
        Column::new(value_column.into(), series.values().to_vec()),
    ])
}

/// Read a `date, <value_column>` frame back into a series, sorted by date.
///
/// # Errors
/// Returns `MissingColumn` if a column is absent, or a series error on repeated dates.
pub fn frame_to_series(df: &DataFrame, dataset: &str, value_column: &str) -> Result<DateSeries, DataError> {
    let dates = read_dates(df, dataset, "date")?;
    let values = read_f64(df, dataset, value_column)?;
    let mut pairs: Vec<(Date, f64)> =
        dates.into_iter().zip(values).filter_map(|(d, v)| Some((d?, v))).collect();
    pairs.sort_by_key(|(d, _)| *d);
    Ok(DateSeries::from_pairs(pairs)?)
}
