//! Wide `date x entity` panels.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use ndarray::{Array2, ArrayView1, Axis};

use crate::{Date, PrimitivesError};

/// A wide panel of values indexed by date (rows) and entity (columns).
///
/// Missing observations are stored as `NaN`. Dates are strictly increasing and
/// entities are unique, so every `(date, entity)` pair appears at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    dates: Vec<Date>,
    entities: Vec<String>,
    values: Array2<f64>,
}

/// One factor's or composite's cross-sectional scores over time.
pub type ScoreMatrix = Panel;

/// Forward returns realized over a fixed horizon starting at each date.
pub type ForwardReturnMatrix = Panel;

impl Panel {
    /// Create a panel, validating its axes.
    ///
    /// # Errors
    /// Returns an error if the value shape does not match the axes, the dates are
    /// not strictly increasing, or an entity is repeated.
    pub fn new(
        dates: Vec<Date>,
        entities: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, PrimitivesError> {
        let expected = (dates.len(), entities.len());
        if values.dim() != expected {
            return Err(PrimitivesError::ShapeMismatch { expected, actual: values.dim() });
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PrimitivesError::UnorderedDates(pair[1]));
        }
        let mut seen = HashSet::with_capacity(entities.len());
        for entity in &entities {
            if !seen.insert(entity.as_str()) {
                return Err(PrimitivesError::DuplicateEntity(entity.clone()));
            }
        }
        Ok(Self { dates, entities, values })
    }

    /// Create a panel with no dates and no entities.
    #[must_use]
    pub fn empty() -> Self {
        Self { dates: Vec::new(), entities: Vec::new(), values: Array2::zeros((0, 0)) }
    }

    /// Pivot long-format `(date, entity, value)` records into a panel.
    ///
    /// Dates and entities are sorted. Cells without a record are `NaN`.
    ///
    /// # Errors
    /// Returns `DuplicateObservation` if a `(date, entity)` pair occurs twice.
    pub fn from_records<I, S>(records: I) -> Result<Self, PrimitivesError>
    where
        I: IntoIterator<Item = (Date, S, f64)>,
        S: Into<String>,
    {
        let mut cells: BTreeMap<(Date, String), f64> = BTreeMap::new();
        let mut entities = BTreeSet::new();
        for (date, entity, value) in records {
            let entity = entity.into();
            entities.insert(entity.clone());
            if cells.insert((date, entity.clone()), value).is_some() {
                return Err(PrimitivesError::DuplicateObservation { date, entity });
            }
        }

        let dates: Vec<Date> =
            cells.keys().map(|(d, _)| *d).collect::<BTreeSet<_>>().into_iter().collect();
        let entities: Vec<String> = entities.into_iter().collect();
        let entity_pos: HashMap<&str, usize> =
            entities.iter().enumerate().map(|(j, e)| (e.as_str(), j)).collect();

        let mut values = Array2::from_elem((dates.len(), entities.len()), f64::NAN);
        let mut row = 0;
        for ((date, entity), value) in &cells {
            while dates[row] != *date {
                row += 1;
            }
            values[[row, entity_pos[entity.as_str()]]] = *value;
        }

        Ok(Self { dates, entities, values })
    }

    /// Dates on the row axis.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Entities on the column axis.
    #[must_use]
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Raw value matrix (`n_dates x n_entities`).
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of dates.
    #[must_use]
    pub const fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of entities.
    #[must_use]
    pub const fn n_entities(&self) -> usize {
        self.entities.len()
    }

    /// Whether the panel has no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.entities.is_empty()
    }

    /// Row position of a date.
    #[must_use]
    pub fn date_position(&self, date: Date) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Column position of an entity.
    #[must_use]
    pub fn entity_position(&self, entity: &str) -> Option<usize> {
        self.entities.iter().position(|e| e == entity)
    }

    /// Cross-section at row `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    /// Cross-section on a given date.
    #[must_use]
    pub fn cross_section(&self, date: Date) -> Option<ArrayView1<'_, f64>> {
        self.date_position(date).map(|i| self.values.row(i))
    }

    /// Observed value for `(date, entity)`, `None` if absent or missing.
    #[must_use]
    pub fn get(&self, date: Date, entity: &str) -> Option<f64> {
        let i = self.date_position(date)?;
        let j = self.entity_position(entity)?;
        let v = self.values[[i, j]];
        (!v.is_nan()).then_some(v)
    }

    /// Replace the value matrix, keeping the axes.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the new values do not fit the axes.
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self, PrimitivesError> {
        Self::new(self.dates.clone(), self.entities.clone(), values)
    }

    /// Apply a function to every cell.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            dates: self.dates.clone(),
            entities: self.entities.clone(),
            values: self.values.mapv(f),
        }
    }

    /// Lag values by `periods` rows: the value at row `i` becomes the one observed at
    /// row `i - periods`. The first `periods` rows become missing.
    #[must_use]
    pub fn shift(&self, periods: usize) -> Self {
        let (n, m) = self.values.dim();
        let mut out = Array2::from_elem((n, m), f64::NAN);
        for i in periods..n {
            out.row_mut(i).assign(&self.values.row(i - periods));
        }
        Self { dates: self.dates.clone(), entities: self.entities.clone(), values: out }
    }

    /// Forward returns over `horizon` rows, treating the panel as prices.
    ///
    /// `fwd[t] = price[t + horizon] / price[t] - 1`; the last `horizon` rows and any
    /// cell with a missing or non-positive base price are missing.
    #[must_use]
    pub fn forward_returns(&self, horizon: usize) -> Self {
        let (n, m) = self.values.dim();
        let mut out = Array2::from_elem((n, m), f64::NAN);
        for i in 0..n.saturating_sub(horizon) {
            for j in 0..m {
                let base = self.values[[i, j]];
                let next = self.values[[i + horizon, j]];
                if base.is_finite() && base > 0.0 && next.is_finite() {
                    out[[i, j]] = next / base - 1.0;
                }
            }
        }
        Self { dates: self.dates.clone(), entities: self.entities.clone(), values: out }
    }

    /// Carry the last observed value forward along the date axis, per entity.
    #[must_use]
    pub fn forward_fill(&self) -> Self {
        let mut values = self.values.clone();
        for mut column in values.axis_iter_mut(Axis(1)) {
            let mut last = f64::NAN;
            for v in column.iter_mut() {
                if v.is_nan() {
                    *v = last;
                } else {
                    last = *v;
                }
            }
        }
        Self { dates: self.dates.clone(), entities: self.entities.clone(), values }
    }

    /// Replace missing cells with `value`.
    #[must_use]
    pub fn fill_missing(&self, value: f64) -> Self {
        self.map(|v| if v.is_nan() { value } else { v })
    }

    /// Re-project onto new axes. Cells absent from `self` are missing.
    #[must_use]
    pub fn reindex(&self, dates: &[Date], entities: &[String]) -> Self {
        let entity_pos: HashMap<&str, usize> =
            self.entities.iter().enumerate().map(|(j, e)| (e.as_str(), j)).collect();
        let col_map: Vec<Option<usize>> =
            entities.iter().map(|e| entity_pos.get(e.as_str()).copied()).collect();

        let mut out = Array2::from_elem((dates.len(), entities.len()), f64::NAN);
        for (i, date) in dates.iter().enumerate() {
            let Some(src_row) = self.date_position(*date) else { continue };
            for (j, src_col) in col_map.iter().enumerate() {
                if let Some(src_col) = src_col {
                    out[[i, j]] = self.values[[src_row, *src_col]];
                }
            }
        }
        Self { dates: dates.to_vec(), entities: entities.to_vec(), values: out }
    }

    /// Sorted union of the date and entity axes of several panels.
    #[must_use]
    pub fn union_axes<'a>(panels: impl IntoIterator<Item = &'a Self>) -> (Vec<Date>, Vec<String>) {
        let mut dates = BTreeSet::new();
        let mut entities = BTreeSet::new();
        for panel in panels {
            dates.extend(panel.dates.iter().copied());
            entities.extend(panel.entities.iter().cloned());
        }
        (dates.into_iter().collect(), entities.into_iter().collect())
    }

    /// Dates present in both panels as `(date, row_in_self, row_in_other)`.
    #[must_use]
    pub fn common_dates(&self, other: &Self) -> Vec<(Date, usize, usize)> {
        let mut out = Vec::new();
        let (mut i, mut k) = (0, 0);
        while i < self.dates.len() && k < other.dates.len() {
            match self.dates[i].cmp(&other.dates[k]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => k += 1,
                std::cmp::Ordering::Equal => {
                    out.push((self.dates[i], i, k));
                    i += 1;
                    k += 1;
                }
            }
        }
        out
    }

    /// Entities present in both panels as `(col_in_self, col_in_other)`.
    #[must_use]
    pub fn common_entities(&self, other: &Self) -> Vec<(usize, usize)> {
        let other_pos: HashMap<&str, usize> =
            other.entities.iter().enumerate().map(|(j, e)| (e.as_str(), j)).collect();
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(j, e)| other_pos.get(e.as_str()).map(|&k| (j, k)))
            .collect()
    }

    /// Number of non-missing cells.
    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Fraction of cells that are missing (`NaN` for an empty panel).
    #[must_use]
    pub fn nan_fraction(&self) -> f64 {
        let total = self.values.len();
        if total == 0 {
            return f64::NAN;
        }
        1.0 - self.n_observations() as f64 / total as f64
    }

    /// Number of dates with at least one non-missing value.
    #[must_use]
    pub fn valid_dates(&self) -> usize {
        self.values.rows().into_iter().filter(|row| row.iter().any(|v| !v.is_nan())).count()
    }

    /// Iterate non-missing cells in long form.
    pub fn observations(&self) -> impl Iterator<Item = (Date, &str, f64)> + '_ {
        self.values.indexed_iter().filter(|(_, v)| !v.is_nan()).map(|((i, j), v)| {
            (self.dates[i], self.entities[j].as_str(), *v)
        })
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::empty()
    }
}
