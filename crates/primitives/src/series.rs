//! Date-indexed scalar series.

use crate::{Date, PrimitivesError};

/// A scalar series indexed by strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateSeries {
    dates: Vec<Date>,
    values: Vec<f64>,
}

impl DateSeries {
    /// Create a series.
    ///
    /// # Errors
    /// Returns an error if lengths differ or dates are not strictly increasing.
    pub fn new(dates: Vec<Date>, values: Vec<f64>) -> Result<Self, PrimitivesError> {
        if dates.len() != values.len() {
            return Err(PrimitivesError::ShapeMismatch {
                expected: (dates.len(), 1),
                actual: (values.len(), 1),
            });
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PrimitivesError::UnorderedDates(pair[1]));
        }
        Ok(Self { dates, values })
    }

    /// Build from `(date, value)` pairs already in increasing date order.
    ///
    /// # Errors
    /// Returns an error if dates are not strictly increasing.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Date, f64)>) -> Result<Self, PrimitivesError> {
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    /// Empty series.
    #[must_use]
    pub const fn empty() -> Self {
        Self { dates: Vec::new(), values: Vec::new() }
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Date index.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Value on a given date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.values[i])
    }

    /// The last `n` points (all of them when shorter).
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self { dates: self.dates[start..].to_vec(), values: self.values[start..].to_vec() }
    }

    /// Drop points whose value is `NaN` or infinite.
    #[must_use]
    pub fn finite(&self) -> Self {
        let (dates, values) = self.iter().filter(|(_, v)| v.is_finite()).unzip();
        Self { dates, values }
    }
}
