//! Winsorization operations for outlier handling.

use ndarray::Array1;

use crate::{MathError, quantile::quantile_sorted};

/// Clip a 1D array to its `lower` and `upper` linear quantiles.
///
/// `NaN` values are left untouched and excluded from the quantile estimate.
///
/// # Errors
/// Returns `MathError::InvalidLimits` unless `0 <= lower < upper <= 1`.
pub fn winsorize(data: &Array1<f64>, lower: f64, upper: f64) -> Result<Array1<f64>, MathError> {
    if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
        return Err(MathError::InvalidLimits(lower, upper));
    }

    let mut valid_values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    if valid_values.is_empty() {
        return Ok(data.clone());
    }
    valid_values.sort_by(f64::total_cmp);

    let lower_bound = quantile_sorted(&valid_values, lower);
    let upper_bound = quantile_sorted(&valid_values, upper);

    Ok(data.mapv(|x| if x.is_nan() { x } else { x.clamp(lower_bound, upper_bound) }))
}

/// Winsorization configuration and transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winsorizer {
    lower: f64,
    upper: f64,
}

impl Winsorizer {
    /// Create a new winsorizer.
    ///
    /// # Errors
    /// Returns `MathError::InvalidLimits` unless `0 <= lower < upper <= 1`.
    pub fn new(lower: f64, upper: f64) -> Result<Self, MathError> {
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            return Err(MathError::InvalidLimits(lower, upper));
        }
        Ok(Self { lower, upper })
    }

    /// Quantile limits.
    #[must_use]
    pub const fn limits(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// Apply winsorization to an array.
    ///
    /// # Errors
    /// Returns error if winsorization fails.
    pub fn apply(&self, data: &Array1<f64>) -> Result<Array1<f64>, MathError> {
        winsorize(data, self.lower, self.upper)
    }
}
