//! Cross-sectional centering over a single date's values.
//!
//! Missing (`NaN`) entries are excluded from every estimate and stay missing.

use std::collections::HashMap;

use ndarray::Array1;

use crate::stats::{nan_mean, sample_std};

/// Cross-sectional centering transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterXSection {
    /// Whether to also divide by the sample standard deviation.
    pub standardize: bool,
}

impl CenterXSection {
    /// Create a new centering transform.
    #[must_use]
    pub const fn new(standardize: bool) -> Self {
        Self { standardize }
    }

    /// Apply centering to a cross-section.
    ///
    /// With `standardize`, a cross-section with zero or undefined dispersion is only
    /// demeaned.
    #[must_use]
    pub fn apply(&self, data: &Array1<f64>) -> Array1<f64> {
        let mean = nan_mean(data.iter().copied());
        if mean.is_nan() {
            return data.clone();
        }
        let centered = data.mapv(|x| x - mean);
        if !self.standardize {
            return centered;
        }
        let observed: Vec<f64> = centered.iter().copied().filter(|x| !x.is_nan()).collect();
        let std = sample_std(&observed);
        if std.is_finite() && std > 0.0 { centered.mapv(|x| x / std) } else { centered }
    }
}

impl Default for CenterXSection {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Subtract each group's mean from its members.
///
/// `groups[i]` labels entry `i`; entries sharing a label form one group.
///
/// # Panics
/// Panics if `groups` and `data` differ in length.
#[must_use]
pub fn demean_groups<K: Eq + std::hash::Hash>(data: &Array1<f64>, groups: &[K]) -> Array1<f64> {
    assert_eq!(data.len(), groups.len(), "one group label per entry");
    let mut sums: HashMap<&K, (f64, usize)> = HashMap::new();
    for (x, g) in data.iter().zip(groups) {
        if !x.is_nan() {
            let entry = sums.entry(g).or_insert((0.0, 0));
            entry.0 += x;
            entry.1 += 1;
        }
    }
    Array1::from_iter(data.iter().zip(groups).map(|(x, g)| match sums.get(g) {
        Some((sum, n)) if !x.is_nan() => x - sum / *n as f64,
        _ => *x,
    }))
}
