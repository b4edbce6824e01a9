//! Per-date cross-sectional statistics.

use factorlab_math::{nan_mean, qcut, spearman};
use factorlab_primitives::{Date, DateSeries, Panel};
use ndarray::ArrayView1;

use crate::AnalyticsError;

/// Values of two rows at the shared columns where both are finite.
pub(crate) fn paired(
    a: ArrayView1<'_, f64>,
    b: ArrayView1<'_, f64>,
    columns: &[(usize, usize)],
) -> (Vec<f64>, Vec<f64>) {
    columns
        .iter()
        .map(|&(i, k)| (a[i], b[k]))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .unzip()
}

/// Spearman correlation between scores and forward returns on each shared date.
///
/// Dates with fewer than two paired observations, or an undefined correlation, are
/// dropped.
///
/// # Errors
/// Returns an error only if the output series cannot be constructed.
pub fn information_coefficient(scores: &Panel, fwd_returns: &Panel) -> Result<DateSeries, AnalyticsError> {
    let columns = scores.common_entities(fwd_returns);
    let mut out: Vec<(Date, f64)> = Vec::new();
    for (date, i, k) in scores.common_dates(fwd_returns) {
        let (x, y) = paired(scores.row(i), fwd_returns.row(k), &columns);
        if x.len() < 2 {
            continue;
        }
        let ic = spearman(&x, &y);
        if !ic.is_nan() {
            out.push((date, ic));
        }
    }
    Ok(DateSeries::from_pairs(out)?)
}

/// Spearman correlation between each cross-section and the next one.
///
/// Indexed by the earlier date of each pair. Measures rank stability (turnover), not
/// predictive value.
///
/// # Errors
/// Returns an error only if the output series cannot be constructed.
pub fn autocorrelation(scores: &Panel) -> Result<DateSeries, AnalyticsError> {
    let columns: Vec<(usize, usize)> = (0..scores.n_entities()).map(|j| (j, j)).collect();
    let mut out = Vec::new();
    for t in 1..scores.n_dates() {
        let (x, y) = paired(scores.row(t - 1), scores.row(t), &columns);
        let ac = spearman(&x, &y);
        if !ac.is_nan() {
            out.push((scores.dates()[t - 1], ac));
        }
    }
    Ok(DateSeries::from_pairs(out)?)
}

/// Decile monotonicity of a factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Monotonicity {
    /// Per-date spread between the best and worst bucket mean forward return.
    pub spread: DateSeries,
    /// Mean forward return of each bucket across dates (`NaN` for a bucket never filled).
    pub avg_bucket_returns: Vec<f64>,
}

/// Bucket each cross-section into `buckets` equal-frequency groups by score and record
/// the mean forward return per bucket.
///
/// Dates with fewer paired observations than `buckets` are skipped. Heavy ties collapse
/// buckets; the surviving buckets are labelled from zero.
///
/// # Errors
/// Returns `InvalidBuckets` when `buckets` is zero.
pub fn monotonicity(
    scores: &Panel,
    fwd_returns: &Panel,
    buckets: usize,
) -> Result<Monotonicity, AnalyticsError> {
    if buckets == 0 {
        return Err(AnalyticsError::InvalidBuckets);
    }
    let columns = scores.common_entities(fwd_returns);
    let mut per_bucket: Vec<Vec<f64>> = vec![Vec::new(); buckets];
    let mut spreads = Vec::new();

    for (date, i, k) in scores.common_dates(fwd_returns) {
        let (x, y) = paired(scores.row(i), fwd_returns.row(k), &columns);
        if x.len() < buckets {
            continue;
        }
        let Some(bucketed) = qcut(&x, buckets) else { continue };

        let mut sums = vec![0.0; bucketed.n_buckets];
        let mut counts = vec![0usize; bucketed.n_buckets];
        for (label, ret) in bucketed.labels.iter().zip(&y) {
            sums[*label] += ret;
            counts[*label] += 1;
        }
        let means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .filter(|(_, c)| **c > 0)
            .map(|(s, c)| s / *c as f64)
            .collect();
        for (label, (s, c)) in sums.iter().zip(&counts).enumerate() {
            if *c > 0 {
                per_bucket[label].push(s / *c as f64);
            }
        }

        if let (Some(max), Some(min)) = (
            means.iter().copied().reduce(f64::max),
            means.iter().copied().reduce(f64::min),
        ) {
            spreads.push((date, max - min));
        }
    }

    let avg_bucket_returns = per_bucket.into_iter().map(nan_mean).collect();
    Ok(Monotonicity { spread: DateSeries::from_pairs(spreads)?.finite(), avg_bucket_returns })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::{Array2, array};

    use super::*;

    fn dates(n: usize) -> Vec<Date> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
    }

    fn entities(n: usize) -> Vec<String> {
        (0..n).map(|j| format!("E{j:02}")).collect()
    }

    #[test]
    fn ic_is_one_for_identical_ranks() {
        let scores = Panel::new(dates(3), entities(4), Array2::from_shape_fn((3, 4), |(i, j)| (i + j) as f64)).unwrap();
        let fwd = scores.map(|v| v * 0.01);
        let ic = information_coefficient(&scores, &fwd).unwrap();
        assert_eq!(ic.len(), 3);
        for v in ic.values() {
            assert_relative_eq!(*v, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn ic_drops_dates_with_too_few_pairs() {
        let scores = Panel::new(dates(2), entities(3), array![[1.0, 2.0, 3.0], [1.0, f64::NAN, f64::NAN]]).unwrap();
        let fwd = Panel::new(dates(2), entities(3), array![[3.0, 2.0, 1.0], [1.0, 2.0, 3.0]]).unwrap();
        let ic = information_coefficient(&scores, &fwd).unwrap();
        assert_eq!(ic.len(), 1);
        assert_relative_eq!(ic.values()[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn ic_uses_only_shared_dates_and_entities() {
        let scores = Panel::new(dates(3), entities(3), Array2::from_shape_fn((3, 3), |(_, j)| j as f64)).unwrap();
        let fwd_dates = dates(4)[1..].to_vec();
        let fwd_entities = vec!["E01".to_string(), "E02".to_string(), "ZZ".to_string()];
        let fwd = Panel::new(fwd_dates, fwd_entities, Array2::from_elem((3, 3), 1.0)).unwrap();
        let ic = information_coefficient(&scores, &fwd).unwrap();
        // constant forward returns: correlation undefined, every date dropped
        assert!(ic.is_empty());
        for d in ic.dates() {
            assert!(scores.date_position(*d).is_some() && fwd.date_position(*d).is_some());
        }
    }

    #[test]
    fn autocorrelation_indexed_by_earlier_date() {
        let scores = Panel::new(dates(3), entities(3), array![[1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [3.0, 2.0, 1.0]]).unwrap();
        let ac = autocorrelation(&scores).unwrap();
        assert_eq!(ac.dates(), &dates(2)[..]);
        assert_relative_eq!(ac.values()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(ac.values()[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn monotone_spread_is_positive() {
        let n = 20;
        let scores = Panel::new(dates(5), entities(n), Array2::from_shape_fn((5, n), |(i, j)| (j * (i + 1)) as f64)).unwrap();
        let fwd = Panel::new(dates(5), entities(n), Array2::from_shape_fn((5, n), |(_, j)| j as f64 / 100.0)).unwrap();
        let mono = monotonicity(&scores, &fwd, 10).unwrap();

        assert_eq!(mono.spread.len(), 5);
        assert!(mono.spread.values().iter().all(|s| *s > 0.0));
        assert_eq!(mono.avg_bucket_returns.len(), 10);
        assert!(mono.avg_bucket_returns[9] > mono.avg_bucket_returns[0]);
    }

    #[test]
    fn monotonicity_skips_thin_dates() {
        let scores = Panel::new(dates(1), entities(5), array![[1.0, 2.0, 3.0, 4.0, 5.0]]).unwrap();
        let mono = monotonicity(&scores, &scores, 10).unwrap();
        assert!(mono.spread.is_empty());
        assert!(mono.avg_bucket_returns.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn monotonicity_collapses_tied_buckets() {
        let mut row = vec![0.0; 10];
        row.extend((1..=10).map(f64::from));
        let n = row.len();
        let scores = Panel::new(dates(1), entities(n), Array2::from_shape_vec((1, n), row).unwrap()).unwrap();
        let mono = monotonicity(&scores, &scores, 10).unwrap();

        assert_eq!(mono.spread.len(), 1);
        assert!(mono.avg_bucket_returns[9].is_nan());
    }

    #[test]
    fn zero_buckets_rejected() {
        let scores = Panel::empty();
        assert!(matches!(monotonicity(&scores, &scores, 0), Err(AnalyticsError::InvalidBuckets)));
    }
}
