//! Quantiles and equal-frequency bucketing.

/// Linear-interpolation quantile of an ascending slice, `NaN` when empty.
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Linear-interpolation quantile over the finite values of `values`.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(f64::total_cmp);
    quantile_sorted(&finite, q)
}

/// Result of equal-frequency bucketing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    /// Bucket label per input value, `0..n_buckets`, in input order.
    pub labels: Vec<usize>,
    /// Number of buckets after duplicate edges collapsed.
    pub n_buckets: usize,
}

/// Partition finite `values` into `buckets` equal-frequency groups.
///
/// Edges are the linear quantiles at `k / buckets`. Repeated edges collapse, so heavy
/// ties yield fewer buckets. Intervals are right-closed with the lowest edge included,
/// so a value equal to an interior edge always lands in the lower bucket and equal
/// values always share a bucket.
///
/// Returns `None` when fewer than two distinct edges remain.
#[must_use]
pub fn qcut(values: &[f64], buckets: usize) -> Option<Buckets> {
    if buckets == 0 || values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> =
        (0..=buckets).map(|k| quantile_sorted(&sorted, k as f64 / buckets as f64)).collect();
    edges.dedup();
    if edges.len() < 2 {
        return None;
    }
    let n_buckets = edges.len() - 1;

    let labels = values
        .iter()
        .map(|x| edges[1..].partition_point(|e| e < x).min(n_buckets - 1))
        .collect();
    Some(Buckets { labels, n_buckets })
}
