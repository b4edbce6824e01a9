//! Choosing the best weighting scheme per composite.

use std::collections::BTreeMap;

use factorlab_analytics::SummaryRecord;

use crate::WeightScheme;

/// For each composite, the scheme whose summary scored highest on `criterion`.
///
/// `runs` maps each scheme to the summaries of one composite run. An undefined value
/// ranks below every defined one. A run missing the metric does not score, and
/// composites with no scored run are omitted. Ties keep the first scheme in order.
#[must_use]
pub fn select_best_weights(
    runs: &BTreeMap<WeightScheme, BTreeMap<String, SummaryRecord>>,
    criterion: &str,
) -> BTreeMap<String, WeightScheme> {
    let mut best: BTreeMap<String, (WeightScheme, f64)> = BTreeMap::new();
    for (scheme, summaries) in runs {
        for (name, summary) in summaries {
            let Some(value) = summary.metric(criterion) else { continue };
            let score = if value.is_nan() { f64::NEG_INFINITY } else { value };
            match best.get(name) {
                Some((_, current)) if *current >= score => {}
                _ => {
                    best.insert(name.clone(), (*scheme, score));
                }
            }
        }
    }
    best.into_iter().map(|(name, (scheme, _))| (name, scheme)).collect()
}
