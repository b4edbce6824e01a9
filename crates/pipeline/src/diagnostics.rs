//! Per-step diagnostics rows.

use factorlab_analytics::AnalyticsBundle;
use factorlab_primitives::Panel;

/// Coverage of a score panel and the headline metrics of its analytics.
#[must_use]
pub fn step_diagnostics(scores: &Panel, bundle: &AnalyticsBundle) -> Vec<(String, f64)> {
    let mut row = vec![
        ("n_dates".to_string(), scores.n_dates() as f64),
        ("n_entities".to_string(), scores.n_entities() as f64),
        ("n_observations".to_string(), scores.n_observations() as f64),
        ("nan_fraction".to_string(), scores.nan_fraction()),
        ("valid_dates".to_string(), scores.valid_dates() as f64),
        ("ic_dates".to_string(), bundle.ic.len() as f64),
    ];
    row.extend(bundle.summary.metrics());
    row
}
