//! Rolling IC for time-varying performance.

use factorlab_math::{rolling_mean, rolling_std};
use factorlab_primitives::{Date, DateSeries};

/// One sampled point of the rolling IC table.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingIcRow {
    /// Factor name.
    pub factor: String,
    /// Date at the end of the window.
    pub date: Date,
    /// Mean IC over the window.
    pub rolling_mean_ic: f64,
    /// Mean IC over its standard deviation within the window.
    pub rolling_ic_ir: f64,
}

/// Rolling mean IC and IC information ratio over full windows of `window` points,
/// sampled at every `step`-th position of the IC series.
///
/// Positions whose window is incomplete are dropped after sampling.
#[must_use]
pub fn rolling_ic(factor: &str, ic: &DateSeries, window: usize, step: usize) -> Vec<RollingIcRow> {
    let means = rolling_mean(ic.values(), window);
    let stds = rolling_std(ic.values(), window);
    (0..ic.len())
        .step_by(step.max(1))
        .filter(|&pos| !means[pos].is_nan())
        .map(|pos| RollingIcRow {
            factor: factor.to_string(),
            date: ic.dates()[pos],
            rolling_mean_ic: means[pos],
            rolling_ic_ir: means[pos] / stds[pos],
        })
        .collect()
}
