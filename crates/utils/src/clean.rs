//! Standard cleaning transform.

use factorlab_math::{CenterXSection, Winsorizer, demean_groups};
use factorlab_primitives::{Panel, SectorMap};
use factorlab_traits::{CleaningConfig, CleaningError, CleaningTransform, NeutralizeMethod};
use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::fill_cross_section;

/// Coverage filter, winsorize, fill, sector-neutralize and z-score, date by date.
///
/// Non-finite raw values are treated as missing. Entities absent from the sector map
/// are demeaned together as one group.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCleaner;

impl StandardCleaner {
    /// Create a cleaner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate(config: &CleaningConfig) -> Result<Winsorizer, CleaningError> {
        let (lower, upper) = config.winsor_limits;
        let winsorizer = Winsorizer::new(lower, upper)
            .map_err(|e| CleaningError::InvalidParameter(e.to_string()))?;
        if !(0.0..=1.0).contains(&config.min_coverage) {
            return Err(CleaningError::InvalidParameter(format!(
                "min_coverage must lie in [0, 1], got {}",
                config.min_coverage
            )));
        }
        Ok(winsorizer)
    }
}

impl CleaningTransform for StandardCleaner {
    fn clean(
        &self,
        raw: &Panel,
        sectors: Option<&SectorMap>,
        config: &CleaningConfig,
    ) -> Result<Panel, CleaningError> {
        let winsorizer = Self::validate(config)?;
        let n_entities = raw.n_entities();
        if n_entities == 0 {
            return Ok(raw.clone());
        }

        let groups: Option<Vec<Option<&str>>> = match (config.neutralize_method, sectors) {
            (NeutralizeMethod::Sector, Some(map)) => {
                Some(raw.entities().iter().map(|e| map.get(e).map(String::as_str)).collect())
            }
            _ => None,
        };
        let standardize = CenterXSection::default();

        let mut out = Array2::from_elem((raw.n_dates(), n_entities), f64::NAN);
        let mut dropped = 0usize;
        for (i, row) in raw.values().axis_iter(Axis(0)).enumerate() {
            let row: Array1<f64> = row.mapv(|x| if x.is_finite() { x } else { f64::NAN });
            let observed = row.iter().filter(|x| !x.is_nan()).count();
            if observed == 0 || (observed as f64 / n_entities as f64) < config.min_coverage {
                dropped += 1;
                continue;
            }

            let winsorized = winsorizer
                .apply(&row)
                .map_err(|e| CleaningError::Numerical(e.to_string()))?;
            let filled = fill_cross_section(&winsorized, config.fill_method);
            let neutral = match &groups {
                Some(labels) => demean_groups(&filled, labels),
                None => filled,
            };
            out.row_mut(i).assign(&standardize.apply(&neutral));
        }

        debug!(dates = raw.n_dates(), dropped, "cleaned panel");
        Ok(raw.with_values(out)?)
    }
}
