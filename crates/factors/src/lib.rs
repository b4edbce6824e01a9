#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod window;

mod momentum;
pub use momentum::{MomentumConfig, MomentumFactor};

mod high52w;
pub use high52w::{High52wProximityConfig, High52wProximityFactor};

mod downside_vol;
pub use downside_vol::{DownsideVolConfig, DownsideVolFactor};

use factorlab_traits::Factor;

/// Dataset the price factors read by default.
pub const PRICE_DATASET: &str = "price_daily";

/// Every factor computed by a default run.
#[must_use]
pub fn default_factors() -> Vec<Box<dyn Factor>> {
    vec![
        Box::new(MomentumFactor::default()),
        Box::new(High52wProximityFactor::default()),
        Box::new(DownsideVolFactor::default()),
    ]
}
