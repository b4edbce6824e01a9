#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod stats;
pub use stats::{mean, median, nan_mean, nan_std, sample_std};

mod rank;
pub use rank::{CorrelationMethod, average_ranks, pearson, spearman};

mod quantile;
pub use quantile::{Buckets, qcut, quantile, quantile_sorted};

mod performance;
pub use performance::{TRADING_DAYS_PER_YEAR, max_drawdown, sharpe_ratio};

mod rolling;
pub use rolling::{rolling_mean, rolling_std};

mod cross_section;
pub use cross_section::{CenterXSection, demean_groups};

mod winsorize;
pub use winsorize::{Winsorizer, winsorize};

mod linalg;
pub use linalg::{OlsResult, invert, ols, pinv_symmetric};

mod error;
pub use error::MathError;
