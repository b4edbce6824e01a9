#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cross_section;
pub use cross_section::{Monotonicity, autocorrelation, information_coefficient, monotonicity};

mod summary;
pub use summary::{IcSummary, RECENT_IC_WINDOW, SummaryRecord, summarize};

mod long_short;
pub use long_short::{LongShortDiagnostics, LongShortStats, diagnostic_ls_backtest, long_short_returns};

mod regression;
pub use regression::{FactorLoading, RISK_PREMIA, RegressionResult, regress_on_ff};

mod correlation;
pub use correlation::{CORRELATION_COLUMNS, CorrelationMatrix, corr_with_ff, factor_correlation};

mod rolling;
pub use rolling::{RollingIcRow, rolling_ic};

mod bundle;
pub use bundle::{AnalyticsBundle, AnalyticsConfig, compute_all_analytics};

mod error;
pub use error::AnalyticsError;
