#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod panel;
pub use panel::{ForwardReturnMatrix, Panel, ScoreMatrix};

mod series;
pub use series::DateSeries;

mod risk;
pub use risk::{AlignedRows, RiskFactorMatrix};

mod error;
pub use error::PrimitivesError;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;

/// Mapping from entity id to sector label.
pub type SectorMap = std::collections::HashMap<String, String>;
