#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod data;
pub use data::{DataAccess, DataError, DataSource};

mod cleaning;
pub use cleaning::{CleaningConfig, CleaningError, CleaningTransform, FillMethod, NeutralizeMethod};

mod factor;
pub use factor::{Factor, FactorError, FactorParams, compute_factor};
