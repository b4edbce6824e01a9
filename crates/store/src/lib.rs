#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod frames;
pub use frames::{long_to_panel, panel_to_long, series_to_frame, frame_to_series};

mod table;
pub use table::MetricTable;

mod artifacts;
pub use artifacts::{ArtifactStore, DIAGNOSTICS_DIR, FACTORS_DIR};

mod registry;
pub use registry::{COMPOSITE_SUMMARY, FACTOR_SUMMARY, Registry, STEP_DIAGNOSTICS};

mod source;
pub use source::{FileDataAccess, FileDataSource, RISK_FACTORS_DATASET, SECTOR_MAP_DATASET};

mod error;
pub use error::StoreError;
