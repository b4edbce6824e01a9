#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod settings;
pub use settings::{DEFAULT_CONFIG_PATH, PipelineSettings, Settings};

mod error;
pub use error::ConfigError;
