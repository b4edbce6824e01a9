#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod weights;
pub use weights::{WeightMap, WeightScheme, compute_weights, ic_ir_map, ls_vol_map};

mod builder;
pub use builder::{CompositeSpec, SPARSE_EVENT_COMPOSITE, build_composite, build_composites};

mod selection;
pub use selection::select_best_weights;

mod error;
pub use error::CompositeError;
