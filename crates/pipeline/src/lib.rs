#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod pool;
pub use pool::WorkerPool;

mod diagnostics;
pub use diagnostics::step_diagnostics;

mod orchestrator;
pub use orchestrator::{Correlations, FactorRun, Orchestrator, RunReport, analytics_config};

mod composites;
pub use composites::{CompositeRun, WeightInputs, WeightSelection};

mod error;
pub use error::PipelineError;

#[cfg(test)]
mod testing;

/// Re-export commonly used types.
pub mod prelude {
    pub use factorlab_config::Settings;
    pub use factorlab_store::ArtifactStore;
    pub use factorlab_traits::{CleaningTransform, DataSource, Factor};

    pub use super::{FactorRun, Orchestrator, PipelineError, WeightInputs};
}
