//! # factorlab
//!
//! Factor research engine: cross-sectional analytics, long-short backtests, risk-premia
//! regression, composite construction and the orchestrator that ties them together.
//!
//! This crate provides a unified interface to the factorlab components.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Panels, date series and risk-factor matrices
//! - `traits`: Data access, cleaning and factor contracts
//! - `math`: Time-series and cross-sectional statistics
//! - `config`: JSON settings and the layered parameter resolver
//! - `analytics`: IC, long-short, regression, correlation and rolling analytics
//! - `composite`: Weighting schemes and composite construction
//! - `store`: Parquet/CSV artifacts, registries and file-backed data access
//! - `utils`: The standard cleaning transform
//! - `factors`: Concrete price factors
//! - `pipeline`: The orchestrator and worker pool
//! - `cli`: The `factorlab` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use factorlab::pipeline::prelude::*;
//! use factorlab::store::FileDataSource;
//!
//! let settings = Arc::new(Settings::load("config/config.json")?);
//! let source = Arc::new(FileDataSource::new("data"));
//! let orchestrator = Orchestrator::new(settings, source, ArtifactStore::new("results"));
//! let report = orchestrator.run_all()?;
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorlab/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use factorlab_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use factorlab_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use factorlab_math as math;
#[cfg(feature = "config")]
#[doc(inline)]
pub use factorlab_config as config;
#[cfg(feature = "analytics")]
#[doc(inline)]
pub use factorlab_analytics as analytics;
#[cfg(feature = "composite")]
#[doc(inline)]
pub use factorlab_composite as composite;
#[cfg(feature = "store")]
#[doc(inline)]
pub use factorlab_store as store;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use factorlab_utils as utils;
#[cfg(feature = "factors")]
#[doc(inline)]
pub use factorlab_factors as factors;
#[cfg(feature = "pipeline")]
#[doc(inline)]
pub use factorlab_pipeline as pipeline;
