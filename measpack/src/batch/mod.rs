//! Batch orchestration.
//!
//! # Overview
//!
//! - **Selection**: which plug-ins under a root to build (`.` or names)
//! - **BatchOrchestrator**: builds, then optionally publishes, each
//!   plug-in in isolation and returns a [`BatchReport`]
//! - **InteractiveSession**: prompt-driven loop of select, build and
//!   publish cycles
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use measpack::batch::{BatchOrchestrator, Selection};
//! use measpack::builder::{NipkgTool, PackageBuilder};
//! use measpack::feed::{FeedPublisher, SystemLinkFeedClient};
//! use measpack::package::TemplateGenerator;
//!
//! let builder = PackageBuilder::new(NipkgTool::default(), TemplateGenerator::default())
//!     .with_output_root("build");
//! let publisher = FeedPublisher::new(SystemLinkFeedClient::new()?);
//! let orchestrator = BatchOrchestrator::new(builder, publisher);
//!
//! let plugins = Selection::parse("sample_meas,dc_meas").resolve(Path::new("plugins"))?;
//! let report = orchestrator.run_batch(&plugins, None);
//! println!("{} packages built", report.built());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod interactive;
pub mod messages;
mod orchestrator;
mod selection;

pub use error::{BatchError, BatchResult};
pub use interactive::{InteractiveSession, Prompter, UploadDefaults, MAX_SELECTION_ATTEMPTS};
pub use orchestrator::{
    BatchOrchestrator, BatchReport, BuildOutcome, FailureKind, PluginReport, PublishOutcome,
    SkipReason,
};
pub use selection::{available_plugins, log_available, parse_index_selection, Selection, SELECT_ALL};
