//! measpack - Measurement plug-in packaging and publishing
//!
//! This library turns Python measurement plug-in directories into NI package
//! files and optionally publishes them to SystemLink feeds.
//!
//! # Workflow
//!
//! ```text
//! root dir ─► plugin::discover_plugins ─► batch::Selection ─┐
//!                                                           ▼
//!        ┌──────────────── batch::BatchOrchestrator (per plug-in) ───────────────┐
//!        │ plugin::validate ─► package::resolve ─► package::TemplateGenerator    │
//!        │      ─► builder::PackagingTool (nipkg pack) ─► artifact lookup        │
//!        │      ─► feed::FeedPublisher (optional upload)                         │
//!        └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI crate wires these pieces together with a console prompter,
//! a configuration file and logging.

pub mod batch;
pub mod builder;
pub mod config;
pub mod feed;
pub mod logging;
pub mod package;
pub mod plugin;

/// Version of the measpack library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
