//! Per-plug-in build and publish loop.
//!
//! Each plug-in in a batch is processed in isolation: a failure is logged,
//! recorded in its [`PluginReport`] and the loop moves on to the next
//! plug-in. Nothing a single plug-in does can abort the batch.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use super::messages;
use crate::builder::{BuildError, BuildStatus, PackageBuilder, PackagingTool};
use crate::feed::{FeedClient, FeedError, FeedPublisher, UploadConfig, UploadResponse};
use crate::plugin::{self, ValidationResult};

/// Category of a build failure, used to pick the user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// An output location could not be written.
    PermissionDenied,
    /// The packaging tool exited with an error.
    Subprocess,
    /// Anything else (metadata, I/O, tool launch).
    Other,
}

impl FailureKind {
    fn of(err: &BuildError) -> Self {
        if err.is_permission_denied() {
            FailureKind::PermissionDenied
        } else if matches!(err, BuildError::Subprocess { .. }) {
            FailureKind::Subprocess
        } else {
            FailureKind::Other
        }
    }
}

/// Why a plug-in produced no package without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidPlugin(ValidationResult),
    NoOutputRoot,
    NoArtifact,
}

/// Build result for one plug-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built(PathBuf),
    Skipped(SkipReason),
    Failed { kind: FailureKind, message: String },
}

/// Upload result for one plug-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Uploads were not requested, or there was nothing to upload.
    NotAttempted,
    Published(UploadResponse),
    Failed(String),
}

/// What happened to one plug-in in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReport {
    pub plugin: PathBuf,
    pub build: BuildOutcome,
    pub publish: PublishOutcome,
}

/// Reports for every plug-in in a batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub plugins: Vec<PluginReport>,
}

impl BatchReport {
    pub fn built(&self) -> usize {
        self.count(|r| matches!(r.build, BuildOutcome::Built(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r.build, BuildOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r.build, BuildOutcome::Failed { .. }))
    }

    pub fn published(&self) -> usize {
        self.count(|r| matches!(r.publish, PublishOutcome::Published(_)))
    }

    pub fn publish_failed(&self) -> usize {
        self.count(|r| matches!(r.publish, PublishOutcome::Failed(_)))
    }

    /// Built packages, in processing order.
    pub fn artifacts(&self) -> Vec<&Path> {
        self.plugins
            .iter()
            .filter_map(|r| match &r.build {
                BuildOutcome::Built(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    /// True when no build or upload failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.publish_failed() == 0
    }

    fn count(&self, predicate: impl Fn(&PluginReport) -> bool) -> usize {
        self.plugins.iter().filter(|r| predicate(r)).count()
    }
}

/// Runs build and optional upload over a list of plug-ins.
#[derive(Debug)]
pub struct BatchOrchestrator<T: PackagingTool, C: FeedClient> {
    builder: PackageBuilder<T>,
    publisher: FeedPublisher<C>,
}

impl<T: PackagingTool, C: FeedClient> BatchOrchestrator<T, C> {
    pub fn new(builder: PackageBuilder<T>, publisher: FeedPublisher<C>) -> Self {
        Self { builder, publisher }
    }

    pub fn builder(&self) -> &PackageBuilder<T> {
        &self.builder
    }

    pub fn publisher(&self) -> &FeedPublisher<C> {
        &self.publisher
    }

    /// Process each plug-in in order.
    ///
    /// When `upload` is given, every successfully built package is
    /// published with it.
    pub fn run_batch(&self, plugins: &[PathBuf], upload: Option<&UploadConfig>) -> BatchReport {
        let reports: Vec<PluginReport> = plugins
            .iter()
            .map(|plugin| self.run_one(plugin, upload))
            .collect();
        let report = BatchReport { plugins: reports };

        info!(
            "Batch finished: {} built, {} skipped, {} failed",
            report.built(),
            report.skipped(),
            report.failed()
        );
        if upload.is_some() {
            info!(
                "{} uploaded, {} upload failures",
                report.published(),
                report.publish_failed()
            );
        }
        report
    }

    /// Build (and maybe publish) a single plug-in.
    pub fn run_one(&self, plugin: &Path, upload: Option<&UploadConfig>) -> PluginReport {
        info!(
            "Building the package for the measurement plug-in '{}'...",
            plugin::plugin_name(plugin)
        );

        let build = match self.builder.build(plugin) {
            Ok(BuildStatus::Built(artifact)) => {
                info!(
                    "Package for '{}' built successfully at '{}'",
                    plugin::plugin_name(plugin),
                    artifact.display()
                );
                BuildOutcome::Built(artifact)
            }
            Ok(BuildStatus::InvalidPlugin(validation)) => {
                info!("{}", messages::INVALID_PLUGIN);
                BuildOutcome::Skipped(SkipReason::InvalidPlugin(validation))
            }
            Ok(BuildStatus::NoOutputRoot) => BuildOutcome::Skipped(SkipReason::NoOutputRoot),
            Ok(BuildStatus::NoArtifact) => BuildOutcome::Skipped(SkipReason::NoArtifact),
            Err(err) => report_build_failure(plugin, &err),
        };

        let publish = match (&build, upload) {
            (BuildOutcome::Built(artifact), Some(config)) => self.publish(artifact, config),
            _ => PublishOutcome::NotAttempted,
        };

        PluginReport {
            plugin: plugin.to_path_buf(),
            build,
            publish,
        }
    }

    fn publish(&self, artifact: &Path, config: &UploadConfig) -> PublishOutcome {
        match self.publisher.publish(artifact, config) {
            Ok(response) => PublishOutcome::Published(response),
            Err(err) => {
                let name = artifact
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                report_publish_failure(&name, config.feed_name(), &err);
                PublishOutcome::Failed(err.to_string())
            }
        }
    }
}

fn report_publish_failure(package: &str, feed: &str, err: &FeedError) {
    debug!(package, feed, error = ?err, "Upload failed");
    error!("{}", messages::upload_failed(package, feed));

    match err {
        FeedError::Api { message, .. } => error!("{}", message),
        FeedError::MissingConfigKey(key) => error!("{}", messages::missing_config_key(key)),
        FeedError::ReadFailed { .. }
        | FeedError::WorkspaceNotFound(_)
        | FeedError::FeedNotFound(_)
        | FeedError::InvalidResponse(_)
        | FeedError::Http(_) => {
            error!("{}", err);
            info!("{}", messages::CHECK_LOG_FILE);
        }
    }
}

fn report_build_failure(plugin: &Path, err: &BuildError) -> BuildOutcome {
    let kind = FailureKind::of(err);
    debug!(plugin = %plugin.display(), error = ?err, "Build failed");

    match kind {
        FailureKind::PermissionDenied => error!("{}", messages::ACCESS_DENIED),
        FailureKind::Subprocess => {
            error!("{}", err);
            if let BuildError::Subprocess { stderr, .. } = err {
                if !stderr.is_empty() {
                    debug!("{}", stderr);
                }
            }
            info!("{}", messages::CHECK_LOG_FILE);
        }
        FailureKind::Other => {
            error!("{}", err);
            info!("{}", messages::CHECK_LOG_FILE);
        }
    }

    BuildOutcome::Failed {
        kind,
        message: err.to_string(),
    }
}
