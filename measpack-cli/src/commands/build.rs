//! Non-interactive builds.

use std::path::Path;

use measpack::batch::{messages, BatchOrchestrator, BatchReport, Selection};
use measpack::builder::PackagingTool;
use measpack::feed::{FeedClient, UploadConfig};
use tracing::debug;

use crate::error::CliError;

/// Build (and maybe upload) a single plug-in directory.
pub fn run_single<T: PackagingTool, C: FeedClient>(
    orchestrator: &BatchOrchestrator<T, C>,
    plugin: &Path,
    upload: Option<&UploadConfig>,
) -> BatchReport {
    debug!(
        "{}. Measurement plug-in directory: {}",
        messages::NON_INTERACTIVE_MODE,
        plugin.display()
    );
    orchestrator.run_batch(&[plugin.to_path_buf()], upload)
}

/// Build the plug-ins a selection names under `root`.
///
/// The whole selection is checked before the first build starts.
pub fn run_selection<T: PackagingTool, C: FeedClient>(
    orchestrator: &BatchOrchestrator<T, C>,
    root: &Path,
    selection: &Selection,
    upload: Option<&UploadConfig>,
) -> Result<BatchReport, CliError> {
    debug!(
        "{}. Measurement plug-in base directory: {}",
        messages::NON_INTERACTIVE_MODE,
        root.display()
    );
    let plugins = selection.resolve(root)?;
    Ok(orchestrator.run_batch(&plugins, upload))
}
