//! Interactive builds.

use std::path::PathBuf;

use measpack::batch::{
    messages, BatchError, BatchOrchestrator, BatchReport, InteractiveSession, Prompter,
    UploadDefaults,
};
use measpack::builder::PackagingTool;
use measpack::config::FeedSettings;
use measpack::feed::FeedClient;
use tracing::debug;

use crate::error::CliError;

/// Ask for the plug-in root, then run build cycles until the user stops.
pub fn run<T: PackagingTool, C: FeedClient, P: Prompter>(
    orchestrator: &BatchOrchestrator<T, C>,
    prompter: &P,
    feed: &FeedSettings,
) -> Result<Vec<BatchReport>, CliError> {
    let root = prompt_root(prompter)?;
    debug!("{}", messages::INTERACTIVE_MODE_ON);

    let session = InteractiveSession::new(orchestrator, prompter)
        .with_credential_policy(feed.credential_policy)
        .with_upload_defaults(UploadDefaults {
            api_url: feed.api_url.clone(),
            workspace: feed.workspace.clone(),
        });
    Ok(session.run(&root)?)
}

/// Read the plug-in root directory. It must already exist.
pub fn prompt_root<P: Prompter>(prompter: &P) -> Result<PathBuf, CliError> {
    let answer = prompter.input(messages::ROOT_PROMPT, None)?;
    let root = PathBuf::from(answer.trim().trim_matches('"'));
    if root.as_os_str().is_empty() || !root.is_dir() {
        return Err(BatchError::InvalidRootDirectory(root).into());
    }
    Ok(root)
}
