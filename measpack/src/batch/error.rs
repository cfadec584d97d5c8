//! Error types for batch runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that abort a batch before or between builds.
///
/// Per-plug-in build and upload failures never surface here; they are
/// recorded in the batch report instead.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The root directory is missing, unreadable, or holds no valid plug-ins.
    #[error("Invalid measurement plug-in base directory - '{}'. Please provide the parent directory containing measurement plug-in folders.", .0.display())]
    InvalidRootDirectory(PathBuf),

    /// A selected name is not a valid plug-in under the root.
    #[error("Invalid plug-in name '{token}' provided in the selection. Please enter comma-separated names (e.g. sample_measurement,test_measurement) or '.' to build all plug-ins.")]
    InvalidSelection { token: String },

    /// Required interactive input was left empty.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// Reading from the prompter failed.
    #[error("failed to read input: {0}")]
    Prompt(#[from] io::Error),
}
