//! Error types for feed publishing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors that can occur while publishing a package to a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A connection setting needed by the client was not supplied.
    #[error("{0} key found missing in SystemLink Client configuration files.")]
    MissingConfigKey(&'static str),

    /// The package file to upload does not exist or cannot be read.
    #[error("failed to read package {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The named workspace does not exist on the server.
    #[error("workspace '{0}' was not found")]
    WorkspaceNotFound(String),

    /// The named feed does not exist in the selected workspace.
    #[error("feed '{0}' was not found")]
    FeedNotFound(String),

    /// The server rejected a request.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The server response could not be understood.
    #[error("invalid server response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
