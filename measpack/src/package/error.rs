//! Error types for metadata resolution and template generation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for metadata resolution.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Result type for template generation.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while reading plug-in metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The plug-in has no `pyproject.toml`.
    #[error("The 'pyproject.toml' file is not found in '{}'", .0.display())]
    MissingMetadataFile(PathBuf),

    /// The metadata file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The metadata file is not valid TOML or lacks a project table.
    #[error("malformed metadata in {}: {reason}", path.display())]
    MalformedMetadata { path: PathBuf, reason: String },
}

/// Errors that can occur while laying out a package template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A stale template directory could not be removed.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A template directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A plug-in directory could not be listed.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A plug-in file could not be copied into the payload.
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A descriptor file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
