//! Error types for the package builder.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::package::{MetadataError, TemplateError};

/// Result type for builder operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that can occur while building a package.
#[derive(Debug)]
pub enum BuildError {
    /// Metadata could not be resolved.
    Metadata(MetadataError),

    /// The template could not be laid out.
    Template(TemplateError),

    /// Failed to create an output directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to list an output directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// The packaging tool could not be started.
    ToolNotFound { path: PathBuf, source: io::Error },

    /// The packaging tool exited with a failure status.
    Subprocess {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl BuildError {
    /// Returns true if the failure came from a permission-denied I/O error
    /// anywhere in the error chain.
    pub fn is_permission_denied(&self) -> bool {
        let mut current: Option<&(dyn Error + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(io_err) = err.downcast_ref::<io::Error>() {
                if io_err.kind() == io::ErrorKind::PermissionDenied {
                    return true;
                }
            }
            current = err.source();
        }
        false
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Metadata(e) => write!(f, "{}", e),
            BuildError::Template(e) => write!(f, "{}", e),
            BuildError::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            BuildError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            BuildError::ToolNotFound { path, source } => {
                write!(
                    f,
                    "packaging tool '{}' could not be started: {}",
                    path.display(),
                    source
                )
            }
            BuildError::Subprocess {
                command, exit_code, ..
            } => match exit_code {
                Some(code) => write!(
                    f,
                    "Command '{}' returned non-zero exit status {}.",
                    command, code
                ),
                None => write!(f, "Command '{}' was terminated by a signal.", command),
            },
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BuildError::Metadata(e) => Some(e),
            BuildError::Template(e) => Some(e),
            BuildError::CreateDirFailed { source, .. } => Some(source),
            BuildError::ReadFailed { source, .. } => Some(source),
            BuildError::ToolNotFound { source, .. } => Some(source),
            BuildError::Subprocess { .. } => None,
        }
    }
}

impl From<MetadataError> for BuildError {
    fn from(err: MetadataError) -> Self {
        BuildError::Metadata(err)
    }
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        BuildError::Template(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_display() {
        let err = BuildError::Subprocess {
            command: "nipkg pack a b".to_string(),
            exit_code: Some(3),
            stderr: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'nipkg pack a b' returned non-zero exit status 3."
        );
    }

    #[test]
    fn test_permission_denied_direct() {
        let err = BuildError::CreateDirFailed {
            path: PathBuf::from("/protected"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_permission_denied_through_template_error() {
        let err = BuildError::from(TemplateError::WriteFailed {
            path: PathBuf::from("/protected/control"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_other_io_error_is_not_permission_denied() {
        let err = BuildError::ReadFailed {
            path: PathBuf::from("/out"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(!err.is_permission_denied());
    }

    #[test]
    fn test_subprocess_has_no_source() {
        let err = BuildError::Subprocess {
            command: "nipkg".to_string(),
            exit_code: None,
            stderr: String::new(),
        };
        assert!(err.source().is_none());
        assert!(!err.is_permission_denied());
    }
}
