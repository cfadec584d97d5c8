//! CLI error type.

use std::fmt;
use std::io;

use measpack::batch::BatchError;
use measpack::config::ConfigError;
use measpack::feed::FeedError;
use measpack::logging::LoggingError;

/// Errors that end a CLI invocation.
#[derive(Debug)]
pub enum CliError {
    /// Invalid combination of command-line arguments.
    Usage(String),
    /// A path argument does not name a usable directory.
    InvalidDirectory(String),
    /// Bad configuration key or value.
    Config(String),
    ConfigFile(ConfigError),
    Logging(LoggingError),
    Batch(BatchError),
    Feed(FeedError),
    Io(io::Error),
}

impl CliError {
    /// Input errors are reported without the log-file hint.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CliError::Usage(_)
                | CliError::InvalidDirectory(_)
                | CliError::Config(_)
                | CliError::Batch(BatchError::InvalidRootDirectory(_))
                | CliError::Batch(BatchError::InvalidSelection { .. })
                | CliError::Batch(BatchError::InvalidInput(_))
        )
    }

    /// True when an I/O failure was refused by the operating system.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            CliError::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            CliError::Logging(LoggingError::CreateDirFailed { source, .. }) => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::InvalidDirectory(msg) => write!(f, "{}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to set up logging: {}", e),
            CliError::Batch(e) => write!(f, "{}", e),
            CliError::Feed(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Batch(e) => Some(e),
            CliError::Feed(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<BatchError> for CliError {
    fn from(e: BatchError) -> Self {
        CliError::Batch(e)
    }
}

impl From<FeedError> for CliError {
    fn from(e: FeedError) -> Self {
        CliError::Feed(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_input_errors() {
        assert!(CliError::Usage("x".into()).is_input_error());
        assert!(CliError::Batch(BatchError::InvalidRootDirectory(PathBuf::from("/x"))).is_input_error());
        assert!(!CliError::Io(io::Error::other("boom")).is_input_error());
    }

    #[test]
    fn test_permission_denied() {
        let err = CliError::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.is_permission_denied());
        assert!(!CliError::Usage("x".into()).is_permission_denied());
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        let err = CliError::from(io::Error::other("disk"));
        assert!(err.source().is_some());
        assert!(CliError::Config("bad".into()).source().is_none());
    }
}
