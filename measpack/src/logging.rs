//! Logging setup.
//!
//! Two sinks are installed for the lifetime of one invocation:
//!
//! - console (stdout): INFO and above, `<time> | <message>`
//! - file: DEBUG and above (or `RUST_LOG`), daily rolling `measpack.log`,
//!   at most [`MAX_LOG_FILES`] files kept
//!
//! The file sink writes through a background worker. Keep the returned
//! [`LogGuard`] alive until exit so buffered lines are flushed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::time::{FormatTime, LocalTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Directory created under the documents folder for log files.
pub const LOG_SUBDIR: &str = "Measurement-Plugin-Packager";

/// Number of rotated log files kept.
pub const MAX_LOG_FILES: usize = 20;

const LOG_FILE_PREFIX: &str = "measpack";
const LOG_FILE_SUFFIX: &str = "log";
// The library and the `measpack` binary share the `measpack` target prefix.
const DEFAULT_FILE_FILTER: &str = "measpack=debug";

/// Result type for logging setup.
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Errors that can occur while installing the log sinks.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file in {}: {reason}", path.display())]
    Appender { path: PathBuf, reason: String },

    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

/// Where logs go and which preferred locations were unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLocation {
    pub directory: PathBuf,
    pub public_documents_available: bool,
    pub user_documents_available: bool,
}

/// Pick the log directory.
///
/// Prefers the public documents folder, then the user's documents folder,
/// then `fallback`. The chosen base gets `<LOG_SUBDIR>/Logs` appended.
pub fn resolve_log_location(fallback: &Path) -> LogLocation {
    let public = dirs::public_dir().map(|p| p.join("Documents"));
    let user = dirs::document_dir();
    locate(public, user, fallback)
}

fn locate(public: Option<PathBuf>, user: Option<PathBuf>, fallback: &Path) -> LogLocation {
    let public_documents_available = public.is_some();
    let user_documents_available = public_documents_available || user.is_some();
    let base = public
        .or(user)
        .unwrap_or_else(|| fallback.to_path_buf());

    LogLocation {
        directory: base.join(LOG_SUBDIR).join("Logs"),
        public_documents_available,
        user_documents_available,
    }
}

/// Console lines: `<time> | <message>`.
struct ConsoleFormat<T> {
    timer: T,
}

impl<S, N, T> FormatEvent<S, N> for ConsoleFormat<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    T: FormatTime,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(writer, " | ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Keeps the file sink alive. Dropping it flushes pending log lines.
#[derive(Debug)]
pub struct LogGuard {
    _worker: WorkerGuard,
    directory: PathBuf,
}

impl LogGuard {
    /// Directory holding the log files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Install the console and file sinks as the global subscriber.
///
/// # Errors
///
/// Fails if the directory or log file cannot be created, or a global
/// subscriber is already set.
pub fn init(log_dir: &Path) -> LoggingResult<LogGuard> {
    fs::create_dir_all(log_dir).map_err(|e| LoggingError::CreateDirFailed {
        path: log_dir.to_path_buf(),
        source: e,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| LoggingError::Appender {
            path: log_dir.to_path_buf(),
            reason: e.to_string(),
        })?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILE_FILTER));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(timer.clone())
        .with_filter(file_filter);

    let console_layer = fmt::layer()
        .with_writer(io::stdout)
        .event_format(ConsoleFormat { timer })
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(LogGuard {
        _worker: worker,
        directory: log_dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_filter_targets_measpack() {
        let filter = EnvFilter::try_new(DEFAULT_FILE_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("measpack=debug"));
        assert!(!rendered.contains("measpack_cli"));
    }

    #[test]
    fn test_prefers_public_documents() {
        let location = locate(
            Some(PathBuf::from("/public/Documents")),
            Some(PathBuf::from("/home/me/Documents")),
            Path::new("/fallback"),
        );
        assert_eq!(
            location.directory,
            PathBuf::from("/public/Documents/Measurement-Plugin-Packager/Logs")
        );
        assert!(location.public_documents_available);
        assert!(location.user_documents_available);
    }

    #[test]
    fn test_falls_back_to_user_documents() {
        let location = locate(None, Some(PathBuf::from("/home/me/Documents")), Path::new("/fb"));
        assert!(location.directory.starts_with("/home/me/Documents"));
        assert!(!location.public_documents_available);
        assert!(location.user_documents_available);
    }

    #[test]
    fn test_falls_back_to_given_path() {
        let location = locate(None, None, Path::new("/plugins/sample"));
        assert_eq!(
            location.directory,
            PathBuf::from("/plugins/sample/Measurement-Plugin-Packager/Logs")
        );
        assert!(!location.user_documents_available);
    }
}
