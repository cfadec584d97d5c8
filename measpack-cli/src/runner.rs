//! Build invocation: logging, banners, wiring and error reporting.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use measpack::batch::{messages, BatchOrchestrator};
use measpack::builder::{NipkgTool, PackageBuilder};
use measpack::config::ConfigFile;
use measpack::feed::{FeedPublisher, SystemLinkFeedClient};
use measpack::logging::{self, LogLocation};
use measpack::package::TemplateGenerator;
use measpack::VERSION;
use tracing::{debug, error, info, warn};

use crate::commands::args::{BuildArgs, RunMode};
use crate::commands::{build, interactive};
use crate::error::CliError;
use crate::prompt::ConsoleInteraction;

const NO_TERMINAL: &str = "Interactive mode needs a terminal for its prompts.";

type Orchestrator = BatchOrchestrator<NipkgTool, SystemLinkFeedClient>;

/// Run a build invocation.
///
/// Errors returned here happened before logging was up. Anything after
/// that is logged, followed by the completion banner, and turned into
/// the exit code.
pub fn run(args: BuildArgs) -> Result<ExitCode, CliError> {
    let config = ConfigFile::load()?;

    let fallback = args
        .log_fallback()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let location = logging::resolve_log_location(&fallback);
    let _guard = logging::init(&location.directory)?;

    announce(&location);

    let code = match execute(args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    };

    info!("{}", messages::PROCESS_COMPLETED);
    Ok(code)
}

fn announce(location: &LogLocation) {
    info!("{}", messages::STARTED);
    debug!("{}", messages::version(VERSION));
    if !location.public_documents_available {
        info!("{}", messages::FAILED_PUBLIC_DIR);
    }
    if !location.user_documents_available {
        info!("{}", messages::FAILED_USER_DIR);
    }
    info!("{}", messages::log_file_location(&location.directory));
}

fn execute(args: BuildArgs, config: &ConfigFile) -> Result<(), CliError> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.packager.output_dir.clone());
    let tool_path = args
        .tool_path
        .clone()
        .unwrap_or_else(|| config.packager.tool_path.clone());

    let request = args.validate(&config.feed)?;
    let orchestrator = build_orchestrator(config, tool_path, output_dir)?;

    match request.mode {
        RunMode::Interactive => {
            if !ConsoleInteraction::is_available() {
                return Err(CliError::Usage(NO_TERMINAL.to_string()));
            }
            let prompter = ConsoleInteraction::new();
            interactive::run(&orchestrator, &prompter, &config.feed)?;
        }
        RunMode::Single(plugin) => {
            build::run_single(&orchestrator, &plugin, request.upload.as_ref());
        }
        RunMode::Batch { root, selection } => {
            build::run_selection(&orchestrator, &root, &selection, request.upload.as_ref())?;
        }
    }

    Ok(())
}

fn build_orchestrator(
    config: &ConfigFile,
    tool_path: PathBuf,
    output_dir: PathBuf,
) -> Result<Orchestrator, CliError> {
    debug!("Packaging tool: {}", tool_path.display());
    debug!("Output directory: {}", output_dir.display());

    let generator = TemplateGenerator::new(config.packager.install_root.clone());
    let builder =
        PackageBuilder::new(NipkgTool::new(tool_path), generator).with_output_root(output_dir);
    let publisher = FeedPublisher::new(SystemLinkFeedClient::new()?);
    Ok(BatchOrchestrator::new(builder, publisher))
}

fn report(err: &CliError) {
    debug!(error = ?err, "Run aborted");

    if err.is_permission_denied() {
        info!("{}", messages::ACCESS_DENIED);
    } else if err.is_input_error() {
        warn!("{}", err);
    } else {
        error!("{}", err);
        info!("{}", messages::CHECK_LOG_FILE);
    }
}
