//! User-facing console messages.

pub const STARTED: &str = "Starting the Measurement Plug-In Packager...";
pub const PROCESS_COMPLETED: &str = "Process Completed.";
pub const CHECK_LOG_FILE: &str = "Please check the log file for further details.";
pub const ACCESS_DENIED: &str = "Access is denied. Please run the tool with Admin privileges or provide a different output directory.";
pub const FAILED_PUBLIC_DIR: &str =
    "Failed to get PublicDocuments directory. Using UserDocuments for Log file.";
pub const FAILED_USER_DIR: &str =
    "Failed to get UserDocuments directory. Using the provided directory for Log file.";
pub const INTERACTIVE_MODE_ON: &str = "Interactive mode enabled";
pub const NON_INTERACTIVE_MODE: &str = "Non-interactive mode enabled";
pub const INVALID_PLUGIN: &str = "Invalid Measurement Plug-In folder, as it is missing one or more of the required files: 'measurement.py', 'start.bat', or 'pyproject.toml'.";

pub const AVAILABLE_PLUGINS: &str = "Available measurement plug-ins:";
pub const INVALID_INDEX: &str = "Invalid measurement plug-in number.";
pub const NO_API_KEY: &str =
    "No API Key, Please Provide an API key for uploading the measurement packages.";
pub const NO_FEED_NAME: &str =
    "No feed name, Please provide a valid feed name for uploading the measurement packages.";

pub const ROOT_PROMPT: &str =
    "Enter the parent directory containing the measurement plug-in folders";
pub const UPLOAD_PROMPT: &str = "Do you want to upload the measurement packages to SystemLink feeds?";
pub const API_URL_PROMPT: &str = "Enter the SystemLink API URL";
pub const API_KEY_PROMPT: &str = "Enter the SystemLink API Key";
pub const WORKSPACE_PROMPT: &str = "Enter the workspace name";
pub const FEED_PROMPT: &str = "Enter the feed name";
pub const OVERWRITE_PROMPT: &str = "Do you want to overwrite the existing measurement packages?";
pub const CONTINUE_PROMPT: &str = "Do you want to continue building measurement packages?";
pub const SAME_FEED_PROMPT: &str = "Do you want to use the same feed?";

/// Prompt for plug-in indexes when `count` plug-ins are listed.
pub fn selection_prompt(count: usize) -> String {
    format!(
        "Enter measurement plug-in index number (1-{}) to build [. to build all or comma-separated index numbers, e.g. 1,2,3]",
        count
    )
}

/// Failure line for a package that could not be uploaded.
pub fn upload_failed(package: &str, feed: &str) -> String {
    format!(
        "Failed to upload the package '{}' to SystemLink feed '{}'.",
        package, feed
    )
}

/// A feed connection setting was not supplied.
pub fn missing_config_key(key: &str) -> String {
    format!(
        "The '{}' setting is missing. Provide it on the command line or in the configuration file.",
        key
    )
}

/// Banner line naming the log directory.
pub fn log_file_location(dir: &std::path::Path) -> String {
    format!("Log File Directory: {}", dir.display())
}

/// Debug line naming the tool version.
pub fn version(version: &str) -> String {
    format!("Package Version - {}", version)
}

/// A single plug-in path that is not a directory.
pub fn invalid_plugin_dir(dir: &std::path::Path) -> String {
    format!("Invalid measurement plug-in directory - '{}'", dir.display())
}
