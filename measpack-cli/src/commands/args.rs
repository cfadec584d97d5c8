//! Build arguments and their validation.
//!
//! All combination rules are checked here, before any logging of build
//! progress or any build starts.

use std::path::{Path, PathBuf};

use clap::Args;
use measpack::batch::{BatchError, Selection};
use measpack::batch::messages;
use measpack::config::FeedSettings;
use measpack::feed::UploadConfig;

use crate::error::CliError;

pub const DIR_NOT_REQUIRED: &str = "None of the following options are required for 'Interactive mode': '--plugin-dir', '--base-dir', '--selected-plugins' or the upload options.";
pub const PLUGIN_DIR_REQUIRED: &str =
    "Either '--plugin-dir' or '--base-dir' with '--selected-plugins' arguments are required.";
pub const UPLOAD_SWITCH_REQUIRED: &str =
    "Please provide the argument '-u or --upload-packages' for uploading the packages.";

/// Options for building (and uploading) packages.
#[derive(Debug, Default, Args)]
pub struct BuildArgs {
    /// Interactive mode to build measurement plug-ins placed in a directory
    #[arg(short = 'i', long = "interactive-mode")]
    pub interactive: bool,

    /// Measurement plug-in directory
    #[arg(short = 'p', long, value_name = "DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Measurement plug-in base directory
    #[arg(short = 'b', long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Comma-separated list of measurement plug-ins, or '.' for all of them
    #[arg(short = 's', long = "selected-plugins", value_name = "NAMES")]
    pub selected_plugins: Option<String>,

    /// Upload the measurement packages to a SystemLink feed
    #[arg(short = 'u', long = "upload-packages")]
    pub upload: bool,

    /// SystemLink API URL (defaults to feed.api_url in config.ini)
    #[arg(short = 'a', long, value_name = "URL")]
    pub api_url: Option<String>,

    /// SystemLink API key
    #[arg(short = 'k', long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Workspace to upload the packages to (defaults to feed.workspace in config.ini)
    #[arg(short = 'w', long, value_name = "NAME")]
    pub workspace: Option<String>,

    /// Feed to upload the packages to
    #[arg(short = 'f', long, value_name = "NAME")]
    pub feed_name: Option<String>,

    /// Overwrite existing packages in the feed
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Directory for templates and built packages (overrides packager.output_dir)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Packaging tool executable (overrides packager.tool_path)
    #[arg(long, value_name = "PATH")]
    pub tool_path: Option<PathBuf>,
}

/// What to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Single(PathBuf),
    Batch { root: PathBuf, selection: Selection },
}

/// Validated arguments.
#[derive(Debug)]
pub struct RunRequest {
    pub mode: RunMode,
    pub upload: Option<UploadConfig>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BuildArgs {
    /// Directory to fall back on for log files when no documents folder
    /// exists.
    pub fn log_fallback(&self) -> Option<&Path> {
        self.plugin_dir.as_deref().or(self.base_dir.as_deref())
    }

    fn has_upload_options(&self) -> bool {
        self.upload
            || self.overwrite
            || present(&self.api_url)
            || present(&self.api_key)
            || present(&self.workspace)
            || present(&self.feed_name)
    }

    /// Check argument combinations and build the run request.
    ///
    /// `feed` supplies the API URL and workspace when the flags are absent.
    pub fn validate(self, feed: &FeedSettings) -> Result<RunRequest, CliError> {
        if self.interactive {
            if self.plugin_dir.is_some()
                || self.base_dir.is_some()
                || present(&self.selected_plugins)
                || self.has_upload_options()
            {
                return Err(CliError::Usage(DIR_NOT_REQUIRED.to_string()));
            }
            return Ok(RunRequest {
                mode: RunMode::Interactive,
                upload: None,
            });
        }

        let mode = self.resolve_mode()?;
        let upload = self.upload_config(feed)?;
        Ok(RunRequest { mode, upload })
    }

    fn resolve_mode(&self) -> Result<RunMode, CliError> {
        let batch = self.base_dir.is_some() && present(&self.selected_plugins);
        let partial_batch = self.base_dir.is_some() || present(&self.selected_plugins);

        match (&self.plugin_dir, batch) {
            (Some(plugin_dir), false) if !partial_batch => {
                if !plugin_dir.is_dir() {
                    return Err(CliError::InvalidDirectory(messages::invalid_plugin_dir(
                        plugin_dir,
                    )));
                }
                Ok(RunMode::Single(plugin_dir.clone()))
            }
            (None, true) => {
                let root = self.base_dir.clone().unwrap_or_default();
                if !root.is_dir() {
                    return Err(BatchError::InvalidRootDirectory(root).into());
                }
                let selection = Selection::parse(self.selected_plugins.as_deref().unwrap_or(""));
                Ok(RunMode::Batch { root, selection })
            }
            _ => Err(CliError::Usage(PLUGIN_DIR_REQUIRED.to_string())),
        }
    }

    fn upload_config(&self, feed: &FeedSettings) -> Result<Option<UploadConfig>, CliError> {
        if !self.upload {
            if self.has_upload_options() {
                return Err(CliError::Usage(UPLOAD_SWITCH_REQUIRED.to_string()));
            }
            return Ok(None);
        }

        let api_key = non_blank(self.api_key.clone())
            .ok_or_else(|| CliError::Usage(messages::NO_API_KEY.to_string()))?;
        let feed_name = non_blank(self.feed_name.clone())
            .ok_or_else(|| CliError::Usage(messages::NO_FEED_NAME.to_string()))?;

        Ok(Some(
            UploadConfig::new(api_key, feed_name)
                .with_api_url(non_blank(self.api_url.clone()).or_else(|| feed.api_url.clone()))
                .with_workspace(
                    non_blank(self.workspace.clone()).or_else(|| feed.workspace.clone()),
                )
                .with_overwrite(self.overwrite),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: BuildArgs,
    }

    fn parse(argv: &[&str]) -> BuildArgs {
        let mut full = vec!["measpack"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    fn validate(argv: &[&str]) -> Result<RunRequest, CliError> {
        parse(argv).validate(&FeedSettings::default())
    }

    fn usage_message(result: Result<RunRequest, CliError>) -> String {
        match result {
            Err(CliError::Usage(msg)) => msg,
            other => panic!("expected usage error, got {:?}", other),
        }
    }

    #[test]
    fn test_interactive_alone() {
        let request = validate(&["-i"]).unwrap();
        assert_eq!(request.mode, RunMode::Interactive);
        assert!(request.upload.is_none());
    }

    #[test]
    fn test_interactive_rejects_paths_and_upload_options() {
        assert_eq!(usage_message(validate(&["-i", "-p", "x"])), DIR_NOT_REQUIRED);
        assert_eq!(usage_message(validate(&["-i", "-s", "."])), DIR_NOT_REQUIRED);
        assert_eq!(usage_message(validate(&["-i", "-u"])), DIR_NOT_REQUIRED);
        assert_eq!(usage_message(validate(&["-i", "-f", "feed"])), DIR_NOT_REQUIRED);
    }

    #[test]
    fn test_interactive_allows_output_dir() {
        let request = validate(&["-i", "--output-dir", "out"]).unwrap();
        assert_eq!(request.mode, RunMode::Interactive);
    }

    #[test]
    fn test_nothing_given() {
        assert_eq!(usage_message(validate(&[])), PLUGIN_DIR_REQUIRED);
    }

    #[test]
    fn test_base_dir_without_selection() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_str().unwrap();
        assert_eq!(usage_message(validate(&["-b", root])), PLUGIN_DIR_REQUIRED);
        assert_eq!(usage_message(validate(&["-b", root, "-s", "  "])), PLUGIN_DIR_REQUIRED);
    }

    #[test]
    fn test_plugin_dir_and_base_dir_together() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_str().unwrap();
        assert_eq!(
            usage_message(validate(&["-p", dir, "-b", dir, "-s", "."])),
            PLUGIN_DIR_REQUIRED
        );
        assert_eq!(usage_message(validate(&["-p", dir, "-s", "."])), PLUGIN_DIR_REQUIRED);
    }

    #[test]
    fn test_single_plugin() {
        let temp = TempDir::new().unwrap();
        let request = validate(&["-p", temp.path().to_str().unwrap()]).unwrap();
        assert_eq!(request.mode, RunMode::Single(temp.path().to_path_buf()));
    }

    #[test]
    fn test_single_plugin_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        match validate(&["-p", missing.to_str().unwrap()]) {
            Err(CliError::InvalidDirectory(msg)) => assert!(msg.contains("missing")),
            other => panic!("expected invalid directory, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_selection() {
        let temp = TempDir::new().unwrap();
        let request = validate(&["-b", temp.path().to_str().unwrap(), "-s", "a, 'c'"]).unwrap();
        assert_eq!(
            request.mode,
            RunMode::Batch {
                root: temp.path().to_path_buf(),
                selection: Selection::Named(vec!["a".to_string(), "c".to_string()]),
            }
        );
    }

    #[test]
    fn test_batch_root_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let result = validate(&["-b", missing.to_str().unwrap(), "-s", "."]);
        assert!(matches!(
            result,
            Err(CliError::Batch(BatchError::InvalidRootDirectory(_)))
        ));
    }

    #[test]
    fn test_upload_options_need_switch() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_str().unwrap();
        assert_eq!(usage_message(validate(&["-p", dir, "-k", "key"])), UPLOAD_SWITCH_REQUIRED);
        assert_eq!(
            usage_message(validate(&["-p", dir, "-a", "http://sl"])),
            UPLOAD_SWITCH_REQUIRED
        );
        assert_eq!(usage_message(validate(&["-p", dir, "-o"])), UPLOAD_SWITCH_REQUIRED);
    }

    #[test]
    fn test_upload_requires_key_and_feed() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_str().unwrap();
        assert_eq!(
            usage_message(validate(&["-p", dir, "-u", "-f", "feed"])),
            messages::NO_API_KEY
        );
        assert_eq!(
            usage_message(validate(&["-p", dir, "-u", "-k", "key"])),
            messages::NO_FEED_NAME
        );
    }

    #[test]
    fn test_upload_config_uses_config_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_str().unwrap();
        let feed = FeedSettings {
            api_url: Some("https://sl.example.com".to_string()),
            workspace: Some("Lab".to_string()),
            ..FeedSettings::default()
        };

        let request = parse(&["-p", dir, "-u", "-k", "key", "-f", "Plugins", "-w", "Prod", "-o"])
            .validate(&feed)
            .unwrap();
        let upload = request.upload.unwrap();
        assert_eq!(upload.api_key(), "key");
        assert_eq!(upload.feed_name(), "Plugins");
        assert_eq!(upload.api_url(), Some("https://sl.example.com"));
        assert_eq!(upload.workspace(), Some("Prod"));
        assert!(upload.overwrite());
    }

    #[test]
    fn test_log_fallback() {
        assert_eq!(parse(&["-p", "plug"]).log_fallback(), Some(Path::new("plug")));
        assert_eq!(parse(&["-b", "root", "-s", "."]).log_fallback(), Some(Path::new("root")));
        assert_eq!(parse(&["-i"]).log_fallback(), None);
    }
}
