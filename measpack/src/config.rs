//! Configuration file.
//!
//! Settings live in an INI file at `<config_dir>/measpack/config.ini`:
//!
//! ```ini
//! [packager]
//! tool_path = nipkg
//! output_dir = /home/user/.local/share/Measurement-Plugin-Packager
//! install_root = C:\ProgramData\National Instruments\Plug-Ins\Measurements
//!
//! [feed]
//! api_url = https://systemlink.example.com
//! workspace = Default
//! credential_policy = retain
//! ```
//!
//! Every key is optional. A missing file means all defaults. API keys are
//! never read from or written to this file.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{EscapePolicy, Ini, ParseOption};
use thiserror::Error;
use tracing::warn;

use crate::builder::DEFAULT_NIPKG_PATH;
use crate::feed::CredentialPolicy;
use crate::package::DEFAULT_INSTALL_ROOT;

/// Directory created under the data folder for built packages.
pub const OUTPUT_SUBDIR: &str = "Measurement-Plugin-Packager";

const CONFIG_DIR: &str = "measpack";
const CONFIG_FILE: &str = "config.ini";

const PACKAGER_SECTION: &str = "packager";
const FEED_SECTION: &str = "feed";

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from reading, writing or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config file {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create config directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("unknown configuration key '{0}' (run 'measpack config list' for the available keys)")]
    UnknownKey(String),
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Default directory for built packages.
pub fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(OUTPUT_SUBDIR)
}

/// `[packager]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerSettings {
    /// Packaging tool executable.
    pub tool_path: PathBuf,
    /// Root under which templates and packages are written.
    pub output_dir: PathBuf,
    /// Install location written into package instructions.
    pub install_root: String,
}

impl Default for PackagerSettings {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from(DEFAULT_NIPKG_PATH),
            output_dir: default_output_dir(),
            install_root: DEFAULT_INSTALL_ROOT.to_string(),
        }
    }
}

/// `[feed]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSettings {
    pub api_url: Option<String>,
    pub workspace: Option<String>,
    pub credential_policy: CredentialPolicy,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub packager: PackagerSettings,
    pub feed: FeedSettings,
}

impl ConfigFile {
    /// Load from [`config_file_path`], or defaults when the file is absent.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults when the file is absent.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        // Windows paths carry backslashes; read them literally.
        let options = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_file_opt(path, options).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();

        for key in ConfigKey::all() {
            if let Some(value) = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()))
            {
                key.set(&mut config, value)?;
            }
        }

        if ini
            .section(Some(FEED_SECTION))
            .is_some_and(|section| section.contains_key("api_key"))
        {
            warn!("Ignoring api_key in the configuration file. Pass the API key on the command line or at the prompt.");
        }

        Ok(config)
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        self.to_ini()
            .write_to_file_policy(path, EscapePolicy::Nothing)
            .map_err(|e| ConfigError::WriteFailed {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Current values grouped by section, in file order.
    pub fn sections(&self) -> Vec<(&'static str, Vec<ConfigEntry>)> {
        let defaults = Self::default();

        [PACKAGER_SECTION, FEED_SECTION]
            .into_iter()
            .map(|section| {
                let entries = ConfigKey::all()
                    .iter()
                    .filter(|key| key.section() == section)
                    .map(|key| {
                        let value = key.get(self);
                        ConfigEntry {
                            key: *key,
                            is_default: value == key.get(&defaults),
                            value,
                        }
                    })
                    .collect();
                (section, entries)
            })
            .collect()
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            // Unset optional values are left out rather than written empty.
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }
}

/// One key with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: ConfigKey,
    /// Value as text; empty when an optional key is unset.
    pub value: String,
    /// The value equals the built-in default.
    pub is_default: bool,
}

/// A settable configuration key, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    PackagerToolPath,
    PackagerOutputDir,
    PackagerInstallRoot,
    FeedApiUrl,
    FeedWorkspace,
    FeedCredentialPolicy,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::PackagerToolPath,
            ConfigKey::PackagerOutputDir,
            ConfigKey::PackagerInstallRoot,
            ConfigKey::FeedApiUrl,
            ConfigKey::FeedWorkspace,
            ConfigKey::FeedCredentialPolicy,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::PackagerToolPath
            | ConfigKey::PackagerOutputDir
            | ConfigKey::PackagerInstallRoot => PACKAGER_SECTION,
            ConfigKey::FeedApiUrl | ConfigKey::FeedWorkspace | ConfigKey::FeedCredentialPolicy => {
                FEED_SECTION
            }
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::PackagerToolPath => "tool_path",
            ConfigKey::PackagerOutputDir => "output_dir",
            ConfigKey::PackagerInstallRoot => "install_root",
            ConfigKey::FeedApiUrl => "api_url",
            ConfigKey::FeedWorkspace => "workspace",
            ConfigKey::FeedCredentialPolicy => "credential_policy",
        }
    }

    /// What the key controls.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigKey::PackagerToolPath => "NI Package Manager executable that packs templates",
            ConfigKey::PackagerOutputDir => "Directory receiving templates and built packages",
            ConfigKey::PackagerInstallRoot => "Folder on the target system that plug-ins install under",
            ConfigKey::FeedApiUrl => "SystemLink server offered as the default API URL",
            ConfigKey::FeedWorkspace => "SystemLink workspace offered as the default",
            ConfigKey::FeedCredentialPolicy => {
                "Interactive feed switch keeps (retain) or re-asks (refresh) connection settings"
            }
        }
    }

    /// Whether the key always holds a value.
    pub fn is_required(&self) -> bool {
        self.section() == PACKAGER_SECTION
    }

    /// Restore the built-in default. Optional keys become unset.
    pub fn reset(&self, config: &mut ConfigFile) {
        let defaults = ConfigFile::default();
        match self {
            ConfigKey::PackagerToolPath => config.packager.tool_path = defaults.packager.tool_path,
            ConfigKey::PackagerOutputDir => {
                config.packager.output_dir = defaults.packager.output_dir
            }
            ConfigKey::PackagerInstallRoot => {
                config.packager.install_root = defaults.packager.install_root
            }
            ConfigKey::FeedApiUrl => config.feed.api_url = defaults.feed.api_url,
            ConfigKey::FeedWorkspace => config.feed.workspace = defaults.feed.workspace,
            ConfigKey::FeedCredentialPolicy => {
                config.feed.credential_policy = defaults.feed.credential_policy
            }
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text. Unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::PackagerToolPath => config.packager.tool_path.display().to_string(),
            ConfigKey::PackagerOutputDir => config.packager.output_dir.display().to_string(),
            ConfigKey::PackagerInstallRoot => config.packager.install_root.clone(),
            ConfigKey::FeedApiUrl => config.feed.api_url.clone().unwrap_or_default(),
            ConfigKey::FeedWorkspace => config.feed.workspace.clone().unwrap_or_default(),
            ConfigKey::FeedCredentialPolicy => config.feed.credential_policy.to_string(),
        }
    }

    /// Validate and store `value`.
    ///
    /// Blank values clear optional keys and are rejected for required ones.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        match self {
            ConfigKey::PackagerToolPath => {
                config.packager.tool_path = PathBuf::from(self.required(value)?);
            }
            ConfigKey::PackagerOutputDir => {
                config.packager.output_dir = PathBuf::from(self.required(value)?);
            }
            ConfigKey::PackagerInstallRoot => {
                config.packager.install_root = self.required(value)?.to_string();
            }
            ConfigKey::FeedApiUrl => {
                if !value.is_empty()
                    && !value.starts_with("http://")
                    && !value.starts_with("https://")
                {
                    return Err(self.invalid("expected an http:// or https:// URL"));
                }
                config.feed.api_url = optional(value);
            }
            ConfigKey::FeedWorkspace => {
                config.feed.workspace = optional(value);
            }
            ConfigKey::FeedCredentialPolicy => {
                config.feed.credential_policy =
                    value.parse().map_err(|reason: String| self.invalid(&reason))?;
            }
        }
        Ok(())
    }

    fn required<'v>(&self, value: &'v str) -> ConfigResult<&'v str> {
        if value.is_empty() {
            Err(self.invalid("value must not be empty"))
        } else {
            Ok(value)
        }
    }

    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            reason: reason.to_string(),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.feed.credential_policy, CredentialPolicy::Retain);
        assert_eq!(config.packager.install_root, DEFAULT_INSTALL_ROOT);
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[packager]\ntool_path = /opt/ni/nipkg\n\n[feed]\nworkspace = Lab\ncredential_policy = refresh\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.packager.tool_path, PathBuf::from("/opt/ni/nipkg"));
        assert_eq!(config.packager.output_dir, default_output_dir());
        assert_eq!(config.feed.workspace.as_deref(), Some("Lab"));
        assert_eq!(config.feed.api_url, None);
        assert_eq!(config.feed.credential_policy, CredentialPolicy::Refresh);
    }

    #[test]
    fn test_invalid_policy_in_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[feed]\ncredential_policy = sometimes\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("feed.credential_policy"));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.feed.api_url = Some("https://sl.example.com".to_string());
        config.packager.output_dir = temp.path().join("out");
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("workspace"));
        assert!(!text.contains("api_key"));
    }

    #[test]
    fn test_api_key_in_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[feed]\napi_key = secret\nworkspace = Lab\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.feed.workspace.as_deref(), Some("Lab"));
        let saved = temp.path().join("saved.ini");
        config.save_to(&saved).unwrap();
        assert!(!fs::read_to_string(saved).unwrap().contains("secret"));
    }

    #[test]
    fn test_windows_paths_read_literally() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[packager]\ninstall_root = D:\\Plug-Ins\\Measurements\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.packager.install_root, r"D:\Plug-Ins\Measurements");
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(
            "feed.api_url".parse::<ConfigKey>().unwrap(),
            ConfigKey::FeedApiUrl
        );
        assert_eq!(
            " Packager.Tool_Path ".parse::<ConfigKey>().unwrap(),
            ConfigKey::PackagerToolPath
        );
        assert!(matches!(
            "feed.api_key".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
            assert_eq!(key.to_string(), key.name());
        }
    }

    #[test]
    fn test_sections_follow_file_order() {
        let mut config = ConfigFile::default();
        config.feed.workspace = Some("Lab".to_string());

        let sections = config.sections();
        let names: Vec<&str> = sections.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["packager", "feed"]);
        assert_eq!(sections[0].1.len(), 3);

        let feed = &sections[1].1;
        assert_eq!(feed[1].key, ConfigKey::FeedWorkspace);
        assert_eq!(feed[1].value, "Lab");
        assert!(!feed[1].is_default);
        assert!(feed[2].is_default);
        assert_eq!(feed[2].value, "retain");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut config = ConfigFile::default();
        ConfigKey::PackagerToolPath.set(&mut config, "/opt/nipkg").unwrap();
        ConfigKey::FeedWorkspace.set(&mut config, "Lab").unwrap();

        ConfigKey::PackagerToolPath.reset(&mut config);
        ConfigKey::FeedWorkspace.reset(&mut config);

        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_required_keys_are_packager_keys() {
        let required: Vec<ConfigKey> = ConfigKey::all()
            .iter()
            .copied()
            .filter(ConfigKey::is_required)
            .collect();
        assert_eq!(
            required,
            vec![
                ConfigKey::PackagerToolPath,
                ConfigKey::PackagerOutputDir,
                ConfigKey::PackagerInstallRoot,
            ]
        );
        assert!(ConfigKey::all().iter().all(|key| !key.description().is_empty()));
    }

    #[test]
    fn test_set_validates() {
        let mut config = ConfigFile::default();

        assert!(ConfigKey::FeedApiUrl.set(&mut config, "ftp://x").is_err());
        assert!(ConfigKey::PackagerToolPath.set(&mut config, "  ").is_err());

        ConfigKey::FeedApiUrl
            .set(&mut config, "http://localhost:9090")
            .unwrap();
        assert_eq!(ConfigKey::FeedApiUrl.get(&config), "http://localhost:9090");

        ConfigKey::FeedApiUrl.set(&mut config, "").unwrap();
        assert_eq!(config.feed.api_url, None);
        assert_eq!(ConfigKey::FeedApiUrl.get(&config), "");
    }
}
