//! Measurement plug-in directory validation and discovery.
//!
//! A well-formed plug-in directory contains three files:
//!
//! - `pyproject.toml` - project metadata
//! - `measurement.py` - measurement entry point
//! - `start.bat` - service launcher
//!
//! Validation never fails hard. A directory missing any of these files is
//! reported as invalid (with a debug log line per missing file) so that
//! batch callers can skip it and carry on.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Project metadata file name.
pub const METADATA_FILE: &str = "pyproject.toml";

/// Measurement entry-point script name.
pub const ENTRY_POINT_FILE: &str = "measurement.py";

/// Launcher script name.
pub const LAUNCHER_FILE: &str = "start.bat";

/// A file every plug-in directory must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredFile {
    /// `pyproject.toml`
    Metadata,
    /// `measurement.py`
    EntryPoint,
    /// `start.bat`
    Launcher,
}

impl RequiredFile {
    /// All required files, in the order they are checked.
    pub const ALL: [RequiredFile; 3] = [
        RequiredFile::Metadata,
        RequiredFile::EntryPoint,
        RequiredFile::Launcher,
    ];

    /// File name expected inside the plug-in directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Metadata => METADATA_FILE,
            Self::EntryPoint => ENTRY_POINT_FILE,
            Self::Launcher => LAUNCHER_FILE,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Metadata => "The 'pyproject.toml' file",
            Self::EntryPoint => "The 'measurement.py' file",
            Self::Launcher => "The 'start.bat' Batch file",
        }
    }
}

impl fmt::Display for RequiredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Outcome of validating a plug-in directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    missing: Vec<RequiredFile>,
}

impl ValidationResult {
    /// Returns true when no required file is missing.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// Required files that were not found.
    pub fn missing(&self) -> &[RequiredFile] {
        &self.missing
    }

    /// Check whether a specific required file was missing.
    pub fn is_missing(&self, file: RequiredFile) -> bool {
        self.missing.contains(&file)
    }
}

/// A valid plug-in found under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDir {
    /// Directory name, used as the plug-in name.
    pub name: String,
    /// Full path to the plug-in directory.
    pub path: PathBuf,
}

/// Validate a plug-in directory, logging each missing file at debug level.
pub fn validate(plugin_dir: &Path) -> ValidationResult {
    let missing = RequiredFile::ALL
        .into_iter()
        .filter(|file| !plugin_dir.join(file.file_name()).is_file())
        .inspect(|file| {
            debug!(
                "{} is not found in '{}'",
                file.label(),
                plugin_dir.display()
            );
        })
        .collect();

    ValidationResult { missing }
}

/// Check if a directory is a well-formed plug-in.
pub fn is_valid(plugin_dir: &Path) -> bool {
    validate(plugin_dir).is_valid()
}

/// Derive the plug-in name from its directory.
///
/// Falls back to the canonical path when the given path has no final
/// component (e.g. `.`).
pub fn plugin_name(plugin_dir: &Path) -> String {
    if let Some(name) = plugin_dir.file_name() {
        return name.to_string_lossy().into_owned();
    }

    fs::canonicalize(plugin_dir)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| plugin_dir.to_string_lossy().into_owned())
}

/// List the valid plug-ins directly under `root`, sorted by name.
///
/// Entries that are not directories, or that fail validation, are left out.
///
/// # Errors
///
/// Returns an error if the root directory cannot be read.
pub fn discover_plugins(root: &Path) -> io::Result<Vec<PluginDir>> {
    let mut plugins = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() || !is_valid(&path) {
            continue;
        }
        plugins.push(PluginDir {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }

    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(plugins)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Create a plug-in directory containing the given files.
    pub fn write_plugin(root: &Path, name: &str, files: &[&str]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), b"").unwrap();
        }
        dir
    }

    /// Create a complete plug-in with a minimal poetry section.
    pub fn write_valid_plugin(root: &Path, name: &str) -> PathBuf {
        let dir = write_plugin(root, name, &["measurement.py", "start.bat"]);
        fs::write(
            dir.join("pyproject.toml"),
            format!(
                "[tool.poetry]\nname = \"{}\"\nversion = \"1.2.3\"\ndescription = \"test\"\nauthors = [\"Tester\"]\n",
                name
            ),
        )
        .unwrap();
        dir
    }
}
