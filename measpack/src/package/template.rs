//! Package template layout.
//!
//! The packaging tool consumes a directory with a fixed shape:
//!
//! ```text
//! <output_root>/<plugin_name>/
//! ├── control/
//! │   └── control              package descriptor (key: value lines)
//! ├── data/
//! │   ├── <package_name>/      filtered copy of the plug-in
//! │   └── instructions         install location descriptor
//! └── debian-binary            format marker ("2.0")
//! ```
//!
//! Generation is not incremental: any existing template for the same
//! plug-in is removed first so stale files never leak into a package.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::description::PackageDescription;
use super::error::{TemplateError, TemplateResult};
use super::naming::host_architecture;
use crate::logging::LOG_SUBDIR;

/// Default install location for measurement services on the target.
pub const DEFAULT_INSTALL_ROOT: &str = r"C:\ProgramData\National Instruments\Plug-Ins\Measurements";

/// Entry names never copied into a package payload, at any depth.
///
/// Includes the packager's own log folder, which lands inside the plug-in
/// when no documents folder is available.
pub const EXCLUDED_ENTRIES: &[&str] = &[
    ".venv",
    "__pycache__",
    ".cache",
    "dist",
    ".vscode",
    ".vs",
    ".env",
    "poetry.lock",
    ".mypy_cache",
    ".pytest_cache",
    "coverage.xml",
    LOG_SUBDIR,
];

const CONTROL_DIR: &str = "control";
const CONTROL_FILE: &str = "control";
const DATA_DIR: &str = "data";
const INSTRUCTIONS_FILE: &str = "instructions";
const FORMAT_MARKER_FILE: &str = "debian-binary";
const FORMAT_VERSION: &str = "2.0";

/// Check if a directory entry name is excluded from payloads.
pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_ENTRIES.contains(&name)
}

/// Writes package templates for the packaging tool.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    install_root: String,
    architecture: String,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_INSTALL_ROOT)
    }
}

impl TemplateGenerator {
    /// Create a generator targeting the host architecture.
    pub fn new(install_root: impl Into<String>) -> Self {
        Self {
            install_root: install_root.into(),
            architecture: host_architecture(),
        }
    }

    /// Override the architecture written to the control file.
    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = architecture.into();
        self
    }

    /// The architecture string written to control files.
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Template directory for a plug-in under the given output root.
    pub fn template_dir(output_root: &Path, description: &PackageDescription) -> PathBuf {
        output_root.join(&description.plugin_name)
    }

    /// Lay out a complete template and return its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the stale template cannot be removed, or any
    /// directory or file cannot be created or copied.
    pub fn generate(
        &self,
        output_root: &Path,
        plugin_dir: &Path,
        description: &PackageDescription,
    ) -> TemplateResult<PathBuf> {
        let template_dir = Self::template_dir(output_root, description);

        if template_dir.exists() {
            debug!("Removing previous template {}", template_dir.display());
            fs::remove_dir_all(&template_dir).map_err(|e| TemplateError::RemoveFailed {
                path: template_dir.clone(),
                source: e,
            })?;
        }

        let control_dir = template_dir.join(CONTROL_DIR);
        let data_dir = template_dir.join(DATA_DIR);
        let payload_dir = data_dir.join(&description.package_name);

        create_dir(&control_dir)?;
        create_dir(&payload_dir)?;

        let copied = copy_filtered(plugin_dir, &payload_dir)?;
        debug!(
            "Copied {} files from {} into {}",
            copied,
            plugin_dir.display(),
            payload_dir.display()
        );

        write_file(
            &control_dir.join(CONTROL_FILE),
            &self.control_file_contents(description),
        )?;
        write_file(
            &data_dir.join(INSTRUCTIONS_FILE),
            &self.instructions_contents(description),
        )?;
        write_file(&template_dir.join(FORMAT_MARKER_FILE), FORMAT_VERSION)?;

        Ok(template_dir)
    }

    /// Render the control file.
    ///
    /// Keys appear in a fixed order, one `key: value` pair per line.
    pub fn control_file_contents(&self, description: &PackageDescription) -> String {
        let fields = [
            ("Built-Using", "nipkg"),
            ("Section", "Add-Ons"),
            ("XB-Plugin", "file"),
            ("XB-StoreProduct", "no"),
            ("XB-UserVisible", "yes"),
            ("XB-VisibleForRuntimeDeployment", "no"),
            ("Architecture", self.architecture.as_str()),
            ("Description", description.description.as_str()),
            ("Version", description.version.as_str()),
            ("XB-DisplayName", description.plugin_name.as_str()),
            ("Maintainer", description.author.as_str()),
            ("Package", description.package_name.as_str()),
        ];

        fields
            .iter()
            .map(|(key, value)| format!("{}: {}\n", key, value))
            .collect()
    }

    /// Render the instructions file pointing the payload at its install path.
    pub fn instructions_contents(&self, description: &PackageDescription) -> String {
        format!(
            "<instructions>\n\
             <customDirectories>\n    \
             <customDirectory name=\"{}\" path=\"{}\"/>\n\
             </customDirectories>\n\
             </instructions>\n",
            description.package_name,
            self.install_path(&description.plugin_name)
        )
    }

    /// Install path for a plug-in, joined with the separator the root uses.
    pub fn install_path(&self, plugin_name: &str) -> String {
        let separator = if self.install_root.contains('\\') {
            '\\'
        } else {
            '/'
        };
        let root = self.install_root.trim_end_matches(['\\', '/']);
        format!("{}{}{}", root, separator, plugin_name)
    }
}

fn create_dir(path: &Path) -> TemplateResult<()> {
    fs::create_dir_all(path).map_err(|e| TemplateError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(path: &Path, contents: &str) -> TemplateResult<()> {
    fs::write(path, contents).map_err(|e| TemplateError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Recursively copy `src` into `dest`, skipping excluded entries.
///
/// Returns the number of files copied.
fn copy_filtered(src: &Path, dest: &Path) -> TemplateResult<usize> {
    let entries = fs::read_dir(src).map_err(|e| TemplateError::ReadFailed {
        path: src.to_path_buf(),
        source: e,
    })?;

    let mut copied = 0;
    for entry in entries {
        let entry = entry.map_err(|e| TemplateError::ReadFailed {
            path: src.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name();
        if is_excluded(&name.to_string_lossy()) {
            continue;
        }

        let from = entry.path();
        let to = dest.join(&name);
        if from.is_dir() {
            create_dir(&to)?;
            copied += copy_filtered(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| TemplateError::CopyFailed {
                from: from.clone(),
                to: to.clone(),
                source: e,
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
