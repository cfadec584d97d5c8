//! Package building.
//!
//! [`PackageBuilder`] drives one plug-in through the full build. Each step
//! gates the next:
//!
//! 1. an output root must be configured
//! 2. the plug-in must pass validation
//! 3. metadata is resolved and the template generated
//! 4. the packaging tool runs and the artifact is looked up
//!
//! # Output layout
//!
//! ```text
//! <output_root>/
//! ├── <plugin_name>/     template (regenerated on every build)
//! └── packages/          package files written by the tool
//! ```
//!
//! Expected skips (invalid plug-in, no output root, no artifact) are
//! reported through [`BuildStatus`]. Environment and tool failures are
//! returned as [`BuildError`].

mod error;
mod tool;

pub use error::{BuildError, BuildResult};
pub use tool::{NipkgTool, PackagingTool, DEFAULT_NIPKG_PATH};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::package::{self, TemplateGenerator};
use crate::plugin::{self, ValidationResult};

/// Subdirectory of the output root that receives package files.
pub const PACKAGES_DIR: &str = "packages";

/// Outcome of a build that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// A package file was produced.
    Built(PathBuf),

    /// The plug-in directory is missing required files.
    InvalidPlugin(ValidationResult),

    /// No output root is configured.
    NoOutputRoot,

    /// The tool succeeded but no matching package file was found.
    NoArtifact,
}

impl BuildStatus {
    /// Path of the produced package, if any.
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            BuildStatus::Built(path) => Some(path),
            _ => None,
        }
    }
}

/// Builds packages from plug-in directories.
#[derive(Debug)]
pub struct PackageBuilder<T: PackagingTool> {
    tool: T,
    generator: TemplateGenerator,
    output_root: Option<PathBuf>,
}

impl<T: PackagingTool> PackageBuilder<T> {
    /// Create a builder with no output root.
    pub fn new(tool: T, generator: TemplateGenerator) -> Self {
        Self {
            tool,
            generator,
            output_root: None,
        }
    }

    /// Set the directory templates and packages are written under.
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(output_root.into());
        self
    }

    /// The configured output root.
    pub fn output_root(&self) -> Option<&Path> {
        self.output_root.as_deref()
    }

    /// Directory package files are written to.
    pub fn packages_dir(&self) -> Option<PathBuf> {
        self.output_root.as_ref().map(|root| root.join(PACKAGES_DIR))
    }

    /// The packaging tool in use.
    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Build a package for the plug-in at `plugin_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata cannot be resolved, the template or
    /// packages directory cannot be written, or the packaging tool fails.
    pub fn build(&self, plugin_dir: &Path) -> BuildResult<BuildStatus> {
        let Some(output_root) = self.output_root.as_deref() else {
            info!("No output directory is configured, skipping build");
            return Ok(BuildStatus::NoOutputRoot);
        };

        let validation = plugin::validate(plugin_dir);
        if !validation.is_valid() {
            info!(
                "'{}' is not a valid measurement plug-in, skipping",
                plugin_dir.display()
            );
            return Ok(BuildStatus::InvalidPlugin(validation));
        }

        let description = package::resolve(plugin_dir)?;
        info!(
            "Building package '{}' version {}",
            description.package_name, description.version
        );

        let template_dir = self
            .generator
            .generate(output_root, plugin_dir, &description)?;
        debug!("Template generated at {}", template_dir.display());

        let packages_dir = output_root.join(PACKAGES_DIR);
        fs::create_dir_all(&packages_dir).map_err(|e| BuildError::CreateDirFailed {
            path: packages_dir.clone(),
            source: e,
        })?;

        self.tool.pack(&template_dir, &packages_dir)?;

        match find_artifact(&packages_dir, &description.package_name)? {
            Some(artifact) => {
                info!("Package created: {}", artifact.display());
                Ok(BuildStatus::Built(artifact))
            }
            None => {
                info!(
                    "No package file for '{}' found in {}",
                    description.package_name,
                    packages_dir.display()
                );
                Ok(BuildStatus::NoArtifact)
            }
        }
    }
}

/// Find the first file in `dir` named `<package_name>_...`.
///
/// The packaging tool names files `<package>_<version>_<arch>.nipkg`, so
/// matching on the prefix keeps `meas` from picking up `dc-meas_*` when
/// both share an output directory. Entries are checked in name order so
/// repeated lookups agree.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn find_artifact(dir: &Path, package_name: &str) -> BuildResult<Option<PathBuf>> {
    let read_failed = |e: std::io::Error| BuildError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let prefix = format!("{}_", package_name);
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let path = entry.path();
        if path.is_file() && entry.file_name().to_string_lossy().starts_with(&prefix) {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.into_iter().next())
}
