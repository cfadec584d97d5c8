//! External packaging tool abstraction.
//!
//! The builder never shells out directly. It goes through [`PackagingTool`],
//! so tests can substitute a recording fake and production uses
//! [`NipkgTool`].

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::error::{BuildError, BuildResult};

/// Default location of the NI Package Manager command-line tool.
#[cfg(windows)]
pub const DEFAULT_NIPKG_PATH: &str = r"C:\Program Files\National Instruments\NI Package Manager\nipkg.exe";

/// Default location of the NI Package Manager command-line tool.
#[cfg(not(windows))]
pub const DEFAULT_NIPKG_PATH: &str = "nipkg";

/// Turns a template directory into a package file.
pub trait PackagingTool {
    /// Pack `template_dir` and write the resulting package into `output_dir`.
    ///
    /// Blocks until the tool finishes.
    fn pack(&self, template_dir: &Path, output_dir: &Path) -> BuildResult<()>;
}

/// Packaging through `nipkg pack`.
#[derive(Debug, Clone)]
pub struct NipkgTool {
    path: PathBuf,
}

impl Default for NipkgTool {
    fn default() -> Self {
        Self::new(DEFAULT_NIPKG_PATH)
    }
}

impl NipkgTool {
    /// Create a tool wrapper for the executable at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the wrapped executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command_line(&self, template_dir: &Path, output_dir: &Path) -> String {
        format!(
            "{} pack {} {}",
            self.path.display(),
            template_dir.display(),
            output_dir.display()
        )
    }
}

impl PackagingTool for NipkgTool {
    fn pack(&self, template_dir: &Path, output_dir: &Path) -> BuildResult<()> {
        // Bare names are looked up on PATH at launch.
        if self.path.components().count() > 1 && !self.path.is_file() {
            return Err(BuildError::ToolNotFound {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            });
        }

        let command = self.command_line(template_dir, output_dir);
        debug!("Running {}", command);

        let output = Command::new(&self.path)
            .arg("pack")
            .arg(template_dir)
            .arg(output_dir)
            .output()
            .map_err(|e| BuildError::ToolNotFound {
                path: self.path.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{}", stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("nipkg stderr: {}", stderr);
            return Err(BuildError::Subprocess {
                command,
                exit_code: output.status.code(),
                stderr,
            });
        }

        Ok(())
    }
}
