//! Plug-in selection.
//!
//! Two selection grammars are supported:
//!
//! - **Names** (command line): `.` for every valid plug-in under the root,
//!   or comma-separated directory names. Quotes and surrounding whitespace
//!   are stripped from each name.
//! - **Indexes** (interactive): `.` or comma-separated 1-based positions in
//!   the listed plug-ins.

use std::path::{Path, PathBuf};

use tracing::info;

use super::error::{BatchError, BatchResult};
use super::messages;
use crate::plugin::{self, PluginDir};

/// Token selecting every plug-in.
pub const SELECT_ALL: &str = ".";

/// A parsed name selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every valid plug-in under the root, sorted by name.
    All,
    /// The named plug-ins, in the given order.
    Named(Vec<String>),
}

fn strip_token(token: &str) -> &str {
    token.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}

impl Selection {
    /// Parse a selection expression.
    ///
    /// Never fails: bad names surface in [`resolve`](Self::resolve).
    pub fn parse(expression: &str) -> Self {
        let expression = strip_token(expression);
        if expression == SELECT_ALL {
            return Selection::All;
        }
        Selection::Named(
            expression
                .split(',')
                .map(|token| strip_token(token).to_string())
                .collect(),
        )
    }

    /// Resolve the selection against `root`.
    ///
    /// Either every named plug-in is valid and all of them are returned, or
    /// the first invalid name is reported and nothing is returned. The root
    /// must hold at least one valid plug-in for either form.
    ///
    /// # Errors
    ///
    /// - [`BatchError::InvalidRootDirectory`] if `root` is not a directory
    ///   or holds no valid plug-in
    /// - [`BatchError::InvalidSelection`] for the first bad name, after
    ///   logging the plug-ins that are available
    pub fn resolve(&self, root: &Path) -> BatchResult<Vec<PathBuf>> {
        let plugins = available_plugins(root)?;
        match self {
            Selection::All => Ok(plugins.into_iter().map(|p| p.path).collect()),
            Selection::Named(names) => {
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    match plugins.iter().find(|p| p.name == *name) {
                        Some(plugin) => selected.push(plugin.path.clone()),
                        None => {
                            log_available(&plugins);
                            return Err(BatchError::InvalidSelection {
                                token: name.clone(),
                            });
                        }
                    }
                }
                Ok(selected)
            }
        }
    }
}

/// Valid plug-ins under `root`, sorted by name.
///
/// # Errors
///
/// Returns [`BatchError::InvalidRootDirectory`] if `root` cannot be listed
/// or holds no valid plug-in.
pub fn available_plugins(root: &Path) -> BatchResult<Vec<PluginDir>> {
    if !root.is_dir() {
        return Err(BatchError::InvalidRootDirectory(root.to_path_buf()));
    }
    let plugins = plugin::discover_plugins(root)
        .map_err(|_| BatchError::InvalidRootDirectory(root.to_path_buf()))?;
    if plugins.is_empty() {
        return Err(BatchError::InvalidRootDirectory(root.to_path_buf()));
    }
    Ok(plugins)
}

/// Print plug-ins as a 1-based list.
pub fn log_available(plugins: &[PluginDir]) {
    info!("{}", messages::AVAILABLE_PLUGINS);
    for (index, plugin) in plugins.iter().enumerate() {
        info!("{}. {}", index + 1, plugin.name);
    }
}

/// Parse an interactive index selection against `plugins`.
///
/// Returns `None` if any token is not a listed position.
pub fn parse_index_selection(input: &str, plugins: &[PluginDir]) -> Option<Vec<PathBuf>> {
    let input = input.trim();
    if input == SELECT_ALL {
        return Some(plugins.iter().map(|p| p.path.clone()).collect());
    }

    input
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|index| (1..=plugins.len()).contains(index))
                .map(|index| plugins[index - 1].path.clone())
        })
        .collect()
}
