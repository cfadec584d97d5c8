//! `measpack config` subcommands.
//!
//! Keys are parsed into [`ConfigKey`] by clap, so an unknown key never
//! reaches the handlers. Validation and defaults live in the library; this
//! module only loads, edits, saves and renders.

use std::fmt::Write as _;
use std::path::Path;

use clap::Subcommand;
use measpack::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

const NOT_SET: &str = "(not set)";

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of one key (section.key, e.g. packager.tool_path)
    Get { key: ConfigKey },

    /// Validate and store a value
    Set {
        key: ConfigKey,

        /// New value; blank clears an optional key
        value: String,
    },

    /// Restore a key to its built-in default
    Unset { key: ConfigKey },

    /// Show every key with its value and what it controls
    List,

    /// Print the configuration file location
    Path,

    /// Write the defaults to the configuration file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand against the user's configuration file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Get { key } => {
            let config = ConfigFile::load_from(&path)?;
            println!("{}", display_value(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let mut config = ConfigFile::load_from(&path)?;
            let previous = key.get(&config);
            key.set(&mut config, &value)
                .map_err(|e| CliError::Config(e.to_string()))?;
            config.save_to(&path)?;
            println!("{}", describe_change(key, &previous, &key.get(&config)));
        }
        ConfigCommands::Unset { key } => {
            let mut config = ConfigFile::load_from(&path)?;
            let previous = key.get(&config);
            key.reset(&mut config);
            config.save_to(&path)?;
            println!("{}", describe_reset(key, &previous, &key.get(&config)));
        }
        ConfigCommands::List => {
            let config = ConfigFile::load_from(&path)?;
            print!("{}", render_list(&config, &path));
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                println!(
                    "Configuration file already exists: {} (use --force to replace it)",
                    path.display()
                );
                return Ok(());
            }
            ConfigFile::default().save_to(&path)?;
            println!("Wrote default settings to {}", path.display());
            println!("Command-line options override these values.");
        }
    }
    Ok(())
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        NOT_SET
    } else {
        value
    }
}

fn describe_change(key: ConfigKey, previous: &str, current: &str) -> String {
    if previous == current {
        format!("{} unchanged: {}", key, display_value(current))
    } else {
        format!(
            "Set {} = {} (was {})",
            key,
            display_value(current),
            display_value(previous)
        )
    }
}

fn describe_reset(key: ConfigKey, previous: &str, current: &str) -> String {
    if key.is_required() {
        format!("Reset {} to its default: {}", key, current)
    } else if previous.is_empty() {
        format!("{} was not set", key)
    } else {
        format!("Cleared {} (was {})", key, previous)
    }
}

/// Render every key grouped by INI section, marking default values.
fn render_list(config: &ConfigFile, path: &Path) -> String {
    let mut out = String::new();
    let source = if path.exists() {
        format!("Settings from {}", path.display())
    } else {
        format!("No file at {}, showing defaults", path.display())
    };
    let _ = writeln!(out, "{}", source);

    for (section, entries) in config.sections() {
        let _ = writeln!(out, "\n[{}]", section);
        for entry in entries {
            let marker = if entry.is_default && !entry.value.is_empty() {
                " (default)"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "  {} = {}{}",
                entry.key.key_name(),
                display_value(&entry.value),
                marker
            );
            let _ = writeln!(out, "      {}", entry.key.description());
        }
    }
    out
}
