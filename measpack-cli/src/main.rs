//! measpack CLI - Command-line interface
//!
//! Builds NI packages from Python measurement plug-ins and optionally
//! uploads them to SystemLink feeds.

mod commands;
mod error;
mod prompt;
mod runner;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::args::BuildArgs;
use commands::config::ConfigCommands;

#[derive(Parser)]
#[command(name = "measpack")]
#[command(version, about = "Create and upload NI packages for Python measurement plug-ins", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// View and edit configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Config(command)) => commands::config::run(command).map(|()| ExitCode::SUCCESS),
        None => runner::run(cli.build),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", console::style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
