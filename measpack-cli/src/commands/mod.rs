//! CLI command implementations.

pub mod args;
pub mod build;
pub mod config;
pub mod interactive;
