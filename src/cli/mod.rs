//! CLI module
//!
//! Command-line interface for the chord node.

pub mod args;
pub mod config;

pub use args::CliArgs;
pub use config::Config;
