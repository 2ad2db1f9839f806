//! Command-line interface for songbook-import.
//!
//! One subcommand per storage target, plus config setup.

mod commands;

pub use commands::{Cli, Commands, run_command};
