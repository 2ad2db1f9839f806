//! Songbook Import - loads a spreadsheet of songs and chord sheets into the
//! chord catalog.
//!
//! Rows are normalized, deduplicated by exact title and artist, and appended
//! to one of three stores: the SQLite song database, a flat JSON file, or
//! the mobile app's key-value storage snapshot.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod model;
pub mod sink;
pub mod source;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log targets used across the crate, at info; everything else at warn.
const DEFAULT_LOG_FILTER: &str = "warn,import=info,source=info,sink=info,config=info";

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so stdout only carries the import summary
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    cli::run_command(&args)
}
