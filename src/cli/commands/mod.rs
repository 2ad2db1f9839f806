//! CLI command definitions and dispatch.
//!
//! Each target is a subcommand; the handlers live in submodules:
//! - `import`: spreadsheet import into the database, JSON file or storage snapshot
//! - `setup`: writing a default config file

mod import;
mod setup;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config;

pub use import::{cmd_import_db, cmd_import_json, cmd_import_storage};
pub use setup::cmd_init_config;

/// Import songs and chord sheets from a spreadsheet into the catalog
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config directory)
    #[arg(long, global = true, env = "SONGBOOK_IMPORT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every import target
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Spreadsheet to import (xlsx, xls, ods)
    #[arg(short, long)]
    pub source: Option<PathBuf>,
    /// Worksheet name (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Dry run - show what would be added without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Import into the SQLite song database
    Db {
        #[command(flatten)]
        source: SourceArgs,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Import into a JSON file holding an array of songs
    Json {
        #[command(flatten)]
        source: SourceArgs,
        /// JSON file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import into the app's key-value storage snapshot
    Storage {
        #[command(flatten)]
        source: SourceArgs,
        /// Storage directory
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Storage key (also the file name inside the directory)
        #[arg(long)]
        key: Option<String>,
    },
    /// Write a config file with default settings
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Db { source, db } => {
            let rt = Runtime::new()?;
            cmd_import_db(&rt, &config, source, db.as_ref())
        }
        Commands::Json { source, output } => {
            let rt = Runtime::new()?;
            cmd_import_json(&rt, &config, source, output.as_ref())
        }
        Commands::Storage { source, dir, key } => {
            let rt = Runtime::new()?;
            cmd_import_storage(&rt, &config, source, dir.as_ref(), key.as_deref())
        }
        Commands::InitConfig { force } => cmd_init_config(cli.config.as_ref(), *force),
    }
}
