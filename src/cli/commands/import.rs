//! Spreadsheet import commands, one per storage target.

use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::info;

use super::SourceArgs;
use crate::config::Config;
use crate::import::{self, ImportReport, PREVIEW_CHORD_CHARS, PREVIEW_LIMIT};
use crate::model::{RawRow, SongRecord};
use crate::sink::{DatabaseSink, JsonFileSink, RecordSink, StorageSink};
use crate::source::{RowSource, SpreadsheetSource};

/// Import into the SQLite database
pub fn cmd_import_db(
    rt: &Runtime,
    config: &Config,
    args: &SourceArgs,
    db_path: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let rows = read_source(config, args)?;
    let path = db_path.unwrap_or(&config.database.path).clone();

    rt.block_on(async {
        let mut sink = if args.dry_run {
            DatabaseSink::open_scratch(path).await?
        } else {
            DatabaseSink::open(path).await?
        };
        import_and_report(&rows, &mut sink, args.dry_run).await
    })
}

/// Import into a flat JSON file
pub fn cmd_import_json(
    rt: &Runtime,
    config: &Config,
    args: &SourceArgs,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let rows = read_source(config, args)?;
    let path = output.unwrap_or(&config.json.path).clone();

    rt.block_on(async {
        let mut sink = JsonFileSink::open(path)?;
        import_and_report(&rows, &mut sink, args.dry_run).await
    })
}

/// Import into the key-value storage snapshot
pub fn cmd_import_storage(
    rt: &Runtime,
    config: &Config,
    args: &SourceArgs,
    dir: Option<&PathBuf>,
    key: Option<&str>,
) -> anyhow::Result<()> {
    let rows = read_source(config, args)?;

    let mut storage = config.storage.clone();
    if let Some(dir) = dir {
        storage.dir = dir.clone();
    }
    if let Some(key) = key {
        storage.key = key.to_string();
    }

    rt.block_on(async {
        let mut sink = StorageSink::open(&storage)?;
        import_and_report(&rows, &mut sink, args.dry_run).await?;
        if !args.dry_run {
            println!("Manifest updated: {}", sink.manifest_path().display());
        }
        anyhow::Ok(())
    })
}

/// Read every row before any sink is opened, so a bad source leaves
/// storage untouched.
fn read_source(config: &Config, args: &SourceArgs) -> anyhow::Result<Vec<RawRow>> {
    let path = args.source.as_ref().unwrap_or(&config.source.path);
    let sheet = args.sheet.clone().or_else(|| config.source.sheet.clone());

    let mut source = SpreadsheetSource::new(path, sheet);
    let rows = source.read_rows()?;
    info!(target: "source", path = %path.display(), rows = rows.len(), "Source loaded");
    Ok(rows)
}

async fn import_and_report<S: RecordSink>(
    rows: &[RawRow],
    sink: &mut S,
    dry_run: bool,
) -> anyhow::Result<()> {
    let report = import::run_import(rows, sink, dry_run).await?;
    let preview = sink.preview(PREVIEW_LIMIT).await?;
    print_summary(&report, &preview, &sink.location(), dry_run);
    Ok(())
}

fn print_summary(report: &ImportReport, preview: &[SongRecord], location: &str, dry_run: bool) {
    if dry_run {
        println!("[DRY RUN MODE - Nothing was written]\n");
        println!("{} new songs would be added.", report.added_count);
    } else {
        println!("{} new songs added.", report.added_count);
    }
    println!("Total songs: {}", report.total_count);
    println!("Location: {}", location);

    if preview.is_empty() {
        return;
    }
    println!("\nSample songs:");
    for song in preview {
        println!();
        for line in preview_lines(song) {
            println!("{}", line);
        }
    }
}

fn preview_lines(song: &SongRecord) -> [String; 4] {
    [
        format!("Title:  {}", song.title),
        format!("Artist: {}", song.artist),
        format!("Key:    {}", song.original_key),
        format!(
            "Chords: {}...",
            import::truncate_chords(&song.chords, PREVIEW_CHORD_CHARS)
        ),
    ]
}
