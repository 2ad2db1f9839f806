//! Song import pipeline.
//!
//! Turns raw spreadsheet rows into [`SongRecord`]s and appends the ones a
//! sink does not already hold. Two songs are the same song when their
//! trimmed title and artist are byte-for-byte equal; nothing else is
//! compared. Songs added earlier in a batch count as already held, so
//! re-running an import with the same spreadsheet adds nothing.
//!
//! # Example
//!
//! ```ignore
//! use songbook_import::import::run_import;
//! use songbook_import::sink::JsonFileSink;
//!
//! let mut sink = JsonFileSink::open("songs.json")?;
//! let report = run_import(&rows, &mut sink, false).await?;
//! println!("{} added, {} total", report.added_count, report.total_count);
//! ```

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{RawRow, SongRecord};
use crate::sink::RecordSink;

/// Number of songs shown after an import.
pub const PREVIEW_LIMIT: usize = 3;

/// Characters of the chord sheet shown per previewed song.
pub const PREVIEW_CHORD_CHARS: usize = 100;

/// Outcome of an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Newly added songs, in source order
    pub added: Vec<SongRecord>,
    /// `added.len()`
    pub added_count: usize,
    /// Songs in the sink after the run (existing + added)
    pub total_count: usize,
}

fn cell(value: Option<&String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Normalize a raw row into a new record.
///
/// Absent cells become empty strings and every field is trimmed. The record
/// gets a fresh id and the current time as its creation timestamp.
pub fn normalize_row(row: &RawRow) -> SongRecord {
    SongRecord {
        id: Some(Uuid::new_v4().to_string()),
        title: cell(row.title.as_ref()),
        artist: cell(row.artist.as_ref()),
        original_key: cell(row.original_key.as_ref()),
        chords: cell(row.chords.as_ref()),
        created_at: Utc::now().to_rfc3339(),
    }
}

/// Whether `sink` already holds a song with the record's title and artist.
pub async fn is_duplicate<S>(record: &SongRecord, sink: &mut S) -> Result<bool>
where
    S: RecordSink + ?Sized,
{
    sink.contains(&record.title, &record.artist).await
}

/// Append every row that is not already in `sink`, in source order.
///
/// Does not finalize the sink.
pub async fn import_rows<S>(rows: &[RawRow], sink: &mut S) -> Result<ImportReport>
where
    S: RecordSink + ?Sized,
{
    let mut added = Vec::new();

    for row in rows {
        let record = normalize_row(row);
        if is_duplicate(&record, sink).await? {
            debug!(target: "import", title = %record.title, artist = %record.artist, "Skipping duplicate");
            continue;
        }
        sink.append(&record).await?;
        added.push(record);
    }

    let total_count = sink.total().await?;
    info!(
        target: "import",
        rows = rows.len(),
        added = added.len(),
        total = total_count,
        "Import batch processed"
    );

    Ok(ImportReport {
        added_count: added.len(),
        added,
        total_count,
    })
}

/// Import `rows` and persist the result.
///
/// With `dry_run` the sink is never finalized, so nothing is written; the
/// report still shows what would have been added.
pub async fn run_import<S>(rows: &[RawRow], sink: &mut S, dry_run: bool) -> Result<ImportReport>
where
    S: RecordSink + ?Sized,
{
    let report = import_rows(rows, sink).await?;
    if dry_run {
        info!(target: "import", location = %sink.location(), "Dry run, nothing written");
    } else {
        sink.finalize().await?;
    }
    Ok(report)
}

/// The first `max_chars` characters of a chord sheet.
pub fn truncate_chords(chords: &str, max_chars: usize) -> &str {
    match chords.char_indices().nth(max_chars) {
        Some((idx, _)) => &chords[..idx],
        None => chords,
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::sink::Catalog;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    /// Small alphabet so duplicates actually occur
    fn arbitrary_cell() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[ ab]{0,3}")
    }

    fn arbitrary_row() -> impl Strategy<Value = RawRow> {
        (arbitrary_cell(), arbitrary_cell(), arbitrary_cell(), arbitrary_cell()).prop_map(
            |(title, artist, original_key, chords)| RawRow {
                title,
                artist,
                original_key,
                chords,
            },
        )
    }

    fn identity(row: &RawRow) -> (String, String) {
        let trim = |c: &Option<String>| c.as_deref().unwrap_or("").trim().to_string();
        (trim(&row.title), trim(&row.artist))
    }

    proptest! {
        /// Normalized fields never carry surrounding whitespace
        #[test]
        fn normalized_fields_are_trimmed(row in arbitrary_row()) {
            let record = normalize_row(&row);
            for field in [&record.title, &record.artist, &record.original_key, &record.chords] {
                prop_assert_eq!(field.trim(), field.as_str());
            }
        }

        /// One song per distinct identity, first occurrence first
        #[test]
        fn added_songs_are_distinct_first_occurrences(rows in prop::collection::vec(arbitrary_row(), 0..30)) {
            let mut catalog = Catalog::new();
            let report = block_on(import_rows(&rows, &mut catalog)).unwrap();

            let mut seen = HashSet::new();
            let expected: Vec<(String, String)> = rows
                .iter()
                .map(identity)
                .filter(|id| seen.insert(id.clone()))
                .collect();
            let actual: Vec<(String, String)> = report
                .added
                .iter()
                .map(|r| (r.title.clone(), r.artist.clone()))
                .collect();

            prop_assert_eq!(actual, expected);
            prop_assert_eq!(report.added_count, report.added.len());
            prop_assert_eq!(report.total_count, catalog.len());
        }

        /// Importing the same rows again adds nothing
        #[test]
        fn reimport_is_idempotent(
            existing in prop::collection::vec(arbitrary_row(), 0..10),
            rows in prop::collection::vec(arbitrary_row(), 0..20),
        ) {
            let seed: Vec<SongRecord> = existing.iter().map(normalize_row).collect();
            let mut catalog = Catalog::from_records(seed);

            let first = block_on(import_rows(&rows, &mut catalog)).unwrap();
            let second = block_on(import_rows(&rows, &mut catalog)).unwrap();

            prop_assert_eq!(second.added_count, 0);
            prop_assert_eq!(first.total_count, second.total_count);
        }
    }
}
