//! Record sinks: where imported songs end up.
//!
//! Every storage target implements [`RecordSink`], so the import pipeline
//! runs unchanged against:
//! - [`Catalog`]: an in-memory catalog (tests, and the working set of the
//!   file sinks)
//! - [`DatabaseSink`]: the SQLite `songs` table
//! - [`JsonFileSink`]: a single JSON array on disk
//! - [`StorageSink`]: the app's key-value storage snapshot plus manifest
//!
//! Nothing reaches storage until [`RecordSink::finalize`] runs; a sink
//! dropped before that leaves the previous state untouched.

mod database;
mod json_file;
mod manifest;
mod memory;
mod storage;

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Error, Result, ResultExt};
use crate::model::SongRecord;

pub use database::DatabaseSink;
pub use json_file::JsonFileSink;
pub use manifest::{Manifest, ManifestEntry};
pub use memory::Catalog;
pub use storage::StorageSink;

/// Storage target for the import pipeline.
#[async_trait]
pub trait RecordSink: Send {
    /// Whether a song with exactly this title and artist is already stored,
    /// including songs appended earlier in the current run.
    async fn contains(&mut self, title: &str, artist: &str) -> Result<bool>;

    /// Append a new song.
    async fn append(&mut self, record: &SongRecord) -> Result<()>;

    /// Number of songs stored, including pending appends.
    async fn total(&mut self) -> Result<usize>;

    /// The first `limit` songs in storage order.
    async fn preview(&mut self, limit: usize) -> Result<Vec<SongRecord>>;

    /// Persist everything appended so far.
    async fn finalize(&mut self) -> Result<()>;

    /// Human-readable location of the underlying storage.
    fn location(&self) -> String;
}

/// Serialize `value` as pretty JSON and replace `path` with it atomically.
///
/// The data is written to a sibling temp file first and then renamed over
/// the target, so readers see either the old or the new file.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::sink(format!("not a file path: {}", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(format!("creating {}", dir.display()))?;
    }
    std::fs::write(&temp_path, contents)
        .with_context(format!("writing {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path).with_context(format!(
        "renaming {} to {}",
        temp_path.display(),
        path.display()
    ))?;
    Ok(())
}
