//! Test utilities and fixtures for songbook-import tests.
//!
//! # Example
//!
//! ```ignore
//! use songbook_import::test_utils::{temp_db, mock_record};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let song = mock_record("Hey Jude", "Beatles");
//!     // ... test logic
//! }
//! ```

use std::path::PathBuf;

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::config::StorageConfig;
use crate::model::{RawRow, SongRecord};

/// Creates a temporary database for testing.
///
/// Keep the returned `TempDir` alive for the duration of the test; the
/// database is deleted when it is dropped.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");

    let pool = crate::db::init_db(&crate::db::db_url(&db_path))
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// A spreadsheet row with the given title and artist and filler key/chords.
pub fn mock_row(title: &str, artist: &str) -> RawRow {
    RawRow::new(Some(title), Some(artist), Some("Am"), Some("Am F C G"))
}

/// An already-normalized record, as a sink would hold it.
///
/// Customize with struct update syntax:
///
/// ```ignore
/// let song = SongRecord {
///     chords: "C G".to_string(),
///     ..mock_record("Imagine", "John Lennon")
/// };
/// ```
pub fn mock_record(title: &str, artist: &str) -> SongRecord {
    SongRecord {
        id: Some(format!("test-{title}-{artist}")),
        title: title.to_string(),
        artist: artist.to_string(),
        original_key: "Am".to_string(),
        chords: "Am F C G".to_string(),
        created_at: "2025-01-01T00:00:00+00:00".to_string(),
    }
}

/// Storage settings rooted at `dir` with the default key and manifest name.
pub fn storage_config(dir: PathBuf) -> StorageConfig {
    StorageConfig {
        dir,
        ..StorageConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;
        assert_eq!(crate::db::count_songs(&pool).await.unwrap(), 0);
    }

    #[test]
    fn test_mock_record_defaults() {
        let song = mock_record("Hey Jude", "Beatles");
        assert_eq!(song.title, "Hey Jude");
        assert_eq!(song.artist, "Beatles");
        assert_eq!(song.original_key, "Am");
        assert!(song.id.is_some());
    }

    #[test]
    fn test_storage_config_uses_default_names() {
        let config = storage_config(PathBuf::from("/tmp/store"));
        assert_eq!(config.key, "songs");
        assert_eq!(config.manifest, "manifest.json");
    }
}
