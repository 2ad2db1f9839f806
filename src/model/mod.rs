//! Core data models for the song catalog.
//!
//! Defines [`SongRecord`], the canonical persisted unit, and [`RawRow`],
//! one unprocessed row as it comes out of a spreadsheet.
//!
//! # Serialized layout
//!
//! File-backed sinks store records as a JSON array using the keys the
//! mobile app reads: `id`, `title`, `artist`, `originalKey`, `chords`,
//! `created_at`. The database sink maps the same fields onto the `songs`
//! table (`original_key`, `created_at` columns).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A song with its chord sheet, as stored in a catalog.
///
/// Identity is the exact `(title, artist)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct SongRecord {
    /// Unique id assigned at import time (not stored by the database sink)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(skip)]
    pub id: Option<String>,
    /// Song title
    pub title: String,
    /// Performing artist (may be empty)
    pub artist: String,
    /// Key the chords are written in (may be empty)
    #[serde(rename = "originalKey")]
    pub original_key: String,
    /// Chord sheet text (may be empty)
    pub chords: String,
    /// RFC 3339 import timestamp
    pub created_at: String,
}

/// One spreadsheet row, read positionally.
///
/// Any cell may be absent (empty cell, short row, unreadable value).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub original_key: Option<String>,
    pub chords: Option<String>,
}

impl RawRow {
    /// Build a row from string slices, mostly for tests and fixtures.
    pub fn new(
        title: Option<&str>,
        artist: Option<&str>,
        original_key: Option<&str>,
        chords: Option<&str>,
    ) -> Self {
        Self {
            title: title.map(str::to_string),
            artist: artist.map(str::to_string),
            original_key: original_key.map(str::to_string),
            chords: chords.map(str::to_string),
        }
    }

    /// Build a row from cells in column order.
    ///
    /// Columns beyond the fourth are ignored; missing trailing columns are
    /// treated as absent.
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut cells = cells.into_iter();
        Self {
            title: cells.next().flatten(),
            artist: cells.next().flatten(),
            original_key: cells.next().flatten(),
            chords: cells.next().flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_uses_app_keys() {
        let record = SongRecord {
            id: Some("abc".to_string()),
            title: "Gülpembe".to_string(),
            artist: "Barış Manço".to_string(),
            original_key: "Em".to_string(),
            chords: "Em Am".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"originalKey\":\"Em\""));
        assert!(json.contains("\"created_at\""));
        // Non-ASCII text is kept as-is
        assert!(json.contains("Barış Manço"));
    }

    #[test]
    fn test_record_without_id_omits_key() {
        let record = SongRecord {
            title: "Imagine".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: SongRecord =
            serde_json::from_str(r#"{"id":"1","title":"Gülpembe","artist":"Barış Manço"}"#)
                .unwrap();
        assert_eq!(record.id.as_deref(), Some("1"));
        assert_eq!(record.original_key, "");
        assert_eq!(record.chords, "");
        assert_eq!(record.created_at, "");
    }

    #[test]
    fn test_from_cells_is_positional() {
        let row = RawRow::from_cells(vec![
            Some("Title".to_string()),
            None,
            Some("C".to_string()),
            Some("C G Am F".to_string()),
            Some("ignored".to_string()),
        ]);
        assert_eq!(row, RawRow::new(Some("Title"), None, Some("C"), Some("C G Am F")));

        let short = RawRow::from_cells(vec![Some("Only title".to_string())]);
        assert_eq!(short.artist, None);
        assert_eq!(short.chords, None);
    }
}
