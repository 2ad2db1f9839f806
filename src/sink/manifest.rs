//! Key-value storage manifest.
//!
//! The storage directory holds one file per key plus `manifest.json`, a JSON
//! object mapping each key to `{"key": <key>, "value": <file path>}`. Entries
//! written by other tools are kept verbatim.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::write_json_atomic;
use crate::error::Result;

/// Manifest entry pointing a storage key at its backing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl Manifest {
    /// Load the manifest at `path`.
    ///
    /// A missing, unreadable or malformed manifest starts out empty; the
    /// broken file is replaced on the next [`Manifest::save`].
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(target: "sink::storage", path = %path.display(), error = %e, "Malformed manifest, starting empty");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warn!(target: "sink::storage", path = %path.display(), error = %e, "Unreadable manifest, starting empty");
                Map::new()
            }
        };
        Self { path, entries }
    }

    /// Create or replace the entry for `key`.
    pub fn upsert(&mut self, key: &str, file: &Path) -> Result<()> {
        let entry = ManifestEntry {
            key: key.to_string(),
            value: file.display().to_string(),
        };
        self.entries
            .insert(key.to_string(), serde_json::to_value(entry)?);
        Ok(())
    }

    /// The entry for `key`, if present and well-formed.
    pub fn get(&self, key: &str) -> Option<ManifestEntry> {
        self.entries
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.entries)
    }
}
