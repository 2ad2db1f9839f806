use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Catalog, Manifest, RecordSink, write_json_atomic};
use crate::config::StorageConfig;
use crate::error::{Error, Result, ResultExt};
use crate::model::SongRecord;

/// Snapshot of the mobile app's key-value storage.
///
/// Songs live in `<dir>/<key>` as a JSON array. On finalize the array is
/// rewritten and the manifest entry for `key` is created or refreshed.
/// Unlike [`JsonFileSink`](super::JsonFileSink), a storage file that fails
/// to parse is treated as empty.
#[derive(Debug)]
pub struct StorageSink {
    key: String,
    file: PathBuf,
    manifest_path: PathBuf,
    catalog: Catalog,
}

impl StorageSink {
    /// Load the current snapshot from the storage directory.
    ///
    /// The directory is only created by [`RecordSink::finalize`], so a dry
    /// run against a fresh location leaves nothing behind.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        validate_key(&config.key, &config.manifest)?;

        let file = config.dir.join(&config.key);
        let records = read_records(&file)?;
        Ok(Self {
            key: config.key.clone(),
            file,
            manifest_path: config.dir.join(&config.manifest),
            catalog: Catalog::from_records(records),
        })
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }
}

/// The key doubles as a file name, so it must be a plain one.
fn validate_key(key: &str, manifest: &str) -> Result<()> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(Error::config(format!(
            "storage key {key:?} is not a plain file name"
        )));
    }
    // Atomic writes go through `<name>.tmp`, so those names collide too
    if key == manifest || key == temp_name(manifest) || temp_name(key) == manifest {
        return Err(Error::config(format!(
            "storage key {key:?} collides with the manifest file {manifest:?}"
        )));
    }
    Ok(())
}

fn temp_name(name: &str) -> String {
    format!("{name}.tmp")
}

fn read_records(file: &Path) -> Result<Vec<SongRecord>> {
    if !file.exists() {
        return Ok(Vec::new());
    }
    let contents =
        std::fs::read_to_string(file).with_context(format!("reading {}", file.display()))?;
    match serde_json::from_str(&contents) {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!(target: "sink::storage", path = %file.display(), error = %e, "Malformed storage file, starting empty");
            Ok(Vec::new())
        }
    }
}

#[async_trait]
impl RecordSink for StorageSink {
    async fn contains(&mut self, title: &str, artist: &str) -> Result<bool> {
        Ok(self.catalog.contains(title, artist))
    }

    async fn append(&mut self, record: &SongRecord) -> Result<()> {
        self.catalog.push(record.clone());
        Ok(())
    }

    async fn total(&mut self) -> Result<usize> {
        Ok(self.catalog.len())
    }

    async fn preview(&mut self, limit: usize) -> Result<Vec<SongRecord>> {
        Ok(self.catalog.records().iter().take(limit).cloned().collect())
    }

    async fn finalize(&mut self) -> Result<()> {
        write_json_atomic(&self.file, self.catalog.records())?;

        let mut manifest = Manifest::load(&self.manifest_path);
        let replaced = manifest.get(&self.key).is_some();
        manifest.upsert(&self.key, &self.file)?;
        manifest.save()?;

        info!(
            target: "sink::storage",
            key = %self.key,
            path = %self.file.display(),
            total = self.catalog.len(),
            manifest_entries = manifest.len(),
            replaced,
            "Wrote storage snapshot and manifest"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.file.display().to_string()
    }
}
