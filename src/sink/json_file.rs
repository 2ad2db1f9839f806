use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Catalog, RecordSink, write_json_atomic};
use crate::error::{Error, Result, ResultExt};
use crate::model::SongRecord;

/// Catalog stored as one JSON array in a single file.
///
/// The whole array is loaded on open and rewritten on finalize. A file that
/// exists but does not parse as an array of songs is an error; nothing is
/// overwritten in that case.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    catalog: Catalog,
}

impl JsonFileSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = read_records(&path)?;
        debug!(target: "sink::json", path = %path.display(), existing = records.len(), "Opened JSON catalog");
        Ok(Self {
            path,
            catalog: Catalog::from_records(records),
        })
    }
}

fn read_records(path: &Path) -> Result<Vec<SongRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents =
        std::fs::read_to_string(path).with_context(format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).map_err(|e| Error::invalid_format(path, e.to_string()))
}

#[async_trait]
impl RecordSink for JsonFileSink {
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
        write_json_atomic(&self.path, self.catalog.records())?;
        info!(target: "sink::json", path = %self.path.display(), total = self.catalog.len(), "Wrote JSON catalog");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
