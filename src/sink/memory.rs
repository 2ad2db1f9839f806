use std::collections::HashSet;

use async_trait::async_trait;

use super::RecordSink;
use crate::error::Result;
use crate::model::SongRecord;

/// Ordered in-memory catalog with a `(title, artist)` index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<SongRecord>,
    keys: HashSet<(String, String)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already persisted records, keeping their order.
    ///
    /// Existing duplicates are kept as-is; they only collapse in the index.
    pub fn from_records(records: Vec<SongRecord>) -> Self {
        let keys = records
            .iter()
            .map(|r| (r.title.clone(), r.artist.clone()))
            .collect();
        Self { records, keys }
    }

    pub fn contains(&self, title: &str, artist: &str) -> bool {
        self.keys.contains(&(title.to_string(), artist.to_string()))
    }

    pub fn push(&mut self, record: SongRecord) {
        self.keys
            .insert((record.title.clone(), record.artist.clone()));
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SongRecord] {
        &self.records
    }
}

#[async_trait]
impl RecordSink for Catalog {
    async fn contains(&mut self, title: &str, artist: &str) -> Result<bool> {
        Ok(Catalog::contains(self, title, artist))
    }

    async fn append(&mut self, record: &SongRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }

    async fn total(&mut self) -> Result<usize> {
        Ok(self.len())
    }

    async fn preview(&mut self, limit: usize) -> Result<Vec<SongRecord>> {
        Ok(self.records.iter().take(limit).cloned().collect())
    }

    async fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
