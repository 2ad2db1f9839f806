use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};

use super::RecordSink;
use crate::db;
use crate::error::{Error, Result, ResultExt};
use crate::model::SongRecord;

/// Songs table in a SQLite database.
///
/// All lookups and inserts of a run share one transaction, so a song
/// inserted earlier in the batch is seen by later lookups and an aborted
/// run leaves the table unchanged. [`RecordSink::finalize`] commits.
pub struct DatabaseSink {
    path: PathBuf,
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl DatabaseSink {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let pool = db::init_db(&db::db_url(&path))
            .await
            .with_context(format!("opening database {}", path.display()))?;
        let tx = pool.begin().await?;
        debug!(target: "sink::db", path = %path.display(), "Opened database");
        Ok(Self {
            path,
            pool,
            tx: Some(tx),
        })
    }

    /// Open a throwaway copy of the database at `path` for a dry run.
    ///
    /// The run sees every song already stored, but works on an in-memory
    /// database; the file is neither created nor migrated nor modified.
    pub async fn open_scratch(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let seed = path.is_file().then_some(path.as_path());
        let pool = db::init_scratch_db(seed)
            .await
            .with_context(format!("reading database {}", path.display()))?;
        let tx = pool.begin().await?;
        debug!(target: "sink::db", path = %path.display(), seeded = seed.is_some(), "Opened scratch database");
        Ok(Self {
            path,
            pool,
            tx: Some(tx),
        })
    }

    fn tx(&mut self) -> Result<&mut Transaction<'static, Sqlite>> {
        self.tx
            .as_mut()
            .ok_or_else(|| Error::sink("database transaction already committed"))
    }
}

#[async_trait]
impl RecordSink for DatabaseSink {
    async fn contains(&mut self, title: &str, artist: &str) -> Result<bool> {
        let tx = self.tx()?;
        Ok(db::find_song_id(&mut **tx, title, artist).await?.is_some())
    }

    async fn append(&mut self, record: &SongRecord) -> Result<()> {
        let tx = self.tx()?;
        let id = db::insert_song(&mut **tx, record).await?;
        debug!(target: "sink::db", id, title = %record.title, "Inserted song");
        Ok(())
    }

    async fn total(&mut self) -> Result<usize> {
        let count = match self.tx.as_mut() {
            Some(tx) => db::count_songs(&mut **tx).await?,
            None => db::count_songs(&self.pool).await?,
        };
        Ok(count as usize)
    }

    async fn preview(&mut self, limit: usize) -> Result<Vec<SongRecord>> {
        let limit = limit as i64;
        let songs = match self.tx.as_mut() {
            Some(tx) => db::get_songs(&mut **tx, limit).await?,
            None => db::get_songs(&self.pool, limit).await?,
        };
        Ok(songs)
    }

    async fn finalize(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::sink("database transaction already committed"))?;
        tx.commit().await.with_context("committing import")?;
        info!(target: "sink::db", path = %self.path.display(), "Committed import");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
