//! Database module for song persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Query helpers are generic over the executor so the same code runs
//! against the pool or inside an open transaction.
//!
//! # Example
//!
//! ```ignore
//! use songbook_import::db::{init_db, count_songs};
//!
//! let pool = init_db("sqlite:songs.db").await?;
//! let total = count_songs(&pool).await?;
//! ```

use std::path::Path;

use crate::model::SongRecord;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Sqlite};

/// Build a SQLite database URL from a file path.
pub fn db_url(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database seeded with the songs stored at `seed`.
///
/// Used for dry runs: lookups and counts match the real catalog, but the
/// file at `seed` is only read, never created or migrated. An in-memory
/// database lives as long as its single connection, so the pool keeps
/// exactly one connection open for its whole lifetime.
pub async fn init_scratch_db(seed: Option<&Path>) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    if let Some(path) = seed {
        // ATTACH is not allowed inside a transaction, so seed before any is opened
        let mut conn = pool.acquire().await?;
        sqlx::query("ATTACH DATABASE ? AS seed")
            .bind(path.display().to_string())
            .execute(&mut *conn)
            .await?;

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM seed.sqlite_master WHERE type = 'table' AND name = 'songs'",
        )
        .fetch_one(&mut *conn)
        .await?;
        if tables > 0 {
            sqlx::query(
                r#"
                INSERT INTO songs (id, title, artist, original_key, chords, created_at)
                SELECT id, title, artist, original_key, chords, created_at
                FROM seed.songs ORDER BY id
                "#,
            )
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query("DETACH DATABASE seed")
            .execute(&mut *conn)
            .await?;
    }

    Ok(pool)
}

/// Look up a song by its exact title and artist.
///
/// Returns the row id of the first match.
pub async fn find_song_id<'e, E>(executor: E, title: &str, artist: &str) -> sqlx::Result<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM songs WHERE title = ? AND artist = ? LIMIT 1")
            .bind(title)
            .bind(artist)
            .fetch_optional(executor)
            .await?;
    Ok(row.map(|(id,)| id))
}

/// Insert a song and return its row id.
///
/// The record's own `id` is not stored; SQLite assigns one.
pub async fn insert_song<'e, E>(executor: E, song: &SongRecord) -> sqlx::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO songs (title, artist, original_key, chords, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.original_key)
    .bind(&song.chords)
    .bind(&song.created_at)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Count all songs.
pub async fn count_songs<'e, E>(executor: E) -> sqlx::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM songs")
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Get the first `limit` songs in insertion order.
pub async fn get_songs<'e, E>(executor: E, limit: i64) -> sqlx::Result<Vec<SongRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, SongRecord>(
        "SELECT title, artist, original_key, chords, created_at FROM songs ORDER BY id LIMIT ?",
    )
    .bind(limit)
    .fetch_all(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_record, temp_db};

    #[tokio::test]
    async fn test_init_db_creates_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let pool = init_db(&db_url(&db_path)).await.expect("Failed to init db");
        assert!(db_path.exists());

        assert_eq!(count_songs(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scratch_db_is_seeded_and_isolated() {
        let (pool, dir) = temp_db().await;
        insert_song(&pool, &mock_record("Hey Jude", "Beatles")).await.unwrap();
        insert_song(&pool, &mock_record("Yesterday", "Beatles")).await.unwrap();

        let scratch = init_scratch_db(Some(&dir.path().join("test.db"))).await.unwrap();
        assert_eq!(count_songs(&scratch).await.unwrap(), 2);
        let songs = get_songs(&scratch, 10).await.unwrap();
        assert_eq!(songs[0].title, "Hey Jude");
        assert_eq!(songs[1].title, "Yesterday");

        insert_song(&scratch, &mock_record("Imagine", "John Lennon")).await.unwrap();
        assert_eq!(count_songs(&scratch).await.unwrap(), 3);
        assert_eq!(count_songs(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_scratch_db_without_seed_is_empty() {
        let scratch = init_scratch_db(None).await.unwrap();
        assert_eq!(count_songs(&scratch).await.unwrap(), 0);
        insert_song(&scratch, &mock_record("Hey Jude", "Beatles")).await.unwrap();
        assert!(find_song_id(&scratch, "Hey Jude", "Beatles").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_and_find_song() {
        let (pool, _dir) = temp_db().await;
        let song = mock_record("Hey Jude", "Beatles");

        let id = insert_song(&pool, &song).await.unwrap();
        assert!(id > 0);

        let found = find_song_id(&pool, "Hey Jude", "Beatles").await.unwrap();
        assert_eq!(found, Some(id));

        // Exact match only
        assert!(find_song_id(&pool, "hey jude", "Beatles").await.unwrap().is_none());
        assert!(find_song_id(&pool, "Hey Jude", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_songs_in_insertion_order() {
        let (pool, _dir) = temp_db().await;
        for title in ["A", "B", "C", "D"] {
            insert_song(&pool, &mock_record(title, "Artist")).await.unwrap();
        }

        let songs = get_songs(&pool, 3).await.unwrap();
        let titles: Vec<&str> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert!(songs.iter().all(|s| s.id.is_none()));
        assert_eq!(songs[0].original_key, "Am");
        assert_eq!(count_songs(&pool).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_queries_run_inside_transaction() {
        let (pool, _dir) = temp_db().await;
        let mut tx = pool.begin().await.unwrap();

        insert_song(&mut *tx, &mock_record("Let It Be", "Beatles"))
            .await
            .unwrap();
        assert!(
            find_song_id(&mut *tx, "Let It Be", "Beatles")
                .await
                .unwrap()
                .is_some()
        );

        tx.rollback().await.unwrap();
        assert_eq!(count_songs(&pool).await.unwrap(), 0);
    }
}
