//! Read connection pool for listing clips.
//!
//! Uses r2d2 with r2d2_sqlite for pooled read access.
//! SQLite WAL mode allows readers alongside the writer thread.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{OpenFlags, Row};
use std::path::Path;
use thiserror::Error;

use super::schema::apply_reader_pragmas;
use crate::model::{parse_timestamp, ClippedPage};

/// Error type for reader pool operations.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Failed to create connection pool: {0}")]
    PoolCreation(#[from] r2d2::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Read connection pool for clip queries.
///
/// The database must already exist: the writer creates and migrates it
/// before the pool is built.
#[derive(Clone)]
pub struct ReaderPool {
    pool: Pool<SqliteConnectionManager>,
}

impl ReaderPool {
    /// Create a new reader pool for the given database path.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the SQLite database file
    /// * `max_size` - Maximum number of connections in the pool
    pub fn new<P: AsRef<Path>>(db_path: P, max_size: u32) -> Result<Self, ReaderError> {
        let manager = SqliteConnectionManager::file(db_path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);

        let pool = Pool::builder()
            .max_size(max_size.max(1))
            .connection_customizer(Box::new(ReaderConnectionCustomizer))
            .build(manager)?;

        Ok(Self { pool })
    }

    /// Get a connection from the pool.
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, ReaderError> {
        Ok(self.pool.get()?)
    }

    /// Load every stored clip, in storage order.
    pub fn all_pages(&self) -> Result<Vec<ClippedPage>, ReaderError> {
        let conn = self.get()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, title, url, content, timestamp, word_count, reading_time
             FROM clipped_pages",
        )?;
        let pages = stmt
            .query_map([], row_to_page)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    /// Load every stored clip on the blocking thread pool.
    pub async fn all_pages_async(&self) -> Result<Vec<ClippedPage>, ReaderError> {
        let pool = self.clone();
        tokio::task::spawn_blocking(move || pool.all_pages()).await?
    }
}

fn row_to_page(row: &Row<'_>) -> rusqlite::Result<ClippedPage> {
    let raw_timestamp: String = row.get(4)?;
    let timestamp = parse_timestamp(&raw_timestamp)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(ClippedPage {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        // Pre-metadata stores allowed NULL content
        content: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        timestamp,
        word_count: row.get(5)?,
        reading_time: row.get(6)?,
    })
}

/// Connection customizer that applies reader pragmas.
#[derive(Debug)]
struct ReaderConnectionCustomizer;

impl r2d2::CustomizeConnection<rusqlite::Connection, rusqlite::Error>
    for ReaderConnectionCustomizer
{
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        apply_reader_pragmas(conn)
    }
}
