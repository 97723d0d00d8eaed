//! Test utilities for clip store tests.
//!
//! Provides:
//! - Temporary data directory fixtures
//! - Builders for legacy (pre-metadata) databases

#![allow(dead_code)]

use clipshelf::{ClipStore, StoreConfig};
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

/// Layout of the clip store before reading metadata existed.
pub const LEGACY_V1_TABLE: &str = r#"
CREATE TABLE clipped_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    content TEXT,
    timestamp TEXT NOT NULL
)
"#;

/// Test fixture that manages a temporary data directory.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary data directory
    pub temp_dir: TempDir,
    /// Store configuration rooted at the temporary directory
    pub config: StoreConfig,
}

impl TestFixture {
    /// Create a new fixture with an empty data directory.
    pub fn new() -> Self {
        clipshelf::observability::tracing::init_test_tracing();
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let config = StoreConfig::test_config(temp_dir.path());
        Self { temp_dir, config }
    }

    /// Path to the database file.
    pub fn db_path(&self) -> PathBuf {
        self.config.db_path()
    }

    /// An uninitialized store over this fixture's database.
    pub fn store(&self) -> ClipStore {
        ClipStore::new(self.config.clone())
    }

    /// An initialized store over this fixture's database.
    pub async fn ready_store(&self) -> ClipStore {
        let store = self.store();
        store.init().await.expect("init failed");
        store
    }

    /// Write a version 1 database holding one row per `(title, content)`.
    pub fn write_legacy_database(&self, rows: &[(&str, Option<&str>)]) {
        let conn = Connection::open(self.db_path()).expect("failed to open legacy db");
        conn.execute(LEGACY_V1_TABLE, []).unwrap();
        for (title, content) in rows {
            conn.execute(
                "INSERT INTO clipped_pages (title, url, content, timestamp)
                 VALUES (?1, 'http://legacy.example', ?2, '2023-11-02T09:15:00.000Z')",
                rusqlite::params![title, content],
            )
            .unwrap();
        }
        conn.pragma_update(None, "user_version", 1).unwrap();
    }

    /// Read `PRAGMA user_version` straight from the file.
    pub fn schema_version(&self) -> i64 {
        let conn = Connection::open(self.db_path()).unwrap();
        conn.query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap()
    }

    /// Read the file's journal mode without changing it.
    pub fn journal_mode(&self) -> String {
        let conn = Connection::open(self.db_path()).unwrap();
        conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.temp_dir.path().exists());
        assert!(fixture.db_path().ends_with("test.db"));
    }
}
