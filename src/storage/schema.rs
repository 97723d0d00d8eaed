//! Schema definitions, pragmas and version bookkeeping.
//!
//! The schema version lives in `PRAGMA user_version`:
//! - `0`: empty database, nothing created yet
//! - `1`: clip store without derived reading metadata
//! - `2`: clip store with `word_count` / `reading_time`

use rusqlite::{Connection, OptionalExtension};

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: i64 = 2;

/// Last schema version without derived reading metadata.
pub const PRE_METADATA_VERSION: i64 = 1;

/// Name of the single record store.
pub const CLIPS_TABLE: &str = "clipped_pages";

/// Current layout of the clip store.
pub const CREATE_CLIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clipped_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    timestamp TEXT NOT NULL,
    word_count INTEGER NOT NULL DEFAULT 0,
    reading_time INTEGER NOT NULL DEFAULT 0
)
"#;

/// Secondary indexes on the clip store.
pub const CREATE_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_clipped_pages_timestamp ON clipped_pages(timestamp)"];

/// Columns added by the version 2 upgrade.
pub const METADATA_COLUMNS: &[(&str, &str)] = &[
    (
        "word_count",
        "ALTER TABLE clipped_pages ADD COLUMN word_count INTEGER",
    ),
    (
        "reading_time",
        "ALTER TABLE clipped_pages ADD COLUMN reading_time INTEGER",
    ),
];

/// Apply pragmas for the writer connection.
///
/// WAL lets pooled readers run alongside the writer; `synchronous=FULL`
/// makes every acknowledged write durable.
pub fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "FULL")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    Ok(())
}

/// Apply pragmas for read-only pooled connections.
pub fn apply_reader_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.pragma_update(None, "query_only", true)?;
    Ok(())
}

/// Read the on-disk schema version.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Record the on-disk schema version.
pub fn set_schema_version(conn: &Connection, version: i64) -> rusqlite::Result<()> {
    conn.pragma_update(None, "user_version", version)
}

/// Whether the clip store table exists.
pub fn clips_table_exists(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [CLIPS_TABLE],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

/// Whether the clip store has the given column.
pub fn clips_column_exists(conn: &Connection, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let mut rows = stmt.query([CLIPS_TABLE])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Create the clip store at the current layout.
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(CREATE_CLIPS_TABLE, [])?;
    for stmt in CREATE_INDEXES {
        conn.execute(stmt, [])?;
    }
    Ok(())
}
