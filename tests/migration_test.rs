//! Schema upgrade tests against on-disk fixtures.
//!
//! Tests:
//! - Pre-metadata databases are upgraded and backfilled during init
//! - Existing metadata survives the upgrade
//! - Failed upgrades leave the database at its old version

mod common;

use chrono::{TimeZone, Utc};
use clipshelf::storage::migration::backfill_metadata;
use clipshelf::storage::schema::SCHEMA_VERSION;
use clipshelf::storage::{InitError, MigrationError, MigrationOutcome, StoreError};
use clipshelf::storage::writer::WriterError;
use common::TestFixture;
use rusqlite::Connection;

type Snapshot = Vec<(i64, String, String, Option<String>, String, Option<i64>, Option<i64>)>;

fn snapshot(conn: &Connection) -> Snapshot {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, url, content, timestamp, word_count, reading_time
             FROM clipped_pages ORDER BY id",
        )
        .unwrap();
    stmt.query_map([], |row| {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    })
    .unwrap()
    .collect::<Result<Vec<_>, _>>()
    .unwrap()
}

#[tokio::test]
async fn test_upgrade_backfills_metadata() {
    let fixture = TestFixture::new();
    fixture.write_legacy_database(&[("short", Some("a b")), ("missing", None)]);

    let store = fixture.ready_store().await;

    assert_eq!(
        store.migration_outcome(),
        Some(MigrationOutcome::Upgraded {
            from: 1,
            backfilled: 2
        })
    );
    let mut pages = store.get_all_pages().await.unwrap();
    pages.sort_by_key(|p| p.id);

    assert_eq!(pages.len(), 2);
    assert_eq!((pages[0].id, pages[0].word_count, pages[0].reading_time), (1, 2, 1));
    assert_eq!(pages[0].title, "short");
    assert_eq!(pages[0].url, "http://legacy.example");
    assert_eq!((pages[1].word_count, pages[1].reading_time), (0, 0));
    assert_eq!(fixture.schema_version(), SCHEMA_VERSION);
}

#[tokio::test]
async fn test_upgrade_keeps_existing_metadata() {
    let fixture = TestFixture::new();
    fixture.write_legacy_database(&[("fresh", Some("a b")), ("counted", Some("a b"))]);
    {
        // A record that already carries metadata, still at version 1
        let conn = Connection::open(fixture.db_path()).unwrap();
        conn.execute_batch(
            "ALTER TABLE clipped_pages ADD COLUMN word_count INTEGER;
             ALTER TABLE clipped_pages ADD COLUMN reading_time INTEGER;
             UPDATE clipped_pages SET word_count = 5, reading_time = 1 WHERE title = 'counted';",
        )
        .unwrap();
    }

    let store = fixture.ready_store().await;

    let mut pages = store.get_all_pages().await.unwrap();
    pages.sort_by_key(|p| p.id);
    assert_eq!((pages[0].word_count, pages[0].reading_time), (2, 1));
    assert_eq!((pages[1].word_count, pages[1].reading_time), (5, 1));
    assert_eq!(
        store.migration_outcome(),
        Some(MigrationOutcome::Upgraded {
            from: 1,
            backfilled: 1
        })
    );
}

#[tokio::test]
async fn test_upgraded_offsetless_timestamps_stay_listable() {
    let fixture = TestFixture::new();
    fixture.write_legacy_database(&[("zoned", Some("a b"))]);
    {
        let conn = Connection::open(fixture.db_path()).unwrap();
        conn.execute(
            "INSERT INTO clipped_pages (title, url, content, timestamp)
             VALUES ('naive', 'http://legacy.example', 'c d e', '2023-11-02T09:15:00')",
            [],
        )
        .unwrap();
    }

    let store = fixture.ready_store().await;

    assert_eq!(
        store.migration_outcome(),
        Some(MigrationOutcome::Upgraded {
            from: 1,
            backfilled: 2
        })
    );
    let mut pages = store.get_all_pages().await.unwrap();
    pages.sort_by_key(|p| p.id);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].timestamp, pages[1].timestamp);
    assert_eq!(
        pages[1].timestamp,
        Utc.with_ymd_and_hms(2023, 11, 2, 9, 15, 0).unwrap()
    );
    assert_eq!(pages[1].word_count, 3);
}

#[tokio::test]
async fn test_new_clips_continue_after_legacy_ids() {
    let fixture = TestFixture::new();
    fixture.write_legacy_database(&[("one", Some("x")), ("two", Some("y"))]);

    let store = fixture.ready_store().await;
    let id = store
        .add_page(clipshelf::NewClip::new("three", "http://x", "z"))
        .await
        .unwrap();

    assert_eq!(id, 3);
}

#[tokio::test]
async fn test_backfill_twice_is_identical() {
    let fixture = TestFixture::new();
    fixture.write_legacy_database(&[
        ("a", Some("one two three")),
        ("b", None),
        ("c", Some("")),
        ("d", Some("  spaced   out  ")),
    ]);
    fixture.ready_store().await.shutdown().await.unwrap();

    let conn = Connection::open(fixture.db_path()).unwrap();
    let after_upgrade = snapshot(&conn);
    assert_eq!(backfill_metadata(&conn).unwrap(), 0);
    assert_eq!(snapshot(&conn), after_upgrade);
}

#[tokio::test]
async fn test_failed_upgrade_keeps_old_version() {
    let fixture = TestFixture::new();
    {
        // Version 1 store whose rows cannot be scanned
        let conn = Connection::open(fixture.db_path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE clipped_pages (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT);
             INSERT INTO clipped_pages (title) VALUES ('broken');
             PRAGMA user_version = 1;",
        )
        .unwrap();
    }
    let store = fixture.store();

    let err = store.init().await.unwrap_err();

    assert!(matches!(
        err,
        StoreError::Init(InitError::Writer(WriterError::Migration(
            MigrationError::Database(_)
        )))
    ));
    assert!(!store.is_initialized());
    assert_eq!(fixture.schema_version(), 1);
}

#[tokio::test]
async fn test_newer_database_is_refused() {
    let fixture = TestFixture::new();
    {
        let conn = Connection::open(fixture.db_path()).unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
    }

    let err = fixture.store().init().await.unwrap_err();

    assert!(matches!(
        err,
        StoreError::Init(InitError::Writer(WriterError::Migration(
            MigrationError::UnsupportedVersion { .. }
        )))
    ));
    assert_eq!(fixture.schema_version(), SCHEMA_VERSION + 1);
    assert_eq!(fixture.journal_mode(), "delete");
}
