//! Versioned schema upgrades.
//!
//! Runs once per open, inside a single immediate transaction, before the
//! writer accepts any command. The whole step is all-or-nothing: on error the
//! transaction rolls back and `user_version` keeps its previous value.

use rusqlite::{params, Connection, TransactionBehavior};
use thiserror::Error;

use super::schema::{self, PRE_METADATA_VERSION, SCHEMA_VERSION};
use crate::metadata;

/// Error type for schema migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: i64, supported: i64 },
}

/// What a migration run did to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Fresh install: the store was created at the current version.
    Created,
    /// An existing store was upgraded.
    Upgraded {
        /// Version found on disk before the upgrade.
        from: i64,
        /// Records whose metadata was rewritten by the backfill.
        backfilled: usize,
    },
    /// Already at the current version.
    UpToDate,
}

/// Read the on-disk version, refusing stores written by a newer build.
pub fn ensure_supported(conn: &Connection) -> Result<i64, MigrationError> {
    let found = schema::schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(MigrationError::UnsupportedVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(found)
}

/// Bring the database to [`SCHEMA_VERSION`].
#[tracing::instrument(skip(conn))]
pub fn run_migrations(conn: &mut Connection) -> Result<MigrationOutcome, MigrationError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let from = ensure_supported(&tx)?;

    let outcome = if !schema::clips_table_exists(&tx)? {
        // Nothing to backfill on a fresh install
        schema::initialize_schema(&tx)?;
        MigrationOutcome::Created
    } else if from < SCHEMA_VERSION {
        upgrade(&tx, from)?
    } else {
        MigrationOutcome::UpToDate
    };

    if from != SCHEMA_VERSION {
        schema::set_schema_version(&tx, SCHEMA_VERSION)?;
    }
    tx.commit()?;

    match outcome {
        MigrationOutcome::Created => {
            tracing::info!(version = SCHEMA_VERSION, "Created clip store");
        }
        MigrationOutcome::Upgraded { from, backfilled } => {
            tracing::info!(from, to = SCHEMA_VERSION, backfilled, "Upgraded clip store");
        }
        MigrationOutcome::UpToDate => {
            tracing::debug!(version = SCHEMA_VERSION, "Clip store schema up to date");
        }
    }

    Ok(outcome)
}

fn upgrade(conn: &Connection, from: i64) -> Result<MigrationOutcome, MigrationError> {
    let mut backfilled = 0;

    if from <= PRE_METADATA_VERSION {
        for (column, alter) in schema::METADATA_COLUMNS {
            if !schema::clips_column_exists(conn, column)? {
                conn.execute(alter, [])?;
            }
        }
        backfilled = backfill_metadata(conn)?;
    }

    for stmt in schema::CREATE_INDEXES {
        conn.execute(stmt, [])?;
    }

    Ok(MigrationOutcome::Upgraded { from, backfilled })
}

/// Fill in missing reading metadata for every stored clip.
///
/// Scans in storage order. A record is rewritten only when its word count or
/// reading time is missing or zero and the derived values differ from what
/// is stored; every other field, including the id, is left as is. Returns
/// the number of records rewritten, so a second run over the same data
/// returns zero.
pub fn backfill_metadata(conn: &Connection) -> rusqlite::Result<usize> {
    let mut select = conn.prepare(
        "SELECT id, content, word_count, reading_time FROM clipped_pages ORDER BY id ASC",
    )?;
    let rows = select
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<i64>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut update =
        conn.prepare("UPDATE clipped_pages SET word_count = ?1, reading_time = ?2 WHERE id = ?3")?;
    let mut rewritten = 0;

    for (id, content, word_count, reading_time) in rows {
        if is_set(word_count) && is_set(reading_time) {
            continue;
        }

        let derived = metadata::derive(content.as_deref().unwrap_or_default());
        if word_count == Some(i64::from(derived.word_count))
            && reading_time == Some(i64::from(derived.reading_time))
        {
            continue;
        }

        update.execute(params![derived.word_count, derived.reading_time, id])?;
        rewritten += 1;
    }

    Ok(rewritten)
}

fn is_set(value: Option<i64>) -> bool {
    matches!(value, Some(v) if v != 0)
}
