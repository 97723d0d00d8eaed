//! Dedicated writer thread owning the single read-write connection.
//!
//! - Commands arrive over a bounded mpsc channel (backpressure)
//! - Each command runs in its own transaction, in arrival order
//! - Results go back over oneshot channels, so callers resume exactly when
//!   their transaction commits or fails
//! - Change events are published only after a successful commit

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::migration::{ensure_supported, run_migrations, MigrationError, MigrationOutcome};
use super::schema::apply_pragmas;
use crate::metadata;
use crate::model::{format_timestamp, ClipId, NewClip};
use crate::notify::{ChangeBus, ClipEvent};

/// Error type for writer operations.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("writer channel closed")]
    ChannelClosed,

    #[error("database error: {0}")]
    Database(String),

    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),

    #[error("failed to spawn writer thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("writer thread panicked")]
    ThreadPanic,
}

impl From<rusqlite::Error> for WriterError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

enum WriteCommand {
    Add {
        clip: NewClip,
        reply: oneshot::Sender<Result<ClipId, WriterError>>,
    },
    Delete {
        id: ClipId,
        reply: oneshot::Sender<Result<bool, WriterError>>,
    },
    Clear {
        reply: oneshot::Sender<Result<usize, WriterError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle for submitting writes.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<WriteCommand>,
}

impl WriterHandle {
    /// Insert a clip, returning its assigned id.
    pub async fn add(&self, clip: NewClip) -> Result<ClipId, WriterError> {
        let (reply, rx) = oneshot::channel();
        self.submit(WriteCommand::Add { clip, reply }).await?;
        rx.await.map_err(|_| WriterError::ThreadPanic)?
    }

    /// Delete a clip. Returns whether a record was removed.
    pub async fn delete(&self, id: ClipId) -> Result<bool, WriterError> {
        let (reply, rx) = oneshot::channel();
        self.submit(WriteCommand::Delete { id, reply }).await?;
        rx.await.map_err(|_| WriterError::ThreadPanic)?
    }

    /// Delete every clip. Returns the number of records removed.
    pub async fn clear(&self) -> Result<usize, WriterError> {
        let (reply, rx) = oneshot::channel();
        self.submit(WriteCommand::Clear { reply }).await?;
        rx.await.map_err(|_| WriterError::ThreadPanic)?
    }

    /// Stop the writer after applying every write already queued.
    pub async fn shutdown(&self) -> Result<(), WriterError> {
        let (reply, rx) = oneshot::channel();
        self.submit(WriteCommand::Shutdown { reply }).await?;
        rx.await.map_err(|_| WriterError::ThreadPanic)
    }

    async fn submit(&self, command: WriteCommand) -> Result<(), WriterError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| WriterError::ChannelClosed)
    }
}

/// The writer thread and its handle.
pub struct Writer {
    handle: WriterHandle,
    thread: JoinHandle<()>,
}

impl Writer {
    /// Spawn the writer thread for the database at `db_path`.
    ///
    /// The thread opens (creating if absent) the database and runs schema
    /// migrations before accepting commands. Resolves once the connection
    /// is ready, with the migration outcome.
    pub async fn start(
        db_path: PathBuf,
        bus: ChangeBus,
        channel_size: usize,
    ) -> Result<(Self, MigrationOutcome), WriterError> {
        let (tx, rx) = mpsc::channel(channel_size.max(1));
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = thread::Builder::new()
            .name("clipshelf-writer".into())
            .spawn(move || match open_and_migrate(&db_path) {
                Ok((conn, outcome)) => {
                    let _ = ready_tx.send(Ok(outcome));
                    writer_loop(conn, rx, &bus);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(WriterError::Spawn)?;

        match ready_rx.await {
            Ok(Ok(outcome)) => Ok((
                Self {
                    handle: WriterHandle { tx },
                    thread,
                },
                outcome,
            )),
            // The thread exits on its own after a failed open; detach it
            Ok(Err(e)) => Err(e),
            Err(_) => Err(WriterError::ThreadPanic),
        }
    }

    /// Get a handle for submitting writes.
    pub fn handle(&self) -> WriterHandle {
        self.handle.clone()
    }

    /// Wait for the writer thread to exit.
    ///
    /// Only returns once every handle is dropped or [`WriterHandle::shutdown`]
    /// has completed.
    pub fn join(self) -> Result<(), WriterError> {
        let Self { handle, thread } = self;
        drop(handle);
        thread.join().map_err(|_| WriterError::ThreadPanic)
    }
}

fn open_and_migrate(db_path: &Path) -> Result<(Connection, MigrationOutcome), WriterError> {
    let mut conn = Connection::open(db_path).map_err(WriterError::Open)?;
    // Leave a newer store's journal mode alone
    ensure_supported(&conn)?;
    apply_pragmas(&conn).map_err(WriterError::Open)?;
    let outcome = run_migrations(&mut conn)?;
    tracing::debug!(path = %db_path.display(), ?outcome, "Writer connection ready");
    Ok((conn, outcome))
}

fn writer_loop(mut conn: Connection, mut rx: mpsc::Receiver<WriteCommand>, bus: &ChangeBus) {
    while let Some(command) = rx.blocking_recv() {
        if let WriteCommand::Shutdown { reply } = command {
            // Refuse new writes, flush what is already queued
            rx.close();
            while let Ok(pending) = rx.try_recv() {
                apply(&mut conn, pending, bus);
            }
            let _ = reply.send(());
            break;
        }
        apply(&mut conn, command, bus);
    }
    tracing::info!("Writer thread stopped");
}

fn apply(conn: &mut Connection, command: WriteCommand, bus: &ChangeBus) {
    match command {
        WriteCommand::Add { clip, reply } => {
            let result = insert_clip(conn, &clip);
            match &result {
                Ok(id) => {
                    tracing::debug!(id, url = %clip.url, "Clip inserted");
                    bus.publish(ClipEvent::Added { id: *id });
                }
                Err(e) => tracing::warn!(error = %e, "Clip insert failed"),
            }
            let _ = reply.send(result.map_err(WriterError::from));
        }
        WriteCommand::Delete { id, reply } => {
            let result = delete_clip(conn, id);
            match &result {
                Ok(true) => {
                    tracing::debug!(id, "Clip deleted");
                    bus.publish(ClipEvent::Deleted { id });
                }
                Ok(false) => tracing::debug!(id, "Delete of unknown clip ignored"),
                Err(e) => tracing::warn!(id, error = %e, "Clip delete failed"),
            }
            let _ = reply.send(result.map_err(WriterError::from));
        }
        WriteCommand::Clear { reply } => {
            let result = clear_clips(conn);
            match &result {
                Ok(removed) => {
                    tracing::debug!(removed, "Clip store cleared");
                    bus.publish(ClipEvent::Cleared);
                }
                Err(e) => tracing::warn!(error = %e, "Clip store clear failed"),
            }
            let _ = reply.send(result.map_err(WriterError::from));
        }
        WriteCommand::Shutdown { reply } => {
            let _ = reply.send(());
        }
    }
}

fn insert_clip(conn: &mut Connection, clip: &NewClip) -> rusqlite::Result<ClipId> {
    let derived = metadata::derive(&clip.content);
    let timestamp = format_timestamp(&clip.timestamp.unwrap_or_else(Utc::now));

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO clipped_pages (title, url, content, timestamp, word_count, reading_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            clip.title,
            clip.url,
            clip.content,
            timestamp,
            derived.word_count,
            derived.reading_time,
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

fn delete_clip(conn: &mut Connection, id: ClipId) -> rusqlite::Result<bool> {
    let tx = conn.transaction()?;
    let removed = tx.execute("DELETE FROM clipped_pages WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(removed > 0)
}

fn clear_clips(conn: &mut Connection) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let removed = tx.execute("DELETE FROM clipped_pages", [])?;
    tx.commit()?;
    Ok(removed)
}
