//! The clip store handle.
//!
//! A [`ClipStore`] starts uninitialized. [`ClipStore::init`] opens and
//! migrates the database once; every other operation fails with
//! [`StoreError::NotInitialized`] until it has succeeded.

use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{broadcast, OnceCell};

use super::migration::MigrationOutcome;
use super::reader::{ReaderError, ReaderPool};
use super::writer::{Writer, WriterError, WriterHandle};
use crate::config::StoreConfig;
use crate::model::{ClipId, ClippedPage, NewClip};
use crate::notify::{ChangeBus, ClipEvent};

/// Error type for opening the store.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error(transparent)]
    Readers(#[from] ReaderError),
}

/// Error type for clip store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("clip store is not initialized")]
    NotInitialized,

    #[error("failed to initialize clip store: {0}")]
    Init(#[from] InitError),

    #[error("write failed: {0}")]
    Write(#[source] WriterError),

    #[error("read failed: {0}")]
    Read(#[source] ReaderError),
}

struct Connected {
    writer: Writer,
    handle: WriterHandle,
    readers: ReaderPool,
    outcome: MigrationOutcome,
}

/// Handle to one clip database.
///
/// Independent stores never share state, so tests can run many side by side.
pub struct ClipStore {
    config: StoreConfig,
    bus: ChangeBus,
    connected: OnceCell<Connected>,
}

impl ClipStore {
    /// Create an uninitialized store. Performs no I/O.
    pub fn new(config: StoreConfig) -> Self {
        let bus = ChangeBus::new(config.event_channel_size);
        Self {
            config,
            bus,
            connected: OnceCell::new(),
        }
    }

    /// Open the database, migrating it to the current schema if needed.
    ///
    /// Idempotent: once it has succeeded, later calls return immediately
    /// without touching the database. Concurrent callers share a single
    /// initialization. A failed call leaves the store uninitialized.
    #[tracing::instrument(skip(self), fields(data_dir = %self.config.data_dir.display()))]
    pub async fn init(&self) -> Result<(), StoreError> {
        self.connected
            .get_or_try_init(|| self.connect())
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::error!(error = %e, "Clip store initialization failed");
                StoreError::Init(e)
            })
    }

    async fn connect(&self) -> Result<Connected, InitError> {
        let data_dir = &self.config.data_dir;
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|source| InitError::DataDir {
                path: data_dir.clone(),
                source,
            })?;

        let db_path = self.config.db_path();
        let (writer, outcome) = Writer::start(
            db_path.clone(),
            self.bus.clone(),
            self.config.write_channel_size,
        )
        .await?;
        let readers = ReaderPool::new(&db_path, self.config.reader_pool_size)?;

        tracing::info!(?outcome, "Clip store ready");

        Ok(Connected {
            handle: writer.handle(),
            writer,
            readers,
            outcome,
        })
    }

    fn connected(&self) -> Result<&Connected, StoreError> {
        self.connected.get().ok_or(StoreError::NotInitialized)
    }

    /// Save a new clip, returning its assigned id.
    ///
    /// Word count and reading time are derived from the content; the
    /// timestamp defaults to now.
    #[tracing::instrument(skip(self, clip), fields(url = %clip.url))]
    pub async fn add_page(&self, clip: NewClip) -> Result<ClipId, StoreError> {
        let connected = self.connected()?;
        connected.handle.add(clip).await.map_err(StoreError::Write)
    }

    /// Load every stored clip, in unspecified order.
    ///
    /// See [`crate::model::sort_newest_first`] for display order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_pages(&self) -> Result<Vec<ClippedPage>, StoreError> {
        let connected = self.connected()?;
        let pages = connected
            .readers
            .all_pages_async()
            .await
            .map_err(StoreError::Read)?;
        tracing::debug!(count = pages.len(), "Loaded clips");
        Ok(pages)
    }

    /// Delete one clip. Deleting an unknown id is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn delete_page(&self, id: ClipId) -> Result<(), StoreError> {
        let connected = self.connected()?;
        connected
            .handle
            .delete(id)
            .await
            .map(|_| ())
            .map_err(StoreError::Write)
    }

    /// Delete every clip, returning how many were removed.
    #[tracing::instrument(skip(self))]
    pub async fn clear_all_pages(&self) -> Result<usize, StoreError> {
        let connected = self.connected()?;
        connected.handle.clear().await.map_err(StoreError::Write)
    }

    /// Subscribe to committed changes. Works before `init`.
    pub fn subscribe(&self) -> broadcast::Receiver<ClipEvent> {
        self.bus.subscribe()
    }

    /// What `init` did to the database, once it has succeeded.
    pub fn migration_outcome(&self) -> Option<MigrationOutcome> {
        self.connected.get().map(|c| c.outcome)
    }

    /// Whether `init` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.connected.initialized()
    }

    /// Flush queued writes and stop the writer thread.
    ///
    /// A store that was never initialized shuts down trivially.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        let Some(connected) = self.connected.into_inner() else {
            return Ok(());
        };
        let Connected { writer, handle, .. } = connected;

        handle.shutdown().await.map_err(StoreError::Write)?;
        drop(handle);
        tokio::task::spawn_blocking(move || writer.join())
            .await
            .map_err(|_| StoreError::Write(WriterError::ThreadPanic))?
            .map_err(StoreError::Write)?;

        tracing::info!("Clip store shut down");
        Ok(())
    }
}
