//! Configuration for the clip store.
//!
//! Supports:
//! - CLI arguments via clap (flattened into front-end parsers)
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Args;
use std::path::{Path, PathBuf};

/// Default database file name inside the data directory.
pub const DEFAULT_DB_FILE: &str = "clipshelf.db";

/// Storage settings shared by every front end.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Data directory for the SQLite database
    #[arg(short, long, env = "CLIPSHELF_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Database file name inside the data directory
    #[arg(long, env = "CLIPSHELF_DB_FILE", default_value = DEFAULT_DB_FILE)]
    pub db_file: String,

    /// Size of the write channel (backpressure control)
    #[arg(long, env = "CLIPSHELF_WRITE_CHANNEL_SIZE", default_value_t = 64)]
    pub write_channel_size: usize,

    /// Size of the reader connection pool
    #[arg(long, env = "CLIPSHELF_READER_POOL_SIZE", default_value_t = 4)]
    pub reader_pool_size: u32,

    /// Size of the change notification channel
    #[arg(long, env = "CLIPSHELF_EVENT_CHANNEL_SIZE", default_value_t = 256)]
    pub event_channel_size: usize,
}

impl StoreConfig {
    /// Default configuration rooted at the given data directory.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Full path of the database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    /// Create a small configuration for testing.
    pub fn test_config(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            db_file: "test.db".into(),
            write_channel_size: 8,
            reader_pool_size: 2,
            event_channel_size: 32,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            db_file: DEFAULT_DB_FILE.into(),
            write_channel_size: 64,
            reader_pool_size: 4,
            event_channel_size: 256,
        }
    }
}
