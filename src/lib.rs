//! Clipshelf: local storage for clipped web pages.
//!
//! Saved pages ("clips") are persisted in a schema-versioned SQLite database
//! and carry derived reading metadata (word count, estimated reading time).
//!
//! # Architecture
//!
//! - **Single writer**: one dedicated thread owns the read-write connection,
//!   every write is its own transaction
//! - **Pooled readers**: read-only connections over WAL for listing clips
//! - **Explicit migrations**: schema upgrades run once inside `init`,
//!   versioned by `PRAGMA user_version`
//!
//! # Modules
//!
//! - [`config`]: Store configuration (CLI flags and environment)
//! - [`metadata`]: Word count and reading-time derivation
//! - [`model`]: Clip record types
//! - [`notify`]: Change notifications for committed writes
//! - [`observability`]: Tracing setup
//! - [`storage`]: SQLite persistence layer and the [`ClipStore`] handle

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // storage::store::StoreError is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc,         // Panic docs can be verbose
    clippy::needless_raw_string_hashes  // r#""# is fine for SQL
)]

pub mod config;
pub mod metadata;
pub mod model;
pub mod notify;
pub mod observability;
pub mod storage;

pub use config::StoreConfig;
pub use model::{ClipId, ClippedPage, NewClip};
pub use storage::{ClipStore, StoreError};
