//! SQLite storage layer for clips.
//!
//! Provides:
//! - Schema definitions and explicit, versioned migrations
//! - Dedicated writer thread, one transaction per write
//! - Read connection pool for listing clips
//! - The [`ClipStore`] handle tying them together

pub mod migration;
pub mod reader;
pub mod schema;
pub mod store;
pub mod writer;

pub use migration::{MigrationError, MigrationOutcome};
pub use store::{ClipStore, InitError, StoreError};
