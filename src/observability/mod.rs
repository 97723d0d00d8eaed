//! Observability infrastructure.
//!
//! Provides structured tracing for store lifecycle and operations.

pub mod tracing;
