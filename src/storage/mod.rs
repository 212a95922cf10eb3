// src/storage/mod.rs

//! Storage abstractions for prompt persistence.
//!
//! The durable store is an append-only tabular file with a stable column
//! header (`prompt`, `source url`, `query`). The header is written exactly
//! once, the first time the store is created. Appends happen after each
//! completed fetch so a crash loses at most the in-flight work.

pub mod csv;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::PromptRecord;

// Re-export for convenience
pub use csv::CsvStore;

/// Trait for prompt storage backends.
///
/// Only the orchestrator calls `append`; scheduler workers never write to
/// the store, so rows are never interleaved.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Load every persisted row. An absent store yields an empty list.
    async fn load_all(&self) -> Result<Vec<PromptRecord>>;

    /// Append rows and make the write durable before returning.
    async fn append(&self, records: &[PromptRecord]) -> Result<()>;
}
