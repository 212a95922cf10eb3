//! CSV-backed prompt store.
//!
//! One row per record. The writer opens the file for append on every call,
//! writing the header only when the file did not previously exist, so
//! partial progress survives a crash and reruns pick up where they left
//! off.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::PromptRecord;
use crate::storage::PromptStore;

/// Append-only CSV storage backend.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PromptStore for CsvStore {
    async fn load_all(&self) -> Result<Vec<PromptRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    async fn append(&self, records: &[PromptRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        let mut file = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        file.flush()?;

        Ok(())
    }
}
