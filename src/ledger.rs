// src/ledger.rs

//! In-memory index of already-seen records and already-visited URLs.
//!
//! Hydrated once from the durable store at startup, mutated only by the
//! orchestrator, and discarded at process exit. Durability lives in the
//! store, not here.

use std::collections::HashSet;

use crate::models::PromptRecord;

/// Dedup ledger backing the pipeline.
#[derive(Debug, Default)]
pub struct Ledger {
    seen: HashSet<(String, String)>,
    visited: HashSet<String>,
}

impl Ledger {
    /// Build a ledger from the rows already persisted in the store.
    ///
    /// Visit-marker rows contribute to the visited set only; they are not
    /// records.
    pub fn hydrate(rows: &[PromptRecord]) -> Self {
        let mut ledger = Self::default();
        for row in rows {
            if !row.is_visit_marker() {
                ledger.seen.insert(row.identity_key());
            }
            ledger.visited.insert(row.source_url.clone());
        }
        ledger
    }

    /// Has this URL already been submitted to the extraction provider?
    pub fn contains_url(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Is this record already known?
    pub fn contains_record(&self, record: &PromptRecord) -> bool {
        self.seen.contains(&record.identity_key())
    }

    /// Mark a URL as visited, whether or not it produced records.
    pub fn mark_visited(&mut self, url: &str) {
        self.visited.insert(url.to_string());
    }

    /// Record all given records. Idempotent; also marks their sources visited.
    pub fn record_all(&mut self, records: &[PromptRecord]) {
        for record in records {
            self.seen.insert(record.identity_key());
            self.visited.insert(record.source_url.clone());
        }
    }

    /// Number of distinct records known.
    pub fn record_count(&self) -> usize {
        self.seen.len()
    }

    /// Number of distinct URLs visited.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
