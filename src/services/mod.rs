// src/services/mod.rs

//! Remote provider clients.
//!
//! - `SearchClient`: pages through the search provider for candidate URLs
//! - `ExtractionClient`: scrapes one URL and extracts prompts via the
//!   provider's prompt-only JSON extraction

pub mod extract;
pub mod search;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::PromptRecord;

pub use extract::ExtractionClient;
pub use search::SearchClient;

/// Discovery seam: query in, ordered candidate URLs out.
///
/// Implementations report partial success: a failed page ends paging but
/// URLs already collected are still returned.
#[async_trait]
pub trait Discoverer: Send + Sync {
    async fn discover(&self, query: &str, limit: usize) -> Vec<String>;
}

/// Extraction seam: URL in, zero or more records out.
///
/// A single attempt per call; failures surface as errors and the caller
/// decides how to degrade.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Vec<PromptRecord>>;
}
