//! Prompt record data structure.

use serde::{Deserialize, Serialize};

/// A single extracted prompt tied to its source URL and originating query.
///
/// Column names match the store header: `prompt`, `source url`, `query`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptRecord {
    /// Extracted prompt text
    #[serde(rename = "prompt")]
    pub content: String,

    /// URL of the page the prompt was extracted from
    #[serde(rename = "source url")]
    pub source_url: String,

    /// Query that discovered the page, if known
    #[serde(rename = "query")]
    pub query: Option<String>,
}

impl PromptRecord {
    /// Create a record with no originating query.
    pub fn new(content: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_url: source_url.into(),
            query: None,
        }
    }

    /// Row persisted for a URL that yielded no prompts, so visited-ness
    /// survives a restart and the URL is never re-billed.
    pub fn visit_marker(source_url: impl Into<String>) -> Self {
        Self::new(String::new(), source_url)
    }

    /// Does this row only mark its URL as visited?
    ///
    /// Extraction discards blank prompts, so an empty content field can
    /// never collide with a real record.
    pub fn is_visit_marker(&self) -> bool {
        self.content.is_empty()
    }

    /// Identity key for deduplication.
    ///
    /// Two records with the same content from the same URL are the same
    /// record regardless of which query rediscovered the URL.
    pub fn identity_key(&self) -> (String, String) {
        (self.content.clone(), self.source_url.clone())
    }
}
