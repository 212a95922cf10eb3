//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Upper bound on results per query documented by the search provider.
pub const PROVIDER_MAX_RESULTS: usize = 1000;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Search provider settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Extraction provider settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Pipeline run settings
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.search.base_url.trim().is_empty() {
            return Err(AppError::config("search.base_url is empty"));
        }
        if self.search.timeout_secs == 0 {
            return Err(AppError::config("search.timeout_secs must be > 0"));
        }
        if self.search.page_size == 0 {
            return Err(AppError::config("search.page_size must be > 0"));
        }
        if self.extraction.base_url.trim().is_empty() {
            return Err(AppError::config("extraction.base_url is empty"));
        }
        if self.extraction.timeout_secs == 0 {
            return Err(AppError::config("extraction.timeout_secs must be > 0"));
        }
        if self.extraction.instruction.trim().is_empty() {
            return Err(AppError::config("extraction.instruction is empty"));
        }
        if self.run.queries.is_empty() {
            return Err(AppError::config("run.queries is empty"));
        }
        if self.run.max_results == 0 || self.run.max_results > PROVIDER_MAX_RESULTS {
            return Err(AppError::config(format!(
                "run.max_results must be in 1..={PROVIDER_MAX_RESULTS}"
            )));
        }
        if self.run.concurrency == 0 {
            return Err(AppError::config("run.concurrency must be > 0"));
        }
        if self.run.store_path.trim().is_empty() {
            return Err(AppError::config("run.store_path is empty"));
        }
        Ok(())
    }
}

/// Search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search provider API
    #[serde(default = "defaults::search_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (search pages return quickly)
    #[serde(default = "defaults::search_timeout")]
    pub timeout_secs: u64,

    /// Results requested per page (provider caps at 100)
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::search_base_url(),
            timeout_secs: defaults::search_timeout(),
            page_size: defaults::page_size(),
        }
    }
}

/// Extraction provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Base URL of the extraction provider API
    #[serde(default = "defaults::extraction_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (scrape includes a remote LLM step)
    #[serde(default = "defaults::extraction_timeout")]
    pub timeout_secs: u64,

    /// Natural-language instruction sent with every scrape request
    #[serde(default = "defaults::instruction")]
    pub instruction: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::extraction_base_url(),
            timeout_secs: defaults::extraction_timeout(),
            instruction: defaults::instruction(),
        }
    }
}

/// Pipeline run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Topical search queries driving discovery
    #[serde(default = "defaults::queries")]
    pub queries: Vec<String>,

    /// Result target per query, clamped to the provider maximum
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,

    /// Maximum concurrent extraction calls in flight
    #[serde(default = "defaults::concurrency")]
    pub concurrency: usize,

    /// Path of the CSV store
    #[serde(default = "defaults::store_path")]
    pub store_path: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            queries: defaults::queries(),
            max_results: defaults::max_results(),
            concurrency: defaults::concurrency(),
            store_path: defaults::store_path(),
            user_agent: defaults::user_agent(),
        }
    }
}

mod defaults {
    // Search defaults
    pub fn search_base_url() -> String {
        "https://serpapi.com".into()
    }
    pub fn search_timeout() -> u64 {
        60
    }
    pub fn page_size() -> usize {
        100
    }

    // Extraction defaults
    pub fn extraction_base_url() -> String {
        "https://api.firecrawl.dev/v1".into()
    }
    pub fn extraction_timeout() -> u64 {
        120
    }
    pub fn instruction() -> String {
        "Extract every mindfulness or journaling prompt from the page. \
         Return them as an array called 'prompts'. Do **not** invent prompts."
            .into()
    }

    // Run defaults
    pub fn max_results() -> usize {
        200
    }
    pub fn concurrency() -> usize {
        8
    }
    pub fn store_path() -> String {
        "prompts.csv".into()
    }
    pub fn user_agent() -> String {
        "promptcrawl/0.1".into()
    }

    pub fn queries() -> Vec<String> {
        [
            // Mindfulness & well-being
            "mindfulness journaling prompts",
            "daily mindfulness questions",
            "journal prompts for presence and awareness",
            "introspective journaling prompts",
            "journaling prompts for grounding and calm",
            "self-care journal prompts",
            "mindful reflection prompts",
            // Emotional awareness & mental health
            "emotional awareness journaling prompts",
            "journaling prompts for anxiety and stress",
            "trauma-informed journal prompts",
            "mental health journaling questions",
            "healing journal prompts",
            "gratitude journal prompts",
            "self-compassion journal prompts",
            // Personal growth & self-discovery
            "personal development journaling prompts",
            "journal prompts for self-discovery",
            "journaling prompts to get to know yourself",
            "identity and values journaling prompts",
            "deep reflection journal questions",
            "self-growth journal prompts",
            // Goals, habits & productivity
            "journaling prompts for goal setting",
            "prompts for planning your day/week",
            "journaling prompts for productivity",
            "habit tracking journal prompts",
            "prompts to reflect on your achievements",
            // Creativity & inspiration
            "creative writing journal prompts",
            "prompts for inspired journaling",
            "morning pages prompts",
            "journal prompts for artists and creatives",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}
