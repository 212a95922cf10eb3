// src/models/mod.rs

//! Domain models for the prompt pipeline.

mod config;
mod prompt;

// Re-export all public types
pub use config::{Config, ExtractionConfig, PROVIDER_MAX_RESULTS, RunConfig, SearchConfig};
pub use prompt::PromptRecord;
