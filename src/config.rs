// src/config.rs

//! Credential loading from the process environment.
//!
//! Both provider credentials are required at startup, before any network
//! activity. A missing variable is fatal for the run, not per-call.

use std::env;

use crate::error::{AppError, Result};

/// Environment variable holding the search provider bearer token.
pub const SEARCH_API_KEY_VAR: &str = "SERPAPI_API_KEY";

/// Environment variable holding the extraction provider bearer token.
pub const EXTRACTION_API_KEY_VAR: &str = "FIRECRAWL_API_KEY";

/// Bearer credentials for the two remote providers.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Search provider bearer token
    pub search_api_key: String,

    /// Extraction provider bearer token
    pub extraction_api_key: String,
}

impl Credentials {
    /// Read both credentials from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            search_api_key: require_var(SEARCH_API_KEY_VAR)?,
            extraction_api_key: require_var(EXTRACTION_API_KEY_VAR)?,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::config(format!(
            "{name} not set. Export it or add to .env"
        ))),
    }
}
