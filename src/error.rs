// src/error.rs

//! Unified error handling for the prompt pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV read/write failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One page of a discovery query failed
    #[error("Discovery error for '{query}': {message}")]
    Discovery { query: String, message: String },

    /// Extraction call for a single URL failed
    #[error("Extraction error for {url}: {message}")]
    Extraction { url: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a discovery error for a query.
    pub fn discovery(query: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Discovery {
            query: query.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error for a URL.
    pub fn extraction(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
