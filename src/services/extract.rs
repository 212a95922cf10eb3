// src/services/extract.rs

//! Extraction provider client.
//!
//! Sends one scrape request per URL with a natural-language instruction;
//! the provider fetches the page, runs its extraction model, and returns a
//! structured payload. Charged per URL submitted regardless of result
//! count, so callers must never resubmit a visited URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{ExtractionConfig, PromptRecord};
use crate::services::Extractor;

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
    #[serde(rename = "jsonOptions")]
    json_options: JsonOptions<'a>,
}

#[derive(Debug, Serialize)]
struct JsonOptions<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct ScrapeResponse {
    #[serde(default)]
    data: Value,
}

/// Client for the remote scrape-and-extract provider.
pub struct ExtractionClient {
    client: Client,
    base_url: String,
    api_key: String,
    instruction: String,
}

impl ExtractionClient {
    /// Create a new extraction client with the given configuration.
    pub fn new(
        config: &ExtractionConfig,
        user_agent: &str,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            instruction: config.instruction.clone(),
        })
    }

    /// Map the provider payload into records.
    ///
    /// Non-string and blank entries are discarded; a missing payload means
    /// the page simply had no prompts.
    fn parse_records(data: &Value, url: &str) -> Vec<PromptRecord> {
        let Some(prompts) = data.pointer("/json/prompts").and_then(Value::as_array) else {
            return Vec::new();
        };

        prompts
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| PromptRecord::new(p, url))
            .collect()
    }
}

#[async_trait]
impl Extractor for ExtractionClient {
    /// Scrape one URL and extract prompt records. Single attempt, no retry.
    async fn extract(&self, url: &str) -> Result<Vec<PromptRecord>> {
        let request = ScrapeRequest {
            url,
            formats: ["json"],
            json_options: JsonOptions {
                prompt: &self.instruction,
            },
        };

        let response = self
            .client
            .post(format!("{}/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::extraction(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::extraction(url, format!("HTTP {status}")));
        }

        let payload: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| AppError::extraction(url, e))?;

        Ok(Self::parse_records(&payload.data, url))
    }
}
