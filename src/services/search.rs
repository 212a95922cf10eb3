// src/services/search.rs

//! Search provider client.
//!
//! Pages through ranked search results for a query. The provider charges
//! per returned result and caps page size, so paging stops as soon as the
//! limit is met or a page comes back empty.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{PROVIDER_MAX_RESULTS, SearchConfig};
use crate::services::Discoverer;

/// One page of provider results.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    link: String,
}

/// Client for the remote search provider.
pub struct SearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl SearchClient {
    /// Create a new search client with the given configuration.
    pub fn new(
        config: &SearchConfig,
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
            page_size: config.page_size,
        })
    }

    /// Fetch one result page starting at the given offset.
    async fn fetch_page(&self, query: &str, start: usize) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("start", &start.to_string()),
                ("num", &self.page_size.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::discovery(query, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::discovery(
                query,
                format!("HTTP {status} at start={start}"),
            ));
        }

        let page: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::discovery(query, e))?;

        Ok(page.organic_results.into_iter().map(|r| r.link).collect())
    }
}

#[async_trait]
impl Discoverer for SearchClient {
    /// Collect up to `limit` result URLs for a query, in provider order.
    ///
    /// A failed page aborts further paging but keeps URLs already
    /// collected.
    async fn discover(&self, query: &str, limit: usize) -> Vec<String> {
        let limit = limit.clamp(1, PROVIDER_MAX_RESULTS);
        let mut links = Vec::new();
        let mut start = 0;

        while links.len() < limit {
            match self.fetch_page(query, start).await {
                Ok(page) => {
                    if page.is_empty() {
                        break;
                    }
                    links.extend(page);
                    start += self.page_size;
                }
                Err(error) => {
                    log::warn!("Discovery page failed for '{query}': {error}");
                    break;
                }
            }
        }

        links.truncate(limit);
        links
    }
}
