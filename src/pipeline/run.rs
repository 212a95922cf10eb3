// src/pipeline/run.rs

//! Pipeline orchestrator.
//!
//! Drives the whole run: hydrate the ledger from the store, then per query
//! discover candidate URLs, filter out already-visited ones, dispatch the
//! rest to the fetch scheduler, and drain results as they complete. New
//! records are appended to the store after every completed fetch, so a
//! crash loses at most the in-flight work. The ledger and the store are
//! only ever touched from this task; workers share nothing mutable.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use url::Url;

use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::{Config, PromptRecord};
use crate::pipeline::fetch;
use crate::services::{Discoverer, Extractor};
use crate::storage::PromptStore;

/// Summary of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub queries: usize,
    pub urls_discovered: usize,
    pub urls_fetched: usize,
    pub urls_failed: usize,
    pub new_records: usize,
}

/// Run the full discovery-and-extraction pipeline.
pub async fn run_pipeline<D, E>(
    config: &Config,
    discoverer: &D,
    extractor: &E,
    store: &dyn PromptStore,
) -> Result<RunStats>
where
    D: Discoverer + ?Sized,
    E: Extractor + ?Sized,
{
    let started_at = Utc::now();

    let existing = store.load_all().await?;
    let mut ledger = Ledger::hydrate(&existing);
    log::info!(
        "Ledger hydrated: {} records, {} visited URLs",
        ledger.record_count(),
        ledger.visited_count()
    );

    let mut urls_discovered = 0;
    let mut urls_fetched = 0;
    let mut urls_failed = 0;
    let mut new_records = 0;

    for query in &config.run.queries {
        log::info!("Query: '{query}'");
        let urls = discoverer.discover(query, config.run.max_results).await;
        urls_discovered += urls.len();
        log::info!("Discovered {} URLs for '{query}'", urls.len());
        if log::log_enabled!(log::Level::Debug) {
            for url in &urls {
                log::debug!("discovered {url}");
            }
        }

        // Submission set: drop malformed URLs, visited URLs, and
        // batch-local duplicates.
        let mut in_batch = HashSet::new();
        let batch: Vec<String> = urls
            .into_iter()
            .filter(|u| {
                if let Err(error) = Url::parse(u) {
                    log::warn!("Skipping malformed URL from provider: {u}: {error}");
                    return false;
                }
                !ledger.contains_url(u) && in_batch.insert(u.clone())
            })
            .collect();

        if batch.is_empty() {
            log::info!("All discovered URLs already visited for '{query}'");
            continue;
        }
        log::info!("Dispatching {} URLs for '{query}'", batch.len());

        let mut results = fetch::fetch_all(extractor, batch, config.run.concurrency);
        while let Some((url, result)) = results.next().await {
            // Visited either way: zero-result and failed pages are not
            // re-billed on the next run.
            ledger.mark_visited(&url);

            match result {
                Ok(records) => {
                    urls_fetched += 1;
                    let found = records.len();

                    let mut survivors: Vec<PromptRecord> = Vec::new();
                    for mut record in records {
                        record.query = Some(query.clone());
                        if !ledger.contains_record(&record) {
                            ledger.record_all(std::slice::from_ref(&record));
                            survivors.push(record);
                        }
                    }

                    if survivors.is_empty() {
                        // Persist visited-ness so a restart does not
                        // re-bill a page that had nothing new.
                        store.append(&[visit_marker(&url, query)]).await?;
                        log::debug!("{found} prompts in {url}, none new");
                    } else {
                        store.append(&survivors).await?;
                        new_records += survivors.len();
                        log::info!("{} new prompts from {url}", survivors.len());
                    }
                }
                Err(error) => {
                    urls_failed += 1;
                    log::warn!("{error}");
                    store.append(&[visit_marker(&url, query)]).await?;
                }
            }
        }
    }

    let stats = RunStats {
        started_at,
        finished_at: Utc::now(),
        queries: config.run.queries.len(),
        urls_discovered,
        urls_fetched,
        urls_failed,
        new_records,
    };

    log::info!(
        "Run complete: {} queries, {} URLs discovered, {} fetched, {} failed, {} new records",
        stats.queries,
        stats.urls_discovered,
        stats.urls_fetched,
        stats.urls_failed,
        stats.new_records
    );

    Ok(stats)
}

/// Marker row for a URL that produced no new records, stamped with the
/// query that dispatched it.
fn visit_marker(url: &str, query: &str) -> PromptRecord {
    let mut marker = PromptRecord::visit_marker(url);
    marker.query = Some(query.to_string());
    marker
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::AppError;

    struct FakeDiscovery(HashMap<String, Vec<String>>);

    impl FakeDiscovery {
        fn single(query: &str, urls: &[&str]) -> Self {
            let mut map = HashMap::new();
            map.insert(query.to_string(), urls.iter().map(|u| u.to_string()).collect());
            Self(map)
        }
    }

    #[async_trait]
    impl Discoverer for FakeDiscovery {
        async fn discover(&self, query: &str, _limit: usize) -> Vec<String> {
            self.0.get(query).cloned().unwrap_or_default()
        }
    }

    /// Extractor fake that records every billed call.
    struct FakeExtractor {
        responses: HashMap<String, Vec<String>>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeExtractor {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                failing: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_prompts(mut self, url: &str, prompts: &[&str]) -> Self {
            self.responses
                .insert(url.to_string(), prompts.iter().map(|p| p.to_string()).collect());
            self
        }

        fn with_failure(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Extractor for FakeExtractor {
        async fn extract(&self, url: &str) -> Result<Vec<PromptRecord>> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.failing.contains(url) {
                return Err(AppError::extraction(url, "simulated failure"));
            }
            Ok(self
                .responses
                .get(url)
                .map(|prompts| {
                    prompts
                        .iter()
                        .map(|p| PromptRecord::new(p.clone(), url))
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    /// In-memory store counting append batches.
    #[derive(Default)]
    struct MemStore {
        rows: Mutex<Vec<PromptRecord>>,
        appends: AtomicUsize,
    }

    impl MemStore {
        fn seeded(rows: Vec<PromptRecord>) -> Self {
            Self {
                rows: Mutex::new(rows),
                appends: AtomicUsize::new(0),
            }
        }

        fn rows(&self) -> Vec<PromptRecord> {
            self.rows.lock().unwrap().clone()
        }

        fn prompt_rows(&self) -> Vec<PromptRecord> {
            self.rows()
                .into_iter()
                .filter(|r| !r.is_visit_marker())
                .collect()
        }
    }

    #[async_trait]
    impl PromptStore for MemStore {
        async fn load_all(&self) -> Result<Vec<PromptRecord>> {
            Ok(self.rows())
        }

        async fn append(&self, records: &[PromptRecord]) -> Result<()> {
            self.appends.fetch_add(1, Ordering::SeqCst);
            self.rows.lock().unwrap().extend_from_slice(records);
            Ok(())
        }
    }

    fn test_config(queries: &[&str]) -> Config {
        let mut config = Config::default();
        config.run.queries = queries.iter().map(|q| q.to_string()).collect();
        config.run.concurrency = 2;
        config.run.max_results = 10;
        config
    }

    const QUERY: &str = "mindfulness journaling prompts";

    #[tokio::test]
    async fn first_run_persists_new_records_and_marks_empty_pages() {
        let config = test_config(&[QUERY]);
        let discovery = FakeDiscovery::single(QUERY, &["https://a.example", "https://b.example"]);
        let extractor = FakeExtractor::new()
            .with_prompts("https://a.example", &["Write about gratitude"])
            .with_prompts("https://b.example", &[]);
        let store = MemStore::default();

        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        let prompts = store.prompt_rows();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].content, "Write about gratitude");
        assert_eq!(prompts[0].source_url, "https://a.example");
        assert_eq!(prompts[0].query.as_deref(), Some(QUERY));

        // The zero-result page leaves a marker row, making its
        // visited-ness durable.
        assert!(
            store
                .rows()
                .iter()
                .any(|r| r.is_visit_marker() && r.source_url == "https://b.example")
        );

        assert_eq!(stats.urls_discovered, 2);
        assert_eq!(stats.urls_fetched, 2);
        assert_eq!(stats.urls_failed, 0);
        assert_eq!(stats.new_records, 1);
        // One append per completed URL, not one per run.
        assert_eq!(store.appends.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rerun_with_unchanged_store_is_idempotent() {
        let config = test_config(&[QUERY]);
        let discovery = FakeDiscovery::single(QUERY, &["https://a.example", "https://b.example"]);
        let extractor = FakeExtractor::new()
            .with_prompts("https://a.example", &["Write about gratitude"])
            .with_prompts("https://b.example", &[]);
        let store = MemStore::default();

        run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();
        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(stats.new_records, 0);
        assert_eq!(store.prompt_rows().len(), 1);
        // At-most-once billing: each URL extracted once across both runs,
        // including the one whose page had no prompts.
        let mut calls = extractor.calls();
        calls.sort();
        assert_eq!(calls, vec!["https://a.example", "https://b.example"]);
    }

    #[tokio::test]
    async fn rerun_dispatches_only_newly_discovered_urls() {
        let store = MemStore::default();

        let first =
            FakeDiscovery::single(QUERY, &["https://a.example", "https://b.example"]);
        let extractor = FakeExtractor::new()
            .with_prompts("https://a.example", &["Write about gratitude"])
            .with_prompts("https://b.example", &[])
            .with_prompts("https://c.example", &["Describe your morning"]);
        let config = test_config(&[QUERY]);
        run_pipeline(&config, &first, &extractor, &store)
            .await
            .unwrap();

        let second = FakeDiscovery::single(
            QUERY,
            &["https://a.example", "https://b.example", "https://c.example"],
        );
        let stats = run_pipeline(&config, &second, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(stats.new_records, 1);
        let calls = extractor.calls();
        assert_eq!(
            calls.iter().filter(|u| u.as_str() == "https://c.example").count(),
            1
        );
        assert_eq!(
            calls.iter().filter(|u| u.as_str() == "https://a.example").count(),
            1
        );
    }

    #[tokio::test]
    async fn extraction_failure_does_not_abort_siblings() {
        let config = test_config(&[QUERY]);
        let discovery = FakeDiscovery::single(QUERY, &["https://a.example", "https://b.example"]);
        let extractor = FakeExtractor::new()
            .with_failure("https://a.example")
            .with_prompts("https://b.example", &["Name one small win"]);
        let store = MemStore::default();

        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(stats.urls_failed, 1);
        assert_eq!(stats.urls_fetched, 1);
        let prompts = store.prompt_rows();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].source_url, "https://b.example");

        // The failed URL is still marked visited: a rerun does not re-bill it.
        let rerun = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();
        assert_eq!(rerun.urls_failed, 0);
        assert_eq!(
            extractor
                .calls()
                .iter()
                .filter(|u| u.as_str() == "https://a.example")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn restart_after_partial_run_redispatches_only_remainder() {
        // Simulate a crash after one of three URLs was completed and
        // appended: the store already holds its row.
        let seeded = vec![PromptRecord {
            content: "Write about gratitude".to_string(),
            source_url: "https://a.example".to_string(),
            query: Some(QUERY.to_string()),
        }];
        let store = MemStore::seeded(seeded);

        let config = test_config(&[QUERY]);
        let discovery = FakeDiscovery::single(
            QUERY,
            &["https://a.example", "https://b.example", "https://c.example"],
        );
        let extractor = FakeExtractor::new()
            .with_prompts("https://b.example", &["Describe your evening"])
            .with_prompts("https://c.example", &[]);

        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        let mut calls = extractor.calls();
        calls.sort();
        assert_eq!(calls, vec!["https://b.example", "https://c.example"]);
        assert_eq!(stats.new_records, 1);
        assert_eq!(store.prompt_rows().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_content_within_payload_persisted_once() {
        let config = test_config(&[QUERY]);
        let discovery = FakeDiscovery::single(QUERY, &["https://a.example"]);
        let extractor = FakeExtractor::new()
            .with_prompts("https://a.example", &["Write about gratitude", "Write about gratitude"]);
        let store = MemStore::default();

        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(stats.new_records, 1);
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn same_content_from_different_urls_kept() {
        let config = test_config(&[QUERY]);
        let discovery = FakeDiscovery::single(QUERY, &["https://a.example", "https://b.example"]);
        let extractor = FakeExtractor::new()
            .with_prompts("https://a.example", &["Write about gratitude"])
            .with_prompts("https://b.example", &["Write about gratitude"]);
        let store = MemStore::default();

        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(stats.new_records, 2);
        assert_eq!(store.rows().len(), 2);
    }

    #[tokio::test]
    async fn url_rediscovered_by_second_query_not_resubmitted() {
        let other = "gratitude journal prompts";
        let mut map = HashMap::new();
        map.insert(
            QUERY.to_string(),
            vec!["https://a.example".to_string()],
        );
        map.insert(other.to_string(), vec!["https://a.example".to_string()]);
        let discovery = FakeDiscovery(map);

        let extractor =
            FakeExtractor::new().with_prompts("https://a.example", &["Write about gratitude"]);
        let store = MemStore::default();
        let config = test_config(&[QUERY, other]);

        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(extractor.calls().len(), 1);
        assert_eq!(stats.new_records, 1);
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn malformed_urls_are_skipped_before_dispatch() {
        let config = test_config(&[QUERY]);
        let discovery =
            FakeDiscovery::single(QUERY, &["journaling prompts (no url)", "https://a.example"]);
        let extractor =
            FakeExtractor::new().with_prompts("https://a.example", &["Write about gratitude"]);
        let store = MemStore::default();

        let stats = run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(extractor.calls(), vec!["https://a.example"]);
        assert_eq!(stats.new_records, 1);
        // A URL that was never submitted gets no visited mark.
        assert!(
            !store
                .rows()
                .iter()
                .any(|r| r.source_url == "journaling prompts (no url)")
        );
    }

    #[tokio::test]
    async fn duplicate_urls_within_one_batch_submitted_once() {
        let config = test_config(&[QUERY]);
        let discovery = FakeDiscovery::single(
            QUERY,
            &["https://a.example", "https://a.example", "https://a.example"],
        );
        let extractor =
            FakeExtractor::new().with_prompts("https://a.example", &["Write about gratitude"]);
        let store = MemStore::default();

        run_pipeline(&config, &discovery, &extractor, &store)
            .await
            .unwrap();

        assert_eq!(extractor.calls().len(), 1);
    }
}
