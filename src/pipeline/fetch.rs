// src/pipeline/fetch.rs

//! Concurrent fetch scheduler.
//!
//! Runs extraction calls for many URLs with a bounded in-flight count and
//! yields each result as soon as it completes, so the caller can persist
//! incrementally instead of waiting for the whole batch.

use futures::stream::{self, Stream, StreamExt};

use crate::error::Result;
use crate::models::PromptRecord;
use crate::services::Extractor;

/// Fetch all URLs through the extractor, at most `concurrency` in flight.
///
/// Results arrive in completion order, not submission order. Each URL in
/// the batch is submitted exactly once; callers are expected to hand in a
/// deduplicated batch. Every submitted URL is awaited to completion.
pub fn fetch_all<E>(
    extractor: &E,
    urls: Vec<String>,
    concurrency: usize,
) -> impl Stream<Item = (String, Result<Vec<PromptRecord>>)> + '_
where
    E: Extractor + ?Sized,
{
    stream::iter(urls)
        .map(move |url| async move {
            let result = extractor.extract(&url).await;
            (url, result)
        })
        .buffer_unordered(concurrency.max(1))
}
