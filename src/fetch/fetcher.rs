//! Page fetching orchestration
//!
//! Page 1 is fetched first and yielded immediately; its envelope supplies the
//! total page count. Pages 2..N are spawned eagerly as tasks gated by a
//! semaphore, held in an ordered sequence, and drained strictly in ascending
//! page order regardless of completion order. That keeps the output order
//! identical to a sequential walk at any concurrency width.

use super::types::{take_results, ListQuery, PageEnvelope};
use crate::error::{Error, Result};
use crate::http::{RequestConfig, RequestExecutor};
use crate::sideload::embed_sideloads;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

/// Width of the bounded concurrency limiter for page requests
pub const DEFAULT_MAX_IN_FLIGHT_REQUESTS: usize = 4;

/// Ordered stream of records produced by a fetch-all call
pub type RecordStream = BoxStream<'static, Result<Value>>;

/// Fetches all pages of a collection as an ordered record stream
#[derive(Debug, Clone)]
pub struct PageFetcher {
    executor: RequestExecutor,
    max_in_flight: usize,
}

impl PageFetcher {
    /// Create a fetcher issuing page requests through the given executor
    pub fn new(executor: RequestExecutor, max_in_flight: usize) -> Self {
        Self {
            executor,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Fetch every record of the collection at `url`.
    ///
    /// Records are yielded in ascending page order with per-page server order
    /// preserved. Page 1 is available after a single round trip; the stream
    /// ends early with an error if any page fails terminally. Dropping the
    /// stream aborts all page requests still outstanding.
    pub async fn fetch_all(&self, url: &str, query: &ListQuery) -> Result<RecordStream> {
        if !query.paginated {
            let mut data = self.request_page(url, query, None).await?;
            let records = take_results(&mut data)?;
            return Ok(stream::iter(records.into_iter().map(Ok)).boxed());
        }

        let first = self.fetch_page(url, query, None).await?;
        let last_page = query
            .max_pages
            .map_or(first.total_pages, |cap| first.total_pages.min(cap));
        debug!(
            "fetched page 1/{} of {url}, scheduling {} more page requests",
            first.total_pages,
            last_page.saturating_sub(1)
        );

        // All remaining pages are scheduled at once; the semaphore caps how
        // many are actually on the wire.
        let limiter = Arc::new(Semaphore::new(self.max_in_flight));
        let tasks: Vec<PageTask> = (2..=last_page)
            .map(|page| {
                let fetcher = self.clone();
                let url = url.to_string();
                let query = query.clone();
                let limiter = Arc::clone(&limiter);
                PageTask(tokio::spawn(async move {
                    let _permit = limiter
                        .acquire_owned()
                        .await
                        .map_err(|_| Error::task("concurrency limiter closed"))?;
                    let envelope = fetcher.fetch_page(&url, &query, Some(page)).await?;
                    Ok(envelope.results)
                }))
            })
            .collect();

        let head = stream::iter(first.results.into_iter().map(Ok));
        // Awaiting the handles in page order (not completion order) is what
        // makes repeated fetches of the same state yield the same sequence.
        let tail = stream::iter(tasks)
            .then(PageTask::join)
            .map_ok(|records| stream::iter(records.into_iter().map(Ok)))
            .try_flatten();
        Ok(head.chain(tail).boxed())
    }

    /// Fetch and embed a single page
    async fn fetch_page(
        &self,
        url: &str,
        query: &ListQuery,
        page: Option<u64>,
    ) -> Result<PageEnvelope> {
        let data = self.request_page(url, query, page).await?;
        PageEnvelope::from_value(data)
    }

    async fn request_page(
        &self,
        url: &str,
        query: &ListQuery,
        page: Option<u64>,
    ) -> Result<Value> {
        let mut params = query.query_params();
        if let Some(page) = page {
            params.insert("page".to_string(), page.to_string());
        }
        let mut config = RequestConfig::new().query_map(params);
        if let Some(body) = &query.json {
            config = config.json(body.clone());
        }
        let mut data = self
            .executor
            .request_json(query.method.clone(), url, config)
            .await?;
        embed_sideloads(&mut data, &query.sideloads)?;
        Ok(data)
    }
}

/// A spawned page request that is aborted when dropped unawaited, so that
/// dropping the record stream cancels everything still in flight.
struct PageTask(JoinHandle<Result<Vec<Value>>>);

impl PageTask {
    async fn join(mut self) -> Result<Vec<Value>> {
        match (&mut self.0).await {
            Ok(result) => result,
            Err(join_error) => Err(Error::task(join_error.to_string())),
        }
    }
}

impl Drop for PageTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}
