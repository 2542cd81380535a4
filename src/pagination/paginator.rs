//! Batched offset/limit paginator
//!
//! Pages are requested in batches. Each batch is submitted concurrently
//! through the rate limiter, awaited as a whole, then scanned in submission
//! order for the end of the listing. Exactly one batch is in flight at a time.

use super::types::{
    scan_batch, FetchResult, FetchStats, PageRequest, PageResponse, PaginationConfig,
    PaginationState,
};
use crate::error::{Error, Result};
use crate::http::{ApiRequest, RateLimiter, RequestExecutor};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Drives a paginated fetch of one collection
pub struct Paginator {
    executor: Arc<dyn RequestExecutor>,
    limiter: RateLimiter,
    config: PaginationConfig,
}

impl Paginator {
    /// Create a paginator
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        limiter: RateLimiter,
        config: PaginationConfig,
    ) -> Self {
        Self {
            executor,
            limiter,
            config,
        }
    }

    /// Pagination settings
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Rate limiter shared by every batch of a fetch
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Fetch every page of the listing described by `request`
    ///
    /// `request` carries method, path and headers; `limit` and `offset` are
    /// added per page. Any failed page request fails the whole fetch and the
    /// records gathered so far are dropped.
    pub async fn fetch_all(&self, request: &ApiRequest) -> Result<FetchResult> {
        self.config.validate()?;

        let start = Instant::now();
        let batch_size = self.config.batch_size as u64;
        let mut state = PaginationState::new();
        let mut stats = FetchStats::default();
        let mut records = Vec::new();

        while !state.done {
            let batch_offset = state.offset;
            let responses = self.fetch_batch(request, batch_offset).await?;
            stats.add_batch(batch_offset, responses.len());

            let before = records.len();
            let outcome = scan_batch(self.config.scan_policy, responses, &mut records);
            state.add_fetched((records.len() - before) as u64);

            debug!(
                path = %request.path,
                offset = batch_offset,
                accepted = records.len() - before,
                "Batch scanned"
            );

            if outcome.should_stop() {
                state.mark_done();
            }
            state.add_offset(batch_size);
        }

        stats.records = state.total_fetched;
        stats.elapsed = start.elapsed();

        info!(
            path = %request.path,
            batches = stats.batches,
            requests = stats.requests,
            records = stats.records,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Pagination complete"
        );

        Ok(FetchResult { records, stats })
    }

    /// Submit one batch and wait for all of it
    ///
    /// Responses come back in submission order. When several requests fail,
    /// the earliest-submitted failure is reported.
    async fn fetch_batch(&self, request: &ApiRequest, offset: u64) -> Result<Vec<PageResponse>> {
        let mut handles = Vec::with_capacity(self.config.batch_size);

        for position in 0..self.config.batch_size {
            self.limiter.pace(position, self.config.batch_size).await;

            let page = PageRequest::new(offset + position as u64, self.config.page_limit);
            let page_request = page.apply(request);
            let executor = Arc::clone(&self.executor);
            let limiter = self.limiter.clone();
            let field = self.config.items_field.clone();

            handles.push(tokio::spawn(async move {
                let body = limiter.run(executor.execute(&page_request)).await?;
                PageResponse::from_body(body, &field)
            }));
        }

        let results = futures::future::join_all(handles).await;

        let mut pages = Vec::with_capacity(results.len());
        for result in results {
            let page =
                result.map_err(|e| Error::Other(format!("Page request task failed: {e}")))??;
            pages.push(page);
        }
        Ok(pages)
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("config", &self.config)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
