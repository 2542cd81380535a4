//! Execution engine module
//!
//! Runs the fetch sequence: refresh the bearer token, persist the rotated
//! credentials, then page through each requested collection with the new
//! token.
//!
//! # Overview
//!
//! The engine module provides:
//! - `FetchEngine` - Owns the HTTP client, configuration and secret store
//! - `ResourceFetch` - Records fetched for one collection
//! - `RunStats` - Request and record counters across the run
//!
//! Every failure leaving the engine is labelled with its [`Phase`].

mod types;

pub use types::{ResourceFetch, RunStats};

use crate::auth::{Credentials, SecretStore, TokenManager};
use crate::config::AppConfig;
use crate::error::{Phase, Result};
use crate::http::{ApiRequest, HttpClient, RateLimiter, RequestExecutor};
use crate::pagination::{FetchResult, Paginator};
use crate::types::Resource;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetch engine for one run
pub struct FetchEngine {
    /// Request executor shared by the refresh and every page request
    executor: Arc<dyn RequestExecutor>,
    /// Run configuration
    config: AppConfig,
    /// Home of the credentials
    store: Arc<dyn SecretStore>,
    /// Statistics
    stats: RunStats,
}

impl FetchEngine {
    /// Create an engine with an HTTP client built from `config`
    pub fn new(config: AppConfig, store: Arc<dyn SecretStore>) -> Result<Self> {
        let client = HttpClient::with_config(config.http_client_config())
            .map_err(|e| e.in_phase(Phase::Setup))?;
        Ok(Self::with_executor(config, Arc::new(client), store))
    }

    /// Create an engine around an existing executor
    pub fn with_executor(
        config: AppConfig,
        executor: Arc<dyn RequestExecutor>,
        store: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            executor,
            config,
            store,
            stats: RunStats::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get statistics
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Load, refresh and persist the credentials
    ///
    /// Returns the rotated credentials. A failure here must end the run
    /// before any page is requested.
    pub async fn refresh(&mut self) -> Result<Credentials> {
        let current = self
            .store
            .load()
            .await
            .map_err(|e| e.in_phase(Phase::Setup))?;

        let manager = TokenManager::new(
            Arc::clone(&self.executor),
            self.config.refresh_endpoint(),
        );
        self.stats.add_refresh();
        let rotated = manager
            .refresh(&current)
            .await
            .map_err(|e| e.in_phase(Phase::Refresh))?;

        self.store
            .save(&rotated)
            .await
            .map_err(|e| e.in_phase(Phase::Persist))?;
        info!("Rotated credentials persisted");

        Ok(rotated)
    }

    /// Page through one collection with the given credentials
    pub async fn fetch(
        &mut self,
        resource: Resource,
        credentials: &Credentials,
    ) -> Result<FetchResult> {
        let (method, path) = self.config.listing(resource);
        let request = ApiRequest::new(method, path)
            .header("Accept", "application/json")
            .header("Authorization", credentials.bearer());

        let paginator = Paginator::new(
            Arc::clone(&self.executor),
            RateLimiter::new(&self.config.rate_limiter_config()),
            self.config.pagination_config(resource),
        );

        info!(resource = %resource, "Fetching");
        let result = paginator
            .fetch_all(&request)
            .await
            .map_err(|e| e.in_phase(Phase::Fetch(resource.to_string())))?;

        self.stats.add_fetch(&result.stats);
        info!(
            resource = %resource,
            records = result.stats.records,
            requests = result.stats.requests,
            batches = result.stats.batches,
            elapsed_ms = result.stats.elapsed.as_millis() as u64,
            "Fetch complete"
        );

        let cap = self.config.vendor.daily_call_cap;
        if self.stats.exceeds(cap) {
            warn!(
                requests = self.stats.requests,
                daily_call_cap = cap,
                "Calls made this run exceed the vendor daily cap"
            );
        }

        Ok(result)
    }

    /// Refresh once, then fetch each collection in order
    pub async fn run(&mut self, resources: &[Resource]) -> Result<Vec<ResourceFetch>> {
        let credentials = self.refresh().await?;

        let mut fetched = Vec::with_capacity(resources.len());
        for &resource in resources {
            let result = self.fetch(resource, &credentials).await?;
            fetched.push(ResourceFetch { resource, result });
        }
        Ok(fetched)
    }
}

impl std::fmt::Debug for FetchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchEngine")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
