//! Engine types

use crate::pagination::{FetchResult, FetchStats};
use crate::types::Resource;
use std::time::Duration;

/// Result of fetching one collection
#[derive(Debug, Clone)]
pub struct ResourceFetch {
    /// Collection that was fetched
    pub resource: Resource,
    /// Records and counters
    pub result: FetchResult,
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Collections fetched
    pub fetches: u64,
    /// API calls made, including the token refresh
    pub requests: u64,
    /// Records accepted over all collections
    pub records: u64,
    /// Time spent fetching
    pub fetch_time: Duration,
}

impl RunStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the refresh call
    pub fn add_refresh(&mut self) {
        self.requests += 1;
    }

    /// Fold in the counters of one fetch
    pub fn add_fetch(&mut self, stats: &FetchStats) {
        self.fetches += 1;
        self.requests += stats.requests;
        self.records += stats.records;
        self.fetch_time += stats.elapsed;
    }

    /// Whether the calls made so far exceed a daily cap
    pub fn exceeds(&self, daily_call_cap: u64) -> bool {
        self.requests > daily_call_cap
    }
}
