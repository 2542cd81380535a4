//! Pagination types
//!
//! Page requests and responses, the batch scan rule and run bookkeeping.

use crate::error::{Error, Result};
use crate::http::ApiRequest;
use crate::types::{JsonValue, Record};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Query parameter carrying the page offset
pub const OFFSET_PARAM: &str = "offset";
/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// One page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Starting position of the page
    pub offset: u64,
    /// Maximum number of records in the page
    pub limit: u32,
}

impl PageRequest {
    /// Create a page request
    pub fn new(offset: u64, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// A copy of `request` carrying this page's `limit` and `offset`
    pub fn apply(&self, request: &ApiRequest) -> ApiRequest {
        request
            .clone()
            .query(LIMIT_PARAM, self.limit.to_string())
            .query(OFFSET_PARAM, self.offset.to_string())
    }
}

/// Records returned for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResponse {
    /// Records in server order; empty means the listing is exhausted
    pub items: Vec<Record>,
}

impl PageResponse {
    /// Create a response from records
    pub fn new(items: Vec<Record>) -> Self {
        Self { items }
    }

    /// Pull the record list out of a response body
    ///
    /// A body without `field`, or with a non-list `field`, is a schema error.
    pub fn from_body(body: JsonValue, field: &str) -> Result<Self> {
        let JsonValue::Object(mut map) = body else {
            return Err(Error::schema(format!(
                "Expected a JSON object holding '{field}', got {}",
                json_type_name(&body)
            )));
        };

        match map.remove(field) {
            Some(JsonValue::Array(items)) => Ok(Self { items }),
            Some(other) => Err(Error::schema(format!(
                "Field '{field}' is {}, expected a list",
                json_type_name(&other)
            ))),
            None => Err(Error::schema(format!(
                "Response has no '{field}' field"
            ))),
        }
    }

    /// Whether this page signals the end of the listing
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of records in the page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}

/// How the responses of a batch are scanned for the end of the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Stop at the first empty page; later pages of the same batch are
    /// dropped even when they hold records
    #[default]
    StopAtFirstEmpty,
    /// Keep every non-empty page; stop only when the whole batch is empty
    KeepNonEmpty,
}

/// Result of checking a batch for the end of the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Continue pagination
    Continue,
    /// Stop pagination
    Stop,
}

impl StopResult {
    /// Check if we should continue
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if we should stop
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Scan a batch in submission order, appending accepted records to `records`
pub fn scan_batch(
    policy: ScanPolicy,
    responses: Vec<PageResponse>,
    records: &mut Vec<Record>,
) -> StopResult {
    match policy {
        ScanPolicy::StopAtFirstEmpty => {
            for response in responses {
                if response.is_empty() {
                    return StopResult::Stop;
                }
                records.extend(response.items);
            }
            StopResult::Continue
        }
        ScanPolicy::KeepNonEmpty => {
            let mut all_empty = true;
            for response in responses {
                if !response.is_empty() {
                    all_empty = false;
                    records.extend(response.items);
                }
            }
            if all_empty {
                StopResult::Stop
            } else {
                StopResult::Continue
            }
        }
    }
}

/// Configuration for a paginated fetch
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// Page requests issued per batch
    pub batch_size: usize,
    /// `limit` sent with every page request
    pub page_limit: u32,
    /// Response field holding the record list
    pub items_field: String,
    /// End-of-listing rule
    pub scan_policy: ScanPolicy,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            batch_size: 7,
            page_limit: 25,
            items_field: "aps".to_string(),
            scan_policy: ScanPolicy::StopAtFirstEmpty,
        }
    }
}

impl PaginationConfig {
    /// Create a config with the given batch size and page limit
    pub fn new(batch_size: usize, page_limit: u32) -> Self {
        Self {
            batch_size,
            page_limit,
            ..Self::default()
        }
    }

    /// Set the response field holding the record list
    #[must_use]
    pub fn with_items_field(mut self, field: impl Into<String>) -> Self {
        self.items_field = field.into();
        self
    }

    /// Set the end-of-listing rule
    #[must_use]
    pub fn with_scan_policy(mut self, policy: ScanPolicy) -> Self {
        self.scan_policy = policy;
        self
    }

    /// Check the values a fetch cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid_value("batch_size", "must be at least 1"));
        }
        if self.page_limit == 0 {
            return Err(Error::invalid_value("page_limit", "must be at least 1"));
        }
        if self.items_field.is_empty() {
            return Err(Error::invalid_value("items_field", "must not be empty"));
        }
        Ok(())
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Offset of the next batch's first page
    pub offset: u64,
    /// Total records accepted so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Add offset
    pub fn add_offset(&mut self, amount: u64) {
        self.offset += amount;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}

/// Counters for one fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStats {
    /// Batches issued
    pub batches: u64,
    /// Page requests issued
    pub requests: u64,
    /// Records accepted
    pub records: u64,
    /// Starting offset of every batch, in order
    pub batch_offsets: Vec<u64>,
    /// Wall time of the fetch
    pub elapsed: Duration,
}

impl FetchStats {
    /// Record a completed batch
    pub fn add_batch(&mut self, offset: u64, requests: usize) {
        self.batches += 1;
        self.requests += requests as u64;
        self.batch_offsets.push(offset);
    }
}

/// Records and counters of a finished fetch
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    /// Accepted records in submission order
    pub records: Vec<Record>,
    /// Counters
    pub stats: FetchStats,
}
