//! HTTP module
//!
//! Request execution and rate limiting.
//!
//! # Features
//!
//! - **Response classification**: auth-error header, HTTP status and timeout
//!   failures surface as distinct error kinds
//! - **Single connection pool**: one `reqwest::Client` serves the whole run
//! - **Rate limiting**: concurrency slots plus a swappable pacing policy

mod client;
mod rate_limit;

pub use client::{ApiRequest, HttpClient, HttpClientConfig, RequestExecutor};
pub use rate_limit::{Pacing, RateLimiter, RateLimiterConfig, RequestPermit};

#[cfg(test)]
mod tests;
