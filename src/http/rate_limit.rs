//! Rate limiting implementation
//!
//! Two separate mechanisms:
//! - concurrency slots: a semaphore with one permit per allowed request per
//!   second, held for the lifetime of each in-flight request
//! - submission pacing: how long the submitter waits between handing out
//!   requests of a batch
//!
//! The default pacing (`FixedDelay`) spreads a batch of `n` submissions over
//! roughly one second by waiting `1/n` between them. It bounds burstiness but is not
//! a strict cap. `TokenBucket` swaps in a real token bucket using governor.

use crate::error::{Error, Result};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// How submissions inside a batch are spaced out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Wait `1/n` seconds between successive submissions of an `n`-page batch
    #[default]
    FixedDelay,
    /// Wait for a token from a bucket refilled at `R` per second (burst 1)
    TokenBucket,
    /// No pacing; only the concurrency ceiling applies
    Unpaced,
}

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per second, also the concurrency ceiling
    pub requests_per_second: u32,
    /// Pacing policy between submissions
    pub pacing: Pacing,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 7,
            pacing: Pacing::FixedDelay,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32, pacing: Pacing) -> Self {
        Self {
            requests_per_second,
            pacing,
        }
    }

    /// Concurrency ceiling without any pacing
    pub fn unpaced(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, Pacing::Unpaced)
    }
}

type Bucket = Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

#[derive(Clone)]
enum Pacer {
    Fixed,
    Bucket(Arc<Bucket>),
    Unpaced,
}

/// Concurrency-bounded, paced gate in front of the request executor
#[derive(Clone)]
pub struct RateLimiter {
    slots: Arc<Semaphore>,
    ceiling: u32,
    pacer: Pacer,
}

/// Holds one concurrency slot; the slot is released on drop
#[derive(Debug)]
pub struct RequestPermit {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let pacer = match config.pacing {
            Pacing::FixedDelay => Pacer::Fixed,
            Pacing::TokenBucket => {
                let quota = Quota::per_second(rate).allow_burst(NonZeroU32::MIN);
                Pacer::Bucket(Arc::new(Governor::direct(quota)))
            }
            Pacing::Unpaced => Pacer::Unpaced,
        };

        Self {
            slots: Arc::new(Semaphore::new(rate.get() as usize)),
            ceiling: rate.get(),
            pacer,
        }
    }

    /// Maximum number of requests allowed in flight at once
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Number of requests currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.ceiling as usize - self.slots.available_permits()
    }

    /// Active pacing policy
    pub fn pacing(&self) -> Pacing {
        match self.pacer {
            Pacer::Fixed => Pacing::FixedDelay,
            Pacer::Bucket(_) => Pacing::TokenBucket,
            Pacer::Unpaced => Pacing::Unpaced,
        }
    }

    /// Wait before handing out the `position`-th submission of a batch of
    /// `batch_size` pages
    ///
    /// With fixed-delay pacing the first submission goes out immediately and
    /// every later one waits `1/batch_size` seconds.
    pub async fn pace(&self, position: usize, batch_size: usize) {
        match &self.pacer {
            Pacer::Fixed => {
                if position > 0 {
                    tokio::time::sleep(fixed_delay(batch_size)).await;
                }
            }
            Pacer::Bucket(bucket) => bucket.until_ready().await,
            Pacer::Unpaced => {}
        }
    }

    /// Wait for a free concurrency slot
    pub async fn acquire(&self) -> Result<RequestPermit> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|e| Error::Other(format!("Rate limiter closed: {e}")))?;
        Ok(RequestPermit { _permit: permit })
    }

    /// Run a request while holding a slot; the slot is released however it ends
    pub async fn run<F, T>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self.acquire().await?;
        request.await
    }
}

fn fixed_delay(batch_size: usize) -> Duration {
    Duration::from_secs_f64(1.0 / batch_size.max(1) as f64)
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("ceiling", &self.ceiling)
            .field("pacing", &self.pacing())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
