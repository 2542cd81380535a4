//! Run configuration
//!
//! Endpoints, fetch tuning and vendor limits, loaded once from a YAML file.
//!
//! ```yaml
//! base_url: https://apigw.example.com
//! refresh_uri: /oauth2/token
//! refresh_method: POST
//! bss_uri: /monitoring/v2/bssid/aps
//! bss_method: GET
//! apinfo_uri: /monitoring/v2/aps
//! apinfo_method: GET
//! fetch:
//!   rate_per_second: 7
//!   page_limit: 25
//! vendor:
//!   daily_call_cap: 5000
//! ```

use crate::auth::{ParamsLocation, RefreshEndpoint};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, Pacing, RateLimiterConfig};
use crate::pagination::{PaginationConfig, ScanPolicy};
use crate::types::{Method, Resource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Keys every configuration file must carry
const REQUIRED_KEYS: [&str; 7] = [
    "base_url",
    "refresh_uri",
    "refresh_method",
    "bss_uri",
    "bss_method",
    "apinfo_uri",
    "apinfo_method",
];

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete run configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL for every API request
    pub base_url: String,

    /// Token refresh endpoint path
    pub refresh_uri: String,

    /// Token refresh endpoint method
    pub refresh_method: Method,

    /// BSS listing path
    pub bss_uri: String,

    /// BSS listing method
    pub bss_method: Method,

    /// AP info listing path
    pub apinfo_uri: String,

    /// AP info listing method
    pub apinfo_method: Method,

    /// Fetch tuning
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Vendor rate contract
    #[serde(default)]
    pub vendor: VendorLimits,
}

// ============================================================================
// Fetch Settings
// ============================================================================

/// Tuning knobs for paginated fetches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Requests per second; also the batch size and concurrency ceiling
    #[serde(default = "default_rate")]
    pub rate_per_second: u32,

    /// `limit` sent with each page request
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Submission pacing inside a batch
    #[serde(default)]
    pub pacing: Pacing,

    /// End-of-listing rule
    #[serde(default)]
    pub scan_policy: ScanPolicy,

    /// Response field holding BSS records
    #[serde(default = "default_items_field")]
    pub bss_items_field: String,

    /// Response field holding AP info records
    #[serde(default = "default_items_field")]
    pub apinfo_items_field: String,

    /// Where refresh grant parameters are sent
    #[serde(default)]
    pub refresh_params: ParamsLocation,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            rate_per_second: default_rate(),
            page_limit: default_page_limit(),
            timeout_secs: default_timeout_secs(),
            pacing: Pacing::default(),
            scan_policy: ScanPolicy::default(),
            bss_items_field: default_items_field(),
            apinfo_items_field: default_items_field(),
            refresh_params: ParamsLocation::default(),
        }
    }
}

fn default_rate() -> u32 {
    7
}

fn default_page_limit() -> u32 {
    25
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_items_field() -> String {
    "aps".to_string()
}

// ============================================================================
// Vendor Limits
// ============================================================================

/// Call limits published by the API vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorLimits {
    /// Calls allowed per second
    #[serde(default = "default_burst")]
    pub burst_per_second: u32,

    /// Calls allowed per day
    #[serde(default = "default_daily_cap")]
    pub daily_call_cap: u64,
}

impl Default for VendorLimits {
    fn default() -> Self {
        Self {
            burst_per_second: default_burst(),
            daily_call_cap: default_daily_cap(),
        }
    }
}

fn default_burst() -> u32 {
    7
}

fn default_daily_cap() -> u64 {
    5000
}

// ============================================================================
// Loading and validation
// ============================================================================

impl AppConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let Some(map) = value.as_mapping() else {
            return Err(Error::config("Config must be a YAML mapping"));
        };
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
            return Err(Error::missing_field(*missing));
        }

        let config: Self = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides, then re-validate
    pub fn with_overrides(mut self, rate: Option<u32>, page_limit: Option<u32>) -> Result<Self> {
        if let Some(rate) = rate {
            self.fetch.rate_per_second = rate;
        }
        if let Some(limit) = page_limit {
            self.fetch.page_limit = limit;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check values the run cannot start without
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;

        for (field, path) in [
            ("refresh_uri", &self.refresh_uri),
            ("bss_uri", &self.bss_uri),
            ("apinfo_uri", &self.apinfo_uri),
        ] {
            if path.is_empty() {
                return Err(Error::invalid_value(field, "must not be empty"));
            }
        }

        let fetch = &self.fetch;
        if fetch.rate_per_second == 0 {
            return Err(Error::invalid_value("fetch.rate_per_second", "must be at least 1"));
        }
        if fetch.page_limit == 0 {
            return Err(Error::invalid_value("fetch.page_limit", "must be at least 1"));
        }
        if fetch.timeout_secs == 0 {
            return Err(Error::invalid_value("fetch.timeout_secs", "must be at least 1"));
        }
        if fetch.bss_items_field.is_empty() || fetch.apinfo_items_field.is_empty() {
            return Err(Error::invalid_value("fetch.*_items_field", "must not be empty"));
        }
        if fetch.rate_per_second > self.vendor.burst_per_second {
            return Err(Error::invalid_value(
                "fetch.rate_per_second",
                format!(
                    "{} exceeds the vendor burst cap of {} per second",
                    fetch.rate_per_second, self.vendor.burst_per_second
                ),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Derived settings
    // ========================================================================

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// HTTP client settings shared by the whole run
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(self.timeout())
            .build()
    }

    /// Token refresh endpoint
    pub fn refresh_endpoint(&self) -> RefreshEndpoint {
        RefreshEndpoint::new(self.refresh_method, self.refresh_uri.clone())
            .with_params(self.fetch.refresh_params)
    }

    /// Method and path of a listing
    pub fn listing(&self, resource: Resource) -> (Method, &str) {
        match resource {
            Resource::Bss => (self.bss_method, &self.bss_uri),
            Resource::Apinfo => (self.apinfo_method, &self.apinfo_uri),
        }
    }

    /// Response field holding a listing's records
    pub fn items_field(&self, resource: Resource) -> &str {
        match resource {
            Resource::Bss => &self.fetch.bss_items_field,
            Resource::Apinfo => &self.fetch.apinfo_items_field,
        }
    }

    /// Rate limiter settings; one slot per request per second
    pub fn rate_limiter_config(&self) -> RateLimiterConfig {
        RateLimiterConfig::new(self.fetch.rate_per_second, self.fetch.pacing)
    }

    /// Pagination settings for a listing; the batch size equals the rate
    pub fn pagination_config(&self, resource: Resource) -> PaginationConfig {
        PaginationConfig::new(self.fetch.rate_per_second as usize, self.fetch.page_limit)
            .with_items_field(self.items_field(resource))
            .with_scan_policy(self.fetch.scan_policy)
    }
}
