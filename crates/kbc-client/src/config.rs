// Configuration for the Keboola API client

use crate::region::RegionMap;

/// Default URL template, `{service}` and `{suffix}` are substituted per request
pub const DEFAULT_URL_TEMPLATE: &str = "https://{service}{suffix}";

/// Retry policy for token issuance
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total attempts including the first one (default: 3)
    pub max_attempts: usize,
    /// Delay before the first retry in milliseconds, doubled on every retry (default: 1000)
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Configuration for the HTTP client
#[derive(Clone, Debug)]
pub struct KbcClientConfig {
    /// Region code to host suffix map
    pub regions: RegionMap,
    /// Base URL template (default: "https://{service}{suffix}")
    pub url_template: String,
    /// Connection timeout in milliseconds (default: 10000)
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds (default: 300000)
    pub read_timeout_ms: u64,
    /// Storage job polling interval in milliseconds (default: 1000)
    pub job_poll_interval_ms: u64,
    /// Retry policy for token issuance
    pub retry: RetryConfig,
}

impl Default for KbcClientConfig {
    fn default() -> Self {
        Self {
            regions: RegionMap::default(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            connect_timeout_ms: 10_000,
            read_timeout_ms: 300_000,
            job_poll_interval_ms: 1000,
            retry: RetryConfig::default(),
        }
    }
}

impl KbcClientConfig {
    /// Create a config with the given region map
    pub fn with_regions(regions: RegionMap) -> Self {
        Self {
            regions,
            ..Default::default()
        }
    }

    /// Set the base URL template
    pub fn with_url_template(mut self, template: &str) -> Self {
        self.url_template = template.to_string();
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Set storage job polling interval
    pub fn with_job_poll_interval(mut self, interval_ms: u64) -> Self {
        self.job_poll_interval_ms = interval_ms;
        self
    }

    /// Set retry policy
    pub fn with_retry(mut self, max_attempts: usize, base_delay_ms: u64) -> Self {
        self.retry = RetryConfig {
            max_attempts,
            base_delay_ms,
        };
        self
    }
}
