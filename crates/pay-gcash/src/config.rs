//! # GCash Configuration
//!
//! Where the payment server lives and how long to wait for it.
//! Loaded from environment variables (and `.env` if present).

use pay_core::PaymentError;
use reqwest::Url;
use std::env;
use std::time::Duration;

/// Payment server used by the storefront
pub const DEFAULT_API_BASE_URL: &str = "https://server-1-qq50.onrender.com";

/// Per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GCash payment server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcashConfig {
    /// API base URL, without trailing slash
    pub api_base_url: String,

    /// Timeout for a single HTTP request
    pub request_timeout: Duration,

    /// Path of the payment creation endpoint
    pub create_path: String,

    /// Path of the confirmation endpoint
    pub confirm_path: String,
}

impl GcashConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `GCASH_API_BASE_URL` (default: the storefront's payment server)
    /// - `GCASH_REQUEST_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut config = Self::default();

        if let Ok(base) = env::var("GCASH_API_BASE_URL") {
            config = config.with_api_base_url(base);
        }

        if let Ok(raw) = env::var("GCASH_REQUEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                PaymentError::Configuration(format!(
                    "GCASH_REQUEST_TIMEOUT_SECS must be a number of seconds, got {:?}",
                    raw
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL and the timeout is non-zero
    pub fn validate(&self) -> Result<(), PaymentError> {
        let url = Url::parse(&self.api_base_url).map_err(|e| {
            PaymentError::Configuration(format!(
                "GCASH_API_BASE_URL {} is not a valid URL: {}",
                self.api_base_url, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(PaymentError::Configuration(
                "GCASH_API_BASE_URL must use http or https".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(PaymentError::Configuration(
                "GCASH_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the payment creation endpoint
    pub fn create_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.create_path)
    }

    /// Full URL of the confirmation endpoint
    pub fn confirm_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.confirm_path)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for GcashConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            create_path: "/api/create-gcash-payment".to_string(),
            confirm_path: "/api/confirm-gcash-payment".to_string(),
        }
    }
}
