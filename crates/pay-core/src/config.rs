//! # Poller Configuration
//!
//! Polling interval and confirmation budget. Defaults match the wallet
//! gateway's expectations; tests compress them.

use std::time::Duration;

/// Default wait between confirmation requests
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default budget for one confirmation session
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Timing parameters for the confirmation poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Fixed wait between two confirmation requests
    pub poll_interval: Duration,
    /// Wall-clock budget from session start to timeout
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollerConfig {
    /// Load overrides from `CHECKOUT_POLL_INTERVAL_SECS` and
    /// `CHECKOUT_POLL_TIMEOUT_SECS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            poll_interval: env_secs("CHECKOUT_POLL_INTERVAL_SECS")
                .unwrap_or(defaults.poll_interval),
            timeout: env_secs("CHECKOUT_POLL_TIMEOUT_SECS").unwrap_or(defaults.timeout),
        }
    }

    /// Builder: set poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builder: set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
