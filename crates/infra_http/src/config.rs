//! Client configuration
//!
//! Timeouts are generous on purpose: the backend runs on a host that cold
//! starts, and the first request after idle can take tens of seconds.

use serde::Deserialize;
use std::time::Duration;

use crate::retry::RetryPolicy;

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_refresh_skew_secs() -> i64 {
    30
}

/// Configuration for the resilient API client
///
/// # Example
///
/// ```rust
/// use infra_http::ClientConfig;
///
/// let config = ClientConfig::new("https://api.example.org/")
///     .timeout_secs(45)
///     .max_attempts(3);
/// assert_eq!(config.url("/claims"), "https://api.example.org/claims");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts for transient server errors (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff between attempts
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Refresh a JWT access token this many seconds before it expires
    #[serde(default = "default_refresh_skew_secs")]
    pub refresh_skew_secs: i64,
}

impl ClientConfig {
    /// Creates a configuration for `base_url` with default resilience settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            refresh_skew_secs: default_refresh_skew_secs(),
        }
    }

    /// Sets the per-attempt timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the total attempt bound for transient failures
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the backoff base delay
    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    /// Sets the proactive refresh window
    pub fn refresh_skew_secs(mut self, secs: i64) -> Self {
        self.refresh_skew_secs = secs;
        self
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy derived from this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_backoff_ms))
    }

    /// Joins `path` onto the base URL
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_url_joining() {
        let config = ClientConfig::new("https://api.example.org/");
        assert_eq!(config.url("/claims"), "https://api.example.org/claims");
        assert_eq!(config.url("auth/login"), "https://api.example.org/auth/login");
    }

    #[test]
    fn test_max_attempts_never_zero() {
        let config = ClientConfig::default().max_attempts(0);
        assert_eq!(config.max_attempts, 1);
    }
}
