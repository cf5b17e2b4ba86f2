//! CLI configuration

use serde::Deserialize;
use std::path::PathBuf;

use core_kernel::CoreError;
use domain_claims::{DeadlineMode, WorkflowConfig};
use infra_http::ClientConfig;

/// Settings for the `claim-flow` binary
///
/// Every field can be set through a `CLAIMS_`-prefixed environment
/// variable, e.g. `CLAIMS_BASE_URL` or `CLAIMS_DEADLINE_MODE`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Backend base URL
    pub base_url: String,
    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts for transient server errors
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub refresh_skew_secs: i64,
    /// Where the token pair is persisted between runs
    pub credentials_path: PathBuf,
    pub tick_interval_secs: u64,
    pub urgent_threshold_hours: f64,
    pub deadline_mode: DeadlineMode,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        let workflow = WorkflowConfig::default();
        Self {
            base_url: client.base_url,
            timeout_secs: client.timeout_secs,
            max_attempts: client.max_attempts,
            retry_backoff_ms: client.retry_backoff_ms,
            refresh_skew_secs: client.refresh_skew_secs,
            credentials_path: PathBuf::from(".claim-flow/credentials.json"),
            tick_interval_secs: workflow.tick_interval_secs,
            urgent_threshold_hours: workflow.urgent_threshold_hours,
            deadline_mode: workflow.deadline_mode,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `CLAIMS_*` environment variables
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_source(config::Environment::with_prefix("CLAIMS"))
    }

    /// Loads configuration from `source` layered over the defaults
    pub fn from_source(source: config::Environment) -> Result<Self, CoreError> {
        let loaded = Self::load(source).map_err(|e| CoreError::configuration(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn load(source: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("max_attempts", u64::from(defaults.max_attempts))?
            .set_default("retry_backoff_ms", defaults.retry_backoff_ms)?
            .set_default("refresh_skew_secs", defaults.refresh_skew_secs)?
            .set_default(
                "credentials_path",
                defaults.credentials_path.to_string_lossy().into_owned(),
            )?
            .set_default("tick_interval_secs", defaults.tick_interval_secs)?
            .set_default("urgent_threshold_hours", defaults.urgent_threshold_hours)?
            .set_default("deadline_mode", "wall_clock")?
            .set_default("log_level", defaults.log_level)?
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.max_attempts == 0 {
            return Err(CoreError::configuration("max_attempts must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::configuration("timeout_secs must be positive"));
        }
        if self.tick_interval_secs == 0 {
            return Err(CoreError::configuration("tick_interval_secs must be positive"));
        }
        if !self.urgent_threshold_hours.is_finite() || self.urgent_threshold_hours <= 0.0 {
            return Err(CoreError::configuration(
                "urgent_threshold_hours must be positive",
            ));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone())
            .timeout_secs(self.timeout_secs)
            .max_attempts(self.max_attempts)
            .retry_backoff_ms(self.retry_backoff_ms)
            .refresh_skew_secs(self.refresh_skew_secs)
    }

    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            tick_interval_secs: self.tick_interval_secs,
            urgent_threshold_hours: self.urgent_threshold_hours,
            deadline_mode: self.deadline_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> config::Environment {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("CLAIMS").source(Some(map))
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = AppConfig::from_source(env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.workflow_config(), WorkflowConfig::default());
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = AppConfig::from_source(env(&[
            ("CLAIMS_BASE_URL", "https://claims.example.org/"),
            ("CLAIMS_TIMEOUT_SECS", "20"),
            ("CLAIMS_DEADLINE_MODE", "tick_accumulated"),
        ]))
        .unwrap();

        let client = config.client_config();
        assert_eq!(client.base_url, "https://claims.example.org");
        assert_eq!(client.timeout_secs, 20);
        assert_eq!(client.max_attempts, 3);
        assert_eq!(
            config.workflow_config().deadline_mode,
            DeadlineMode::TickAccumulated
        );
    }

    #[test]
    fn test_unparseable_variable_is_configuration_error() {
        let err = AppConfig::from_source(env(&[("CLAIMS_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)), "got {:?}", err);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = AppConfig::from_source(env(&[("CLAIMS_MAX_ATTEMPTS", "0")])).unwrap_err();
        assert_eq!(
            err,
            CoreError::configuration("max_attempts must be at least 1")
        );
    }
}
