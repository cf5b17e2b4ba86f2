//! Workflow tuning

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::deadline::{DeadlineMode, TICK_INTERVAL, URGENT_THRESHOLD_HOURS};

fn default_tick_interval_secs() -> u64 {
    TICK_INTERVAL.as_secs()
}

fn default_urgent_threshold_hours() -> f64 {
    URGENT_THRESHOLD_HOURS
}

/// Settings for [`ClaimWorkflow`](crate::ClaimWorkflow)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Seconds between deadline ticks
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Remaining hours below which the deadline is urgent
    #[serde(default = "default_urgent_threshold_hours")]
    pub urgent_threshold_hours: f64,
    #[serde(default)]
    pub deadline_mode: DeadlineMode,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            urgent_threshold_hours: default_urgent_threshold_hours(),
            deadline_mode: DeadlineMode::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn with_deadline_mode(mut self, mode: DeadlineMode) -> Self {
        self.deadline_mode = mode;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_secs = interval.as_secs();
        self
    }

    /// Tick period, never shorter than one second
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(60));
        assert_eq!(config.urgent_threshold_hours, 24.0);
        assert_eq!(config.deadline_mode, DeadlineMode::WallClock);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: WorkflowConfig =
            serde_json::from_str(r#"{"deadline_mode":"tick_accumulated"}"#).unwrap();
        assert_eq!(config.deadline_mode, DeadlineMode::TickAccumulated);
        assert_eq!(config.tick_interval_secs, 60);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = WorkflowConfig::default().with_tick_interval(Duration::ZERO);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }
}
