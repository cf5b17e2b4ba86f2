//! Ports and Adapters Infrastructure
//!
//! The claim workflow talks to three backend capabilities (weather, claims,
//! document vault). Each is reached through a port trait defined in
//! `domain_claims`; this module holds the pieces every port shares.
//!
//! ```text
//!   ClaimWorkflow ──► WeatherPort / ClaimsPort / DocumentsPort
//!                          ▲                     ▲
//!                 HTTP adapter (ApiClient)   in-memory mock
//! ```

use serde::{Deserialize, Serialize};

/// Marker trait for all domain ports
///
/// Ports are shared between the workflow and the deadline task, so they
/// must be thread-safe and usable from async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Adapter is healthy and operational
    Healthy,
    /// Adapter is reachable but cannot authenticate
    Degraded,
    /// Adapter cannot reach its backend
    Unhealthy,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Performs a health check on the adapter
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_health_serializes_snake_case() {
        let json = serde_json::to_string(&AdapterHealth::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }
}
