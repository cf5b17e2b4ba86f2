//! Claims service adapter

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use core_kernel::{ClaimId, ClaimNumber, DomainPort};
use infra_http::{envelope, ApiClient, ApiError, HttpMethod};

use crate::deadline::DEFAULT_DEADLINE_HOURS;
use crate::evidence::Attachment;
use crate::form::NewClaimRequest;
use crate::ports::{ClaimCreated, ClaimsPort, EvidenceReceipt};
use crate::session::ClaimIdentity;

pub const CLAIMS_PATH: &str = "/claims";

#[derive(Debug, Deserialize)]
struct CreateResponse {
    /// Internal id
    id: Value,
    /// Human-facing claim number
    claim_id: Value,
    #[serde(default)]
    hours_remaining: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EvidenceResponse {
    total_photos: u32,
}

fn required_id(value: &Value, field: &str) -> Result<String, ApiError> {
    envelope::id_string(value)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::invalid_response(format!("claim response lacks {}", field)))
}

/// [`ClaimsPort`] over the claims backend
#[derive(Debug, Clone)]
pub struct ClaimsAdapter {
    client: Arc<ApiClient>,
}

impl ClaimsAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl DomainPort for ClaimsAdapter {}

#[async_trait]
impl ClaimsPort for ClaimsAdapter {
    async fn create(&self, request: &NewClaimRequest) -> Result<ClaimCreated, ApiError> {
        let body =
            serde_json::to_value(request).map_err(|e| ApiError::Validation(e.to_string()))?;
        let value = self
            .client
            .request(HttpMethod::Post, CLAIMS_PATH, Some(body))
            .await?;
        let response: CreateResponse = envelope::from_value(value)?;

        let claim_id = ClaimId::new(required_id(&response.id, "id")?)
            .map_err(|e| ApiError::invalid_response(e.to_string()))?;
        let claim_number = ClaimNumber::new(required_id(&response.claim_id, "claim_id")?)
            .map_err(|e| ApiError::invalid_response(e.to_string()))?;
        let hours_remaining = match response.hours_remaining {
            Some(hours) => hours,
            None => {
                warn!(claim_id = %claim_id, "Claim response lacks hours_remaining, using default window");
                DEFAULT_DEADLINE_HOURS
            }
        };

        debug!(claim_id = %claim_id, claim_number = %claim_number, hours_remaining, "Claim created");
        Ok(ClaimCreated {
            identity: ClaimIdentity {
                claim_id,
                claim_number,
            },
            hours_remaining,
        })
    }

    async fn upload_evidence(
        &self,
        claim_id: &ClaimId,
        photo: &Attachment,
    ) -> Result<EvidenceReceipt, ApiError> {
        let path = format!("{}/{}/evidence", CLAIMS_PATH, claim_id);
        let value = self
            .client
            .upload(&path, vec![photo.to_part("file")], Vec::new())
            .await?;
        let response: EvidenceResponse = envelope::from_value(value)?;
        debug!(claim_id = %claim_id, total_photos = response.total_photos, "Evidence stored");
        Ok(EvidenceReceipt {
            total_photos: response.total_photos,
        })
    }

    async fn submit(&self, claim_id: &ClaimId) -> Result<String, ApiError> {
        let path = format!("{}/{}/submit", CLAIMS_PATH, claim_id);
        let value = self.client.request(HttpMethod::Post, &path, None).await?;
        let claim_json = match value.get("claim_json") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => value.to_string(),
            Some(other) => other.to_string(),
        };
        Ok(claim_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_id_accepts_numbers_and_strings() {
        assert_eq!(required_id(&json!(12), "id").unwrap(), "12");
        assert_eq!(required_id(&json!("CLM-1"), "claim_id").unwrap(), "CLM-1");
        assert!(matches!(
            required_id(&json!(""), "id"),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(required_id(&Value::Null, "id").is_err());
    }
}
