//! Document vault adapter

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use core_kernel::{ClaimId, DomainPort};
use infra_http::{ApiClient, ApiError, HttpMethod};

use crate::documents::{DocumentReconciliation, DocumentType};
use crate::evidence::Attachment;
use crate::ports::DocumentsPort;

pub const DOCUMENT_UPLOAD_PATH: &str = "/documents/upload";

#[derive(Debug, Deserialize)]
struct AttachResponse {
    #[serde(default)]
    documents_complete: Option<bool>,
    #[serde(default)]
    attached_count: Option<usize>,
    #[serde(default)]
    attached: Vec<Value>,
    #[serde(default)]
    missing: Vec<Value>,
}

/// Reads a document type from a bare string or an object describing it
fn document_type_of(item: &Value) -> Option<DocumentType> {
    let name = match item {
        Value::String(name) => Some(name.as_str()),
        Value::Object(fields) => ["document_type", "type", "name"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str)),
        _ => None,
    }?;
    let document_type = DocumentType::new(name);
    (!document_type.as_str().is_empty()).then_some(document_type)
}

/// Every entry must name a type; a snapshot with holes is not a snapshot
fn document_types(list: &str, items: &[Value]) -> Result<Vec<DocumentType>, ApiError> {
    items
        .iter()
        .map(|item| {
            document_type_of(item).ok_or_else(|| {
                ApiError::invalid_response(format!("unnamed entry in {}: {}", list, item))
            })
        })
        .collect()
}

/// [`DocumentsPort`] over the document vault
#[derive(Debug, Clone)]
pub struct DocumentsAdapter {
    client: Arc<ApiClient>,
}

impl DocumentsAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl DomainPort for DocumentsAdapter {}

#[async_trait]
impl DocumentsPort for DocumentsAdapter {
    async fn reconcile(&self, claim_id: &ClaimId) -> Result<DocumentReconciliation, ApiError> {
        let path = format!("/claims/{}/documents/attach", claim_id);
        let value = self.client.request(HttpMethod::Post, &path, None).await?;
        let response: AttachResponse = infra_http::envelope::from_value(value)?;

        let reconciliation = DocumentReconciliation::new(
            document_types("attached", &response.attached)?,
            document_types("missing", &response.missing)?,
            Utc::now(),
        );
        if let Some(reported) = response.attached_count {
            if reported != reconciliation.attached_count() {
                warn!(
                    claim_id = %claim_id,
                    reported,
                    attached = reconciliation.attached_count(),
                    "Server attached count disagrees with attached list"
                );
            }
        }
        if let Some(reported) = response.documents_complete {
            if reported != reconciliation.is_complete() {
                warn!(
                    claim_id = %claim_id,
                    reported,
                    missing = reconciliation.missing().len(),
                    "Server completeness flag disagrees with missing list"
                );
            }
        }
        debug!(
            claim_id = %claim_id,
            attached = reconciliation.attached_count(),
            missing = reconciliation.missing().len(),
            "Documents reconciled"
        );
        Ok(reconciliation)
    }

    async fn upload_single(
        &self,
        document_type: &DocumentType,
        file: &Attachment,
    ) -> Result<(), ApiError> {
        self.client
            .upload(
                DOCUMENT_UPLOAD_PATH,
                vec![file.to_part("file")],
                vec![("document_type".to_string(), document_type.to_string())],
            )
            .await?;
        debug!(document_type = %document_type, "Document uploaded to vault");
        Ok(())
    }
}
