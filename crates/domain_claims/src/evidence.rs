//! Evidence photos and file attachments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use core_kernel::EvidenceId;
use infra_http::FilePart;

use crate::error::WorkflowError;

/// A file picked on the device, ready to upload
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Device-local reference (path or URI) shown back to the farmer
    pub local_ref: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("local_ref", &self.local_ref)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    /// Builds an attachment, inferring name and content type from the reference
    pub fn new(local_ref: impl Into<String>, bytes: Vec<u8>) -> Self {
        let local_ref = local_ref.into();
        let file_name = Path::new(&local_ref)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            local_ref,
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            WorkflowError::validation(format!("cannot read {}: {}", path.display(), e))
        })?;
        if bytes.is_empty() {
            return Err(WorkflowError::validation(format!(
                "{} is empty",
                path.display()
            )));
        }
        Ok(Self::new(path.to_string_lossy(), bytes))
    }

    /// Multipart part under the given form field
    pub fn to_part(&self, field_name: &str) -> FilePart {
        FilePart {
            field_name: field_name.to_string(),
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "heic" => "image/heic",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// One selected photo in the evidence list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: EvidenceId,
    pub local_ref: String,
    /// Set once the server acknowledged the upload
    pub uploaded: bool,
    pub added_at: DateTime<Utc>,
}

impl EvidenceItem {
    pub fn pending(local_ref: impl Into<String>, added_at: DateTime<Utc>) -> Self {
        Self {
            id: EvidenceId::new(),
            local_ref: local_ref.into(),
            uploaded: false,
            added_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_infers_metadata() {
        let photo = Attachment::new("/sdcard/DCIM/field_01.JPG", vec![1, 2, 3]);
        assert_eq!(photo.file_name, "field_01.JPG");
        assert_eq!(photo.content_type, "image/jpeg");

        let doc = Attachment::new("content://docs/7/7_12_extract.pdf", vec![1]);
        assert_eq!(doc.content_type, "application/pdf");

        let unknown = Attachment::new("blob", vec![1]);
        assert_eq!(unknown.content_type, "application/octet-stream");
    }

    #[test]
    fn test_debug_hides_bytes() {
        let photo = Attachment::new("a.png", vec![0; 4096]);
        let debug = format!("{:?}", photo);
        assert!(debug.contains("len: 4096"));
        assert!(!debug.contains("0, 0, 0"));
    }

    #[tokio::test]
    async fn test_from_path_rejects_missing_file() {
        let result = Attachment::from_path("/definitely/not/here.jpg").await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
    }
}
