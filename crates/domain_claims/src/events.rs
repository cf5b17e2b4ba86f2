//! Audit events recorded by the claim session
//!
//! Events accumulate on the session as transitions succeed and are drained
//! by whoever records the audit trail (see `ClaimSession::take_events`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AlertId, ClaimId, ClaimNumber, EvidenceId};

use crate::documents::DocumentType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClaimEvent {
    /// Weather conditions were fetched
    WeatherChecked {
        location: String,
        alert_id: Option<AlertId>,
        timestamp: DateTime<Utc>,
    },

    /// The farmer answered the weather alert
    AlertAcknowledged {
        alert_id: AlertId,
        has_damage: bool,
        timestamp: DateTime<Utc>,
    },

    /// The claim form was opened
    FormOpened {
        prefilled_loss_type: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// The backend registered the claim
    ClaimCreated {
        claim_id: ClaimId,
        claim_number: ClaimNumber,
        hours_remaining: f64,
        timestamp: DateTime<Utc>,
    },

    /// A photo was added to the evidence list
    EvidenceSelected {
        evidence_id: EvidenceId,
        timestamp: DateTime<Utc>,
    },

    /// The backend confirmed a photo
    EvidenceUploaded {
        evidence_id: EvidenceId,
        total_photos: u32,
        timestamp: DateTime<Utc>,
    },

    /// Vault documents were matched to the claim
    DocumentsReconciled {
        attached: usize,
        missing: usize,
        timestamp: DateTime<Utc>,
    },

    /// A missing document was uploaded to the vault
    DocumentUploaded {
        document_type: DocumentType,
        timestamp: DateTime<Utc>,
    },

    /// The claim was submitted for assessment
    ClaimSubmitted {
        claim_id: ClaimId,
        claim_number: ClaimNumber,
        timestamp: DateTime<Utc>,
    },

    /// The farmer reported no damage; no claim was filed
    ClaimDeclined { timestamp: DateTime<Utc> },
}

impl ClaimEvent {
    /// Short machine-readable name, used as a log field
    pub fn name(&self) -> &'static str {
        match self {
            ClaimEvent::WeatherChecked { .. } => "weather_checked",
            ClaimEvent::AlertAcknowledged { .. } => "alert_acknowledged",
            ClaimEvent::FormOpened { .. } => "form_opened",
            ClaimEvent::ClaimCreated { .. } => "claim_created",
            ClaimEvent::EvidenceSelected { .. } => "evidence_selected",
            ClaimEvent::EvidenceUploaded { .. } => "evidence_uploaded",
            ClaimEvent::DocumentsReconciled { .. } => "documents_reconciled",
            ClaimEvent::DocumentUploaded { .. } => "document_uploaded",
            ClaimEvent::ClaimSubmitted { .. } => "claim_submitted",
            ClaimEvent::ClaimDeclined { .. } => "claim_declined",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClaimEvent::WeatherChecked { timestamp, .. }
            | ClaimEvent::AlertAcknowledged { timestamp, .. }
            | ClaimEvent::FormOpened { timestamp, .. }
            | ClaimEvent::ClaimCreated { timestamp, .. }
            | ClaimEvent::EvidenceSelected { timestamp, .. }
            | ClaimEvent::EvidenceUploaded { timestamp, .. }
            | ClaimEvent::DocumentsReconciled { timestamp, .. }
            | ClaimEvent::DocumentUploaded { timestamp, .. }
            | ClaimEvent::ClaimSubmitted { timestamp, .. }
            | ClaimEvent::ClaimDeclined { timestamp } => *timestamp,
        }
    }
}
