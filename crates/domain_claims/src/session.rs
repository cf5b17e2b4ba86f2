//! Claim session aggregate and step state machine
//!
//! A [`ClaimSession`] is the single source of truth for one claim attempt.
//! Every transition is a pure function from the current session to the
//! next one: it either returns a new session or an error, and never
//! touches the receiver. The workflow swaps the new session in only after
//! the backend call it depends on has succeeded.
//!
//! # Steps
//!
//! ```text
//! WeatherCheck ─► ClaimForm ─► EvidenceUpload ─► DocumentAttachment ◄─► ReviewSubmit ─► Submitted
//!      │
//!      └─(no damage)─► Declined
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ClaimNumber, EvidenceId};

use crate::deadline::{Deadline, DeadlineMode, DeadlineStatus};
use crate::documents::{DocumentReconciliation, DocumentType};
use crate::error::WorkflowError;
use crate::events::ClaimEvent;
use crate::evidence::EvidenceItem;
use crate::form::{FormFields, NewClaimRequest};
use crate::weather::{WeatherAlert, WeatherSnapshot};

/// Number of user-visible steps in the progress indicator
pub const TOTAL_STEPS: u8 = 5;

/// Sub-state of the weather step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherStage {
    /// Conditions not fetched yet
    Pending,
    /// An alert was found and awaits the farmer's answer
    AlertRaised,
    /// No alert; the farmer may still file manually
    Clear,
}

/// Workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "step", content = "stage")]
pub enum Step {
    WeatherCheck(WeatherStage),
    ClaimForm,
    EvidenceUpload,
    DocumentAttachment,
    ReviewSubmit,
    /// Terminal: the claim went to assessment
    Submitted,
    /// Terminal: the farmer reported no damage
    Declined,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::WeatherCheck(_) => "weather check",
            Step::ClaimForm => "claim form",
            Step::EvidenceUpload => "evidence upload",
            Step::DocumentAttachment => "document attachment",
            Step::ReviewSubmit => "review",
            Step::Submitted => "submitted",
            Step::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Submitted | Step::Declined)
    }

    /// 1-based position in the progress indicator; None once terminal
    pub fn position(&self) -> Option<u8> {
        match self {
            Step::WeatherCheck(_) => Some(1),
            Step::ClaimForm => Some(2),
            Step::EvidenceUpload => Some(3),
            Step::DocumentAttachment => Some(4),
            Step::ReviewSubmit => Some(5),
            Step::Submitted | Step::Declined => None,
        }
    }
}

/// Server-issued identity of a created claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimIdentity {
    /// Internal id used in every claim-scoped path
    pub claim_id: ClaimId,
    /// Human-facing number shown to the farmer
    pub claim_number: ClaimNumber,
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub success: bool,
    /// Assessment payload as returned by the server, kept verbatim
    pub claim_json: String,
    pub submitted_at: DateTime<Utc>,
}

/// One claim attempt, from weather check to submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimSession {
    step: Step,
    weather: Option<WeatherSnapshot>,
    form: FormFields,
    claim_request: Option<NewClaimRequest>,
    identity: Option<ClaimIdentity>,
    evidence: Vec<EvidenceItem>,
    uploaded_count: u32,
    documents: Option<DocumentReconciliation>,
    auto_reconcile_fired: bool,
    deadline: Option<Deadline>,
    submission: Option<Submission>,
    started_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<ClaimEvent>,
}

impl ClaimSession {
    /// Starts a fresh session at the weather check
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            step: Step::WeatherCheck(WeatherStage::Pending),
            weather: None,
            form: FormFields::default(),
            claim_request: None,
            identity: None,
            evidence: Vec::new(),
            uploaded_count: 0,
            documents: None,
            auto_reconcile_fired: false,
            deadline: None,
            submission: None,
            started_at: now,
            events: Vec::new(),
        }
    }

    // Accessors

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    /// Payload the claim was created with; frozen afterwards
    pub fn claim_request(&self) -> Option<&NewClaimRequest> {
        self.claim_request.as_ref()
    }

    pub fn identity(&self) -> Option<&ClaimIdentity> {
        self.identity.as_ref()
    }

    pub fn claim_id(&self) -> Option<&ClaimId> {
        self.identity.as_ref().map(|i| &i.claim_id)
    }

    pub fn evidence(&self) -> &[EvidenceItem] {
        &self.evidence
    }

    /// Photo count as last confirmed by the server
    pub fn uploaded_count(&self) -> u32 {
        self.uploaded_count
    }

    pub fn documents(&self) -> Option<&DocumentReconciliation> {
        self.documents.as_ref()
    }

    pub fn auto_reconcile_fired(&self) -> bool {
        self.auto_reconcile_fired
    }

    pub fn deadline(&self) -> Option<&Deadline> {
        self.deadline.as_ref()
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_terminal(&self) -> bool {
        self.step.is_terminal()
    }

    /// Events recorded since the last drain
    pub fn pending_events(&self) -> &[ClaimEvent] {
        &self.events
    }

    /// Returns accumulated events and clears them
    pub fn take_events(&mut self) -> Vec<ClaimEvent> {
        std::mem::take(&mut self.events)
    }

    // Guards

    fn ensure_open(&self) -> Result<(), WorkflowError> {
        if self.is_terminal() {
            Err(WorkflowError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            step: self.step.name(),
            action,
        }
    }

    fn require_step(&self, allowed: bool, action: &'static str) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        if allowed {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn identity_for(&self, action: &'static str) -> Result<&ClaimIdentity, WorkflowError> {
        self.identity
            .as_ref()
            .ok_or(WorkflowError::MissingClaimIdentity(action))
    }

    // Weather check

    /// Checks that weather may be fetched; it is fetched at most once
    pub fn weather_check_allowed(&self) -> Result<(), WorkflowError> {
        self.require_step(
            self.step == Step::WeatherCheck(WeatherStage::Pending),
            "check weather",
        )
    }

    pub fn with_weather(
        &self,
        snapshot: WeatherSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        self.weather_check_allowed()?;
        let mut next = self.clone();
        let stage = if snapshot.alert_detected() {
            WeatherStage::AlertRaised
        } else {
            WeatherStage::Clear
        };
        next.events.push(ClaimEvent::WeatherChecked {
            location: snapshot.location.clone(),
            alert_id: snapshot.alert_id().cloned(),
            timestamp: now,
        });
        next.weather = Some(snapshot);
        next.step = Step::WeatherCheck(stage);
        Ok(next)
    }

    /// The alert waiting for the farmer's answer
    pub fn alert_to_acknowledge(&self) -> Result<&WeatherAlert, WorkflowError> {
        self.require_step(
            self.step == Step::WeatherCheck(WeatherStage::AlertRaised),
            "acknowledge alert",
        )?;
        self.weather
            .as_ref()
            .and_then(|w| w.alert.as_ref())
            .ok_or_else(|| self.invalid("acknowledge alert"))
    }

    /// Records the farmer's answer to the alert
    ///
    /// Damage opens the claim form with the alert type as loss type; no
    /// damage ends the session.
    pub fn with_acknowledgment(
        &self,
        has_damage: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        let alert = self.alert_to_acknowledge()?.clone();
        let mut next = self.clone();
        next.events.push(ClaimEvent::AlertAcknowledged {
            alert_id: alert.alert_id.clone(),
            has_damage,
            timestamp: now,
        });
        if has_damage {
            next.enter_form(Some(alert.alert_type), now);
        } else {
            next.step = Step::Declined;
            next.events.push(ClaimEvent::ClaimDeclined { timestamp: now });
        }
        Ok(next)
    }

    /// Opens the claim form from any weather stage
    ///
    /// Skipping an unanswered alert keeps its id on the claim request but
    /// leaves the loss type for the farmer to fill in.
    pub fn open_form(&self, now: DateTime<Utc>) -> Result<Self, WorkflowError> {
        self.require_step(
            matches!(self.step, Step::WeatherCheck(_)),
            "open claim form",
        )?;
        let mut next = self.clone();
        next.enter_form(None, now);
        Ok(next)
    }

    fn enter_form(&mut self, loss_type: Option<String>, now: DateTime<Utc>) {
        let prefilled = match loss_type {
            Some(loss_type) if self.form.loss_type.trim().is_empty() => {
                self.form.loss_type = loss_type.clone();
                Some(loss_type)
            }
            _ => None,
        };
        self.step = Step::ClaimForm;
        self.events.push(ClaimEvent::FormOpened {
            prefilled_loss_type: prefilled,
            timestamp: now,
        });
    }

    // Claim form

    pub fn with_form(&self, fields: FormFields) -> Result<Self, WorkflowError> {
        self.require_step(
            self.step == Step::ClaimForm && self.identity.is_none(),
            "edit claim form",
        )?;
        let mut next = self.clone();
        next.form = fields;
        Ok(next)
    }

    /// Validates the form and builds the create-claim payload
    pub fn claim_request_for_creation(&self) -> Result<NewClaimRequest, WorkflowError> {
        self.require_step(
            self.step == Step::ClaimForm && self.identity.is_none(),
            "create claim",
        )?;
        let alert_id = self.weather.as_ref().and_then(|w| w.alert_id()).cloned();
        self.form.to_request(alert_id)
    }

    /// Stores the server identity and seeds the deadline
    pub fn with_claim_created(
        &self,
        request: NewClaimRequest,
        identity: ClaimIdentity,
        hours_remaining: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        self.require_step(
            self.step == Step::ClaimForm && self.identity.is_none(),
            "create claim",
        )?;
        let mut next = self.clone();
        let deadline = Deadline::seed(hours_remaining, now);
        next.events.push(ClaimEvent::ClaimCreated {
            claim_id: identity.claim_id.clone(),
            claim_number: identity.claim_number.clone(),
            hours_remaining: deadline.remaining_hours(),
            timestamp: now,
        });
        next.claim_request = Some(request);
        next.identity = Some(identity);
        next.deadline = Some(deadline);
        next.step = Step::EvidenceUpload;
        Ok(next)
    }

    // Evidence

    /// Claim the next photo is uploaded to
    pub fn evidence_target(&self) -> Result<&ClaimId, WorkflowError> {
        self.require_step(self.step == Step::EvidenceUpload, "upload evidence")?;
        Ok(&self.identity_for("evidence upload")?.claim_id)
    }

    /// Adds a photo to the list ahead of its upload
    pub fn with_evidence_selected(
        &self,
        item: EvidenceItem,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        self.evidence_target()?;
        let mut next = self.clone();
        next.events.push(ClaimEvent::EvidenceSelected {
            evidence_id: item.id,
            timestamp: now,
        });
        next.evidence.push(item);
        Ok(next)
    }

    /// A selected photo from `local_ref` whose upload has not been confirmed
    pub fn pending_evidence(&self, local_ref: &str) -> Option<EvidenceId> {
        self.evidence
            .iter()
            .find(|item| !item.uploaded && item.local_ref == local_ref)
            .map(|item| item.id)
    }

    /// Confirms a photo with the server's running total
    pub fn with_evidence_uploaded(
        &self,
        evidence_id: EvidenceId,
        total_photos: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        self.evidence_target()?;
        let mut next = self.clone();
        let item = next
            .evidence
            .iter_mut()
            .find(|item| item.id == evidence_id)
            .ok_or_else(|| {
                WorkflowError::validation(format!("unknown evidence item {}", evidence_id))
            })?;
        item.uploaded = true;
        next.uploaded_count = total_photos;
        next.events.push(ClaimEvent::EvidenceUploaded {
            evidence_id,
            total_photos,
            timestamp: now,
        });
        Ok(next)
    }

    // Documents

    /// Moves to the document step
    ///
    /// Returns the new session and whether the one automatic reconciliation
    /// should run now. Re-entering the step never fires it again.
    pub fn enter_documents(&self) -> Result<(Self, bool), WorkflowError> {
        self.require_step(
            matches!(self.step, Step::EvidenceUpload | Step::DocumentAttachment),
            "continue to documents",
        )?;
        self.identity_for("document attachment")?;
        if self.step == Step::EvidenceUpload && self.uploaded_count == 0 {
            return Err(WorkflowError::validation(
                "upload at least one photo of the damage before continuing",
            ));
        }
        let mut next = self.clone();
        next.step = Step::DocumentAttachment;
        let fire = !next.auto_reconcile_fired;
        next.auto_reconcile_fired = true;
        Ok((next, fire))
    }

    /// Claim whose documents are reconciled
    pub fn reconcile_target(&self) -> Result<&ClaimId, WorkflowError> {
        self.require_step(self.step == Step::DocumentAttachment, "reconcile documents")?;
        Ok(&self.identity_for("document reconciliation")?.claim_id)
    }

    /// Replaces the reconciliation wholesale with the server's snapshot
    pub fn with_reconciliation(
        &self,
        reconciliation: DocumentReconciliation,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        self.reconcile_target()?;
        let mut next = self.clone();
        next.events.push(ClaimEvent::DocumentsReconciled {
            attached: reconciliation.attached_count(),
            missing: reconciliation.missing().len(),
            timestamp: now,
        });
        next.documents = Some(reconciliation);
        Ok(next)
    }

    /// Checks that `document_type` is one the last reconciliation reported missing
    pub fn document_upload_allowed(
        &self,
        document_type: &DocumentType,
    ) -> Result<(), WorkflowError> {
        self.reconcile_target()?;
        match &self.documents {
            Some(documents) if documents.is_missing(document_type) => Ok(()),
            Some(_) => Err(WorkflowError::validation(format!(
                "{} is not missing for this claim",
                document_type.display_name()
            ))),
            None => Err(WorkflowError::validation(
                "documents have not been checked yet",
            )),
        }
    }

    pub fn with_document_uploaded(
        &self,
        document_type: DocumentType,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        self.document_upload_allowed(&document_type)?;
        let mut next = self.clone();
        next.events.push(ClaimEvent::DocumentUploaded {
            document_type,
            timestamp: now,
        });
        Ok(next)
    }

    /// Moves to review; missing documents do not block it
    pub fn to_review(&self) -> Result<Self, WorkflowError> {
        self.require_step(self.step == Step::DocumentAttachment, "review claim")?;
        self.identity_for("review")?;
        let mut next = self.clone();
        next.step = Step::ReviewSubmit;
        Ok(next)
    }

    pub fn back_to_documents(&self) -> Result<Self, WorkflowError> {
        self.require_step(self.step == Step::ReviewSubmit, "go back to documents")?;
        let mut next = self.clone();
        next.step = Step::DocumentAttachment;
        Ok(next)
    }

    // Submission

    /// Claim to submit, once the farmer confirmed
    pub fn submission_target(&self, confirmed: bool) -> Result<&ClaimIdentity, WorkflowError> {
        self.require_step(self.step == Step::ReviewSubmit, "submit claim")?;
        let identity = self.identity_for("submission")?;
        if !confirmed {
            return Err(WorkflowError::ConfirmationRequired);
        }
        Ok(identity)
    }

    pub fn with_submission(
        &self,
        claim_json: String,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        let identity = self.submission_target(true)?.clone();
        let mut next = self.clone();
        next.submission = Some(Submission {
            success: true,
            claim_json,
            submitted_at: now,
        });
        next.step = Step::Submitted;
        next.events.push(ClaimEvent::ClaimSubmitted {
            claim_id: identity.claim_id,
            claim_number: identity.claim_number,
            timestamp: now,
        });
        Ok(next)
    }

    // Deadline

    /// Applies one clock tick in place
    ///
    /// Returns None once there is nothing left to count down: no claim
    /// yet, or the session ended.
    pub fn tick_deadline(
        &mut self,
        mode: DeadlineMode,
        now: DateTime<Utc>,
        urgent_threshold_hours: f64,
    ) -> Option<DeadlineStatus> {
        if self.is_terminal() {
            return None;
        }
        let deadline = self.deadline.as_mut()?;
        deadline.tick(mode, now);
        Some(deadline.status(urgent_threshold_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherConditions;
    use chrono::TimeZone;
    use core_kernel::AlertId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 14, 9, 30, 0).unwrap()
    }

    fn snapshot(alert: bool) -> WeatherSnapshot {
        WeatherSnapshot {
            location: "Nashik".to_string(),
            conditions: WeatherConditions::default(),
            alert: alert.then(|| WeatherAlert {
                alert_id: AlertId::new("A-9").unwrap(),
                alert_type: "hailstorm".to_string(),
                severity: "severe".to_string(),
                message: None,
            }),
            checked_at: now(),
        }
    }

    fn form() -> FormFields {
        FormFields {
            loss_type: "flood".to_string(),
            survey_number: "45/2".to_string(),
            area_affected: "1.5".to_string(),
            description: "Field waterlogged".to_string(),
        }
    }

    fn identity() -> ClaimIdentity {
        ClaimIdentity {
            claim_id: ClaimId::new("101").unwrap(),
            claim_number: ClaimNumber::new("CLM-2026-0101").unwrap(),
        }
    }

    fn at_evidence() -> ClaimSession {
        let session = ClaimSession::start(now())
            .open_form(now())
            .unwrap()
            .with_form(form())
            .unwrap();
        let request = session.claim_request_for_creation().unwrap();
        session
            .with_claim_created(request, identity(), 72.0, now())
            .unwrap()
    }

    fn with_photo(session: &ClaimSession) -> ClaimSession {
        let item = EvidenceItem::pending("a.jpg", now());
        let id = item.id;
        session
            .with_evidence_selected(item, now())
            .unwrap()
            .with_evidence_uploaded(id, 1, now())
            .unwrap()
    }

    #[test]
    fn test_alert_with_damage_prefills_loss_type() {
        let session = ClaimSession::start(now())
            .with_weather(snapshot(true), now())
            .unwrap();
        assert_eq!(session.step(), Step::WeatherCheck(WeatherStage::AlertRaised));

        let session = session.with_acknowledgment(true, now()).unwrap();
        assert_eq!(session.step(), Step::ClaimForm);
        assert_eq!(session.form().loss_type, "hailstorm");
        let request = session
            .with_form(FormFields {
                loss_type: "hailstorm".to_string(),
                ..form()
            })
            .unwrap()
            .claim_request_for_creation()
            .unwrap();
        assert_eq!(request.alert_id.unwrap().as_str(), "A-9");
    }

    #[test]
    fn test_no_damage_declines() {
        let session = ClaimSession::start(now())
            .with_weather(snapshot(true), now())
            .unwrap()
            .with_acknowledgment(false, now())
            .unwrap();
        assert_eq!(session.step(), Step::Declined);
        assert!(session.is_terminal());
        assert_eq!(
            session.open_form(now()).unwrap_err(),
            WorkflowError::SessionClosed
        );
    }

    #[test]
    fn test_weather_fetched_once() {
        let session = ClaimSession::start(now())
            .with_weather(snapshot(false), now())
            .unwrap();
        assert_eq!(session.step(), Step::WeatherCheck(WeatherStage::Clear));
        assert!(matches!(
            session.with_weather(snapshot(true), now()),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_form_opened_past_alert_keeps_alert_without_prefill() {
        let session = ClaimSession::start(now())
            .with_weather(snapshot(true), now())
            .unwrap()
            .open_form(now())
            .unwrap();
        assert_eq!(session.step(), Step::ClaimForm);
        assert!(session.form().loss_type.is_empty());

        let request = session
            .with_form(form())
            .unwrap()
            .claim_request_for_creation()
            .unwrap();
        assert_eq!(request.loss_type, "flood");
        assert_eq!(request.alert_id, Some(AlertId::new("A-9").unwrap()));
    }

    #[test]
    fn test_claim_created_seeds_deadline_and_freezes_form() {
        let session = at_evidence();
        assert_eq!(session.step(), Step::EvidenceUpload);
        assert_eq!(session.claim_id().unwrap().as_str(), "101");
        assert_eq!(session.deadline().unwrap().remaining_hours(), 72.0);
        assert!(session.with_form(FormFields::default()).is_err());
        assert!(session.claim_request().is_some());
    }

    #[test]
    fn test_documents_require_a_photo() {
        let session = at_evidence();
        assert!(matches!(
            session.enter_documents(),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn test_auto_reconcile_fires_once() {
        let (session, fire) = with_photo(&at_evidence()).enter_documents().unwrap();
        assert!(fire);
        let (session, fire) = session.enter_documents().unwrap();
        assert!(!fire);
        let session = session.to_review().unwrap().back_to_documents().unwrap();
        assert_eq!(session.step(), Step::DocumentAttachment);
        assert!(session.auto_reconcile_fired());
    }

    #[test]
    fn test_only_missing_documents_can_be_uploaded() {
        let (session, _) = with_photo(&at_evidence()).enter_documents().unwrap();
        assert!(session
            .document_upload_allowed(&"land_record".into())
            .is_err());

        let session = session
            .with_reconciliation(
                DocumentReconciliation::new(
                    vec!["aadhaar".into()],
                    vec!["land_record".into()],
                    now(),
                ),
                now(),
            )
            .unwrap();
        assert!(session.document_upload_allowed(&"land_record".into()).is_ok());
        assert!(session.document_upload_allowed(&"aadhaar".into()).is_err());
    }

    #[test]
    fn test_submission_requires_confirmation() {
        let (session, _) = with_photo(&at_evidence()).enter_documents().unwrap();
        let session = session.to_review().unwrap();
        assert_eq!(
            session.submission_target(false).unwrap_err(),
            WorkflowError::ConfirmationRequired
        );

        let mut session = session.with_submission("{}".to_string(), now()).unwrap();
        assert_eq!(session.step(), Step::Submitted);
        assert!(session.submission().unwrap().success);
        assert_eq!(session.submission().unwrap().claim_json, "{}");
        assert!(session
            .tick_deadline(DeadlineMode::WallClock, now(), 24.0)
            .is_none());
        let names: Vec<&str> = session.take_events().iter().map(|e| e.name()).collect();
        assert_eq!(names.first(), Some(&"form_opened"));
        assert_eq!(names.last(), Some(&"claim_submitted"));
        assert!(session.pending_events().is_empty());
    }

    #[test]
    fn test_transitions_leave_receiver_untouched() {
        let session = at_evidence();
        let before = session.clone();
        let _ = with_photo(&session);
        let _ = session.enter_documents();
        assert_eq!(session, before);
    }

    #[test]
    fn test_step_positions() {
        assert_eq!(Step::WeatherCheck(WeatherStage::Pending).position(), Some(1));
        assert_eq!(Step::ReviewSubmit.position(), Some(TOTAL_STEPS));
        assert_eq!(Step::Submitted.position(), None);
    }
}
