//! Property-Based Test Generators
//!
//! Provides proptest strategies for claim data and for random command
//! sequences driven through the pure session transitions.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use core_kernel::AlertId;
use domain_claims::{
    ClaimSession, DeadlineMode, DocumentReconciliation, DocumentType, EvidenceItem, WeatherAlert,
    WeatherConditions, WeatherSnapshot, WorkflowError,
};

use crate::fixtures::ClaimFixtures;

/// Strategy for generating document types the backend knows about
pub fn document_type_strategy() -> impl Strategy<Value = DocumentType> {
    prop_oneof![
        Just(DocumentType::new("aadhaar")),
        Just(DocumentType::new("land_record")),
        Just(DocumentType::new("bank_passbook")),
        Just(DocumentType::new("sowing_certificate")),
        Just(DocumentType::new("Land Record")),
        Just(DocumentType::new("bank-passbook")),
    ]
}

/// Strategy for generating a reconciliation of the required documents
///
/// Each required type lands in exactly one of attached or missing.
pub fn reconciliation_strategy() -> impl Strategy<Value = DocumentReconciliation> {
    proptest::collection::vec(any::<bool>(), 3..=3).prop_map(|attached_flags| {
        let (attached, missing): (Vec<_>, Vec<_>) = ClaimFixtures::required_documents()
            .into_iter()
            .zip(attached_flags)
            .partition(|(_, attached)| *attached);
        DocumentReconciliation::new(
            attached.into_iter().map(|(t, _)| t),
            missing.into_iter().map(|(t, _)| t),
            ClaimFixtures::filed_at(),
        )
    })
}

/// Strategy for generating area text as a farmer might type it
pub fn area_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..10_000u32, 0u32..100u32).prop_map(|(whole, frac)| format!("{}.{:02}", whole, frac)),
        (1u32..500u32).prop_map(|n| format!("{} acres", n)),
        Just(String::new()),
        Just("abc".to_string()),
        Just(".5".to_string()),
        "[a-z ]{0,8}",
    ]
}

/// Strategy for generating server-supplied deadline seeds, including junk
pub fn deadline_seed_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => 0.0f64..200.0f64,
        1 => -50.0f64..0.0f64,
        1 => Just(f64::NAN),
        1 => Just(0.0),
    ]
}

/// Strategy for generating tick counts up to a week of minutes
pub fn tick_count_strategy() -> impl Strategy<Value = u32> {
    0u32..10_080u32
}

pub fn deadline_mode_strategy() -> impl Strategy<Value = DeadlineMode> {
    prop_oneof![Just(DeadlineMode::WallClock), Just(DeadlineMode::TickAccumulated)]
}

/// One step a farmer (or the backend) could take
#[derive(Debug, Clone)]
pub enum SessionCommand {
    CheckWeather { alert: bool },
    Acknowledge { has_damage: bool },
    OpenForm,
    FillForm { area: String },
    CreateClaim { id: u64, hours_remaining: f64 },
    SelectPhoto { name: String },
    ConfirmPhoto { total_photos: u32 },
    EnterDocuments,
    Reconcile(DocumentReconciliation),
    ToReview,
    BackToDocuments,
    Submit { confirmed: bool },
    Tick { minutes: i64 },
}

impl SessionCommand {
    /// Applies the command without touching the network
    pub fn apply(
        &self,
        session: &ClaimSession,
        now: DateTime<Utc>,
    ) -> Result<ClaimSession, WorkflowError> {
        match self {
            SessionCommand::CheckWeather { alert } => {
                session.with_weather(snapshot(*alert, now), now)
            }
            SessionCommand::Acknowledge { has_damage } => {
                session.with_acknowledgment(*has_damage, now)
            }
            SessionCommand::OpenForm => session.open_form(now),
            SessionCommand::FillForm { area } => {
                let loss_type = match session.form().loss_type.as_str() {
                    "" => "unseasonal_rain".to_string(),
                    prefilled => prefilled.to_string(),
                };
                session.with_form(ClaimFixtures::form(&loss_type, area))
            }
            SessionCommand::CreateClaim { id, hours_remaining } => {
                let request = session.claim_request_for_creation()?;
                session.with_claim_created(
                    request,
                    ClaimFixtures::identity(*id),
                    *hours_remaining,
                    now,
                )
            }
            SessionCommand::SelectPhoto { name } => {
                session.with_evidence_selected(EvidenceItem::pending(name.clone(), now), now)
            }
            SessionCommand::ConfirmPhoto { total_photos } => {
                let pending = session
                    .evidence()
                    .iter()
                    .find(|item| !item.uploaded)
                    .map(|item| item.id)
                    .ok_or_else(|| WorkflowError::validation("no photo awaiting upload"))?;
                session.with_evidence_uploaded(pending, *total_photos, now)
            }
            SessionCommand::EnterDocuments => session.enter_documents().map(|(next, _)| next),
            SessionCommand::Reconcile(reconciliation) => {
                session.with_reconciliation(reconciliation.clone(), now)
            }
            SessionCommand::ToReview => session.to_review(),
            SessionCommand::BackToDocuments => session.back_to_documents(),
            SessionCommand::Submit { confirmed } => {
                session.submission_target(*confirmed)?;
                session.with_submission(r#"{"status":"submitted"}"#.to_string(), now)
            }
            SessionCommand::Tick { .. } => {
                let mut next = session.clone();
                next.tick_deadline(DeadlineMode::WallClock, now, 24.0);
                Ok(next)
            }
        }
    }

    /// How far the clock moves before this command runs
    pub fn elapsed(&self) -> Duration {
        match self {
            SessionCommand::Tick { minutes } => Duration::minutes(*minutes),
            _ => Duration::seconds(5),
        }
    }
}

fn snapshot(alert: bool, now: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        location: "Niphad".to_string(),
        conditions: WeatherConditions::default(),
        alert: alert.then(|| WeatherAlert {
            alert_id: AlertId::new("A-1").expect("static alert id"),
            alert_type: "hailstorm".to_string(),
            severity: "severe".to_string(),
            message: None,
        }),
        checked_at: now,
    }
}

/// Strategy for generating a single command
pub fn session_command_strategy() -> impl Strategy<Value = SessionCommand> {
    prop_oneof![
        any::<bool>().prop_map(|alert| SessionCommand::CheckWeather { alert }),
        any::<bool>().prop_map(|has_damage| SessionCommand::Acknowledge { has_damage }),
        Just(SessionCommand::OpenForm),
        area_text_strategy().prop_map(|area| SessionCommand::FillForm { area }),
        (1u64..1_000u64, deadline_seed_strategy())
            .prop_map(|(id, hours_remaining)| SessionCommand::CreateClaim { id, hours_remaining }),
        "[a-z]{3,8}\\.jpg".prop_map(|name| SessionCommand::SelectPhoto { name }),
        (1u32..10u32).prop_map(|total_photos| SessionCommand::ConfirmPhoto { total_photos }),
        Just(SessionCommand::EnterDocuments),
        reconciliation_strategy().prop_map(SessionCommand::Reconcile),
        Just(SessionCommand::ToReview),
        Just(SessionCommand::BackToDocuments),
        any::<bool>().prop_map(|confirmed| SessionCommand::Submit { confirmed }),
        (1i64..600i64).prop_map(|minutes| SessionCommand::Tick { minutes }),
    ]
}

/// Strategy for generating command sequences
pub fn session_commands_strategy(max_len: usize) -> impl Strategy<Value = Vec<SessionCommand>> {
    proptest::collection::vec(session_command_strategy(), 1..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn reconciliation_is_consistent(reconciliation in reconciliation_strategy()) {
            prop_assert_eq!(reconciliation.is_complete(), reconciliation.missing().is_empty());
            prop_assert_eq!(reconciliation.attached().len() + reconciliation.missing().len(), 3);
        }

        #[test]
        fn document_types_are_normalised(document_type in document_type_strategy()) {
            prop_assert!(!document_type.as_str().contains(' '));
            prop_assert!(!document_type.as_str().contains('-'));
        }

        #[test]
        fn fresh_session_accepts_only_opening_commands(command in session_command_strategy()) {
            let session = ClaimSession::start(ClaimFixtures::filed_at());
            let accepted = command.apply(&session, ClaimFixtures::filed_at()).is_ok();
            let opening = matches!(
                command,
                SessionCommand::CheckWeather { .. } | SessionCommand::OpenForm | SessionCommand::Tick { .. }
            );
            prop_assert_eq!(accepted, opening);
        }
    }
}
