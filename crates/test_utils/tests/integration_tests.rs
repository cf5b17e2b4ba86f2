//! Integration Tests for the Claim Workflow
//!
//! These tests verify end-to-end scenarios that run the workflow through
//! the HTTP adapters and client together, plus property checks over
//! random command sequences.

use domain_claims::{ClaimSession, DocumentType, Step, WeatherQuery};
use test_utils::*;

mod filing_over_http {
    use super::*;

    /// Files a claim from alert to submission over the scripted backend
    #[tokio::test]
    async fn test_full_claim_over_http() {
        let backend = ScriptedBackend::authenticated();
        backend.script_happy_path(7);
        let workflow = domain_claims::ClaimWorkflow::new(backend.ports(), Default::default());

        let session = workflow.check_weather(WeatherQuery::default()).await.unwrap();
        assert_eq!(session.weather().unwrap().alert_type(), Some("hailstorm"));

        let session = workflow.acknowledge_alert(true).await.unwrap();
        assert_step(&session, Step::ClaimForm);
        assert_eq!(session.form().loss_type, "hailstorm");

        workflow
            .update_form(ClaimFixtures::form("hailstorm", "3.25"))
            .await
            .unwrap();
        let session = workflow.create_claim().await.unwrap();
        assert_eq!(session.identity().unwrap().claim_number.as_str(), "PMFBY-2026-000007");
        assert_deadline_near(&session, 72.0);

        let session = workflow
            .upload_evidence(ClaimFixtures::photo("field.jpg"))
            .await
            .unwrap();
        assert_eq!(session.uploaded_count(), 1);

        let session = workflow.proceed_to_documents().await.unwrap();
        let documents = session.documents().unwrap();
        assert_reconciliation_consistent(documents);
        assert_missing(documents, &["land_record"]);

        let session = workflow
            .upload_missing_document(
                DocumentType::new("land_record"),
                ClaimFixtures::document("7-12.pdf"),
            )
            .await
            .unwrap();
        assert!(session.documents().unwrap().is_complete());

        workflow.proceed_to_review().await.unwrap();
        let session = workflow.submit(true).await.unwrap();
        assert_step(&session, Step::Submitted);
        assert!(session
            .submission()
            .unwrap()
            .claim_json
            .contains("under_assessment"));
        assert!(!workflow.is_clock_running());

        assert_eq!(
            backend.paths(),
            vec![
                "/claims/weather-check",
                "/claims/alerts/9/acknowledge",
                "/claims",
                "/claims/7/evidence",
                "/claims/7/documents/attach",
                "/documents/upload",
                "/claims/7/documents/attach",
                "/claims/7/submit",
            ]
        );
    }

    /// Requests without a stored session never reach the backend
    #[tokio::test]
    async fn test_anonymous_client_cannot_check_weather() {
        let backend = ScriptedBackend::anonymous();
        backend.script_happy_path(1);
        let workflow = domain_claims::ClaimWorkflow::new(backend.ports(), Default::default());

        let err = workflow
            .check_weather(WeatherQuery::default())
            .await
            .unwrap_err();
        assert!(err.is_session_expired());
        assert!(backend.paths().is_empty());
        assert_step(
            &workflow.session(),
            Step::WeatherCheck(domain_claims::WeatherStage::Pending),
        );
    }
}

mod filing_with_mock_ports {
    use super::*;

    #[tokio::test]
    async fn test_vault_already_complete() {
        let harness = WorkflowHarness::builder()
            .vault(
                ClaimFixtures::required_documents(),
                ClaimFixtures::required_documents(),
            )
            .build();
        let session = harness.drive_to(Step::DocumentAttachment).await.unwrap();
        assert!(session.documents().unwrap().is_complete());
        assert_eq!(harness.documents.reconcile_calls(), 1);
    }

    #[tokio::test]
    async fn test_back_and_forth_does_not_rescan() {
        let harness = WorkflowHarness::builder().build();
        harness.drive_to(Step::ReviewSubmit).await.unwrap();

        harness.workflow.back_to_documents().await.unwrap();
        let session = harness.workflow.proceed_to_review().await.unwrap();
        assert_step(&session, Step::ReviewSubmit);
        assert_eq!(harness.documents.reconcile_calls(), 1);
    }

    #[tokio::test]
    async fn test_declined_alert_closes_session() {
        let harness = WorkflowHarness::builder()
            .with_alert("A-3", "drought")
            .build();
        harness
            .workflow
            .check_weather(WeatherQuery::default())
            .await
            .unwrap();
        let session = harness.workflow.acknowledge_alert(false).await.unwrap();
        assert_step(&session, Step::Declined);
        assert!(harness.workflow.continue_to_form().await.is_err());
        assert_eq!(harness.claims.create_calls(), 0);
    }
}

mod session_properties {
    use super::*;
    use proptest::prelude::*;

    fn run(commands: &[SessionCommand]) -> Vec<ClaimSession> {
        let mut now = ClaimFixtures::filed_at();
        let mut session = ClaimSession::start(now);
        let mut history = vec![session.clone()];
        for command in commands {
            now += command.elapsed();
            if let Ok(next) = command.apply(&session, now) {
                session = next;
                history.push(session.clone());
            }
        }
        history
    }

    proptest! {
        #[test]
        fn identity_never_changes_once_assigned(commands in session_commands_strategy(40)) {
            let history = run(&commands);
            let first = history.iter().find_map(|s| s.identity().cloned());
            if let Some(first) = first {
                for session in history.iter().skip_while(|s| s.identity().is_none()) {
                    prop_assert_eq!(session.identity(), Some(&first));
                }
            }
        }

        #[test]
        fn deadline_only_counts_down(commands in session_commands_strategy(40)) {
            let history = run(&commands);
            let remaining: Vec<f64> = history
                .iter()
                .filter_map(|s| s.deadline().map(|d| d.remaining_hours()))
                .collect();
            for pair in remaining.windows(2) {
                prop_assert!(pair[1] <= pair[0]);
                prop_assert!(pair[1] >= 0.0);
            }
        }

        #[test]
        fn completeness_matches_missing(commands in session_commands_strategy(40)) {
            for session in run(&commands) {
                if let Some(documents) = session.documents() {
                    prop_assert_eq!(documents.is_complete(), documents.missing().is_empty());
                }
            }
        }

        #[test]
        fn terminal_steps_are_final(commands in session_commands_strategy(40)) {
            let history = run(&commands);
            if let Some(index) = history.iter().position(|s| s.is_terminal()) {
                let terminal = history[index].step();
                for session in &history[index..] {
                    prop_assert_eq!(session.step(), terminal);
                }
            }
        }

        #[test]
        fn documents_step_requires_a_photo(commands in session_commands_strategy(40)) {
            for session in run(&commands) {
                if matches!(session.step(), Step::DocumentAttachment | Step::ReviewSubmit | Step::Submitted) {
                    prop_assert!(session.uploaded_count() >= 1);
                }
            }
        }
    }
}
