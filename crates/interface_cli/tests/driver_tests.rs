//! Driver tests against a scripted backend

use serde_json::json;
use std::sync::Arc;

use domain_claims::{ClaimWorkflow, Step, WorkflowConfig};
use interface_cli::{Command, Driver, DriverError, Reply};
use test_utils::*;

fn driver(backend: &ScriptedBackend) -> Driver {
    let workflow = Arc::new(ClaimWorkflow::new(backend.ports(), WorkflowConfig::default()));
    Driver::new(backend.client.clone(), workflow)
}

async fn run(driver: &Driver, line: &str) -> Result<String, DriverError> {
    let command: Command = line.parse().expect("test command parses");
    match driver.execute(command).await? {
        Reply::Print(text) => Ok(text),
        Reply::Exit => Ok(String::from("<exit>")),
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_login_and_verify_store_tokens() {
        let backend = ScriptedBackend::anonymous();
        backend.reply("/auth/login", json!({"message": "OTP sent to +91******0000"}));
        backend.reply("/auth/verify", ResponseFixtures::verified(42));
        let driver = driver(&backend);

        let sent = run(&driver, "login +919800000000").await.unwrap();
        assert_eq!(sent, "OTP sent to +91******0000");

        let signed_in = run(&driver, "verify +919800000000 123456").await.unwrap();
        assert_eq!(signed_in, "Signed in as farmer 42");
        assert!(backend.client.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_forgets_session() {
        let backend = ScriptedBackend::authenticated();
        let driver = driver(&backend);

        run(&driver, "logout").await.unwrap();
        assert!(!backend.client.is_authenticated().await.unwrap());
        assert!(backend.paths().is_empty());
    }
}

mod claim_flow {
    use super::*;

    #[tokio::test]
    async fn test_full_session_from_commands() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("field.jpg");
        let record = dir.path().join("7-12.pdf");
        std::fs::write(&photo, [0xFF, 0xD8, 0xFF]).unwrap();
        std::fs::write(&record, b"%PDF-1.7").unwrap();

        let backend = ScriptedBackend::authenticated();
        backend.script_happy_path(5);
        let driver = driver(&backend);

        let out = run(&driver, "weather").await.unwrap();
        assert!(out.contains("Alert 9 (hailstorm"));
        assert!(out.contains("ack yes|no"));

        let out = run(&driver, "ack yes").await.unwrap();
        assert!(out.starts_with("Step 2 of 5"));

        run(&driver, "set survey 112/3").await.unwrap();
        run(&driver, "set area 1.5").await.unwrap();
        run(&driver, "set description hail flattened the crop").await.unwrap();
        let out = run(&driver, "create").await.unwrap();
        assert!(out.contains("Claim PMFBY-2026-000005 (id 5)"));
        assert!(out.contains("72h 00m left"));

        let out = run(&driver, &format!("photo {}", photo.display())).await.unwrap();
        assert!(out.contains("Photos: 1 uploaded"));

        let out = run(&driver, "documents").await.unwrap();
        assert!(out.contains("Missing documents: Land Record"));

        let out = run(&driver, &format!("upload land_record {}", record.display()))
            .await
            .unwrap();
        assert!(out.contains("Documents complete (2 attached)"));

        run(&driver, "review").await.unwrap();
        let err = run(&driver, "submit").await.unwrap_err();
        assert!(matches!(
            err,
            DriverError::Workflow(domain_claims::WorkflowError::ConfirmationRequired)
        ));

        let out = run(&driver, "submit yes").await.unwrap();
        assert!(out.starts_with("Claim submitted"));
        assert!(out.contains("under_assessment"));

        let created = backend
            .transport
            .requests()
            .into_iter()
            .find(|r| r.path == "/claims")
            .unwrap();
        let body = created.json().unwrap();
        assert_eq!(body["loss_type"], "hailstorm");
        assert_eq!(body["area_affected"], 1.5);
        assert_eq!(body["damage_description"], "hail flattened the crop");
    }

    #[tokio::test]
    async fn test_missing_photo_file_is_reported() {
        let backend = ScriptedBackend::authenticated();
        backend.script_happy_path(2);
        let driver = driver(&backend);

        run(&driver, "weather").await.unwrap();
        run(&driver, "ack yes").await.unwrap();
        run(&driver, "set survey 9").await.unwrap();
        run(&driver, "set area 2").await.unwrap();
        run(&driver, "set description lodged").await.unwrap();
        run(&driver, "create").await.unwrap();

        let err = run(&driver, "photo /nonexistent/field.jpg").await.unwrap_err();
        assert!(err.to_string().contains("cannot read"));
        assert_eq!(driver.workflow().session().step(), Step::EvidenceUpload);
    }

    #[tokio::test]
    async fn test_quit_abandons_session() {
        let backend = ScriptedBackend::authenticated();
        let driver = driver(&backend);

        assert_eq!(run(&driver, "quit").await.unwrap(), "<exit>");
        let err = run(&driver, "form").await.unwrap_err();
        assert!(matches!(
            err,
            DriverError::Workflow(domain_claims::WorkflowError::SessionClosed)
        ));
    }
}
