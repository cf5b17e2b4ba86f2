//! Ports to the backend services the workflow depends on
//!
//! The workflow only sees these traits. [`crate::adapters`] implements
//! them over the shared `ApiClient`; tests substitute in-memory versions.

use async_trait::async_trait;

use core_kernel::{AlertId, ClaimId, DomainPort};
use infra_http::ApiError;

use crate::documents::{DocumentReconciliation, DocumentType};
use crate::evidence::Attachment;
use crate::form::NewClaimRequest;
use crate::session::ClaimIdentity;
use crate::weather::{WeatherQuery, WeatherSnapshot};

/// Reply to a successful claim creation
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimCreated {
    pub identity: ClaimIdentity,
    /// Server-computed hours left to file; seeds the deadline
    pub hours_remaining: f64,
}

/// Reply to a successful evidence upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceReceipt {
    /// Photos now stored for the claim, including this one
    pub total_photos: u32,
}

#[async_trait]
pub trait WeatherPort: DomainPort {
    async fn check_current_conditions(
        &self,
        query: &WeatherQuery,
    ) -> Result<WeatherSnapshot, ApiError>;

    async fn acknowledge_alert(&self, alert_id: &AlertId, has_damage: bool)
        -> Result<(), ApiError>;
}

#[async_trait]
pub trait ClaimsPort: DomainPort {
    async fn create(&self, request: &NewClaimRequest) -> Result<ClaimCreated, ApiError>;

    async fn upload_evidence(
        &self,
        claim_id: &ClaimId,
        photo: &Attachment,
    ) -> Result<EvidenceReceipt, ApiError>;

    /// Submits the claim; returns the assessment payload verbatim
    async fn submit(&self, claim_id: &ClaimId) -> Result<String, ApiError>;
}

#[async_trait]
pub trait DocumentsPort: DomainPort {
    /// Attaches matching vault documents and reports what is still missing
    async fn reconcile(&self, claim_id: &ClaimId) -> Result<DocumentReconciliation, ApiError>;

    /// Uploads one document into the farmer's vault
    async fn upload_single(
        &self,
        document_type: &DocumentType,
        file: &Attachment,
    ) -> Result<(), ApiError>;
}

/// In-memory ports for tests
///
/// Each mock answers from simple in-memory state unless a failure was
/// queued for the next call. Failed calls leave the state untouched.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{BTreeSet, HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use core_kernel::ClaimNumber;

    use crate::weather::{WeatherAlert, WeatherConditions};

    #[derive(Debug, Default)]
    struct Script {
        failures: Mutex<VecDeque<ApiError>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn fail_next(&self, err: ApiError) {
            self.failures
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push_back(err);
        }

        fn begin(&self) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self
                .failures
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .pop_front()
            {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// Weather service answering with a fixed snapshot
    #[derive(Debug)]
    pub struct MockWeatherPort {
        snapshot: WeatherSnapshot,
        checks: Script,
        acks: Script,
        acknowledged: Mutex<Vec<(AlertId, bool)>>,
    }

    impl MockWeatherPort {
        pub fn new(snapshot: WeatherSnapshot) -> Self {
            Self {
                snapshot,
                checks: Script::default(),
                acks: Script::default(),
                acknowledged: Mutex::new(Vec::new()),
            }
        }

        /// No alert at `location`
        pub fn clear(location: &str) -> Self {
            Self::new(WeatherSnapshot {
                location: location.to_string(),
                conditions: WeatherConditions::default(),
                alert: None,
                checked_at: Utc::now(),
            })
        }

        /// An alert of `alert_type` at `location`
        pub fn with_alert(location: &str, alert_id: &str, alert_type: &str) -> Self {
            let mut port = Self::clear(location);
            port.snapshot.alert = AlertId::new(alert_id).ok().map(|alert_id| WeatherAlert {
                alert_id,
                alert_type: alert_type.to_string(),
                severity: "high".to_string(),
                message: None,
            });
            port
        }

        pub fn fail_next_check(&self, err: ApiError) {
            self.checks.fail_next(err);
        }

        pub fn fail_next_acknowledgment(&self, err: ApiError) {
            self.acks.fail_next(err);
        }

        pub fn check_calls(&self) -> usize {
            self.checks.calls()
        }

        pub fn acknowledgments(&self) -> Vec<(AlertId, bool)> {
            self.acknowledged
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .clone()
        }
    }

    impl DomainPort for MockWeatherPort {}

    #[async_trait]
    impl WeatherPort for MockWeatherPort {
        async fn check_current_conditions(
            &self,
            _query: &WeatherQuery,
        ) -> Result<WeatherSnapshot, ApiError> {
            self.checks.begin()?;
            Ok(self.snapshot.clone())
        }

        async fn acknowledge_alert(
            &self,
            alert_id: &AlertId,
            has_damage: bool,
        ) -> Result<(), ApiError> {
            self.acks.begin()?;
            self.acknowledged
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push((alert_id.clone(), has_damage));
            Ok(())
        }
    }

    /// Claims service numbering claims sequentially
    #[derive(Debug)]
    pub struct MockClaimsPort {
        hours_remaining: f64,
        latency: Mutex<Duration>,
        created: Mutex<Vec<NewClaimRequest>>,
        photos: Mutex<HashMap<ClaimId, u32>>,
        submitted: Mutex<Vec<ClaimId>>,
        creates: Script,
        uploads: Script,
        submits: Script,
    }

    impl Default for MockClaimsPort {
        fn default() -> Self {
            Self::new(crate::deadline::DEFAULT_DEADLINE_HOURS)
        }
    }

    impl MockClaimsPort {
        pub fn new(hours_remaining: f64) -> Self {
            Self {
                hours_remaining,
                latency: Mutex::new(Duration::ZERO),
                created: Mutex::new(Vec::new()),
                photos: Mutex::new(HashMap::new()),
                submitted: Mutex::new(Vec::new()),
                creates: Script::default(),
                uploads: Script::default(),
                submits: Script::default(),
            }
        }

        /// Delays every call by `latency`
        pub fn set_latency(&self, latency: Duration) {
            *self.latency.lock().unwrap_or_else(|p| p.into_inner()) = latency;
        }

        pub fn fail_next_create(&self, err: ApiError) {
            self.creates.fail_next(err);
        }

        pub fn fail_next_upload(&self, err: ApiError) {
            self.uploads.fail_next(err);
        }

        pub fn fail_next_submit(&self, err: ApiError) {
            self.submits.fail_next(err);
        }

        pub fn create_calls(&self) -> usize {
            self.creates.calls()
        }

        pub fn upload_calls(&self) -> usize {
            self.uploads.calls()
        }

        pub fn submit_calls(&self) -> usize {
            self.submits.calls()
        }

        pub fn created(&self) -> Vec<NewClaimRequest> {
            self.created.lock().unwrap_or_else(|p| p.into_inner()).clone()
        }

        pub fn submitted(&self) -> Vec<ClaimId> {
            self.submitted.lock().unwrap_or_else(|p| p.into_inner()).clone()
        }

        async fn wait(&self) {
            let latency = *self.latency.lock().unwrap_or_else(|p| p.into_inner());
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
        }
    }

    impl DomainPort for MockClaimsPort {}

    #[async_trait]
    impl ClaimsPort for MockClaimsPort {
        async fn create(&self, request: &NewClaimRequest) -> Result<ClaimCreated, ApiError> {
            self.wait().await;
            self.creates.begin()?;
            let mut created = self.created.lock().unwrap_or_else(|p| p.into_inner());
            created.push(request.clone());
            let sequence = created.len();
            let identity = ClaimIdentity {
                claim_id: ClaimId::new(sequence.to_string())
                    .map_err(|e| ApiError::invalid_response(e.to_string()))?,
                claim_number: ClaimNumber::new(format!("CLM-{:05}", sequence))
                    .map_err(|e| ApiError::invalid_response(e.to_string()))?,
            };
            Ok(ClaimCreated {
                identity,
                hours_remaining: self.hours_remaining,
            })
        }

        async fn upload_evidence(
            &self,
            claim_id: &ClaimId,
            _photo: &Attachment,
        ) -> Result<EvidenceReceipt, ApiError> {
            self.wait().await;
            self.uploads.begin()?;
            let mut photos = self.photos.lock().unwrap_or_else(|p| p.into_inner());
            let total = photos.entry(claim_id.clone()).or_insert(0);
            *total += 1;
            Ok(EvidenceReceipt {
                total_photos: *total,
            })
        }

        async fn submit(&self, claim_id: &ClaimId) -> Result<String, ApiError> {
            self.wait().await;
            self.submits.begin()?;
            self.submitted
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(claim_id.clone());
            Ok(format!(
                r#"{{"claim_id":"{}","status":"submitted"}}"#,
                claim_id
            ))
        }
    }

    /// Document vault holding a set of uploaded document types
    #[derive(Debug)]
    pub struct MockDocumentsPort {
        required: BTreeSet<DocumentType>,
        vault: Mutex<BTreeSet<DocumentType>>,
        reconciles: Script,
        uploads: Script,
    }

    impl MockDocumentsPort {
        /// A vault that already holds `stored`; claims need `required`
        pub fn new(
            required: impl IntoIterator<Item = DocumentType>,
            stored: impl IntoIterator<Item = DocumentType>,
        ) -> Self {
            Self {
                required: required.into_iter().collect(),
                vault: Mutex::new(stored.into_iter().collect()),
                reconciles: Script::default(),
                uploads: Script::default(),
            }
        }

        pub fn fail_next_reconcile(&self, err: ApiError) {
            self.reconciles.fail_next(err);
        }

        pub fn fail_next_upload(&self, err: ApiError) {
            self.uploads.fail_next(err);
        }

        pub fn reconcile_calls(&self) -> usize {
            self.reconciles.calls()
        }

        pub fn upload_calls(&self) -> usize {
            self.uploads.calls()
        }
    }

    impl DomainPort for MockDocumentsPort {}

    #[async_trait]
    impl DocumentsPort for MockDocumentsPort {
        async fn reconcile(
            &self,
            _claim_id: &ClaimId,
        ) -> Result<DocumentReconciliation, ApiError> {
            self.reconciles.begin()?;
            let vault = self.vault.lock().unwrap_or_else(|p| p.into_inner());
            let attached = self.required.intersection(&vault).cloned().collect::<Vec<_>>();
            let missing = self.required.difference(&vault).cloned().collect::<Vec<_>>();
            Ok(DocumentReconciliation::new(attached, missing, Utc::now()))
        }

        async fn upload_single(
            &self,
            document_type: &DocumentType,
            _file: &Attachment,
        ) -> Result<(), ApiError> {
            self.uploads.begin()?;
            self.vault
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .insert(document_type.clone());
            Ok(())
        }
    }
}
