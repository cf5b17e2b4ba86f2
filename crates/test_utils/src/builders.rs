//! Test Harness Builders
//!
//! Builders that wire a [`ClaimWorkflow`] to either in-memory ports or the
//! real HTTP adapters over a scripted transport. Tests state only what
//! matters to them and take defaults for everything else.

use std::sync::Arc;
use std::time::Duration;

use core_kernel::ManualTimeSource;
use domain_claims::{
    ClaimSession, ClaimWorkflow, ClaimsAdapter, DeadlineMode, DocumentType, DocumentsAdapter,
    MockClaimsPort, MockDocumentsPort, MockWeatherPort, Step, WeatherAdapter, WeatherQuery,
    WorkflowConfig, WorkflowError, WorkflowPorts,
};
use infra_http::mock::{MockReply, MockTransport};
use infra_http::{ApiClient, ClientConfig, HttpMethod, MemoryTokenStore, TokenPair};

use crate::fixtures::{ClaimFixtures, ResponseFixtures};

/// Base URL used by scripted backends
pub const MOCK_BASE_URL: &str = "http://mock.local";

/// A workflow over in-memory ports, with handles to inspect them
pub struct WorkflowHarness {
    pub workflow: Arc<ClaimWorkflow>,
    pub weather: Arc<MockWeatherPort>,
    pub claims: Arc<MockClaimsPort>,
    pub documents: Arc<MockDocumentsPort>,
    pub time: ManualTimeSource,
    has_alert: bool,
}

impl WorkflowHarness {
    pub fn builder() -> WorkflowHarnessBuilder {
        WorkflowHarnessBuilder::new()
    }

    /// Runs the happy path until the session reaches `target`
    ///
    /// Supported targets are the five visible steps and `Submitted`.
    pub async fn drive_to(&self, target: Step) -> Result<ClaimSession, WorkflowError> {
        let target_rank = rank(target);
        let mut session = self.workflow.session();

        while rank(session.step()) < target_rank {
            session = match session.step() {
                Step::WeatherCheck(_) if self.has_alert => {
                    if session.weather().is_none() {
                        self.workflow.check_weather(WeatherQuery::default()).await?
                    } else {
                        self.workflow.acknowledge_alert(true).await?
                    }
                }
                Step::WeatherCheck(_) => self.workflow.continue_to_form().await?,
                Step::ClaimForm => {
                    let loss_type = session.form().loss_type.clone();
                    let loss_type = if loss_type.is_empty() {
                        "unseasonal_rain".to_string()
                    } else {
                        loss_type
                    };
                    self.workflow
                        .update_form(ClaimFixtures::form(&loss_type, "2.5"))
                        .await?;
                    self.workflow.create_claim().await?
                }
                Step::EvidenceUpload => {
                    if session.uploaded_count() == 0 {
                        self.workflow
                            .upload_evidence(ClaimFixtures::photo("field_01.jpg"))
                            .await?
                    } else {
                        self.workflow.proceed_to_documents().await?
                    }
                }
                Step::DocumentAttachment => self.workflow.proceed_to_review().await?,
                Step::ReviewSubmit => self.workflow.submit(true).await?,
                Step::Submitted | Step::Declined => return Ok(session),
            };
        }
        Ok(session)
    }
}

fn rank(step: Step) -> u8 {
    match step {
        Step::Submitted => 6,
        Step::Declined => 0,
        other => other.position().unwrap_or(0),
    }
}

/// Builder for [`WorkflowHarness`]
pub struct WorkflowHarnessBuilder {
    alert: Option<(String, String)>,
    hours_remaining: f64,
    required: Vec<DocumentType>,
    stored: Vec<DocumentType>,
    config: WorkflowConfig,
}

impl Default for WorkflowHarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowHarnessBuilder {
    /// Clear weather, a 72 hour window, and a vault holding only Aadhaar
    pub fn new() -> Self {
        Self {
            alert: None,
            hours_remaining: 72.0,
            required: ClaimFixtures::required_documents(),
            stored: vec![DocumentType::new("aadhaar")],
            config: WorkflowConfig::default(),
        }
    }

    pub fn with_alert(mut self, alert_id: &str, alert_type: &str) -> Self {
        self.alert = Some((alert_id.to_string(), alert_type.to_string()));
        self
    }

    pub fn hours_remaining(mut self, hours: f64) -> Self {
        self.hours_remaining = hours;
        self
    }

    pub fn vault(mut self, required: Vec<DocumentType>, stored: Vec<DocumentType>) -> Self {
        self.required = required;
        self.stored = stored;
        self
    }

    pub fn deadline_mode(mut self, mode: DeadlineMode) -> Self {
        self.config = self.config.with_deadline_mode(mode);
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_tick_interval(interval);
        self
    }

    pub fn build(self) -> WorkflowHarness {
        let has_alert = self.alert.is_some();
        let weather = Arc::new(match &self.alert {
            Some((id, kind)) => MockWeatherPort::with_alert("Niphad", id, kind),
            None => MockWeatherPort::clear("Niphad"),
        });
        let claims = Arc::new(MockClaimsPort::new(self.hours_remaining));
        let documents = Arc::new(MockDocumentsPort::new(self.required, self.stored));
        let time = ManualTimeSource::new(ClaimFixtures::filed_at());

        let ports = WorkflowPorts {
            weather: weather.clone(),
            claims: claims.clone(),
            documents: documents.clone(),
        };
        let workflow = Arc::new(ClaimWorkflow::with_time_source(
            ports,
            self.config,
            Arc::new(time.clone()),
        ));

        WorkflowHarness {
            workflow,
            weather,
            claims,
            documents,
            time,
            has_alert,
        }
    }
}

/// An `ApiClient` over a scripted transport
pub struct ScriptedBackend {
    pub client: Arc<ApiClient>,
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryTokenStore>,
}

impl ScriptedBackend {
    /// A backend whose client already holds a token pair
    pub fn authenticated() -> Self {
        Self::with_store(MemoryTokenStore::with_tokens(&TokenPair::new(
            "access-1",
            "refresh-1",
        )))
    }

    /// A backend whose client has never logged in
    pub fn anonymous() -> Self {
        Self::with_store(MemoryTokenStore::new())
    }

    fn with_store(store: MemoryTokenStore) -> Self {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(store);
        let config = ClientConfig::new(MOCK_BASE_URL).retry_backoff_ms(100);
        let client = Arc::new(ApiClient::new(config, transport.clone(), store.clone()));
        Self {
            client,
            transport,
            store,
        }
    }

    /// HTTP adapters over this backend's client
    pub fn ports(&self) -> WorkflowPorts {
        WorkflowPorts {
            weather: Arc::new(WeatherAdapter::new(self.client.clone())),
            claims: Arc::new(ClaimsAdapter::new(self.client.clone())),
            documents: Arc::new(DocumentsAdapter::new(self.client.clone())),
        }
    }

    pub fn reply(&self, path: &str, body: serde_json::Value) {
        self.transport
            .enqueue(HttpMethod::Post, path, MockReply::ok(body));
    }

    /// Scripts a full claim with a hailstorm alert, one photo, and one
    /// missing document uploaded before submission
    pub fn script_happy_path(&self, claim_id: u64) {
        let claim_path = format!("/claims/{}", claim_id);
        self.reply("/claims/weather-check", ResponseFixtures::weather_alert(9, "hailstorm"));
        self.reply("/claims/alerts/9/acknowledge", ResponseFixtures::acknowledged());
        self.reply("/claims", ResponseFixtures::claim_created(claim_id, 72.0));
        self.reply(&format!("{}/evidence", claim_path), ResponseFixtures::evidence_stored(1));
        self.reply(
            &format!("{}/documents/attach", claim_path),
            ResponseFixtures::documents(&["aadhaar"], &["land_record"]),
        );
        self.reply("/documents/upload", ResponseFixtures::acknowledged());
        self.reply(
            &format!("{}/documents/attach", claim_path),
            ResponseFixtures::documents(&["aadhaar", "land_record"], &[]),
        );
        self.reply(
            &format!("{}/submit", claim_path),
            ResponseFixtures::submitted(&format!("PMFBY-2026-{:06}", claim_id)),
        );
    }

    /// Paths requested so far, in order
    pub fn paths(&self) -> Vec<String> {
        self.transport
            .requests()
            .into_iter()
            .map(|request| request.path)
            .collect()
    }
}
