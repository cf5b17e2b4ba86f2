//! Claim workflow orchestration
//!
//! [`ClaimWorkflow`] owns one [`ClaimSession`], the service ports and the
//! deadline clock. Each command:
//!
//! 1. checks the transition against the live session,
//! 2. awaits the backend call (no lock held, so the clock keeps ticking),
//! 3. applies the transition to the live session and publishes the result.
//!
//! Steps 2 and 3 run on a spawned task. Dropping the command future only
//! drops the reply; a request already sent still completes and lands in
//! the session.
//!
//! Commands are serialised; a second command waits for the first to
//! finish, including one whose caller went away. A failed command leaves the session as it was, except for the
//! two cases documented on [`ClaimWorkflow::upload_evidence`] and
//! [`ClaimWorkflow::proceed_to_documents`].

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{watch, OwnedMutexGuard};
use tracing::{info, warn};

use core_kernel::{SystemTimeSource, TimeSource};

use crate::config::WorkflowConfig;
use crate::deadline::{DeadlineClock, DeadlineStatus};
use crate::documents::DocumentType;
use crate::error::WorkflowError;
use crate::events::ClaimEvent;
use crate::evidence::{Attachment, EvidenceItem};
use crate::form::FormFields;
use crate::ports::{ClaimsPort, DocumentsPort, WeatherPort};
use crate::session::ClaimSession;
use crate::weather::WeatherQuery;


/// The three backend capabilities a workflow needs
#[derive(Clone)]
pub struct WorkflowPorts {
    pub weather: Arc<dyn WeatherPort>,
    pub claims: Arc<dyn ClaimsPort>,
    pub documents: Arc<dyn DocumentsPort>,
}

/// Session state shared with the clock task
struct Shared {
    session: Mutex<ClaimSession>,
    published: watch::Sender<ClaimSession>,
    deadline: watch::Sender<Option<DeadlineStatus>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClaimSession> {
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn read<R>(
        &self,
        f: impl FnOnce(&ClaimSession) -> Result<R, WorkflowError>,
    ) -> Result<R, WorkflowError> {
        f(&self.lock())
    }

    /// Runs a transition against the live session and publishes the result
    fn apply(
        &self,
        f: impl FnOnce(&ClaimSession) -> Result<ClaimSession, WorkflowError>,
    ) -> Result<ClaimSession, WorkflowError> {
        let mut guard = self.lock();
        let next = f(&guard)?;
        for event in next.pending_events().iter().skip(guard.pending_events().len()) {
            info!(event = event.name(), step = next.step().name(), "Claim event");
        }
        *guard = next.clone();
        drop(guard);
        self.published.send_replace(next.clone());
        Ok(next)
    }
}

/// Drives one claim attempt through its steps
pub struct ClaimWorkflow {
    inner: Arc<Inner>,
}

struct Inner {
    shared: Arc<Shared>,
    ports: WorkflowPorts,
    config: WorkflowConfig,
    time: Arc<dyn TimeSource>,
    commands: Arc<tokio::sync::Mutex<()>>,
    clock: Mutex<Option<DeadlineClock>>,
    abandoned: AtomicBool,
}

impl ClaimWorkflow {
    pub fn new(ports: WorkflowPorts, config: WorkflowConfig) -> Self {
        Self::with_time_source(ports, config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(
        ports: WorkflowPorts,
        config: WorkflowConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let session = ClaimSession::start(time.now());
        let (published, _) = watch::channel(session.clone());
        let (deadline, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                shared: Arc::new(Shared {
                    session: Mutex::new(session),
                    published,
                    deadline,
                }),
                ports,
                config,
                time,
                commands: Arc::new(tokio::sync::Mutex::new(())),
                clock: Mutex::new(None),
                abandoned: AtomicBool::new(false),
            }),
        }
    }

    /// Receives every published session
    pub fn subscribe(&self) -> watch::Receiver<ClaimSession> {
        self.inner.shared.published.subscribe()
    }

    /// Receives every deadline tick; None until a claim exists
    pub fn deadline_updates(&self) -> watch::Receiver<Option<DeadlineStatus>> {
        self.inner.shared.deadline.subscribe()
    }

    /// Snapshot of the current session
    pub fn session(&self) -> ClaimSession {
        self.inner.shared.lock().clone()
    }

    pub fn deadline_status(&self) -> Option<DeadlineStatus> {
        self.inner
            .shared
            .lock()
            .deadline()
            .map(|d| d.status(self.inner.config.urgent_threshold_hours))
    }

    /// Drains audit events recorded since the last call
    pub fn take_events(&self) -> Vec<ClaimEvent> {
        self.inner.shared.lock().take_events()
    }

    pub fn is_clock_running(&self) -> bool {
        self.inner
            .clock
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(DeadlineClock::is_running)
    }

    async fn begin(&self) -> Result<OwnedMutexGuard<()>, WorkflowError> {
        let guard = Arc::clone(&self.inner.commands).lock_owned().await;
        if self.inner.abandoned.load(Ordering::SeqCst) {
            return Err(WorkflowError::SessionClosed);
        }
        Ok(guard)
    }

    /// Runs a command that talks to the backend on its own task
    ///
    /// The task owns the command slot, so the next command still waits for
    /// it when this caller stops listening.
    async fn run<F, Fut>(&self, command: F) -> Result<ClaimSession, WorkflowError>
    where
        F: FnOnce(Arc<Inner>) -> Fut,
        Fut: Future<Output = Result<ClaimSession, WorkflowError>> + Send + 'static,
    {
        let slot = self.begin().await?;
        let work = command(Arc::clone(&self.inner));
        let task = tokio::spawn(async move {
            let _slot = slot;
            work.await
        });
        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(WorkflowError::SessionClosed),
        }
    }

    // Weather check

    pub async fn check_weather(&self, query: WeatherQuery) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move {
            inner.shared.read(|s| s.weather_check_allowed())?;

            let snapshot = inner.ports.weather.check_current_conditions(&query).await?;
            let now = inner.time.now();
            inner.shared.apply(|s| s.with_weather(snapshot, now))
        })
        .await
    }

    /// Answers the weather alert; no damage ends the session
    pub async fn acknowledge_alert(&self, has_damage: bool) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move {
            let alert_id = inner
                .shared
                .read(|s| s.alert_to_acknowledge().map(|a| a.alert_id.clone()))?;

            inner
                .ports
                .weather
                .acknowledge_alert(&alert_id, has_damage)
                .await?;
            let now = inner.time.now();
            let session = inner
                .shared
                .apply(|s| s.with_acknowledgment(has_damage, now))?;
            if session.is_terminal() {
                info!(alert_id = %alert_id, "No damage reported, session closed");
            }
            Ok(session)
        })
        .await
    }

    /// Opens the form: weather clear, or filing manually past an alert
    pub async fn continue_to_form(&self) -> Result<ClaimSession, WorkflowError> {
        let _command = self.begin().await?;
        let now = self.inner.time.now();
        self.inner.shared.apply(|s| s.open_form(now))
    }

    // Claim form

    pub async fn update_form(&self, fields: FormFields) -> Result<ClaimSession, WorkflowError> {
        let _command = self.begin().await?;
        self.inner.shared.apply(|s| s.with_form(fields))
    }

    /// Creates the claim and starts the deadline clock
    pub async fn create_claim(&self) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move {
            let request = inner.shared.read(|s| s.claim_request_for_creation())?;

            let created = inner.ports.claims.create(&request).await?;
            let now = inner.time.now();
            let session = inner.shared.apply(|s| {
                s.with_claim_created(request, created.identity.clone(), created.hours_remaining, now)
            })?;

            if let Some(deadline) = session.deadline() {
                inner
                    .shared
                    .deadline
                    .send_replace(Some(deadline.status(inner.config.urgent_threshold_hours)));
            }
            inner.start_clock();
            info!(
                claim_id = %created.identity.claim_id,
                claim_number = %created.identity.claim_number,
                hours_remaining = created.hours_remaining,
                "Claim created"
            );
            Ok(session)
        })
        .await
    }

    // Evidence

    /// Adds a photo to the evidence list and uploads it
    ///
    /// The photo is listed before the upload starts. If the upload fails it
    /// stays listed as not uploaded and the confirmed count is unchanged;
    /// uploading the same file again retries that entry.
    pub async fn upload_evidence(&self, photo: Attachment) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move {
            let claim_id = inner.shared.read(|s| s.evidence_target().cloned())?;

            let evidence_id =
                match inner.shared.read(|s| Ok(s.pending_evidence(&photo.local_ref)))? {
                    Some(existing) => existing,
                    None => {
                        let now = inner.time.now();
                        let item = EvidenceItem::pending(photo.local_ref.clone(), now);
                        let id = item.id;
                        inner.shared.apply(|s| s.with_evidence_selected(item, now))?;
                        id
                    }
                };

            let receipt = match inner.ports.claims.upload_evidence(&claim_id, &photo).await {
                Ok(receipt) => receipt,
                Err(err) => {
                    warn!(claim_id = %claim_id, evidence_id = %evidence_id, error = %err, "Evidence upload failed");
                    return Err(err.into());
                }
            };
            let now = inner.time.now();
            inner
                .shared
                .apply(|s| s.with_evidence_uploaded(evidence_id, receipt.total_photos, now))
        })
        .await
    }

    // Documents

    /// Moves to the document step
    ///
    /// On first entry this also reconciles the vault once. If that
    /// reconciliation fails the step change stands and the error is
    /// returned; [`rescan_documents`](Self::rescan_documents) retries it.
    pub async fn proceed_to_documents(&self) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move {
            let mut fire = false;
            let session = inner.shared.apply(|s| {
                let (next, first_entry) = s.enter_documents()?;
                fire = first_entry;
                Ok(next)
            })?;
            if !fire {
                return Ok(session);
            }
            inner.reconcile().await
        })
        .await
    }

    /// Re-runs reconciliation on demand
    pub async fn rescan_documents(&self) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move { inner.reconcile().await }).await
    }

    /// Uploads a missing document to the vault, then reconciles again
    pub async fn upload_missing_document(
        &self,
        document_type: DocumentType,
        file: Attachment,
    ) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move {
            inner
                .shared
                .read(|s| s.document_upload_allowed(&document_type))?;

            inner
                .ports
                .documents
                .upload_single(&document_type, &file)
                .await?;
            let now = inner.time.now();
            inner
                .shared
                .apply(|s| s.with_document_uploaded(document_type.clone(), now))?;
            inner.reconcile().await
        })
        .await
    }

    pub async fn proceed_to_review(&self) -> Result<ClaimSession, WorkflowError> {
        let _command = self.begin().await?;
        self.inner.shared.apply(|s| s.to_review())
    }

    pub async fn back_to_documents(&self) -> Result<ClaimSession, WorkflowError> {
        let _command = self.begin().await?;
        self.inner.shared.apply(|s| s.back_to_documents())
    }

    // Submission

    /// Submits the claim once the farmer confirmed
    pub async fn submit(&self, confirmed: bool) -> Result<ClaimSession, WorkflowError> {
        self.run(move |inner| async move {
            let identity = inner
                .shared
                .read(|s| s.submission_target(confirmed).cloned())?;

            let claim_json = inner.ports.claims.submit(&identity.claim_id).await?;
            let now = inner.time.now();
            let session = inner.shared.apply(|s| s.with_submission(claim_json, now))?;
            inner.stop_clock();
            info!(claim_number = %identity.claim_number, "Claim submitted");
            Ok(session)
        })
        .await
    }

    /// Discards the session; later commands fail with `SessionClosed`
    ///
    /// Waits for an in-flight command to finish first.
    pub async fn abandon(&self) {
        let _command = self.inner.commands.lock().await;
        if !self.inner.abandoned.swap(true, Ordering::SeqCst) {
            self.inner.stop_clock();
            info!(step = self.session().step().name(), "Claim session abandoned");
        }
    }
}

impl Inner {
    async fn reconcile(&self) -> Result<ClaimSession, WorkflowError> {
        let claim_id = self.shared.read(|s| s.reconcile_target().cloned())?;
        let reconciliation = self.ports.documents.reconcile(&claim_id).await?;
        let now = self.time.now();
        self.shared
            .apply(|s| s.with_reconciliation(reconciliation, now))
    }

    // Deadline clock

    fn start_clock(&self) {
        let shared = Arc::clone(&self.shared);
        let mode = self.config.deadline_mode;
        let threshold = self.config.urgent_threshold_hours;

        let clock = DeadlineClock::spawn(
            self.config.tick_interval(),
            Arc::clone(&self.time),
            move |now| {
                let (status, snapshot) = {
                    let mut session = shared.lock();
                    match session.tick_deadline(mode, now, threshold) {
                        Some(status) => (status, session.clone()),
                        None => return ControlFlow::Break(()),
                    }
                };
                shared.deadline.send_replace(Some(status));
                shared.published.send_replace(snapshot);
                if status.expired {
                    warn!("Claim filing deadline has passed");
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        *self.clock.lock().unwrap_or_else(|p| p.into_inner()) = Some(clock);
    }

    fn stop_clock(&self) {
        if let Some(clock) = self.clock.lock().unwrap_or_else(|p| p.into_inner()).take() {
            clock.stop();
        }
    }
}
