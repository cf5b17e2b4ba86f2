//! Executes parsed commands against the client and workflow

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use domain_claims::{Attachment, ClaimWorkflow, WorkflowError};
use infra_http::{ApiClient, ApiError};

use crate::commands::{Command, FormField, HELP};
use crate::render;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the terminal should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Exit,
}

/// Binds one workflow to the client that authenticates it
pub struct Driver {
    client: Arc<ApiClient>,
    workflow: Arc<ClaimWorkflow>,
}

impl Driver {
    pub fn new(client: Arc<ApiClient>, workflow: Arc<ClaimWorkflow>) -> Self {
        Self { client, workflow }
    }

    pub fn workflow(&self) -> &Arc<ClaimWorkflow> {
        &self.workflow
    }

    fn summary(&self) -> Reply {
        let session = self.workflow.session();
        let deadline = self.workflow.deadline_status();
        Reply::Print(render::session_summary(&session, deadline.as_ref()))
    }

    pub async fn execute(&self, command: Command) -> Result<Reply, DriverError> {
        debug!(?command, "Executing command");
        match command {
            Command::Login { phone } => {
                let message = self.client.login(&phone).await?;
                Ok(Reply::Print(message.unwrap_or_else(|| "OTP sent".to_string())))
            }
            Command::Verify { phone, otp } => {
                let session = self.client.verify(&phone, &otp).await?;
                let who = session
                    .farmer_id
                    .map(|id| format!(" as farmer {}", id))
                    .unwrap_or_default();
                Ok(Reply::Print(format!("Signed in{}", who)))
            }
            Command::Logout => {
                self.client.logout().await?;
                Ok(Reply::Print("Signed out".to_string()))
            }
            Command::Weather(query) => {
                self.workflow.check_weather(query).await?;
                Ok(self.summary())
            }
            Command::Acknowledge { has_damage } => {
                self.workflow.acknowledge_alert(has_damage).await?;
                Ok(self.summary())
            }
            Command::OpenForm => {
                self.workflow.continue_to_form().await?;
                Ok(self.summary())
            }
            Command::Set { field, value } => {
                let mut form = self.workflow.session().form().clone();
                match field {
                    FormField::LossType => form.loss_type = value,
                    FormField::SurveyNumber => form.survey_number = value,
                    FormField::Area => form.area_affected = value,
                    FormField::Description => form.description = value,
                }
                self.workflow.update_form(form).await?;
                Ok(self.summary())
            }
            Command::Create => {
                self.workflow.create_claim().await?;
                Ok(self.summary())
            }
            Command::Photo(path) => {
                let photo = Attachment::from_path(&path).await?;
                self.workflow.upload_evidence(photo).await?;
                Ok(self.summary())
            }
            Command::Documents => {
                self.workflow.proceed_to_documents().await?;
                Ok(self.summary())
            }
            Command::Rescan => {
                self.workflow.rescan_documents().await?;
                Ok(self.summary())
            }
            Command::Upload {
                document_type,
                path,
            } => {
                let file = Attachment::from_path(&path).await?;
                self.workflow
                    .upload_missing_document(document_type, file)
                    .await?;
                Ok(self.summary())
            }
            Command::Review => {
                self.workflow.proceed_to_review().await?;
                Ok(self.summary())
            }
            Command::Back => {
                self.workflow.back_to_documents().await?;
                Ok(self.summary())
            }
            Command::Submit { confirmed } => {
                self.workflow.submit(confirmed).await?;
                Ok(self.summary())
            }
            Command::Status => Ok(self.summary()),
            Command::Help => Ok(Reply::Print(HELP.to_string())),
            Command::Quit => {
                self.workflow.abandon().await;
                info!("Driver exiting");
                Ok(Reply::Exit)
            }
        }
    }
}
