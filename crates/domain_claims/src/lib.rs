//! Crop-Loss Claim Workflow
//!
//! This crate drives a farmer's crop-insurance claim from the weather check
//! through evidence, documents and submission.
//!
//! # Claim Flow
//!
//! ```text
//! Weather Check -> Claim Form -> Evidence Upload -> Document Attachment -> Review & Submit
//! ```
//!
//! - [`session`]: the [`ClaimSession`] aggregate and its step transitions
//! - [`workflow`]: [`ClaimWorkflow`], which runs commands against the backend
//! - [`deadline`]: the filing countdown and its background clock
//! - [`ports`] / [`adapters`]: backend capabilities and their HTTP adapters

pub mod adapters;
pub mod config;
pub mod deadline;
pub mod documents;
pub mod error;
pub mod events;
pub mod evidence;
pub mod form;
pub mod ports;
pub mod session;
pub mod weather;
pub mod workflow;

pub use adapters::{ClaimsAdapter, DocumentsAdapter, WeatherAdapter};
pub use config::WorkflowConfig;
pub use deadline::{Deadline, DeadlineClock, DeadlineMode, DeadlineStatus};
pub use documents::{DocumentReconciliation, DocumentType};
pub use error::WorkflowError;
pub use events::ClaimEvent;
pub use evidence::{Attachment, EvidenceItem};
pub use form::{FormFields, NewClaimRequest};
pub use ports::{ClaimCreated, ClaimsPort, DocumentsPort, EvidenceReceipt, WeatherPort};
pub use session::{ClaimIdentity, ClaimSession, Step, Submission, WeatherStage};
pub use weather::{WeatherAlert, WeatherConditions, WeatherQuery, WeatherSnapshot};
pub use workflow::{ClaimWorkflow, WorkflowPorts};

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockClaimsPort, MockDocumentsPort, MockWeatherPort};
