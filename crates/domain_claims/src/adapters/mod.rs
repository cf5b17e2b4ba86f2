//! HTTP adapters for the claim workflow ports
//!
//! Each adapter is a thin typed wrapper over the shared
//! [`ApiClient`](infra_http::ApiClient): one request per operation, with
//! authentication, retries and timeouts left to the client. Adapters only
//! translate between the backend's JSON and the domain types.
//!
//! ```rust,ignore
//! let client = Arc::new(ApiClient::new(config, transport, store));
//! let ports = WorkflowPorts {
//!     weather: Arc::new(WeatherAdapter::new(client.clone())),
//!     claims: Arc::new(ClaimsAdapter::new(client.clone())),
//!     documents: Arc::new(DocumentsAdapter::new(client)),
//! };
//! ```

pub mod claims;
pub mod documents;
pub mod weather;

pub use claims::ClaimsAdapter;
pub use documents::DocumentsAdapter;
pub use weather::WeatherAdapter;
