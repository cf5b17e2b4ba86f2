//! Infrastructure HTTP Layer
//!
//! This crate owns the authenticated channel to the claims backend. Callers
//! issue `request(method, path, body)` and receive decoded JSON or an
//! [`ApiError`]; token lifecycle and transient-failure recovery stay hidden.
//!
//! # Resilience
//!
//! - **Token refresh**: a 401 triggers exactly one refresh and one replay.
//!   Concurrent 401s share a single in-flight refresh.
//! - **Bounded retry**: 502/503/504 are retried, three attempts in total.
//! - **Timeouts**: every attempt is bounded; a timeout is a connection
//!   failure, never a session expiry.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_http::{ApiClient, ClientConfig, FileTokenStore, HttpMethod, ReqwestTransport};
//!
//! let config = ClientConfig::new("https://api.example.org");
//! let transport = ReqwestTransport::new(&config)?;
//! let store = FileTokenStore::new("/data/credentials.json");
//! let client = ApiClient::new(config, Arc::new(transport), Arc::new(store));
//!
//! client.verify("+919800000000", "123456").await?;
//! let conditions = client.request(HttpMethod::Post, "/claims/weather-check", None).await?;
//! ```

pub mod config;
pub mod error;
pub mod retry;
pub mod envelope;
pub mod token;
pub mod transport;
pub mod client;
pub mod auth;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use config::ClientConfig;
pub use error::{ApiError, TransportError, TokenStoreError};
pub use retry::RetryPolicy;
pub use token::{TokenPair, TokenStore, MemoryTokenStore, FileTokenStore};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, FilePart, ReqwestTransport,
};
pub use client::ApiClient;
pub use auth::AuthSession;
