//! Terminal Interface
//!
//! A thin line-oriented driver over [`domain_claims::ClaimWorkflow`]: it
//! parses commands, forwards them to the workflow or the auth client, and
//! renders whatever session the workflow publishes. It holds no claim
//! state of its own.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{Command, Driver};
//!
//! let driver = Driver::new(client, workflow);
//! let reply = driver.execute("weather".parse::<Command>()?).await?;
//! ```

pub mod config;
pub mod commands;
pub mod render;
pub mod driver;

pub use config::AppConfig;
pub use commands::{Command, CommandError, FormField};
pub use driver::{Driver, DriverError, Reply};
