//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim workflow test suite.
//!
//! # Modules
//!
//! - `fixtures`: Canned backend responses and domain values
//! - `builders`: Workflow harnesses wired to in-memory or scripted backends
//! - `assertions`: Assertion helpers for sessions, deadlines and documents
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
