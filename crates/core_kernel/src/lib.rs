//! Core Kernel - Foundational types shared by the claim workflow crates
//!
//! This crate provides the building blocks used across the client:
//! - Strongly-typed identifiers for backend-assigned and local entities
//! - A time source abstraction so deadline arithmetic can be replayed in tests
//! - Port marker traits for the hexagonal adapter boundary

pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use temporal::{TimeSource, SystemTimeSource, ManualTimeSource};
pub use identifiers::{ClaimId, ClaimNumber, AlertId, FarmerId, EvidenceId};
pub use error::CoreError;
pub use ports::{DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable};
