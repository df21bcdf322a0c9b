//! Domain layer for trigdep
//!
//! Core models, errors and the port traits adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DependencyValidationError, DomainError, DomainResult};
