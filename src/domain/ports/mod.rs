//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - TriggerRepository: persistence of triggers and dependency edges
//! - TemplateLinkageRepository: persistence of hosts, templates and template links
//!
//! The dependency validator never talks to these directly; the service layer reads a
//! snapshot through them and hands it to the validator.

pub mod template_linkage_repository;
pub mod trigger_repository;

pub use template_linkage_repository::TemplateLinkageRepository;
pub use trigger_repository::{TriggerFilter, TriggerRepository};
