pub mod dependency_service;
pub mod dependency_validator;
pub mod linkage_cache;

pub use dependency_service::{AuditReport, DependencyService};
pub use dependency_validator::{DependencyValidator, TriggerRef};
pub use linkage_cache::LinkageCache;
