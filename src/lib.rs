//! trigdep - monitoring trigger dependency manager
//!
//! Stores hosts, templates and triggers in SQLite and guards every trigger
//! dependency with two rules: the depended-on trigger must belong to a
//! template linked (directly or through other templates) to the dependent
//! trigger's owner, and the dependency graph must stay acyclic.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and repository ports
//! - **Service Layer** (`services`): validation and the read-validate-write cycle
//! - **Adapters** (`adapters`): SQLite repositories and migrations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trigdep::adapters::sqlite::{create_migrated_test_pool, SqliteTemplateLinkageRepository, SqliteTriggerRepository};
//! use trigdep::services::DependencyService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = create_migrated_test_pool().await?;
//!     let service = DependencyService::new(
//!         Arc::new(SqliteTriggerRepository::new(pool.clone())),
//!         Arc::new(SqliteTemplateLinkageRepository::new(pool)),
//!     );
//!     let apache = service.create_template("Apache by HTTP").await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DependencyValidationError, DomainError, DomainResult};
pub use domain::models::{
    Config, DependencyEdge, DependencyGraph, Host, HostKind, LinkageIndex, Trigger,
    TriggerSeverity,
};
pub use domain::ports::{TemplateLinkageRepository, TriggerFilter, TriggerRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DependencyService, DependencyValidator, LinkageCache, TriggerRef};
