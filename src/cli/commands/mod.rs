//! Subcommand handlers.

pub mod host;
pub mod init;
pub mod trigger;

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

use crate::adapters::sqlite::{
    initialize_database, PoolConfig, SqliteTemplateLinkageRepository, SqliteTriggerRepository,
};
use crate::domain::models::{Config, Host, Trigger};
use crate::services::DependencyService;

pub type CliService = DependencyService<SqliteTriggerRepository, SqliteTemplateLinkageRepository>;

/// Open the configured database and build the service on top of it.
pub async fn open_service(config: &Config) -> Result<CliService> {
    let pool = initialize_database(&config.database.url(), Some(PoolConfig::from(&config.database)))
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}. Run 'trigdep init' first.",
                config.database.path
            )
        })?;

    Ok(DependencyService::new(
        Arc::new(SqliteTriggerRepository::new(pool.clone())),
        Arc::new(SqliteTemplateLinkageRepository::new(pool)),
    ))
}

pub async fn resolve_host(service: &CliService, name: &str) -> Result<Host> {
    service
        .find_host(name)
        .await?
        .ok_or_else(|| anyhow!("No host or template named \"{name}\""))
}

pub async fn resolve_trigger(service: &CliService, owner: &str, name: &str) -> Result<Trigger> {
    let owner = resolve_host(service, owner).await?;
    service
        .find_trigger(owner.id, name)
        .await?
        .ok_or_else(|| anyhow!("No trigger \"{name}\" on \"{}\"", owner.name))
}
