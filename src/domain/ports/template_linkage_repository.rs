//! Repository port for hosts, templates and template links.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Host;

/// Repository for hosts/templates and the links between them.
#[async_trait]
pub trait TemplateLinkageRepository: Send + Sync {
    /// Create a host or template. Direct links it carries are stored too.
    async fn create_host(&self, host: &Host) -> DomainResult<()>;

    /// Get a host or template by ID, direct links included.
    async fn get_host(&self, id: Uuid) -> DomainResult<Option<Host>>;

    /// Get a host or template by name.
    async fn get_host_by_name(&self, name: &str) -> DomainResult<Option<Host>>;

    /// List every host and template with its direct links in link order.
    async fn list_hosts(&self) -> DomainResult<Vec<Host>>;

    /// Delete a host or template together with its triggers and links.
    async fn delete_host(&self, id: Uuid) -> DomainResult<()>;

    /// Link a template to a host. Returns false if already linked.
    async fn link_template(&self, host_id: Uuid, template_id: Uuid) -> DomainResult<bool>;

    /// Unlink a template from a host. Returns false if it was not linked.
    async fn unlink_template(&self, host_id: Uuid, template_id: Uuid) -> DomainResult<bool>;
}
