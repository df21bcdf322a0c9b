//! Repository port for triggers and their dependency edges.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DependencyEdge, Trigger};

/// Filters for querying triggers
#[derive(Default, Debug, Clone)]
pub struct TriggerFilter {
    pub owner_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Repository for persisting and querying triggers.
#[async_trait]
pub trait TriggerRepository: Send + Sync {
    /// Create a trigger together with any dependencies it already carries.
    async fn create(&self, trigger: &Trigger) -> DomainResult<()>;

    /// Get a trigger by ID, dependencies included.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Trigger>>;

    /// Get a trigger by owner and name.
    async fn get_by_name(&self, owner_id: Uuid, name: &str) -> DomainResult<Option<Trigger>>;

    /// List triggers with optional filters.
    async fn list(&self, filter: TriggerFilter) -> DomainResult<Vec<Trigger>>;

    /// Delete a trigger. Incoming and outgoing dependency edges go with it.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// Insert an edge. Returns false if it already existed.
    async fn add_dependency(&self, trigger_id: Uuid, depends_on: Uuid) -> DomainResult<bool>;

    /// Remove an edge. Returns false if it did not exist.
    async fn remove_dependency(&self, trigger_id: Uuid, depends_on: Uuid) -> DomainResult<bool>;

    /// Every persisted edge, oldest first.
    async fn list_dependency_edges(&self) -> DomainResult<Vec<DependencyEdge>>;

    /// Triggers that `trigger_id` depends on.
    async fn get_dependencies(&self, trigger_id: Uuid) -> DomainResult<Vec<Trigger>>;

    /// Triggers that depend on `trigger_id`.
    async fn get_dependents(&self, trigger_id: Uuid) -> DomainResult<Vec<Trigger>>;
}
