//! Trigger dependency service.
//!
//! Owns the read-validate-write cycle around dependency edges: it loads a
//! snapshot of the dependency graph and the resolved template linkage, asks the
//! [`DependencyValidator`] for a verdict, and only then commits. Mutations are
//! serialised through an async mutex so two concurrent requests can never both
//! validate against the same stale snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::dependency_validator::{DependencyValidator, TriggerRef};
use super::linkage_cache::LinkageCache;
use crate::domain::errors::{DependencyValidationError, DomainError, DomainResult};
use crate::domain::models::{
    depth_first_path, DependencyEdge, DependencyGraph, Host, LinkageIndex, Trigger,
    TriggerSeverity,
};
use crate::domain::ports::{TemplateLinkageRepository, TriggerFilter, TriggerRepository};

/// Result of a consistency sweep over the persisted dependency graph.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Trigger names along a cycle, first and last equal.
    pub cycle: Option<Vec<String>>,
    /// Edges whose depended-on trigger is no longer linked to the dependent's owner.
    pub linkage_violations: Vec<DependencyValidationError>,
    pub trigger_count: usize,
    pub edge_count: usize,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.cycle.is_none() && self.linkage_violations.is_empty()
    }
}

pub struct DependencyService<T: TriggerRepository, L: TemplateLinkageRepository> {
    triggers: Arc<T>,
    hosts: Arc<L>,
    linkage: LinkageCache<L>,
    validator: DependencyValidator,
    write_lock: Mutex<()>,
}

impl<T: TriggerRepository, L: TemplateLinkageRepository> DependencyService<T, L> {
    pub fn new(triggers: Arc<T>, hosts: Arc<L>) -> Self {
        Self {
            triggers,
            linkage: LinkageCache::new(Arc::clone(&hosts)),
            hosts,
            validator: DependencyValidator::new(),
            write_lock: Mutex::new(()),
        }
    }

    // ---- hosts and templates ----

    /// Create a plain host.
    pub async fn create_host(&self, name: impl Into<String>) -> DomainResult<Host> {
        self.register(Host::new(name)).await
    }

    /// Create a template.
    pub async fn create_template(&self, name: impl Into<String>) -> DomainResult<Host> {
        self.register(Host::template(name)).await
    }

    #[instrument(skip(self, host), fields(name = %host.name, kind = host.kind.as_str()))]
    async fn register(&self, host: Host) -> DomainResult<Host> {
        host.validate().map_err(DomainError::ValidationFailed)?;

        let _guard = self.write_lock.lock().await;
        if self.hosts.get_host_by_name(&host.name).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "a host or template named \"{}\" already exists",
                host.name
            )));
        }

        self.hosts.create_host(&host).await?;
        self.linkage.invalidate().await;
        info!(id = %host.id, "{} created", host.label());
        Ok(host)
    }

    pub async fn get_host(&self, id: Uuid) -> DomainResult<Host> {
        self.hosts.get_host(id).await?.ok_or(DomainError::HostNotFound(id))
    }

    pub async fn find_host(&self, name: &str) -> DomainResult<Option<Host>> {
        self.hosts.get_host_by_name(name).await
    }

    pub async fn list_hosts(&self) -> DomainResult<Vec<Host>> {
        self.hosts.list_hosts().await
    }

    /// Link `template_id` to `host_id`. Returns `false` if the link already existed.
    #[instrument(skip(self))]
    pub async fn link_template(&self, host_id: Uuid, template_id: Uuid) -> DomainResult<bool> {
        let _guard = self.write_lock.lock().await;

        let host = self.get_host(host_id).await?;
        let template = self.get_host(template_id).await?;

        if host_id == template_id {
            return Err(DomainError::InvalidLink {
                host: host.name,
                template: template.name,
                reason: "a host or template cannot be linked to itself".to_string(),
            });
        }
        if !template.is_template() {
            return Err(DomainError::InvalidLink {
                host: host.name,
                template: template.name,
                reason: "only templates can be linked".to_string(),
            });
        }
        if host.templates.contains(&template_id) {
            return Ok(false);
        }

        let all = self.hosts.list_hosts().await?;
        if let Some(cycle) = template_linkage_cycle(&all, host_id, template_id) {
            warn!(host = %host.name, template = %template.name, "circular template linkage rejected");
            return Err(DomainError::CircularTemplateLinkage(cycle));
        }

        let linked = self.hosts.link_template(host_id, template_id).await?;
        if linked {
            self.linkage.invalidate().await;
            info!(host = %host.name, template = %template.name, "template linked");
        }
        Ok(linked)
    }

    /// Unlink `template_id` from `host_id`.
    ///
    /// Fails with the first existing dependency edge that the reduced linkage
    /// would no longer allow. Returns `false` if there was no such link.
    #[instrument(skip(self))]
    pub async fn unlink_template(&self, host_id: Uuid, template_id: Uuid) -> DomainResult<bool> {
        let _guard = self.write_lock.lock().await;

        let host = self.get_host(host_id).await?;
        let template = self.get_host(template_id).await?;
        if !host.templates.contains(&template_id) {
            return Ok(false);
        }

        let mut all = self.hosts.list_hosts().await?;
        for entry in all.iter_mut().filter(|h| h.id == host_id) {
            entry.templates.retain(|&id| id != template_id);
        }
        let reduced = LinkageIndex::resolve(&all);

        let graph = self.load_graph().await?;
        let edges = self.triggers.list_dependency_edges().await?;
        if let Some(violation) = self
            .validator
            .linkage_violations(&graph, &reduced, &edges)
            .into_iter()
            .next()
        {
            warn!(host = %host.name, template = %template.name, "unlink would orphan a dependency");
            return Err(violation.into());
        }

        let unlinked = self.hosts.unlink_template(host_id, template_id).await?;
        if unlinked {
            self.linkage.invalidate().await;
            info!(host = %host.name, template = %template.name, "template unlinked");
        }
        Ok(unlinked)
    }

    /// Delete a host or template with its triggers and links.
    ///
    /// Rejected when a surviving dependency edge relies on linkage that passes
    /// through the deleted template.
    #[instrument(skip(self))]
    pub async fn delete_host(&self, id: Uuid) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;

        let host = self.get_host(id).await?;

        let mut all = self.hosts.list_hosts().await?;
        all.retain(|h| h.id != id);
        for entry in &mut all {
            entry.templates.retain(|&t| t != id);
        }
        let reduced = LinkageIndex::resolve(&all);

        let mut graph = self.load_graph().await?;
        let owned: Vec<Uuid> = graph
            .node_ids()
            .iter()
            .copied()
            .filter(|&t| graph.node(t).is_some_and(|node| node.owner_id == id))
            .collect();
        for trigger_id in owned {
            graph.remove_trigger(trigger_id);
        }

        let surviving: Vec<DependencyEdge> = self
            .triggers
            .list_dependency_edges()
            .await?
            .into_iter()
            .filter(|edge| graph.contains_edge(edge))
            .collect();
        if let Some(violation) = self
            .validator
            .linkage_violations(&graph, &reduced, &surviving)
            .into_iter()
            .next()
        {
            warn!(name = %host.name, "delete would orphan a dependency");
            return Err(violation.into());
        }

        self.hosts.delete_host(id).await?;
        self.linkage.invalidate().await;
        info!(name = %host.name, "{} deleted", host.label());
        Ok(())
    }

    // ---- triggers ----

    #[instrument(skip(self, expression))]
    pub async fn create_trigger(
        &self,
        owner_id: Uuid,
        name: String,
        expression: Option<String>,
        severity: TriggerSeverity,
    ) -> DomainResult<Trigger> {
        let mut trigger = Trigger::new(owner_id, name).with_severity(severity);
        if let Some(expression) = expression {
            trigger = trigger.with_expression(expression);
        }
        trigger.validate().map_err(DomainError::ValidationFailed)?;

        let _guard = self.write_lock.lock().await;
        let owner = self.get_host(owner_id).await?;
        if self.triggers.get_by_name(owner_id, &trigger.name).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "trigger \"{}\" already exists on \"{}\"",
                trigger.name, owner.name
            )));
        }

        self.triggers.create(&trigger).await?;
        info!(id = %trigger.id, owner = %owner.name, "trigger created");
        Ok(trigger)
    }

    pub async fn get_trigger(&self, id: Uuid) -> DomainResult<Trigger> {
        self.triggers.get(id).await?.ok_or(DomainError::TriggerNotFound(id))
    }

    pub async fn find_trigger(&self, owner_id: Uuid, name: &str) -> DomainResult<Option<Trigger>> {
        self.triggers.get_by_name(owner_id, name).await
    }

    pub async fn list_triggers(&self, filter: TriggerFilter) -> DomainResult<Vec<Trigger>> {
        self.triggers.list(filter).await
    }

    /// Triggers that `id` depends on, in the order the edges were added.
    pub async fn dependencies_of(&self, id: Uuid) -> DomainResult<Vec<Trigger>> {
        self.get_trigger(id).await?;
        self.triggers.get_dependencies(id).await
    }

    /// Triggers that depend on `id`.
    pub async fn dependents_of(&self, id: Uuid) -> DomainResult<Vec<Trigger>> {
        self.get_trigger(id).await?;
        self.triggers.get_dependents(id).await
    }

    /// Make `dependent_id` depend on `depends_on_id`.
    ///
    /// Returns `true` if the edge was added, `false` if it already existed.
    /// Nothing is written when validation fails.
    #[instrument(skip(self))]
    pub async fn add_dependency(&self, dependent_id: Uuid, depends_on_id: Uuid) -> DomainResult<bool> {
        let _guard = self.write_lock.lock().await;

        let dependent = self.get_trigger(dependent_id).await?;
        let depends_on = self.get_trigger(depends_on_id).await?;

        let graph = self.load_graph().await?;
        let linkage = self.linkage.get().await?;

        if let Err(err) = self.validator.validate(
            &graph,
            &linkage,
            TriggerRef::from(&dependent),
            TriggerRef::from(&depends_on),
        ) {
            warn!(dependent = %dependent.name, depends_on = %depends_on.name, error = %err, "dependency rejected");
            return Err(err.into());
        }

        if graph.contains_edge(&DependencyEdge::new(dependent_id, depends_on_id)) {
            debug!("dependency already present");
            return Ok(false);
        }

        let added = self.triggers.add_dependency(dependent_id, depends_on_id).await?;
        if added {
            info!(dependent = %dependent.name, depends_on = %depends_on.name, "dependency added");
        }
        Ok(added)
    }

    /// Drop the edge `dependent_id -> depends_on_id`. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn remove_dependency(&self, dependent_id: Uuid, depends_on_id: Uuid) -> DomainResult<bool> {
        let _guard = self.write_lock.lock().await;

        self.get_trigger(dependent_id).await?;
        self.get_trigger(depends_on_id).await?;

        let removed = self.triggers.remove_dependency(dependent_id, depends_on_id).await?;
        if removed {
            info!("dependency removed");
        }
        Ok(removed)
    }

    /// Delete a trigger and every edge touching it. Returns the number of edges dropped.
    #[instrument(skip(self))]
    pub async fn delete_trigger(&self, id: Uuid) -> DomainResult<usize> {
        let _guard = self.write_lock.lock().await;

        let trigger = self.get_trigger(id).await?;
        let dropped = self
            .triggers
            .list_dependency_edges()
            .await?
            .iter()
            .filter(|edge| edge.trigger_id == id || edge.depends_on_id == id)
            .count();

        self.triggers.delete(id).await?;
        info!(name = %trigger.name, edges = dropped, "trigger deleted");
        Ok(dropped)
    }

    /// Sweep the persisted graph for cycles and for edges the current linkage no longer allows.
    #[instrument(skip(self))]
    pub async fn audit(&self) -> DomainResult<AuditReport> {
        let _guard = self.write_lock.lock().await;

        let graph = self.load_graph().await?;
        let linkage = self.linkage.get().await?;
        let edges = self.triggers.list_dependency_edges().await?;

        let cycle = self
            .validator
            .detect_cycle(&graph)
            .map(|ids| ids.into_iter().map(|id| graph.name_of(id)).collect());

        Ok(AuditReport {
            cycle,
            linkage_violations: self.validator.linkage_violations(&graph, &linkage, &edges),
            trigger_count: graph.trigger_count(),
            edge_count: graph.edge_count(),
        })
    }

    async fn load_graph(&self) -> DomainResult<DependencyGraph> {
        let triggers = self.triggers.list(TriggerFilter::default()).await?;
        let graph = DependencyGraph::from_triggers(&triggers);
        debug!(
            triggers = graph.trigger_count(),
            edges = graph.edge_count(),
            "dependency graph snapshot loaded"
        );
        Ok(graph)
    }
}

/// If linking `template_id` to `host_id` would close a loop of template links,
/// return the loop as names starting and ending at `host_id`.
fn template_linkage_cycle(hosts: &[Host], host_id: Uuid, template_id: Uuid) -> Option<Vec<String>> {
    let direct: HashMap<Uuid, &Host> = hosts.iter().map(|h| (h.id, h)).collect();

    let path = depth_first_path(template_id, host_id, |id| {
        direct
            .get(&id)
            .copied()
            .map(|h| h.templates.as_slice())
            .unwrap_or(&[])
    })?;

    let name_of = |id: Uuid| {
        direct
            .get(&id)
            .map(|h| h.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    Some(
        std::iter::once(host_id)
            .chain(path)
            .map(name_of)
            .collect(),
    )
}
