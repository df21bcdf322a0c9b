//! Resolved template linkage.
//!
//! A host inherits the triggers of every template it links, directly or through
//! templates linked to those templates. The index stores that closure so the
//! dependency validator can answer "is T linked to H" without walking links.

use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

use super::host::{Host, HostKind};

#[derive(Debug, Clone)]
struct LinkageEntry {
    name: String,
    kind: HostKind,
    linked: HashSet<Uuid>,
}

/// Mapping from host/template id to every template id it is linked to.
///
/// The relation is reflexive: an entity is always linked to itself.
#[derive(Debug, Clone, Default)]
pub struct LinkageIndex {
    entries: HashMap<Uuid, LinkageEntry>,
    /// Entity ids in the order they were resolved
    order: Vec<Uuid>,
}

impl LinkageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the transitive closure of template links for every host and template.
    pub fn resolve(hosts: &[Host]) -> Self {
        let direct: HashMap<Uuid, &[Uuid]> = hosts
            .iter()
            .map(|host| (host.id, host.templates.as_slice()))
            .collect();

        let order = hosts.iter().map(|host| host.id).collect();
        let entries = hosts
            .iter()
            .map(|host| {
                let mut linked = HashSet::from([host.id]);
                let mut queue: VecDeque<Uuid> = host.templates.iter().copied().collect();
                while let Some(template_id) = queue.pop_front() {
                    if linked.insert(template_id) {
                        if let Some(next) = direct.get(&template_id) {
                            queue.extend(next.iter().copied());
                        }
                    }
                }
                let entry = LinkageEntry {
                    name: host.name.clone(),
                    kind: host.kind,
                    linked,
                };
                (host.id, entry)
            })
            .collect();

        Self { entries, order }
    }

    /// Whether `template_id` is linked to `host_id` (or is the same entity).
    pub fn is_linked(&self, host_id: Uuid, template_id: Uuid) -> bool {
        host_id == template_id
            || self
                .entries
                .get(&host_id)
                .is_some_and(|entry| entry.linked.contains(&template_id))
    }

    /// Display name for a host or template, falling back to its id when unknown.
    pub fn name_of(&self, id: Uuid) -> String {
        self.entries
            .get(&id)
            .map_or_else(|| id.to_string(), |entry| entry.name.clone())
    }

    pub fn kind_of(&self, id: Uuid) -> Option<HostKind> {
        self.entries.get(&id).map(|entry| entry.kind)
    }

    /// Entities that inherit `template_id`, directly or through other templates.
    ///
    /// Plain hosts come first, then templates, each group in resolve order.
    /// The template itself is not included.
    pub fn inheritors(&self, template_id: Uuid) -> Vec<Uuid> {
        let inherits = |id: &Uuid| {
            *id != template_id
                && self
                    .entries
                    .get(id)
                    .is_some_and(|entry| entry.linked.contains(&template_id))
        };
        let (hosts, templates): (Vec<Uuid>, Vec<Uuid>) = self
            .order
            .iter()
            .copied()
            .filter(inherits)
            .partition(|id| self.kind_of(*id) == Some(HostKind::Host));

        hosts.into_iter().chain(templates).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
