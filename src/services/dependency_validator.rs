use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::errors::DependencyValidationError;
use crate::domain::models::{
    DependencyEdge, DependencyGraph, HostKind, LinkageIndex, Trigger, TriggerNode,
};

/// Borrowed view of the trigger data the validator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRef<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub owner_id: Uuid,
}

impl<'a> TriggerRef<'a> {
    pub fn from_node(id: Uuid, node: &'a TriggerNode) -> Self {
        Self {
            id,
            name: &node.name,
            owner_id: node.owner_id,
        }
    }
}

impl<'a> From<&'a Trigger> for TriggerRef<'a> {
    fn from(trigger: &'a Trigger) -> Self {
        Self {
            id: trigger.id,
            name: &trigger.name,
            owner_id: trigger.owner_id,
        }
    }
}

/// Decides whether a proposed dependency edge may be committed.
///
/// Pure: it only reads the snapshot it is given and never mutates it.
#[derive(Debug, Clone, Default)]
pub struct DependencyValidator;

impl DependencyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `dependent -> depends_on` against the current graph, which must
    /// not yet contain the edge unless it is being re-inserted.
    ///
    /// Checks linkage first, then cycles.
    pub fn validate(
        &self,
        graph: &DependencyGraph,
        linkage: &LinkageIndex,
        dependent: TriggerRef<'_>,
        depends_on: TriggerRef<'_>,
    ) -> Result<(), DependencyValidationError> {
        self.check_linkage(linkage, dependent, depends_on)?;
        self.check_cycle(graph, dependent, depends_on)
    }

    /// The depended-on trigger's owner must be linked to the dependent trigger's owner.
    ///
    /// When the dependent belongs to a template, the error names the first
    /// entity inheriting that template which lacks the required link, and
    /// falls back to the template itself when nothing inherits it.
    pub fn check_linkage(
        &self,
        linkage: &LinkageIndex,
        dependent: TriggerRef<'_>,
        depends_on: TriggerRef<'_>,
    ) -> Result<(), DependencyValidationError> {
        let owner_id = dependent.owner_id;
        let template_id = depends_on.owner_id;

        if linkage.is_linked(owner_id, template_id) {
            return Ok(());
        }

        let host_id = if linkage.kind_of(owner_id) == Some(HostKind::Template) {
            linkage
                .inheritors(owner_id)
                .into_iter()
                .find(|&id| !linkage.is_linked(id, template_id))
                .unwrap_or(owner_id)
        } else {
            owner_id
        };

        Err(DependencyValidationError::Linkage {
            dependent_id: dependent.id,
            dependent: dependent.name.to_string(),
            depends_on_id: depends_on.id,
            depends_on: depends_on.name.to_string(),
            template_id,
            template: linkage.name_of(template_id),
            host_id,
            host: linkage.name_of(host_id),
        })
    }

    /// Reject the edge if `depends_on` already reaches `dependent`, or if they
    /// are the same trigger.
    ///
    /// The reported cycle starts at `depends_on`, follows the first path the
    /// depth-first search finds, and closes with the proposed edge.
    pub fn check_cycle(
        &self,
        graph: &DependencyGraph,
        dependent: TriggerRef<'_>,
        depends_on: TriggerRef<'_>,
    ) -> Result<(), DependencyValidationError> {
        let cycle_ids = if dependent.id == depends_on.id {
            vec![dependent.id, dependent.id]
        } else {
            match graph.find_path(depends_on.id, dependent.id) {
                Some(mut path) => {
                    path.push(depends_on.id);
                    path
                }
                None => return Ok(()),
            }
        };

        let name_of = |id: Uuid| {
            if id == dependent.id {
                dependent.name.to_string()
            } else if id == depends_on.id {
                depends_on.name.to_string()
            } else {
                graph.name_of(id)
            }
        };
        let cycle = cycle_ids.iter().map(|&id| name_of(id)).collect();

        Err(DependencyValidationError::CircularDependency {
            dependent_id: dependent.id,
            dependent: dependent.name.to_string(),
            depends_on_id: depends_on.id,
            depends_on: depends_on.name.to_string(),
            cycle_ids,
            cycle,
        })
    }

    /// Find any cycle already present in `graph`. The returned path starts and
    /// ends at the same trigger.
    ///
    /// Iterative, so arbitrarily long dependency chains are fine.
    pub fn detect_cycle(&self, graph: &DependencyGraph) -> Option<Vec<Uuid>> {
        let mut finished: HashSet<Uuid> = HashSet::new();

        for &root in graph.node_ids() {
            if finished.contains(&root) {
                continue;
            }

            let mut on_path: HashSet<Uuid> = HashSet::from([root]);
            let mut stack = vec![(root, graph.dependencies(root).iter())];

            while let Some((node, neighbors)) = stack.last_mut() {
                match neighbors.next() {
                    Some(&next) if on_path.contains(&next) => {
                        let start = stack.iter().position(|(id, _)| *id == next)?;
                        let mut cycle: Vec<Uuid> = stack[start..].iter().map(|(id, _)| *id).collect();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Some(&next) => {
                        if !finished.contains(&next) {
                            on_path.insert(next);
                            stack.push((next, graph.dependencies(next).iter()));
                        }
                    }
                    None => {
                        let done = *node;
                        on_path.remove(&done);
                        finished.insert(done);
                        stack.pop();
                    }
                }
            }
        }

        None
    }

    /// Re-check the linkage rule for every edge in `edges` against `linkage`.
    /// Edges whose endpoints are missing from the graph are skipped.
    pub fn linkage_violations(
        &self,
        graph: &DependencyGraph,
        linkage: &LinkageIndex,
        edges: &[DependencyEdge],
    ) -> Vec<DependencyValidationError> {
        edges
            .iter()
            .filter_map(|edge| {
                let dependent = graph.node(edge.trigger_id)?;
                let depends_on = graph.node(edge.depends_on_id)?;
                self.check_linkage(
                    linkage,
                    TriggerRef::from_node(edge.trigger_id, dependent),
                    TriggerRef::from_node(edge.depends_on_id, depends_on),
                )
                .err()
            })
            .collect()
    }
}
