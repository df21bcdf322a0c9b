//! In-memory view of the trigger dependency graph.
//!
//! Nodes are trigger ids; an edge `A -> B` means trigger A depends on trigger B.
//! Outgoing edges are kept in insertion order so traversals are reproducible.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::trigger::{DependencyEdge, Trigger};

/// Catalogue entry for a trigger known to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerNode {
    pub name: String,
    pub owner_id: Uuid,
}

/// Snapshot of persisted triggers and their dependency edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: HashMap<Uuid, TriggerNode>,
    /// Node ids in the order they were first seen
    order: Vec<Uuid>,
    seen: HashSet<Uuid>,
    /// trigger id -> triggers it depends on
    adjacency: HashMap<Uuid, Vec<Uuid>>,
    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from triggers, using each trigger's `depends_on` order.
    pub fn from_triggers<'a>(triggers: impl IntoIterator<Item = &'a Trigger>) -> Self {
        let triggers: Vec<&Trigger> = triggers.into_iter().collect();
        let mut graph = Self::new();
        for trigger in &triggers {
            graph.add_trigger(trigger);
        }
        for trigger in &triggers {
            for &dep in &trigger.depends_on {
                graph.insert(DependencyEdge::new(trigger.id, dep));
            }
        }
        graph
    }

    /// Register a trigger in the catalogue without touching its edges.
    pub fn add_trigger(&mut self, trigger: &Trigger) {
        self.add_node(trigger.id, trigger.name.clone(), trigger.owner_id);
    }

    pub fn add_node(&mut self, id: Uuid, name: impl Into<String>, owner_id: Uuid) {
        let node = TriggerNode {
            name: name.into(),
            owner_id,
        };
        self.nodes.insert(id, node);
        self.touch(id);
    }

    fn touch(&mut self, id: Uuid) {
        if self.seen.insert(id) {
            self.order.push(id);
        }
    }

    /// Known trigger ids in first-seen order.
    pub fn node_ids(&self) -> &[Uuid] {
        &self.order
    }

    pub fn node(&self, id: Uuid) -> Option<&TriggerNode> {
        self.nodes.get(&id)
    }

    /// Display name for a trigger, falling back to its id when unknown.
    pub fn name_of(&self, id: Uuid) -> String {
        self.nodes
            .get(&id)
            .map_or_else(|| id.to_string(), |node| node.name.clone())
    }

    /// Triggers that `id` depends on, in insertion order.
    pub fn dependencies(&self, id: Uuid) -> &[Uuid] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Triggers that depend on `id`.
    pub fn dependents(&self, id: Uuid) -> Vec<Uuid> {
        self.order
            .iter()
            .copied()
            .filter(|node| self.dependencies(*node).contains(&id))
            .collect()
    }

    pub fn contains_edge(&self, edge: &DependencyEdge) -> bool {
        self.dependencies(edge.trigger_id).contains(&edge.depends_on_id)
    }

    /// Insert an edge. Returns false when it was already present.
    pub fn insert(&mut self, edge: DependencyEdge) -> bool {
        if self.contains_edge(&edge) {
            return false;
        }
        self.touch(edge.trigger_id);
        self.touch(edge.depends_on_id);
        self.adjacency
            .entry(edge.trigger_id)
            .or_default()
            .push(edge.depends_on_id);
        self.edge_count += 1;
        true
    }

    /// Remove an edge. Returns false when it was not present.
    pub fn remove(&mut self, edge: &DependencyEdge) -> bool {
        let Some(deps) = self.adjacency.get_mut(&edge.trigger_id) else {
            return false;
        };
        let Some(pos) = deps.iter().position(|&id| id == edge.depends_on_id) else {
            return false;
        };
        deps.remove(pos);
        self.edge_count -= 1;
        true
    }

    /// Drop a trigger with all incoming and outgoing edges.
    /// Returns the number of edges removed.
    pub fn remove_trigger(&mut self, id: Uuid) -> usize {
        let mut removed = self.adjacency.remove(&id).map_or(0, |deps| deps.len());
        for deps in self.adjacency.values_mut() {
            let before = deps.len();
            deps.retain(|&dep| dep != id);
            removed += before - deps.len();
        }
        self.nodes.remove(&id);
        self.seen.remove(&id);
        self.order.retain(|&node| node != id);
        self.edge_count -= removed;
        removed
    }

    /// All edges, grouped by dependent trigger in first-seen order.
    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.order.iter().flat_map(move |&from| {
            self.dependencies(from)
                .iter()
                .map(move |&to| DependencyEdge::new(from, to))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn trigger_count(&self) -> usize {
        self.nodes.len()
    }

    /// First path from `from` to `to` following dependency edges, if any.
    pub fn find_path(&self, from: Uuid, to: Uuid) -> Option<Vec<Uuid>> {
        depth_first_path(from, to, |id| self.dependencies(id))
    }
}

/// Depth-first search from `start` for `target`.
///
/// Successors are explored in the order returned by `successors`, so the first
/// path found is stable for a given graph. Each node is expanded at most once.
/// The returned path starts at `start` and ends at `target`.
pub fn depth_first_path<'a, F>(start: Uuid, target: Uuid, successors: F) -> Option<Vec<Uuid>>
where
    F: Fn(Uuid) -> &'a [Uuid],
{
    if start == target {
        return Some(vec![start]);
    }

    let mut visited: HashSet<Uuid> = HashSet::from([start]);
    let mut stack = vec![(start, successors(start).iter())];

    while let Some((_, neighbors)) = stack.last_mut() {
        match neighbors.next() {
            Some(&next) => {
                if next == target {
                    let mut path: Vec<Uuid> = stack.iter().map(|(id, _)| *id).collect();
                    path.push(next);
                    return Some(path);
                }
                if visited.insert(next) {
                    stack.push((next, successors(next).iter()));
                }
            }
            None => {
                stack.pop();
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_insert_is_idempotent() {
        let id = ids(2);
        let mut graph = DependencyGraph::new();

        assert!(graph.insert(DependencyEdge::new(id[0], id[1])));
        assert!(!graph.insert(DependencyEdge::new(id[0], id[1])));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies(id[0]), &[id[1]]);
    }

    #[test]
    fn test_remove_edge() {
        let id = ids(2);
        let mut graph = DependencyGraph::new();
        graph.insert(DependencyEdge::new(id[0], id[1]));

        assert!(graph.remove(&DependencyEdge::new(id[0], id[1])));
        assert!(!graph.remove(&DependencyEdge::new(id[0], id[1])));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_remove_trigger_cascades_both_directions() {
        let id = ids(3);
        let mut graph = DependencyGraph::new();
        graph.insert(DependencyEdge::new(id[0], id[1]));
        graph.insert(DependencyEdge::new(id[1], id[2]));
        graph.insert(DependencyEdge::new(id[0], id[2]));

        assert_eq!(graph.remove_trigger(id[1]), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies(id[0]), &[id[2]]);
        assert!(graph.dependents(id[1]).is_empty());
    }

    #[test]
    fn test_find_path_follows_insertion_order() {
        // a -> b -> d and a -> c -> d: the b branch was inserted first.
        let id = ids(4);
        let (a, b, c, d) = (id[0], id[1], id[2], id[3]);
        let mut graph = DependencyGraph::new();
        graph.insert(DependencyEdge::new(a, b));
        graph.insert(DependencyEdge::new(a, c));
        graph.insert(DependencyEdge::new(c, d));
        graph.insert(DependencyEdge::new(b, d));

        assert_eq!(graph.find_path(a, d), Some(vec![a, b, d]));
        assert_eq!(graph.find_path(d, a), None);
    }

    #[test]
    fn test_find_path_terminates_on_existing_cycle() {
        let id = ids(3);
        let mut graph = DependencyGraph::new();
        graph.insert(DependencyEdge::new(id[0], id[1]));
        graph.insert(DependencyEdge::new(id[1], id[0]));

        assert_eq!(graph.find_path(id[0], id[2]), None);
    }

    #[test]
    fn test_from_triggers_uses_names() {
        let owner = Uuid::new_v4();
        let down = Trigger::new(owner, "Apache: Service is down");
        let mut restarted = Trigger::new(owner, "Apache: has been restarted");
        restarted.add_dependency(down.id);

        let graph = DependencyGraph::from_triggers([&down, &restarted]);

        assert_eq!(graph.trigger_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.name_of(down.id), "Apache: Service is down");
        assert_eq!(graph.dependents(down.id), vec![restarted.id]);
        let unknown = Uuid::new_v4();
        assert_eq!(graph.name_of(unknown), unknown.to_string());
    }
}
