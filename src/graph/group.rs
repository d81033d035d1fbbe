//! # ServiceGroup: one weakly-connected component of the dependency graph.
//!
//! A group is the unit of independent scheduling. It owns:
//! - the member descriptors ([`ServiceMeta`]),
//! - a `ServiceKey -> node index` map for O(1) lookups,
//! - forward adjacency (node -> its dependencies),
//! - reverse adjacency (node -> its dependents), precomputed once so crash
//!   cascades never rebuild it,
//! - a topological order (dependencies first), precomputed at assembly.
//!
//! Topology is immutable for the group's lifetime; membership only changes
//! on a full reload or an explicit add/remove (which rebuilds groups).
//!
//! ## Edge direction
//! Edges run dependency → dependent. The topological order therefore yields
//! dependencies before the services that need them, which is exactly the
//! launch order.

use std::collections::{HashMap, VecDeque};

use crate::catalog::ValidatedService;
use crate::services::{ServiceKey, ServiceMeta};

/// One weakly-connected component with group-local topology.
#[derive(Debug)]
pub struct ServiceGroup {
    nodes: Vec<ServiceMeta>,
    index: HashMap<ServiceKey, usize>,
    /// Forward adjacency: node -> the nodes it depends on.
    deps: Vec<Vec<usize>>,
    /// Reverse adjacency: node -> the nodes depending on it.
    dependents: Vec<Vec<usize>>,
    /// Topological order (dependencies first), node indices.
    topo: Vec<usize>,
}

impl ServiceGroup {
    /// Assembles a group from the members of one component.
    ///
    /// Every dependency key of every member must resolve inside `members`
    /// (the validator guarantees closure, the partitioner guarantees the
    /// component is complete). Returns the members unchanged if the
    /// component is cyclic, so the caller can quarantine them.
    pub(crate) fn assemble(mut members: Vec<ValidatedService>) -> Result<Self, Vec<ValidatedService>> {
        // Deterministic node numbering: sort by key.
        members.sort_by(|a, b| a.meta.key().cmp(&b.meta.key()));

        let mut index = HashMap::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            index.insert(member.meta.key(), i);
        }

        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); members.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); members.len()];
        for (i, member) in members.iter().enumerate() {
            for dep in &member.deps {
                let Some(&d) = index.get(dep) else {
                    // Closure violated upstream; treat like a cycle and bail.
                    return Err(members);
                };
                deps[i].push(d);
                dependents[d].push(i);
            }
        }

        let Some(topo) = kahn_order(&deps, &dependents) else {
            return Err(members);
        };

        let nodes = members.into_iter().map(|m| m.meta).collect();
        Ok(Self {
            nodes,
            index,
            deps,
            dependents,
            topo,
        })
    }

    /// Number of services in the group.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the group has no services (never produced by the builder).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if `key` belongs to this group.
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.index.contains_key(key)
    }

    /// Descriptor for `key`, if it belongs to this group.
    pub fn meta(&self, key: &ServiceKey) -> Option<&ServiceMeta> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    /// All member keys, in node order (sorted).
    pub fn keys(&self) -> impl Iterator<Item = ServiceKey> + '_ {
        self.nodes.iter().map(ServiceMeta::key)
    }

    /// All member descriptors, in node order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceMeta> {
        self.nodes.iter()
    }

    /// Direct dependencies of `key` within the group.
    pub fn dependencies_of(&self, key: &ServiceKey) -> Vec<ServiceKey> {
        self.adjacent(key, &self.deps)
    }

    /// Direct dependents of `key` within the group (reverse edges).
    pub fn dependents_of(&self, key: &ServiceKey) -> Vec<ServiceKey> {
        self.adjacent(key, &self.dependents)
    }

    /// Services with no dependencies: eligible to start first, and the
    /// entry points for a whole-group cascade stop.
    pub fn roots(&self) -> Vec<ServiceKey> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| self.deps[*i].is_empty())
            .map(|(_, meta)| meta.key())
            .collect()
    }

    /// Member descriptors in launch order (dependencies first).
    pub fn launch_order(&self) -> impl Iterator<Item = &ServiceMeta> {
        self.topo.iter().map(|&i| &self.nodes[i])
    }

    fn adjacent(&self, key: &ServiceKey, table: &[Vec<usize>]) -> Vec<ServiceKey> {
        match self.index.get(key) {
            Some(&i) => table[i].iter().map(|&j| self.nodes[j].key()).collect(),
            None => Vec::new(),
        }
    }
}

/// Kahn's algorithm over the dependency edges; `None` if the graph is cyclic.
fn kahn_order(deps: &[Vec<usize>], dependents: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut in_degree: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..deps.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(deps.len());

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    (order.len() == deps.len()).then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceConfig;

    fn member(name: &str, deps: &[&str]) -> ValidatedService {
        let config = ServiceConfig::new(name, "1.0", format!("/opt/{name}"));
        ValidatedService {
            meta: ServiceMeta::from(&config),
            deps: deps.iter().map(|d| ServiceKey::new(*d, "1.0")).collect(),
        }
    }

    fn key(name: &str) -> ServiceKey {
        ServiceKey::new(name, "1.0")
    }

    #[test]
    fn test_launch_order_respects_dependencies() {
        // a depends on b, b depends on c.
        let group = ServiceGroup::assemble(vec![
            member("a", &["b"]),
            member("b", &["c"]),
            member("c", &[]),
        ])
        .unwrap();

        let order: Vec<String> = group
            .launch_order()
            .map(|m| m.name.to_string())
            .collect();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("c") < pos("b"));
        assert!(pos("b") < pos("a"));
    }

    #[test]
    fn test_roots_have_no_dependencies() {
        let group = ServiceGroup::assemble(vec![
            member("a", &["c"]),
            member("b", &["c"]),
            member("c", &[]),
        ])
        .unwrap();
        assert_eq!(group.roots(), vec![key("c")]);
    }

    #[test]
    fn test_dependents_are_reverse_of_dependencies() {
        let group = ServiceGroup::assemble(vec![
            member("a", &["c"]),
            member("b", &["c"]),
            member("c", &[]),
        ])
        .unwrap();

        assert_eq!(group.dependencies_of(&key("a")), vec![key("c")]);
        let mut deps_of_c = group.dependents_of(&key("c"));
        deps_of_c.sort();
        assert_eq!(deps_of_c, vec![key("a"), key("b")]);
        assert!(group.dependents_of(&key("a")).is_empty());
    }

    #[test]
    fn test_cycle_is_rejected_with_members_returned() {
        let members = vec![member("a", &["b"]), member("b", &["a"])];
        let err = ServiceGroup::assemble(members).unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn test_single_node_group() {
        let group = ServiceGroup::assemble(vec![member("solo", &[])]).unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.roots(), vec![key("solo")]);
        assert!(group.contains(&key("solo")));
        assert!(!group.contains(&key("other")));
    }
}
