//! # Dependency-graph builder: partition validated services into groups.
//!
//! ```text
//! validated set ──► undirected component discovery ──► per-component assembly
//!                                                          │
//!                                         complete + acyclic┼► ServiceGroup
//!                                     incomplete or cyclic  └► DLQ (whole component)
//! ```
//!
//! ## Rules
//! - Components are discovered over the **undirected** view of the edges;
//!   edge direction is preserved inside each group for ordering.
//! - All-or-nothing: a component whose metadata cannot be fully located is
//!   discarded whole ("group rollback"), and a cyclic component is discarded
//!   whole ("cyclic dependency group"). No partial group is ever exposed.
//! - Deterministic output: keys are processed in sorted order, so groups are
//!   ordered by their smallest member and group indices are stable for a
//!   given input set.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::catalog::{DeadLetterQueueItem, RejectReason, ValidatedService};
use crate::graph::group::ServiceGroup;
use crate::services::ServiceKey;

/// Consumes the validated set and produces one group per surviving
/// component, appending component-level rejects to `dlq`.
pub fn build_groups(
    mut validated: HashMap<ServiceKey, ValidatedService>,
    dlq: &mut Vec<DeadLetterQueueItem>,
) -> Vec<ServiceGroup> {
    let components = split_components(&validated);
    let mut groups = Vec::with_capacity(components.len());
    for component in components {
        if let Some(group) = assemble_component(component, &mut validated, dlq) {
            groups.push(group);
        }
    }
    groups
}

/// Weakly-connected components of the dependency graph, each a sorted list
/// of member keys; components ordered by smallest member.
fn split_components(validated: &HashMap<ServiceKey, ValidatedService>) -> Vec<Vec<ServiceKey>> {
    // Undirected adjacency: a dependency edge connects both ways for
    // grouping purposes only.
    let mut adjacency: HashMap<&ServiceKey, Vec<&ServiceKey>> =
        HashMap::with_capacity(validated.len());
    for (key, service) in validated {
        adjacency.entry(key).or_default();
        for dep in &service.deps {
            adjacency.entry(key).or_default().push(dep);
            adjacency.entry(dep).or_default().push(key);
        }
    }

    let mut seeds: Vec<&ServiceKey> = validated.keys().collect();
    seeds.sort();

    let mut seen: HashSet<&ServiceKey> = HashSet::with_capacity(validated.len());
    let mut components = Vec::new();
    for seed in seeds {
        if !seen.insert(seed) {
            continue;
        }
        let mut component = vec![seed.clone()];
        let mut frontier = VecDeque::from([seed]);
        while let Some(key) = frontier.pop_front() {
            if let Some(neighbors) = adjacency.get(key) {
                for &next in neighbors {
                    if seen.insert(next) {
                        component.push(next.clone());
                        frontier.push_back(next);
                    }
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

/// Pulls a component's members out of the validated set and assembles the
/// group. All-or-nothing: on incomplete metadata or a cycle, every pulled
/// member goes to the DLQ and no group is produced.
fn assemble_component(
    component: Vec<ServiceKey>,
    validated: &mut HashMap<ServiceKey, ValidatedService>,
    dlq: &mut Vec<DeadLetterQueueItem>,
) -> Option<ServiceGroup> {
    let mut members = Vec::with_capacity(component.len());
    let mut complete = true;
    for key in component {
        match validated.remove(&key) {
            Some(service) => members.push(service),
            None => complete = false,
        }
    }

    if !complete {
        for service in members {
            dlq.push(DeadLetterQueueItem {
                key: service.meta.key(),
                meta: service.meta,
                reason: RejectReason::GroupRollback,
            });
        }
        return None;
    }

    match ServiceGroup::assemble(members) {
        Ok(group) => Some(group),
        Err(members) => {
            for service in members {
                dlq.push(DeadLetterQueueItem {
                    key: service.meta.key(),
                    meta: service.meta,
                    reason: RejectReason::CyclicGroup,
                });
            }
            None
        }
    }
}
