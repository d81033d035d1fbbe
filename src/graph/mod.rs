//! # Dependency graph: grouping and group-local topology.
//!
//! The validated set becomes a directed graph (edges dependency → dependent)
//! partitioned into weakly-connected components. Each surviving component is
//! a [`ServiceGroup`] carrying its own key→node index, forward and reverse
//! adjacency, and a precomputed launch order.

mod build;
mod group;

pub use build::build_groups;
pub use group::ServiceGroup;
