//! # Dead-letter queue types.
//!
//! Services rejected during validation or grouping are quarantined into an
//! append-only dead-letter queue instead of aborting the load. Each entry
//! records the identity, its metadata (so a UI can still show the entry),
//! and a typed [`RejectReason`].
//!
//! ## Rules
//! - Within one load, entries are only appended and read; a reload starts a
//!   fresh queue.
//! - One entry per rejected service per load, even when several of its
//!   dependencies are missing.

use std::fmt;

use crate::services::{ServiceKey, ServiceMeta};

/// Why a service was quarantined.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Another validated service already claimed the same `(name, version)`.
    DuplicateIdentity,
    /// A declared dependency does not resolve within the validated set.
    /// A self-dependency is reported the same way.
    MissingDependency(ServiceKey),
    /// The service was pulled into a component whose metadata could not be
    /// fully located; the whole component was discarded.
    GroupRollback,
    /// The service belongs to a dependency cycle; the whole component was
    /// discarded.
    CyclicGroup,
}

impl RejectReason {
    /// Short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RejectReason::DuplicateIdentity => "duplicate_identity",
            RejectReason::MissingDependency(_) => "missing_dependency",
            RejectReason::GroupRollback => "group_rollback",
            RejectReason::CyclicGroup => "cyclic_group",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::DuplicateIdentity => f.write_str("duplicate identity"),
            RejectReason::MissingDependency(dep) => write!(f, "missing dependency: {dep}"),
            RejectReason::GroupRollback => f.write_str("group rollback: incomplete metadata"),
            RejectReason::CyclicGroup => f.write_str("cyclic dependency group"),
        }
    }
}

/// One quarantined service: identity, descriptor, and rejection reason.
#[derive(Clone, Debug)]
pub struct DeadLetterQueueItem {
    /// Identity of the rejected service.
    pub key: ServiceKey,
    /// Its descriptor, preserved for display/debugging.
    pub meta: ServiceMeta,
    /// Why it was rejected.
    pub reason: RejectReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display_matches_contract() {
        assert_eq!(RejectReason::DuplicateIdentity.to_string(), "duplicate identity");
        assert_eq!(
            RejectReason::MissingDependency(ServiceKey::new("db", "1.0")).to_string(),
            "missing dependency: db@1.0"
        );
        assert_eq!(
            RejectReason::GroupRollback.to_string(),
            "group rollback: incomplete metadata"
        );
        assert_eq!(RejectReason::CyclicGroup.to_string(), "cyclic dependency group");
    }
}
