//! # Configuration validator.
//!
//! Turns an unordered collection of raw [`ServiceConfig`] entries into a
//! consistent validated set, quarantining everything else:
//!
//! ```text
//! Vec<ServiceConfig> ──► uniqueness pass ──► dependency fixed-point ──►
//!     (HashMap<ServiceKey, ValidatedService>, Vec<DeadLetterQueueItem>)
//! ```
//!
//! ## Rules
//! - First occurrence of a `(name, version)` wins; later duplicates are
//!   rejected with "duplicate identity".
//! - A service referencing a dependency outside the validated set is removed
//!   and rejected with "missing dependency: <key>". Removal cascades until a
//!   pass removes nothing, so chains of missing dependencies fully unwind.
//! - A self-dependency is treated as a missing dependency.
//! - At most one rejection per service: scanning its dependencies stops at
//!   the first missing one.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::catalog::dead_letter::{DeadLetterQueueItem, RejectReason};
use crate::services::{ServiceConfig, ServiceKey, ServiceMeta};

/// A service that passed validation: descriptor plus resolved dependencies.
#[derive(Clone, Debug)]
pub struct ValidatedService {
    /// Immutable descriptor.
    pub meta: ServiceMeta,
    /// Resolved dependency keys (each present in the validated set).
    pub deps: Vec<ServiceKey>,
}

/// Validates raw entries into a consistent set, appending rejects to `dlq`.
///
/// The returned map satisfies the dependency-closure invariant: every key in
/// every `deps` list is itself a key of the map.
pub fn validate(
    configs: Vec<ServiceConfig>,
    dlq: &mut Vec<DeadLetterQueueItem>,
) -> HashMap<ServiceKey, ValidatedService> {
    let mut validated = check_unique(configs, dlq);
    check_dependencies(&mut validated, dlq);
    validated
}

/// Single pass over input order; the presence check is the map insertion
/// itself (no double lookup).
fn check_unique(
    configs: Vec<ServiceConfig>,
    dlq: &mut Vec<DeadLetterQueueItem>,
) -> HashMap<ServiceKey, ValidatedService> {
    let mut validated: HashMap<ServiceKey, ValidatedService> =
        HashMap::with_capacity(configs.len());
    for config in configs {
        let key = config.key();
        let meta = ServiceMeta::from(&config);
        let deps = config
            .dependencies
            .iter()
            .map(|(n, v)| ServiceKey::new(n.as_str(), v.as_str()))
            .collect();
        let service = ValidatedService { meta, deps };
        match validated.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(service);
            }
            Entry::Occupied(_) => {
                dlq.push(DeadLetterQueueItem {
                    key,
                    meta: service.meta,
                    reason: RejectReason::DuplicateIdentity,
                });
            }
        }
    }
    validated
}

/// Removes services with unresolved dependencies until a fixed point.
fn check_dependencies(
    validated: &mut HashMap<ServiceKey, ValidatedService>,
    dlq: &mut Vec<DeadLetterQueueItem>,
) {
    loop {
        let mut doomed: Vec<(ServiceKey, ServiceKey)> = Vec::new();
        for (key, service) in validated.iter() {
            for dep in &service.deps {
                if dep == key || !validated.contains_key(dep) {
                    doomed.push((key.clone(), dep.clone()));
                    break;
                }
            }
        }
        if doomed.is_empty() {
            return;
        }
        for (key, dep) in doomed {
            if let Some(service) = validated.remove(&key) {
                dlq.push(DeadLetterQueueItem {
                    key,
                    meta: service.meta,
                    reason: RejectReason::MissingDependency(dep),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(name: &str, version: &str) -> ServiceConfig {
        ServiceConfig::new(name, version, format!("/opt/{name}"))
    }

    fn reasons_for(dlq: &[DeadLetterQueueItem], name: &str) -> Vec<RejectReason> {
        dlq.iter()
            .filter(|item| item.key.name() == name)
            .map(|item| item.reason.clone())
            .collect()
    }

    #[test]
    fn test_duplicate_identity_first_wins() {
        let mut dlq = Vec::new();
        let validated = validate(
            vec![
                cfg("api", "1.0").with_args(["--first"]),
                cfg("api", "1.0").with_args(["--second"]),
                cfg("api", "1.0").with_args(["--third"]),
            ],
            &mut dlq,
        );

        assert_eq!(validated.len(), 1);
        let survivor = &validated[&ServiceKey::new("api", "1.0")];
        assert_eq!(&*survivor.meta.args[0], "--first");
        assert_eq!(dlq.len(), 2);
        assert!(dlq
            .iter()
            .all(|item| item.reason == RejectReason::DuplicateIdentity));
    }

    #[test]
    fn test_same_name_different_version_is_not_duplicate() {
        let mut dlq = Vec::new();
        let validated = validate(vec![cfg("api", "1.0"), cfg("api", "2.0")], &mut dlq);
        assert_eq!(validated.len(), 2);
        assert!(dlq.is_empty());
    }

    #[test]
    fn test_missing_dependency_chain_fully_unwinds() {
        // A depends on B, B depends on a service that does not exist.
        let mut dlq = Vec::new();
        let validated = validate(
            vec![
                cfg("a", "1.0").with_dependency("b", "1.0"),
                cfg("b", "1.0").with_dependency("ghost", "1.0"),
            ],
            &mut dlq,
        );

        assert!(validated.is_empty());
        assert_eq!(dlq.len(), 2);
        assert_eq!(
            reasons_for(&dlq, "b"),
            vec![RejectReason::MissingDependency(ServiceKey::new("ghost", "1.0"))]
        );
        assert_eq!(
            reasons_for(&dlq, "a"),
            vec![RejectReason::MissingDependency(ServiceKey::new("b", "1.0"))]
        );
    }

    #[test]
    fn test_one_rejection_even_with_multiple_missing_deps() {
        let mut dlq = Vec::new();
        let validated = validate(
            vec![cfg("a", "1.0")
                .with_dependency("ghost1", "1.0")
                .with_dependency("ghost2", "1.0")],
            &mut dlq,
        );
        assert!(validated.is_empty());
        assert_eq!(dlq.len(), 1);
    }

    #[test]
    fn test_self_dependency_is_missing_dependency() {
        let mut dlq = Vec::new();
        let validated = validate(vec![cfg("a", "1.0").with_dependency("a", "1.0")], &mut dlq);
        assert!(validated.is_empty());
        assert_eq!(
            reasons_for(&dlq, "a"),
            vec![RejectReason::MissingDependency(ServiceKey::new("a", "1.0"))]
        );
    }

    #[test]
    fn test_dependency_closure_holds() {
        let mut dlq = Vec::new();
        let validated = validate(
            vec![
                cfg("a", "1.0").with_dependency("b", "1.0"),
                cfg("b", "1.0"),
                cfg("c", "1.0").with_dependency("ghost", "1.0"),
                cfg("d", "1.0"),
            ],
            &mut dlq,
        );

        assert_eq!(validated.len(), 3);
        for service in validated.values() {
            for dep in &service.deps {
                assert!(validated.contains_key(dep), "dangling dependency {dep}");
            }
        }
    }
}
