//! Runtime state tracking.
//!
//! [`RuntimeStateStore`] maps each grouped service to its current
//! [`ServiceState`]. It is the single source of truth the launch path polls
//! and the event loop writes.
//!
//! ## Rules
//! - Only grouped (validated, non-quarantined) services are tracked.
//! - Untracked keys read as `None`; seeing one is a caller error, since
//!   every grouped service is tracked from reset/insert until removal.
//! - The lock is never held across an await by callers; every method takes
//!   and releases it internally.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::graph::ServiceGroup;
use crate::services::{ServiceKey, ServiceState};

/// Shared service-state map.
#[derive(Debug, Default)]
pub struct RuntimeStateStore {
    inner: RwLock<HashMap<ServiceKey, ServiceState>>,
}

impl RuntimeStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `key`, or `None` if the key is not tracked.
    pub async fn get(&self, key: &ServiceKey) -> Option<ServiceState> {
        self.inner.read().await.get(key).copied()
    }

    /// Sets the state of `key`.
    pub async fn set(&self, key: ServiceKey, state: ServiceState) {
        self.inner.write().await.insert(key, state);
    }

    /// Starts tracking `key` as `Stopped`.
    pub async fn insert(&self, key: ServiceKey) {
        self.inner.write().await.insert(key, ServiceState::Stopped);
    }

    /// Stops tracking `key`.
    pub async fn remove(&self, key: &ServiceKey) {
        self.inner.write().await.remove(key);
    }

    /// Replaces the tracked set with exactly the members of `groups`, all
    /// `Stopped`.
    pub async fn reset(&self, groups: &[Arc<ServiceGroup>]) {
        let mut next = HashMap::new();
        for group in groups {
            for key in group.keys() {
                next.insert(key, ServiceState::Stopped);
            }
        }
        *self.inner.write().await = next;
    }

    /// True iff every in-group dependency of `key` is `Running`.
    ///
    /// A service with no dependencies is trivially ready.
    pub async fn deps_running(&self, key: &ServiceKey, group: &ServiceGroup) -> bool {
        let map = self.inner.read().await;
        group.dependencies_of(key).iter().all(|dep| {
            map.get(dep)
                .is_some_and(|state| *state == ServiceState::Running)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ValidatedService;
    use crate::services::{ServiceConfig, ServiceMeta};

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

    #[tokio::test]
    async fn test_untracked_reads_none() {
        let store = RuntimeStateStore::new();
        assert_eq!(store.get(&key("ghost")).await, None);
    }

    #[tokio::test]
    async fn test_reset_tracks_exactly_group_members() {
        let group = Arc::new(
            ServiceGroup::assemble(vec![member("a", &["b"]), member("b", &[])]).unwrap(),
        );
        let store = RuntimeStateStore::new();
        store.set(key("stale"), ServiceState::Running).await;

        store.reset(&[Arc::clone(&group)]).await;

        assert_eq!(store.get(&key("a")).await, Some(ServiceState::Stopped));
        assert_eq!(store.get(&key("b")).await, Some(ServiceState::Stopped));
        // Stale entry reads as untracked again.
        assert_eq!(store.get(&key("stale")).await, None);
    }

    #[tokio::test]
    async fn test_deps_running_gates_on_every_dependency() {
        let group = Arc::new(
            ServiceGroup::assemble(vec![
                member("a", &["b", "c"]),
                member("b", &[]),
                member("c", &[]),
            ])
            .unwrap(),
        );
        let store = RuntimeStateStore::new();
        store.reset(&[Arc::clone(&group)]).await;

        assert!(!store.deps_running(&key("a"), &group).await);
        store.set(key("b"), ServiceState::Running).await;
        assert!(!store.deps_running(&key("a"), &group).await);
        store.set(key("c"), ServiceState::Running).await;
        assert!(store.deps_running(&key("a"), &group).await);
        // No dependencies: trivially ready.
        assert!(store.deps_running(&key("b"), &group).await);
    }
}
