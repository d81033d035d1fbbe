//! # Orchestrator: dependency-aware service supervision.
//!
//! The [`Orchestrator`] owns the validated fleet (groups + state store) and
//! exposes the control surface: reload, add/remove, group launch/stop,
//! per-service stop, and state queries.
//!
//! ```text
//!                       ┌────────────────────────────────────┐
//!   ServiceConfig ──►   │ validate ──► build_groups ──► Fleet │──► DLQ
//!                       └────────────────────────────────────┘
//!                                  │ Arc<ServiceGroup>
//!            launch_group ─────────┤            ▲
//!            stop_group/service ───┤            │ dependents_of
//!                                  ▼            │
//!        ProcessController ◄── start/stop   crash cascade ◄── event loop
//! ```
//!
//! ## Rules
//! - Until the first successful `reload`, every group/service operation
//!   returns [`OrchestratorError::NotInitialized`].
//! - Launch is **best-effort, not atomic**: start failures and timeouts are
//!   published as events, recorded in the [`LaunchReport`], and the pass
//!   continues. A service is never started while a dependency is not
//!   `Running`, so everything downstream of a failure is deferred.
//! - Stops run dependents-first. A diamond may issue a stop request for a
//!   service more than once; controllers must treat stop as idempotent.
//! - Dropping the orchestrator cancels its background tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::catalog::{validate, DeadLetterQueueItem, ValidatedService};
use crate::control::{ProcessController, ProcessEvent};
use crate::error::OrchestratorError;
use crate::events::{Bus, Event, EventKind};
use crate::graph::{build_groups, ServiceGroup};
use crate::services::{ServiceConfig, ServiceKey, ServiceMeta, ServiceState};

use super::builder::OrchestratorBuilder;
use super::config::Config;
use super::state::RuntimeStateStore;

/// Outcome of one best-effort launch pass over a group.
///
/// Keys appear in pass (topological) order. `skipped` covers both services
/// that were already `Running` and services deferred because a dependency
/// was not `Running`; `failed` covers rejected starts and timeouts.
#[derive(Debug, Clone, Default)]
pub struct LaunchReport {
    /// Services confirmed `Running` during this pass.
    pub launched: Vec<ServiceKey>,
    /// Services not attempted (already running, or dependencies down).
    pub skipped: Vec<ServiceKey>,
    /// Services whose start was rejected or timed out.
    pub failed: Vec<ServiceKey>,
}

impl LaunchReport {
    /// True when every service in the group was launched or already up.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of one best-effort stop pass over a group.
///
/// Entries are the group's roots, in sorted-key order. Dependents stopped by
/// the recursive cascade surface only through `StopFailed` events when they
/// fail.
#[derive(Debug, Clone, Default)]
pub struct StopReport {
    /// Roots whose stop request was accepted (or that were already down).
    pub stopped: Vec<ServiceKey>,
    /// Roots whose stop request the controller refused.
    pub failed: Vec<ServiceKey>,
}

impl StopReport {
    /// True when no root's stop request was refused.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The loaded configuration: groups plus lookup tables.
struct Fleet {
    groups: Vec<Arc<ServiceGroup>>,
    group_of: HashMap<ServiceKey, usize>,
    /// Surviving validated set, kept for incremental add/remove.
    services: HashMap<ServiceKey, ValidatedService>,
}

impl Fleet {
    /// Builds lookup tables over freshly assembled groups. `survivors` may
    /// contain quarantined keys; only grouped services are retained.
    fn assemble(
        groups: Vec<ServiceGroup>,
        mut survivors: HashMap<ServiceKey, ValidatedService>,
    ) -> Self {
        let groups: Vec<Arc<ServiceGroup>> = groups.into_iter().map(Arc::new).collect();
        let mut group_of = HashMap::new();
        let mut services = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            for key in group.keys() {
                if let Some(service) = survivors.remove(&key) {
                    services.insert(key.clone(), service);
                }
                group_of.insert(key, index);
            }
        }
        Self {
            groups,
            group_of,
            services,
        }
    }
}

/// Dependency-aware local-service orchestrator.
///
/// Construct through [`Orchestrator::builder`]; the builder spawns the
/// event loop and (optionally) the subscriber listener, and returns an
/// `Arc` handle. All methods take `&self` and are safe to call
/// concurrently.
pub struct Orchestrator {
    config: Config,
    controller: Arc<dyn ProcessController>,
    bus: Bus,
    states: RuntimeStateStore,
    fleet: RwLock<Option<Fleet>>,
    dead_letters: RwLock<Vec<DeadLetterQueueItem>>,
    process_tx: mpsc::Sender<ProcessEvent>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Starts building an orchestrator with the given configuration.
    #[must_use]
    pub fn builder(config: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    pub(crate) fn new(
        config: Config,
        controller: Arc<dyn ProcessController>,
        bus: Bus,
        process_tx: mpsc::Sender<ProcessEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            controller,
            bus,
            states: RuntimeStateStore::new(),
            fleet: RwLock::new(None),
            dead_letters: RwLock::new(Vec::new()),
            process_tx,
            cancel,
        }
    }

    // === Configuration surface ===

    /// Replaces the fleet with a freshly validated and grouped configuration.
    ///
    /// Rejected entries land in the dead-letter queue (replacing the previous
    /// one) and are published as `ConfigRejected` events. All runtime states
    /// reset to `Stopped`; callers are expected to stop running services
    /// before reloading. Returns the number of groups.
    pub async fn reload(&self, configs: Vec<ServiceConfig>) -> usize {
        let mut rejects = Vec::new();
        let validated = validate(configs, &mut rejects);
        let survivors = validated.clone();
        let groups = build_groups(validated, &mut rejects);
        let fleet = Fleet::assemble(groups, survivors);
        let count = fleet.groups.len();

        {
            let mut guard = self.fleet.write().await;
            self.states.reset(&fleet.groups).await;
            *guard = Some(fleet);
        }

        for item in &rejects {
            self.bus.publish(
                Event::now(EventKind::ConfigRejected)
                    .with_service(item.key.clone())
                    .with_reason(item.reason.to_string()),
            );
        }
        *self.dead_letters.write().await = rejects;

        self.bus
            .publish(Event::now(EventKind::FleetLoaded).with_group(count));
        count
    }

    /// Adds one service to the validated set and rebuilds groups.
    ///
    /// Fails fast (no quarantine) on a duplicate identity or a dependency
    /// that does not resolve in the current set; a self-dependency counts as
    /// missing. The new service starts `Stopped`. Returns its key.
    pub async fn add_service(&self, config: ServiceConfig) -> Result<ServiceKey, OrchestratorError> {
        let mut guard = self.fleet.write().await;
        let fleet = guard.as_mut().ok_or(OrchestratorError::NotInitialized)?;

        let key = config.key();
        if fleet.services.contains_key(&key) {
            return Err(OrchestratorError::DuplicateService { key });
        }
        let deps: Vec<ServiceKey> = config
            .dependencies
            .iter()
            .map(|(n, v)| ServiceKey::new(n.as_str(), v.as_str()))
            .collect();
        for dep in &deps {
            if *dep == key || !fleet.services.contains_key(dep) {
                return Err(OrchestratorError::MissingDependency {
                    key,
                    dependency: dep.clone(),
                });
            }
        }

        let meta = ServiceMeta::from(&config);
        fleet.services.insert(key.clone(), ValidatedService { meta, deps });
        Self::rebuild_groups(fleet);
        self.states.insert(key.clone()).await;
        drop(guard);

        self.bus
            .publish(Event::now(EventKind::ServiceAdded).with_service(key.clone()));
        Ok(key)
    }

    /// Removes one service from the validated set and rebuilds groups.
    ///
    /// Refuses while other validated services depend on it. A second removal
    /// of the same key returns `UnknownService`. If the service is still
    /// `Running`, a best-effort stop request is issued after removal.
    pub async fn remove_service(&self, key: &ServiceKey) -> Result<(), OrchestratorError> {
        let was_running;
        {
            let mut guard = self.fleet.write().await;
            let fleet = guard.as_mut().ok_or(OrchestratorError::NotInitialized)?;
            if !fleet.services.contains_key(key) {
                return Err(OrchestratorError::UnknownService { key: key.clone() });
            }

            let mut dependents: Vec<ServiceKey> = fleet
                .services
                .iter()
                .filter(|(_, service)| service.deps.contains(key))
                .map(|(k, _)| k.clone())
                .collect();
            if !dependents.is_empty() {
                dependents.sort();
                return Err(OrchestratorError::DependentsExist {
                    key: key.clone(),
                    dependents,
                });
            }

            was_running = self.states.get(key).await == Some(ServiceState::Running);
            fleet.services.remove(key);
            Self::rebuild_groups(fleet);
            self.states.remove(key).await;
        }

        if was_running {
            if let Err(err) = self.controller.stop(key).await {
                self.bus.publish(
                    Event::now(EventKind::StopFailed)
                        .with_service(key.clone())
                        .with_reason(err.to_string()),
                );
            }
        }
        self.bus
            .publish(Event::now(EventKind::ServiceRemoved).with_service(key.clone()));
        Ok(())
    }

    /// Rebuilds groups from the fleet's validated set.
    ///
    /// The set is closed and acyclic by construction (add only links to
    /// existing services, remove refuses while dependents exist), so the
    /// rebuild can never quarantine anything.
    fn rebuild_groups(fleet: &mut Fleet) {
        let mut scratch = Vec::new();
        let groups = build_groups(fleet.services.clone(), &mut scratch);
        debug_assert!(scratch.is_empty());
        let survivors = std::mem::take(&mut fleet.services);
        *fleet = Fleet::assemble(groups, survivors);
    }

    // === Runtime surface ===

    /// Launches every service of group `index` in dependency order.
    ///
    /// Best-effort: see [`LaunchReport`]. Each start is awaited up to
    /// `timeout` for the `Running` confirmation delivered through
    /// [`process_events`](Self::process_events).
    pub async fn launch_group(
        &self,
        index: usize,
        timeout: Duration,
    ) -> Result<LaunchReport, OrchestratorError> {
        let group = self.group_at(index).await?;
        let mut report = LaunchReport::default();

        for meta in group.launch_order() {
            let key = meta.key();
            if self.states.get(&key).await == Some(ServiceState::Running) {
                report.skipped.push(key);
                continue;
            }
            if !self.states.deps_running(&key, &group).await {
                self.bus.publish(
                    Event::now(EventKind::LaunchSkipped)
                        .with_service(key.clone())
                        .with_reason("dependencies not running"),
                );
                report.skipped.push(key);
                continue;
            }

            self.bus
                .publish(Event::now(EventKind::ServiceStarting).with_service(key.clone()));
            if let Err(err) = self.controller.start(meta).await {
                self.bus.publish(
                    Event::now(EventKind::StartFailed)
                        .with_service(key.clone())
                        .with_reason(err.to_string()),
                );
                report.failed.push(key);
                continue;
            }

            if self.wait_running(&key, timeout).await {
                report.launched.push(key);
            } else {
                self.bus.publish(
                    Event::now(EventKind::StartTimedOut)
                        .with_service(key.clone())
                        .with_timeout(timeout),
                );
                report.failed.push(key);
            }
        }
        Ok(report)
    }

    /// Stops every service of group `index`, dependents first.
    ///
    /// Only the group's roots are addressed directly; the recursive cascade
    /// covers everything above them. Best-effort like launch: a refused stop
    /// publishes `StopFailed`, lands in the [`StopReport`], and the pass
    /// moves on to the next root.
    pub async fn stop_group(&self, index: usize) -> Result<StopReport, OrchestratorError> {
        let group = self.group_at(index).await?;
        let mut report = StopReport::default();
        for root in group.roots() {
            match self.stop_within(&group, &root).await {
                Ok(()) => report.stopped.push(root),
                Err(_) => report.failed.push(root),
            }
        }
        Ok(report)
    }

    /// Stops one service after recursively stopping its dependents.
    ///
    /// No-op `Ok` when already `Stopped`. An `Error` service has no live
    /// process: its state flips to `Stopped` directly. Dependent stops are
    /// best-effort (failures publish `StopFailed`); a controller failure for
    /// `key` itself surfaces as [`OrchestratorError::Control`].
    pub async fn stop_service(&self, key: &ServiceKey) -> Result<(), OrchestratorError> {
        let group = self.group_for(key).await?;
        self.stop_within(&group, key).await
    }

    async fn stop_within(
        &self,
        group: &Arc<ServiceGroup>,
        key: &ServiceKey,
    ) -> Result<(), OrchestratorError> {
        for dependent in group.dependents_of(key) {
            self.stop_tree(group, dependent).await;
        }
        match self.states.get(key).await {
            None | Some(ServiceState::Stopped) => Ok(()),
            Some(ServiceState::Error) => {
                self.mark_stopped(key.clone()).await;
                Ok(())
            }
            Some(ServiceState::Running) => match self.controller.stop(key).await {
                Ok(()) => Ok(()),
                Err(source) => {
                    self.bus.publish(
                        Event::now(EventKind::StopFailed)
                            .with_service(key.clone())
                            .with_reason(source.to_string()),
                    );
                    Err(OrchestratorError::Control {
                        key: key.clone(),
                        source,
                    })
                }
            },
        }
    }

    /// Best-effort recursive stop, dependents before `key` itself.
    fn stop_tree<'a>(
        &'a self,
        group: &'a Arc<ServiceGroup>,
        key: ServiceKey,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            for dependent in group.dependents_of(&key) {
                self.stop_tree(group, dependent).await;
            }
            match self.states.get(&key).await {
                None | Some(ServiceState::Stopped) => {}
                Some(ServiceState::Error) => self.mark_stopped(key).await,
                Some(ServiceState::Running) => {
                    if let Err(err) = self.controller.stop(&key).await {
                        self.bus.publish(
                            Event::now(EventKind::StopFailed)
                                .with_service(key)
                                .with_reason(err.to_string()),
                        );
                    }
                }
            }
        })
    }

    async fn mark_stopped(&self, key: ServiceKey) {
        self.states.set(key.clone(), ServiceState::Stopped).await;
        self.bus
            .publish(Event::now(EventKind::ServiceStopped).with_service(key));
    }

    async fn wait_running(&self, key: &ServiceKey, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.states.get(key).await == Some(ServiceState::Running) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.config.poll_interval_clamped()).await;
        }
    }

    // === Notifications (event loop) ===

    /// Applies one process notification. Called only by the event loop;
    /// notifications for unknown services are ignored.
    pub(crate) async fn apply_process_event(self: &Arc<Self>, event: ProcessEvent) {
        let Ok(group) = self.group_for(event.key()).await else {
            return;
        };
        match event {
            ProcessEvent::Started { key } => {
                self.states.set(key.clone(), ServiceState::Running).await;
                self.bus
                    .publish(Event::now(EventKind::ServiceRunning).with_service(key));
            }
            ProcessEvent::Stopped { key } => {
                self.mark_stopped(key).await;
            }
            ProcessEvent::Crashed { key, reason } => {
                self.states.set(key.clone(), ServiceState::Error).await;
                self.bus.publish(
                    Event::now(EventKind::ServiceCrashed)
                        .with_service(key.clone())
                        .with_reason(reason.as_str()),
                );
                for dependent in group.dependents_of(&key) {
                    if matches!(
                        self.states.get(&dependent).await,
                        None | Some(ServiceState::Stopped)
                    ) {
                        continue;
                    }
                    self.bus.publish(
                        Event::now(EventKind::CascadeStop)
                            .with_service(dependent.clone())
                            .with_reason(key.to_string()),
                    );
                    let orch = Arc::clone(self);
                    let group = Arc::clone(&group);
                    tokio::spawn(async move {
                        orch.stop_tree(&group, dependent).await;
                    });
                }
            }
        }
    }

    // === Queries ===

    /// Current state of `key`.
    pub async fn service_state(&self, key: &ServiceKey) -> Result<ServiceState, OrchestratorError> {
        self.group_for(key).await?;
        self.states
            .get(key)
            .await
            .ok_or_else(|| OrchestratorError::UnknownService { key: key.clone() })
    }

    /// Snapshot of the dead-letter queue from the last `reload`.
    pub async fn dead_letter_queue(&self) -> Vec<DeadLetterQueueItem> {
        self.dead_letters.read().await.clone()
    }

    /// Number of groups in the loaded fleet.
    pub async fn group_count(&self) -> Result<usize, OrchestratorError> {
        let guard = self.fleet.read().await;
        let fleet = guard.as_ref().ok_or(OrchestratorError::NotInitialized)?;
        Ok(fleet.groups.len())
    }

    /// Descriptors of group `index`, in node (sorted-key) order.
    pub async fn group_services(
        &self,
        index: usize,
    ) -> Result<Vec<ServiceMeta>, OrchestratorError> {
        let group = self.group_at(index).await?;
        Ok(group.services().cloned().collect())
    }

    /// Roots (no-dependency services) of group `index`.
    pub async fn group_roots(&self, index: usize) -> Result<Vec<ServiceKey>, OrchestratorError> {
        let group = self.group_at(index).await?;
        Ok(group.roots())
    }

    /// Sender for delivering process notifications
    /// (`Started` / `Stopped` / `Crashed`) to the event loop.
    #[must_use]
    pub fn process_events(&self) -> mpsc::Sender<ProcessEvent> {
        self.process_tx.clone()
    }

    /// New receiver on the runtime event bus.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    async fn group_at(&self, index: usize) -> Result<Arc<ServiceGroup>, OrchestratorError> {
        let guard = self.fleet.read().await;
        let fleet = guard.as_ref().ok_or(OrchestratorError::NotInitialized)?;
        fleet
            .groups
            .get(index)
            .cloned()
            .ok_or(OrchestratorError::UnknownGroup { index })
    }

    async fn group_for(&self, key: &ServiceKey) -> Result<Arc<ServiceGroup>, OrchestratorError> {
        let guard = self.fleet.read().await;
        let fleet = guard.as_ref().ok_or(OrchestratorError::NotInitialized)?;
        let index = fleet
            .group_of
            .get(key)
            .copied()
            .ok_or_else(|| OrchestratorError::UnknownService { key: key.clone() })?;
        Ok(Arc::clone(&fleet.groups[index]))
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RejectReason;
    use crate::control::ProcessController;
    use crate::error::ControlError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory process primitive: records requests and confirms them
    /// through the orchestrator's notification channel.
    struct MockController {
        started: Mutex<Vec<ServiceKey>>,
        stopped: Mutex<Vec<ServiceKey>>,
        reject_start: Mutex<HashSet<ServiceKey>>,
        reject_stop: Mutex<HashSet<ServiceKey>>,
        unconfirmed: Mutex<HashSet<ServiceKey>>,
        notifier: Mutex<Option<mpsc::Sender<ProcessEvent>>>,
    }

    impl MockController {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                started: Mutex::new(Vec::new()),
                stopped: Mutex::new(Vec::new()),
                reject_start: Mutex::new(HashSet::new()),
                reject_stop: Mutex::new(HashSet::new()),
                unconfirmed: Mutex::new(HashSet::new()),
                notifier: Mutex::new(None),
            })
        }

        fn attach(&self, tx: mpsc::Sender<ProcessEvent>) {
            *self.notifier.lock().unwrap() = Some(tx);
        }

        fn reject(&self, key: ServiceKey) {
            self.reject_start.lock().unwrap().insert(key);
        }

        fn refuse_stop(&self, key: ServiceKey) {
            self.reject_stop.lock().unwrap().insert(key);
        }

        /// Accept the start request but never confirm `Running`.
        fn never_confirm(&self, key: ServiceKey) {
            self.unconfirmed.lock().unwrap().insert(key);
        }

        fn started(&self) -> Vec<ServiceKey> {
            self.started.lock().unwrap().clone()
        }

        fn stopped(&self) -> Vec<ServiceKey> {
            self.stopped.lock().unwrap().clone()
        }

        async fn notify(&self, event: ProcessEvent) {
            let tx = self.notifier.lock().unwrap().clone();
            if let Some(tx) = tx {
                let _ = tx.send(event).await;
            }
        }
    }

    #[async_trait]
    impl ProcessController for MockController {
        async fn start(&self, meta: &ServiceMeta) -> Result<(), ControlError> {
            let key = meta.key();
            if self.reject_start.lock().unwrap().contains(&key) {
                return Err(ControlError::Rejected("spawn refused".into()));
            }
            self.started.lock().unwrap().push(key.clone());
            if !self.unconfirmed.lock().unwrap().contains(&key) {
                self.notify(ProcessEvent::Started { key }).await;
            }
            Ok(())
        }

        async fn stop(&self, key: &ServiceKey) -> Result<(), ControlError> {
            if self.reject_stop.lock().unwrap().contains(key) {
                return Err(ControlError::Rejected("stop refused".into()));
            }
            self.stopped.lock().unwrap().push(key.clone());
            self.notify(ProcessEvent::Stopped { key: key.clone() }).await;
            Ok(())
        }
    }

    fn cfg(name: &str, deps: &[&str]) -> ServiceConfig {
        let mut config = ServiceConfig::new(name, "1.0", format!("/opt/{name}"));
        for dep in deps {
            config = config.with_dependency(*dep, "1.0");
        }
        config
    }

    fn key(name: &str) -> ServiceKey {
        ServiceKey::new(name, "1.0")
    }

    fn rig(controller: &Arc<MockController>) -> Arc<Orchestrator> {
        let orch = Orchestrator::builder(Config::default())
            .with_controller(Arc::clone(controller) as Arc<dyn ProcessController>)
            .build();
        controller.attach(orch.process_events());
        orch
    }

    async fn wait_state(orch: &Orchestrator, key: &ServiceKey, want: ServiceState) {
        let outcome = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if orch.service_state(key).await.unwrap() == want {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(outcome.is_ok(), "{key} never reached {want}");
    }

    const LAUNCH: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_uninitialized_operations_are_rejected() {
        let controller = MockController::new();
        let orch = rig(&controller);

        assert!(matches!(
            orch.launch_group(0, LAUNCH).await,
            Err(OrchestratorError::NotInitialized)
        ));
        assert!(matches!(
            orch.service_state(&key("a")).await,
            Err(OrchestratorError::NotInitialized)
        ));
        assert!(matches!(
            orch.group_count().await,
            Err(OrchestratorError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_launch_follows_dependency_order() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &["b"]), cfg("b", &["c"]), cfg("c", &[])])
            .await;

        let report = orch.launch_group(0, LAUNCH).await.unwrap();

        assert_eq!(report.launched, vec![key("c"), key("b"), key("a")]);
        assert!(report.is_complete());
        assert_eq!(controller.started(), vec![key("c"), key("b"), key("a")]);
        for name in ["a", "b", "c"] {
            assert_eq!(
                orch.service_state(&key(name)).await.unwrap(),
                ServiceState::Running
            );
        }
    }

    #[tokio::test]
    async fn test_launch_is_best_effort() {
        // b depends on both c and e; c's start is rejected.
        let controller = MockController::new();
        controller.reject(key("c"));
        let orch = rig(&controller);
        orch.reload(vec![cfg("b", &["c", "e"]), cfg("c", &[]), cfg("e", &[])])
            .await;

        let report = orch.launch_group(0, LAUNCH).await.unwrap();

        assert_eq!(report.failed, vec![key("c")]);
        assert_eq!(report.launched, vec![key("e")]);
        assert_eq!(report.skipped, vec![key("b")]);
        assert_eq!(
            orch.service_state(&key("b")).await.unwrap(),
            ServiceState::Stopped
        );
        assert_eq!(
            orch.service_state(&key("e")).await.unwrap(),
            ServiceState::Running
        );
    }

    #[tokio::test]
    async fn test_relaunch_skips_running_services() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &["b"]), cfg("b", &[])]).await;

        orch.launch_group(0, LAUNCH).await.unwrap();
        let report = orch.launch_group(0, LAUNCH).await.unwrap();

        assert!(report.launched.is_empty());
        assert_eq!(report.skipped, vec![key("b"), key("a")]);
        assert_eq!(controller.started().len(), 2);
    }

    #[tokio::test]
    async fn test_crash_cascades_dependents_first() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &["b"]), cfg("b", &["c"]), cfg("c", &[])])
            .await;
        orch.launch_group(0, LAUNCH).await.unwrap();

        orch.process_events()
            .send(ProcessEvent::Crashed {
                key: key("c"),
                reason: "exit code 137".into(),
            })
            .await
            .unwrap();

        wait_state(&orch, &key("c"), ServiceState::Error).await;
        wait_state(&orch, &key("a"), ServiceState::Stopped).await;
        wait_state(&orch, &key("b"), ServiceState::Stopped).await;
        // Dependents-first: a before b, and the crashed c never receives a
        // stop request.
        assert_eq!(controller.stopped(), vec![key("a"), key("b")]);
    }

    #[tokio::test]
    async fn test_stop_group_stops_everything() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &["b"]), cfg("b", &["c"]), cfg("c", &[])])
            .await;
        orch.launch_group(0, LAUNCH).await.unwrap();

        let report = orch.stop_group(0).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(controller.stopped(), vec![key("a"), key("b"), key("c")]);
        for name in ["a", "b", "c"] {
            wait_state(&orch, &key(name), ServiceState::Stopped).await;
        }
    }

    #[tokio::test]
    async fn test_stop_group_continues_past_refused_stop() {
        // a depends on x and y; x's stop is refused by the controller.
        let controller = MockController::new();
        controller.refuse_stop(key("x"));
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &["x", "y"]), cfg("x", &[]), cfg("y", &[])])
            .await;
        orch.launch_group(0, LAUNCH).await.unwrap();

        let report = orch.stop_group(0).await.unwrap();

        // The pass reaches y even though x failed.
        assert_eq!(report.failed, vec![key("x")]);
        assert_eq!(report.stopped, vec![key("y")]);
        wait_state(&orch, &key("a"), ServiceState::Stopped).await;
        wait_state(&orch, &key("y"), ServiceState::Stopped).await;
        assert_eq!(
            orch.service_state(&key("x")).await.unwrap(),
            ServiceState::Running
        );
    }

    #[tokio::test]
    async fn test_launch_timeout_is_recoverable() {
        // "a-slow" accepts its start but never confirms Running; the pass
        // still launches the independent "b-ok" and defers "c-top".
        let controller = MockController::new();
        controller.never_confirm(key("a-slow"));
        let orch = rig(&controller);
        orch.reload(vec![
            cfg("a-slow", &[]),
            cfg("b-ok", &[]),
            cfg("c-top", &["a-slow", "b-ok"]),
        ])
        .await;
        let mut events = orch.subscribe();

        let report = orch
            .launch_group(0, Duration::from_millis(100))
            .await
            .unwrap();

        assert_eq!(report.failed, vec![key("a-slow")]);
        assert_eq!(report.launched, vec![key("b-ok")]);
        assert_eq!(report.skipped, vec![key("c-top")]);
        assert_eq!(
            orch.service_state(&key("a-slow")).await.unwrap(),
            ServiceState::Stopped
        );

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::StartTimedOut));
    }

    #[tokio::test]
    async fn test_stop_service_is_idempotent() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &[])]).await;

        orch.stop_service(&key("a")).await.unwrap();
        assert!(controller.stopped().is_empty());
    }

    #[tokio::test]
    async fn test_remove_service_guards_and_idempotency() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &["b"]), cfg("b", &[])]).await;

        // b still has a dependent.
        assert!(matches!(
            orch.remove_service(&key("b")).await,
            Err(OrchestratorError::DependentsExist { .. })
        ));
        // First removal succeeds, second sees an unknown key.
        orch.remove_service(&key("a")).await.unwrap();
        assert!(matches!(
            orch.remove_service(&key("a")).await,
            Err(OrchestratorError::UnknownService { .. })
        ));
        // With a gone, b is removable.
        orch.remove_service(&key("b")).await.unwrap();
        assert_eq!(orch.group_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_service_validates_and_regroups() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &[]), cfg("b", &[])]).await;
        assert_eq!(orch.group_count().await.unwrap(), 2);

        assert!(matches!(
            orch.add_service(cfg("a", &[])).await,
            Err(OrchestratorError::DuplicateService { .. })
        ));
        assert!(matches!(
            orch.add_service(cfg("c", &["ghost"])).await,
            Err(OrchestratorError::MissingDependency { .. })
        ));
        assert!(matches!(
            orch.add_service(cfg("c", &["c"])).await,
            Err(OrchestratorError::MissingDependency { .. })
        ));

        // c bridges a and b into one component.
        let added = orch.add_service(cfg("c", &["a", "b"])).await.unwrap();
        assert_eq!(added, key("c"));
        assert_eq!(orch.group_count().await.unwrap(), 1);
        assert_eq!(
            orch.service_state(&key("c")).await.unwrap(),
            ServiceState::Stopped
        );
    }

    #[tokio::test]
    async fn test_reload_quarantines_and_announces() {
        let controller = MockController::new();
        let orch = rig(&controller);
        let mut events = orch.subscribe();

        let count = orch
            .reload(vec![cfg("a", &[]), cfg("a", &[]), cfg("b", &["ghost"])])
            .await;

        assert_eq!(count, 1);
        let dlq = orch.dead_letter_queue().await;
        assert_eq!(dlq.len(), 2);
        assert!(dlq
            .iter()
            .any(|item| item.reason == RejectReason::DuplicateIdentity));

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == EventKind::ConfigRejected)
                .count(),
            2
        );
        assert!(kinds.contains(&EventKind::FleetLoaded));
    }

    #[tokio::test]
    async fn test_group_queries_expose_topology() {
        let controller = MockController::new();
        let orch = rig(&controller);
        orch.reload(vec![cfg("a", &["c"]), cfg("b", &["c"]), cfg("c", &[]), cfg("z", &[])])
            .await;

        assert_eq!(orch.group_count().await.unwrap(), 2);
        assert_eq!(orch.group_roots(0).await.unwrap(), vec![key("c")]);
        let names: Vec<String> = orch
            .group_services(1)
            .await
            .unwrap()
            .iter()
            .map(|m| m.name.to_string())
            .collect();
        assert_eq!(names, vec!["z"]);
        assert!(matches!(
            orch.group_roots(9).await,
            Err(OrchestratorError::UnknownGroup { index: 9 })
        ));
    }
}
