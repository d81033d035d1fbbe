//! Builder wiring for the orchestrator runtime.
//!
//! [`OrchestratorBuilder`] assembles the pieces in one place: the event bus,
//! the process-notification channel, the event loop, and the optional
//! subscriber listener. `build()` returns an `Arc<Orchestrator>`; dropping
//! the last handle cancels the background tasks.
//!
//! ```rust,ignore
//! let orch = Orchestrator::builder(Config::default())
//!     .with_controller(controller)
//!     .with_subscriber(Arc::new(LogWriter::new()))
//!     .build();
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::control::ProcessController;
use crate::error::ControlError;
use crate::events::Bus;
use crate::services::{ServiceKey, ServiceMeta};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::config::Config;
use super::event_loop::{spawn_event_loop, spawn_subscriber_listener};
use super::orchestrator::Orchestrator;

/// Stand-in controller used when none is attached: every request fails
/// with [`ControlError::Unavailable`]. Queries and configuration still work.
struct UnavailableController;

#[async_trait]
impl ProcessController for UnavailableController {
    async fn start(&self, _meta: &ServiceMeta) -> Result<(), ControlError> {
        Err(ControlError::Unavailable)
    }

    async fn stop(&self, _key: &ServiceKey) -> Result<(), ControlError> {
        Err(ControlError::Unavailable)
    }
}

/// Step-by-step construction of an [`Orchestrator`].
pub struct OrchestratorBuilder {
    config: Config,
    controller: Option<Arc<dyn ProcessController>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl OrchestratorBuilder {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            controller: None,
            subscribers: Vec::new(),
        }
    }

    /// Attaches the process-control primitive. Without one, every
    /// start/stop request fails with `ControlError::Unavailable`.
    #[must_use]
    pub fn with_controller(mut self, controller: Arc<dyn ProcessController>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Adds one event subscriber.
    #[must_use]
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Adds several event subscribers.
    #[must_use]
    pub fn with_subscribers(
        mut self,
        subscribers: impl IntoIterator<Item = Arc<dyn Subscribe>>,
    ) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    /// Wires everything together and spawns the background tasks.
    #[must_use]
    pub fn build(self) -> Arc<Orchestrator> {
        let controller = self
            .controller
            .unwrap_or_else(|| Arc::new(UnavailableController));
        let bus = Bus::new(self.config.bus_capacity);
        let (process_tx, process_rx) =
            mpsc::channel(self.config.process_queue_capacity.max(1));
        let cancel = CancellationToken::new();

        let orchestrator = Arc::new(Orchestrator::new(
            self.config,
            controller,
            bus,
            process_tx,
            cancel.clone(),
        ));

        spawn_event_loop(
            Arc::downgrade(&orchestrator),
            process_rx,
            cancel.clone(),
        );
        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers);
            spawn_subscriber_listener(orchestrator.bus().subscribe(), set, cancel);
        }

        orchestrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceConfig;
    use std::time::Duration;

    #[tokio::test]
    async fn test_default_controller_is_unavailable() {
        let orch = Orchestrator::builder(Config::default()).build();
        orch.reload(vec![ServiceConfig::new("a", "1.0", "/opt/a")])
            .await;

        let report = orch
            .launch_group(0, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(report.launched.is_empty());
    }
}
