//! # Process control boundary
//!
//! The orchestrator never spawns OS processes itself. It delegates to a
//! [`ProcessController`] for start/stop requests and listens to a stream of
//! [`ProcessEvent`]s for confirmations and crash notifications.
//!
//! ```text
//!   Orchestrator ──start/stop──► ProcessController (embedder-provided)
//!        ▲                              │
//!        └───── ProcessEvent channel ◄──┘
//! ```
//!
//! ## Rules
//! - `start`/`stop` are **requests**: returning `Ok(())` means the request
//!   was accepted, not that the service is up or down.
//! - Real state changes arrive as [`ProcessEvent`]s and are applied by the
//!   orchestrator's event loop.
//! - A `Stopped` or `Crashed` event for an unknown service is ignored.

use async_trait::async_trait;

use crate::error::ControlError;
use crate::services::{ServiceKey, ServiceMeta};

/// Boundary to whatever actually runs processes.
///
/// Implementations wrap a process manager, a container runtime, or (in
/// tests) an in-memory fake. Both methods may be called concurrently for
/// different services.
#[async_trait]
pub trait ProcessController: Send + Sync + 'static {
    /// Request that the service described by `meta` be started.
    ///
    /// Accepting the request does not imply the service is running; the
    /// controller confirms via [`ProcessEvent::Started`].
    async fn start(&self, meta: &ServiceMeta) -> Result<(), ControlError>;

    /// Request that the service be stopped.
    ///
    /// The controller confirms via [`ProcessEvent::Stopped`].
    async fn stop(&self, key: &ServiceKey) -> Result<(), ControlError>;
}

/// Notification from the process layer, consumed by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// The service is confirmed up.
    Started { key: ServiceKey },
    /// The service exited cleanly (or an accepted stop completed).
    Stopped { key: ServiceKey },
    /// The service terminated abnormally.
    Crashed { key: ServiceKey, reason: String },
}

impl ProcessEvent {
    /// The service this notification concerns.
    #[must_use]
    pub fn key(&self) -> &ServiceKey {
        match self {
            Self::Started { key } | Self::Stopped { key } | Self::Crashed { key, .. } => key,
        }
    }
}
