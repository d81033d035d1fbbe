//! # Runtime events emitted by the orchestrator and its event loop.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Lifecycle events**: service execution flow (starting, running,
//!   stopped, crashed, cascade stops)
//! - **Operational failures**: start/stop errors and timeouts (best-effort
//!   launch keeps going; these are how it stays observable)
//! - **Configuration events**: quarantines, reloads, add/remove
//!
//! The [`Event`] struct carries optional metadata: service key, reason,
//! group index, timeout.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore order when events are delivered out
//! of order across subscribers.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::services::ServiceKey;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Service lifecycle ===
    /// A start request was issued to the process primitive.
    ///
    /// Sets: `service`, `at`, `seq`.
    ServiceStarting,

    /// The process primitive confirmed the service is up.
    ///
    /// Sets: `service`, `at`, `seq`.
    ServiceRunning,

    /// The service reached `Stopped` (explicit stop or confirmed exit).
    ///
    /// Sets: `service`, `at`, `seq`.
    ServiceStopped,

    /// Crash notification received; state set to `Error`.
    ///
    /// Sets: `service`, `reason` (crash reason), `at`, `seq`.
    ServiceCrashed,

    /// A dependent stop was scheduled because a dependency crashed.
    ///
    /// Sets: `service` (the dependent), `reason` (the crashed dependency),
    /// `at`, `seq`.
    CascadeStop,

    // === Operational failures (best-effort launch/stop) ===
    /// Launch pass skipped a service whose dependencies were not running.
    ///
    /// Sets: `service`, `reason`, `at`, `seq`.
    LaunchSkipped,

    /// The process primitive rejected a start request.
    ///
    /// Sets: `service`, `reason`, `at`, `seq`.
    StartFailed,

    /// A service did not reach `Running` within the launch timeout.
    ///
    /// Sets: `service`, `timeout_ms`, `at`, `seq`.
    StartTimedOut,

    /// The process primitive rejected a stop request.
    ///
    /// Sets: `service`, `reason`, `at`, `seq`.
    StopFailed,

    // === Configuration ===
    /// A service was quarantined into the dead-letter queue.
    ///
    /// Sets: `service`, `reason` (rejection reason), `at`, `seq`.
    ConfigRejected,

    /// A reload finished; groups were replaced.
    ///
    /// Sets: `group` (number of groups), `at`, `seq`.
    FleetLoaded,

    /// A service was added to the validated set.
    ///
    /// Sets: `service`, `at`, `seq`.
    ServiceAdded,

    /// A service was removed from the validated set.
    ///
    /// Sets: `service`, `at`, `seq`.
    ServiceRemoved,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// The service this event concerns, if any.
    pub service: Option<ServiceKey>,
    /// Human-readable reason (crash reasons, rejections, errors).
    pub reason: Option<Arc<str>>,
    /// Group index or group count, depending on the kind.
    pub group: Option<usize>,
    /// Timeout in milliseconds (compact), for `StartTimedOut`.
    pub timeout_ms: Option<u64>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and the
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            reason: None,
            group: None,
            timeout_ms: None,
        }
    }

    /// Attaches the service key.
    #[inline]
    pub fn with_service(mut self, key: ServiceKey) -> Self {
        self.service = Some(key);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a group index (or count, for `FleetLoaded`).
    #[inline]
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    /// Attaches a timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }
}
