//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for observing the fleet: loggers,
//! metrics exporters, UI bridges. Each subscriber is driven by a dedicated
//! worker loop fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries); they never block
//!   the publisher nor other subscribers.
//! - [`Subscribe::accepts`] is consulted **before** enqueueing: events a
//!   subscriber does not care about never occupy its queue.
//! - If a queue overflows, events for that subscriber are dropped (warn).

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Whether this subscriber wants events of the given kind.
    ///
    /// Checked at fan-out time, before the event enters this subscriber's
    /// queue. Default: everything. A metrics exporter might keep only
    /// lifecycle kinds and ignore `ConfigRejected`, for example.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// Fleets are small and launches are paced by confirmation waits, so the
    /// default is modest. On overflow, events are dropped (warn).
    fn queue_capacity(&self) -> usize {
        256
    }
}
