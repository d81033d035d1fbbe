//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`](crate::Event) to
//! multiple subscribers **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Per-subscriber filtering: `accepts` is checked before enqueueing.
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (events are dropped for
//!   that subscriber).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;

use super::Subscribe;

/// Per-subscriber channel, keeping the subscriber handle for the
/// fan-out-time [`Subscribe::accepts`] check.
struct SubscriberChannel {
    subscriber: Arc<dyn Subscribe>,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for subscriber in subs {
            let cap = subscriber.queue_capacity().max(1);
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let worker_sub = Arc::clone(&subscriber);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = worker_sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        eprintln!(
                            "[fleetvisor] subscriber '{}' panicked: {:?}",
                            worker_sub.name(),
                            panic_err
                        );
                    }
                }
            });

            channels.push(SubscriberChannel {
                subscriber,
                sender: tx,
            });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one event to all interested subscribers (non-blocking).
    ///
    /// Subscribers whose [`Subscribe::accepts`] returns `false` for this
    /// event kind are not touched. If a queue is **full** or **closed**, the
    /// event is dropped for that subscriber and a warning is logged.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            if !channel.subscriber.accepts(ev.kind) {
                continue;
            }
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[fleetvisor] subscriber '{}' dropped event: queue full",
                        channel.subscriber.name()
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[fleetvisor] subscriber '{}' dropped event: worker closed",
                        channel.subscriber.name()
                    );
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::services::ServiceKey;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
        only: Option<EventKind>,
        tx: mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
            let _ = self.tx.send(());
        }

        fn accepts(&self, kind: EventKind) -> bool {
            self.only.map_or(true, |only| only == kind)
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
            only: None,
            tx,
        });
        let set = SubscriberSet::new(vec![recorder.clone() as Arc<dyn Subscribe>]);

        set.emit(&Event::now(EventKind::ServiceRunning).with_service(ServiceKey::new("a", "1")));
        rx.recv().await.unwrap();

        assert_eq!(
            recorder.seen.lock().unwrap().as_slice(),
            &[EventKind::ServiceRunning]
        );
        set.shutdown().await;
    }

    #[tokio::test]
    async fn test_filter_is_applied_before_enqueue() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
            only: Some(EventKind::ServiceCrashed),
            tx,
        });
        let set = SubscriberSet::new(vec![recorder.clone() as Arc<dyn Subscribe>]);

        set.emit(&Event::now(EventKind::ServiceRunning));
        set.emit(&Event::now(EventKind::ServiceCrashed).with_reason("exit code 1"));
        rx.recv().await.unwrap();

        assert_eq!(
            recorder.seen.lock().unwrap().as_slice(),
            &[EventKind::ServiceCrashed]
        );
        set.shutdown().await;
    }
}
