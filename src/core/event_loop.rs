//! Background tasks: the process-event loop and the subscriber listener.
//!
//! ```text
//!   ProcessController ──ProcessEvent──► [mpsc] ──► event loop ──► state store
//!                                                      │             + bus
//!   bus ──Event──► subscriber listener ──► SubscriberSet fan-out
//! ```
//!
//! ## Rules
//! - The event loop holds only a `Weak` reference to the orchestrator: it
//!   exits when the orchestrator is dropped, when its cancellation token
//!   fires, or when the notification channel closes.
//! - Events are applied one at a time in arrival order; crash cascades are
//!   dispatched as detached tasks and never awaited by the loop.
//! - The subscriber listener tolerates bus lag (oldest events drop with a
//!   warning) and shuts the fan-out down when the loop ends.

use std::sync::Weak;

use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::control::ProcessEvent;
use crate::events::Event;
use crate::subscribers::SubscriberSet;

use super::orchestrator::Orchestrator;

/// Spawns the process-event loop.
pub(crate) fn spawn_event_loop(
    orchestrator: Weak<Orchestrator>,
    mut rx: mpsc::Receiver<ProcessEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = rx.recv() => {
                    let Some(event) = received else { break };
                    let Some(orch) = orchestrator.upgrade() else { break };
                    orch.apply_process_event(event).await;
                }
            }
        }
    })
}

/// Spawns the listener that drains the bus into a [`SubscriberSet`].
pub(crate) fn spawn_subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(event) => set.emit(&event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        eprintln!("[fleetvisor] subscriber listener lagged: {missed} events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        set.shutdown().await;
    })
}
