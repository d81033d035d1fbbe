//! # fleetvisor
//!
//! **Fleetvisor** is a dependency-aware orchestration library for local
//! service fleets.
//!
//! It validates service definitions, partitions them into independent
//! dependency groups, and supervises their runtime lifecycle: launch in
//! dependency order, stop dependents-first, and cascade stops when a
//! dependency crashes. Process execution itself is delegated to an
//! embedder-provided [`ProcessController`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌───────────────┐  ┌───────────────┐  ┌───────────────┐
//!  │ ServiceConfig │  │ ServiceConfig │  │ ServiceConfig │
//!  └───────┬───────┘  └───────┬───────┘  └───────┬───────┘
//!          ▼                  ▼                  ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  catalog::validate                                          │
//! │  - uniqueness of (name, version)                            │
//! │  - dependency closure (fixed-point unwinding)               │──► DLQ
//! └──────────────────────────────┬──────────────────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  graph::build_groups                                        │
//! │  - weakly-connected components ──► ServiceGroup             │──► DLQ
//! │  - per-group topological order (cycles rejected whole)      │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                               │
//! │  - Fleet (Arc<ServiceGroup> per component)                  │
//! │  - RuntimeStateStore (Stopped / Running / Error)            │
//! │  - Bus (broadcast events)                                   │
//! │  - SubscriberSet (fans out to user subscribers)             │
//! └──────┬───────────────────────────────────────────────▲──────┘
//!        │ start / stop requests                         │
//!        ▼                                               │
//! ┌────────────────────┐      ProcessEvent       ┌──────────────┐
//! │ ProcessController  │ ──Started/Stopped/───►  │  event loop  │
//! │ (embedder-provided)│      Crashed            │ (one task)   │
//! └────────────────────┘                         └──────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! reload(configs)
//!   ├─► validate ──► rejects quarantined (DLQ + ConfigRejected)
//!   ├─► build_groups ──► groups ordered by smallest member
//!   └─► all states reset to Stopped, FleetLoaded published
//!
//! launch_group(idx, timeout)          (best-effort, never atomic)
//!   for service in topological order {
//!     ├─ already Running          ─► skip
//!     ├─ a dependency not Running ─► skip, publish LaunchSkipped
//!     ├─ controller.start() Err   ─► publish StartFailed, continue
//!     └─ wait for Running confirmation
//!          ├─ confirmed ─► launched
//!          └─ timeout   ─► publish StartTimedOut, continue
//!   }
//!
//! crash (ProcessEvent::Crashed)
//!   ├─► state = Error, publish ServiceCrashed
//!   └─► per direct dependent: publish CascadeStop,
//!       spawn detached dependents-first stop
//! ```
//!
//! ## Features
//! | Area               | Description                                                    | Key types / traits                      |
//! |--------------------|----------------------------------------------------------------|-----------------------------------------|
//! | **Validation**     | Quarantine bad definitions, keep operating on the remainder.   | [`validate`], [`RejectReason`]          |
//! | **Grouping**       | Independent dependency components with precomputed topology.   | [`ServiceGroup`], [`build_groups`]      |
//! | **Supervision**    | Dependency-ordered launch, cascading stop, crash handling.     | [`Orchestrator`], [`LaunchReport`]      |
//! | **Process boundary** | Delegate execution to any process primitive.                 | [`ProcessController`], [`ProcessEvent`] |
//! | **Subscriber API** | Hook into lifecycle events (logging, metrics, custom).         | [`Subscribe`], [`SubscriberSet`]        |
//! | **Errors**         | Typed errors for the API surface and the control boundary.     | [`OrchestratorError`], [`ControlError`] |
//! | **Configuration**  | Centralize runtime settings.                                   | [`Config`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use fleetvisor::{
//!     Config, ControlError, Orchestrator, ProcessController, ProcessEvent,
//!     ServiceConfig, ServiceKey, ServiceMeta,
//! };
//!
//! /// Minimal controller that confirms every request immediately.
//! struct EchoController {
//!     notifier: tokio::sync::Mutex<Option<tokio::sync::mpsc::Sender<ProcessEvent>>>,
//! }
//!
//! #[async_trait]
//! impl ProcessController for EchoController {
//!     async fn start(&self, meta: &ServiceMeta) -> Result<(), ControlError> {
//!         let tx = self.notifier.lock().await.clone();
//!         if let Some(tx) = tx {
//!             let _ = tx.send(ProcessEvent::Started { key: meta.key() }).await;
//!         }
//!         Ok(())
//!     }
//!
//!     async fn stop(&self, key: &ServiceKey) -> Result<(), ControlError> {
//!         let tx = self.notifier.lock().await.clone();
//!         if let Some(tx) = tx {
//!             let _ = tx.send(ProcessEvent::Stopped { key: key.clone() }).await;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = Arc::new(EchoController {
//!         notifier: tokio::sync::Mutex::new(None),
//!     });
//!
//!     let orch = Orchestrator::builder(Config::default())
//!         .with_controller(controller.clone())
//!         .build();
//!     *controller.notifier.lock().await = Some(orch.process_events());
//!
//!     // db first, then api (api depends on db).
//!     orch.reload(vec![
//!         ServiceConfig::new("db", "1.0", "/opt/db"),
//!         ServiceConfig::new("api", "1.0", "/opt/api").with_dependency("db", "1.0"),
//!     ])
//!     .await;
//!
//!     let report = orch.launch_group(0, Duration::from_secs(5)).await?;
//!     println!("launched: {:?}", report.launched);
//!
//!     orch.stop_group(0).await?;
//!     Ok(())
//! }
//! ```
mod catalog;
mod control;
mod core;
mod error;
mod events;
mod graph;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use catalog::{validate, DeadLetterQueueItem, RejectReason, ValidatedService};
pub use control::{ProcessController, ProcessEvent};
pub use core::{
    Config, LaunchReport, Orchestrator, OrchestratorBuilder, RuntimeStateStore, StopReport,
};
pub use error::{ControlError, OrchestratorError};
pub use events::{Bus, Event, EventKind};
pub use graph::{build_groups, ServiceGroup};
pub use services::{ServiceConfig, ServiceKey, ServiceMeta, ServiceState};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
