//! Runtime core: orchestrator, builder, state store, configuration, and the
//! background event loop.
//!
//! ## Contents
//! - [`Orchestrator`] the control surface (reload, launch, stop, queries)
//! - [`OrchestratorBuilder`] construction and background-task wiring
//! - [`LaunchReport`] outcome of a best-effort launch pass
//! - [`Config`] tuning knobs
//! - [`RuntimeStateStore`] shared service-state map

mod builder;
mod config;
mod event_loop;
mod orchestrator;
mod state;

pub use builder::OrchestratorBuilder;
pub use config::Config;
pub use orchestrator::{LaunchReport, Orchestrator, StopReport};
pub use state::RuntimeStateStore;
