//! # Runtime state of a service.
//!
//! [`ServiceState`] is the three-state machine driven by the orchestrator:
//!
//! ```text
//! Stopped ──(launch requested, deps Running, start confirmed)──► Running
//! Stopped/Running ──(crash notification)──► Error
//! Error/Running ──(explicit stop)──► Stopped
//! ```
//!
//! Crash reasons are not stored here; they travel in
//! [`Event`](crate::Event)s so the store stays a cheap `Copy` map.

use std::fmt;

/// Current runtime state of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Not running: initial state, after an explicit stop, or never started.
    Stopped,
    /// The process primitive confirmed the service is up.
    Running,
    /// The service crashed; its dependents are being (or have been) stopped.
    Error,
}

impl ServiceState {
    /// Short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceState::Stopped => "stopped",
            ServiceState::Running => "running",
            ServiceState::Error => "error",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
