//! Error types used by the fleetvisor runtime and the process boundary.
//!
//! This module defines two main error enums:
//!
//! - [`OrchestratorError`] — usage and configuration errors surfaced
//!   synchronously by orchestrator operations.
//! - [`ControlError`] — operational errors raised by the external
//!   [`ProcessController`](crate::ProcessController) primitive.
//!
//! Configuration errors discovered during validation never surface here:
//! they are quarantined into the dead-letter queue and the system keeps
//! operating on the valid remainder. Operational errors (start/stop failures,
//! timeouts) are published as events and, per the documented best-effort
//! policy, do not abort the surrounding group operation.

use thiserror::Error;

use crate::services::ServiceKey;

/// # Errors surfaced by orchestrator operations.
///
/// These are caller-facing failures: operating on an uninitialized
/// orchestrator, referencing unknown groups or services, or violating the
/// validated set's invariants through `add_service`/`remove_service`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// No configuration has been loaded yet; call `reload` first.
    #[error("orchestrator not initialized: no configuration loaded")]
    NotInitialized,

    /// The given group index does not name a group.
    #[error("unknown group index {index}")]
    UnknownGroup {
        /// Index passed by the caller.
        index: usize,
    },

    /// The given key does not name a validated service.
    #[error("unknown service {key}")]
    UnknownService {
        /// Key passed by the caller.
        key: ServiceKey,
    },

    /// A service with this identity is already validated.
    #[error("duplicate service identity {key}")]
    DuplicateService {
        /// The conflicting identity.
        key: ServiceKey,
    },

    /// A declared dependency does not resolve within the validated set.
    #[error("service {key}: missing dependency {dependency}")]
    MissingDependency {
        /// The service declaring the dependency.
        key: ServiceKey,
        /// The unresolved dependency.
        dependency: ServiceKey,
    },

    /// Removal refused: other validated services still depend on this one.
    #[error("service {key} still has dependents: {dependents:?}")]
    DependentsExist {
        /// The service whose removal was refused.
        key: ServiceKey,
        /// Validated services that depend on it.
        dependents: Vec<ServiceKey>,
    },

    /// The process primitive refused or failed a control request.
    #[error("control request for {key} failed: {source}")]
    Control {
        /// The service the request targeted.
        key: ServiceKey,
        /// The underlying boundary error.
        source: ControlError,
    },
}

impl OrchestratorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::NotInitialized => "not_initialized",
            OrchestratorError::UnknownGroup { .. } => "unknown_group",
            OrchestratorError::UnknownService { .. } => "unknown_service",
            OrchestratorError::DuplicateService { .. } => "duplicate_service",
            OrchestratorError::MissingDependency { .. } => "missing_dependency",
            OrchestratorError::DependentsExist { .. } => "dependents_exist",
            OrchestratorError::Control { .. } => "control_failed",
        }
    }
}

/// # Errors produced by the external process-control primitive.
///
/// The orchestrator treats these as recoverable: they are logged via the
/// event bus and never crash the runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The primitive rejected the request (bad image, spawn failure, ...).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The primitive is gone (channel closed, supervisor torn down).
    #[error("process controller unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let key = ServiceKey::new("api", "1.0");
        assert_eq!(
            OrchestratorError::NotInitialized.as_label(),
            "not_initialized"
        );
        assert_eq!(
            OrchestratorError::UnknownService { key: key.clone() }.as_label(),
            "unknown_service"
        );
        assert_eq!(
            OrchestratorError::Control {
                key,
                source: ControlError::Unavailable,
            }
            .as_label(),
            "control_failed"
        );
    }

    #[test]
    fn test_display_includes_key() {
        let err = OrchestratorError::MissingDependency {
            key: ServiceKey::new("api", "1.0"),
            dependency: ServiceKey::new("db", "2.0"),
        };
        let msg = err.to_string();
        assert!(msg.contains("api@1.0"));
        assert!(msg.contains("db@2.0"));
    }
}
