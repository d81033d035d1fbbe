//! Console logging subscriber (behind the `logging` feature).
//!
//! [`LogWriter`] prints a single line per event to stderr. It is meant as a
//! zero-setup default for demos and debugging; production embedders usually
//! plug their own [`Subscribe`](crate::Subscribe) impl.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Console logging subscriber.
///
/// Formats each event as `[seq] label service (reason)`, omitting fields
/// that are not set.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new console logger.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn label(kind: EventKind) -> &'static str {
        match kind {
            EventKind::ServiceStarting => "starting",
            EventKind::ServiceRunning => "running",
            EventKind::ServiceStopped => "stopped",
            EventKind::ServiceCrashed => "crashed",
            EventKind::CascadeStop => "cascade-stop",
            EventKind::LaunchSkipped => "launch-skipped",
            EventKind::StartFailed => "start-failed",
            EventKind::StartTimedOut => "start-timed-out",
            EventKind::StopFailed => "stop-failed",
            EventKind::ConfigRejected => "config-rejected",
            EventKind::FleetLoaded => "fleet-loaded",
            EventKind::ServiceAdded => "service-added",
            EventKind::ServiceRemoved => "service-removed",
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        let mut line = format!("[{}] {}", event.seq, Self::label(event.kind));

        if let Some(key) = &event.service {
            line.push(' ');
            line.push_str(&key.to_string());
        }
        if let Some(group) = event.group {
            line.push_str(&format!(" group={group}"));
        }
        if let Some(ms) = event.timeout_ms {
            line.push_str(&format!(" timeout={ms}ms"));
        }
        if let Some(reason) = &event.reason {
            line.push_str(&format!(" ({reason})"));
        }

        eprintln!("{line}");
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
