//! Runtime configuration.
//!
//! [`Config`] collects the orchestrator's tuning knobs. Every field has a
//! conservative default; start from [`Config::default()`] and override what
//! you need:
//!
//! ```rust,ignore
//! let cfg = Config {
//!     poll_interval: Duration::from_millis(10),
//!     ..Config::default()
//! };
//! ```

use std::time::Duration;

/// Tuning knobs for the orchestrator runtime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the broadcast event bus.
    ///
    /// Slow bus consumers observe `Lagged` and lose the oldest events;
    /// subscribers attached through the builder additionally buffer in
    /// their own queues.
    ///
    /// Default: `1024`. Clamped to ≥ 1.
    pub bus_capacity: usize,

    /// Capacity of the process-notification queue drained by the event loop.
    ///
    /// The external process primitive blocks on `send` when the loop falls
    /// behind, which is the intended backpressure.
    ///
    /// Default: `64`. Clamped to ≥ 1.
    pub process_queue_capacity: usize,

    /// Interval between state-store polls while a launch waits for a
    /// service to reach `Running`.
    ///
    /// Default: `25ms`. Clamped to ≥ 1ms.
    pub poll_interval: Duration,
}

impl Config {
    /// Default bus capacity.
    pub const DEFAULT_BUS_CAPACITY: usize = 1024;
    /// Default process-notification queue capacity.
    pub const DEFAULT_PROCESS_QUEUE_CAPACITY: usize = 64;
    /// Default launch poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

    /// Poll interval with the documented lower bound applied.
    pub(crate) fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_capacity: Self::DEFAULT_BUS_CAPACITY,
            process_queue_capacity: Self::DEFAULT_PROCESS_QUEUE_CAPACITY,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.bus_capacity, 1024);
        assert_eq!(cfg.process_queue_capacity, 64);
        assert_eq!(cfg.poll_interval, Duration::from_millis(25));
    }

    #[test]
    fn test_poll_interval_clamped_to_one_ms() {
        let cfg = Config {
            poll_interval: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(1));
    }
}
