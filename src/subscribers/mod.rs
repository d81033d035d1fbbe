//! Event subscribers: trait, fan-out set, and built-in logger.
//!
//! Subscribers observe runtime [`Event`](crate::Event)s without
//! touching the hot path: the orchestrator's listener drains the
//! [`Bus`](crate::Bus) and hands each event to a [`SubscriberSet`],
//! which fans out to per-subscriber bounded queues.
//!
//! ## Contents
//! - [`Subscribe`] the subscriber contract
//! - [`SubscriberSet`] non-blocking fan-out with panic isolation
//! - [`LogWriter`] console logger (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
