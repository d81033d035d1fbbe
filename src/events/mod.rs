//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the orchestrator, the
//! event loop, and group operations.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Orchestrator` (launch/stop/reload paths) and its event
//!   loop (crash/started/stopped notifications).
//! - **Consumers**: the subscriber listener (fans out to `SubscriberSet`)
//!   and tests asserting on lifecycle order.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
