//! # Service identity, descriptors, and runtime state.
//!
//! This module provides the leaf types everything else is built on:
//! - [`ServiceKey`] - unique `(name, version)` identity
//! - [`ServiceConfig`] - raw entry from the configuration source
//! - [`ServiceMeta`] - immutable validated descriptor
//! - [`ServiceState`] - `{ Stopped, Running, Error }` runtime state

mod config;
mod key;
mod meta;
mod state;

pub use config::ServiceConfig;
pub use key::ServiceKey;
pub use meta::ServiceMeta;
pub use state::ServiceState;
