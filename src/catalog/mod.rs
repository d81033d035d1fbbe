//! # Configuration intake: validation and quarantine.
//!
//! Raw [`ServiceConfig`](crate::ServiceConfig) entries enter here and come
//! out either as [`ValidatedService`]s (consumed by the graph builder) or as
//! [`DeadLetterQueueItem`]s with a typed [`RejectReason`].
//!
//! ```text
//! configuration source ──► validate() ──┬──► validated set ──► graph::build_groups()
//!                                       └──► dead-letter queue (append-only)
//! ```

mod dead_letter;
mod validator;

pub use dead_letter::{DeadLetterQueueItem, RejectReason};
pub use validator::{validate, ValidatedService};
