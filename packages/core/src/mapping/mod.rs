//! Object Graph Mapping
//!
//! Converts between persisted value trees and typed metadata objects:
//!
//! - [`reader`] - [`Materializer`], value tree → object graph
//! - [`writer`] - [`Serializer`], object graph → value tree
//! - [`tracker`] - per-call identity tracking and cross-record linkables
//! - [`corrections`] - schema ↔ runtime attribute naming
//! - [`literals`] - text forms of scalar values
//!
//! Both directions are single-pass and recursive. Each call owns its
//! [`IdentityTracker`]; only the [`TypeResolver`](crate::registry::TypeResolver)
//! and [`LinkableEntities`] are shared between calls.

pub mod corrections;
pub mod error;
pub mod literals;
pub mod reader;
pub mod tracker;
pub mod writer;

#[cfg(test)]
mod writer_test;

pub use error::{AttributeFailure, FailureReason, MappingError, MappingReport};
pub use reader::{Materializer, ReadOutcome};
pub use tracker::{EntryState, IdentityTracker, LinkableEntities};
pub use writer::{Serializer, WriteOutcome};
