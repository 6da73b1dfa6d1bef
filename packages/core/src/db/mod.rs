//! Storage Layer
//!
//! This module defines where value trees live between mapping calls:
//!
//! - [`RecordStore`] - async driver boundary, whole records in and out
//! - [`InMemoryRecordStore`] - reference driver for tests and tooling
//! - [`StoreError`] - everything a driver can report
//!
//! # Architecture
//!
//! The catalog service owns one `Arc<dyn RecordStore>`. Drivers never see
//! typed metadata objects; they persist [`Record`](crate::models::Record)s
//! exactly as the serializer produced them.

mod error;
mod memory_store;
mod record_store;

pub use error::StoreError;
pub use memory_store::InMemoryRecordStore;
pub use record_store::RecordStore;
