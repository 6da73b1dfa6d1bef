//! Catalog Services
//!
//! This module contains the service layer on top of the mapper:
//!
//! - `CatalogService` - record reads and writes through a `RecordStore`,
//!   cross-record linkables, registry cache lifecycle
//!
//! Services coordinate between the storage layer and the object graph
//! mapper; the mapper itself never touches a store.

pub mod catalog_service;

pub use catalog_service::{CatalogService, WriteContext};
