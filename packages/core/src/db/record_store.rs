//! RecordStore Trait - Storage Driver Boundary
//!
//! This module defines the `RecordStore` trait the catalog service persists
//! value trees through. The mapper only ever hands complete [`Record`]s to a
//! store and gets complete records back; node layout, indexing and
//! transactions are the driver's business.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async so embedded and networked
//!    drivers share one interface
//! 2. **Ownership Semantics**: writes take the record by value
//! 3. **Error Handling**: drivers fold their failures into [`StoreError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use mdcatalog_core::db::{InMemoryRecordStore, RecordStore};
//! use mdcatalog_core::models::Record;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
//!     store.create_record(Record::new("rec-1", "catalog", "iso19115")).await?;
//!     assert!(store.record_exists("rec-1").await?);
//!     Ok(())
//! }
//! ```

use crate::db::StoreError;
use crate::models::Record;
use async_trait::async_trait;

/// Abstraction layer for record persistence
///
/// Implementations must be `Send + Sync`; the catalog service shares one
/// store between concurrent calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Verify the store is reachable
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot serve
    /// requests.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Persist a new record
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if a record with the same
    /// identifier is stored.
    async fn create_record(&self, record: Record) -> Result<(), StoreError>;

    /// Fetch a record by identifier, `None` when absent
    async fn get_record(&self, identifier: &str) -> Result<Option<Record>, StoreError>;

    /// Replace a stored record
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has this identifier.
    async fn update_record(&self, record: Record) -> Result<(), StoreError>;

    /// Delete a record; returns whether it existed
    async fn delete_record(&self, identifier: &str) -> Result<bool, StoreError>;

    /// Every record of a record set, ordered by identifier
    async fn list_records(&self, record_set: &str) -> Result<Vec<Record>, StoreError>;

    async fn record_exists(&self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.get_record(identifier).await?.is_some())
    }
}
