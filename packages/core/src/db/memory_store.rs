//! In-memory record store
//!
//! Reference [`RecordStore`] driver backed by a `tokio` [`RwLock`]ed map.
//! Used by tests and the dev tools; nothing survives the process.

use crate::db::{RecordStore, StoreError};
use crate::models::Record;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<String, Record>>,
    offline: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `records`; later duplicates overwrite earlier ones
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect();
        Self {
            records: RwLock::new(map),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("in-memory store is offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.ensure_online()
    }

    async fn create_record(&self, record: Record) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut records = self.records.write().await;
        if records.contains_key(&record.identifier) {
            return Err(StoreError::already_exists(&record.identifier));
        }
        tracing::debug!("Stored record {} ({} nodes)", record.identifier, record.len());
        records.insert(record.identifier.clone(), record);
        Ok(())
    }

    async fn get_record(&self, identifier: &str) -> Result<Option<Record>, StoreError> {
        self.ensure_online()?;
        Ok(self.records.read().await.get(identifier).cloned())
    }

    async fn update_record(&self, record: Record) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut records = self.records.write().await;
        match records.get_mut(&record.identifier) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::not_found(&record.identifier)),
        }
    }

    async fn delete_record(&self, identifier: &str) -> Result<bool, StoreError> {
        self.ensure_online()?;
        Ok(self.records.write().await.remove(identifier).is_some())
    }

    async fn list_records(&self, record_set: &str) -> Result<Vec<Record>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.record_set == record_set)
            .cloned()
            .collect())
    }

    async fn record_exists(&self, identifier: &str) -> Result<bool, StoreError> {
        self.ensure_online()?;
        Ok(self.records.read().await.contains_key(identifier))
    }
}
