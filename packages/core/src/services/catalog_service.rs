//! Catalog Mapping Service
//!
//! This service connects the object graph mapper to a [`RecordStore`]. It
//! owns the long-lived pieces (resolver caches, cross-record linkables) and
//! builds a fresh [`Materializer`] or [`Serializer`] for every call, so each
//! call gets its own identity tracker.
//!
//! ## Core Functionality
//!
//! - Read one record, or every record of a record set, into object graphs
//! - Write an object graph as a new record, or replace an existing one
//! - Delete records, forgetting linkables that point into them
//! - Restore the resolution cache at startup, persist it on shutdown
//!
//! ## Example Usage
//!
//! ```no_run
//! # use mdcatalog_core::config::MapperConfig;
//! # use mdcatalog_core::db::InMemoryRecordStore;
//! # use mdcatalog_core::models::metadata::DefaultMetadata;
//! # use mdcatalog_core::models::ObjectRef;
//! # use mdcatalog_core::registry::MetadataRegistry;
//! # use mdcatalog_core::services::{CatalogService, WriteContext};
//! # use std::sync::Arc;
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let service = CatalogService::new(
//!     MapperConfig::default(),
//!     Arc::new(InMemoryRecordStore::new()),
//!     Arc::new(MetadataRegistry::builtin()),
//! )
//! .await?;
//!
//! let metadata = ObjectRef::new(DefaultMetadata::default());
//! let written = service
//!     .write_record(&metadata, WriteContext::new("catalog", "iso19115"))
//!     .await?;
//! let read = service.read_record(&written.record.identifier).await?;
//! println!("dropped {} attributes", read.report.failures.len());
//! service.shutdown()?;
//! # Ok(())
//! # }
//! ```

use crate::config::{MapperConfig, MappingOptions};
use crate::db::{RecordStore, StoreError};
use crate::mapping::{
    LinkableEntities, MappingError, Materializer, ReadOutcome, Serializer, WriteOutcome,
};
use crate::models::{ObjectRef, Record};
use crate::registry::persistence;
use crate::registry::{MetadataRegistry, TypeResolver};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Target of a write: where the record goes and on whose behalf
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteContext {
    /// Record identifier; a UUID is generated when absent
    pub identifier: Option<String>,
    pub record_set: String,
    pub profile: String,
    pub user: Option<String>,
    /// Overrides the configured main standard for this write
    pub main_standard: Option<String>,
}

impl WriteContext {
    pub fn new(record_set: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            record_set: record_set.into(),
            profile: profile.into(),
            ..Default::default()
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_main_standard(mut self, standard: impl Into<String>) -> Self {
        self.main_standard = Some(standard.into());
        self
    }
}

/// Reads and writes typed metadata objects through a record store
pub struct CatalogService {
    config: MapperConfig,
    options: MappingOptions,
    store: Arc<dyn RecordStore>,
    resolver: TypeResolver,
    linkables: LinkableEntities,
}

impl CatalogService {
    /// Create a new CatalogService
    ///
    /// # Errors
    ///
    /// - `Configuration`: invalid config, unknown main standard, or a store
    ///   that fails its health check
    /// - `CachePersistence`: the configured cache file exists but cannot be read
    pub async fn new(
        config: MapperConfig,
        store: Arc<dyn RecordStore>,
        registry: Arc<MetadataRegistry>,
    ) -> Result<Self, MappingError> {
        config.validate().map_err(MappingError::configuration)?;
        if !registry.standards().knows_standard(&config.main_standard) {
            return Err(MappingError::configuration(format!(
                "unknown main standard '{}'",
                config.main_standard
            )));
        }
        let options = config.mapping_options().map_err(MappingError::configuration)?;

        store.health_check().await.map_err(|e| {
            MappingError::configuration(format!("record store health check failed: {}", e))
        })?;

        let resolver = TypeResolver::new(registry);
        if let Some(path) = &config.registry_cache_path {
            persistence::load_cache(&resolver, path)?;
        }

        tracing::info!(
            "Catalog service ready (main standard {}, mode {:?})",
            options.main_standard,
            options.mode
        );
        Ok(Self {
            config,
            options,
            store,
            resolver,
            linkables: LinkableEntities::new(),
        })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    pub fn linkables(&self) -> &LinkableEntities {
        &self.linkables
    }

    /// Materialize one record
    ///
    /// Records referenced through cross-record links are fetched first, so
    /// their nodes can be materialized into the same graph.
    ///
    /// # Errors
    ///
    /// - `RecordNotFound`: no record has this identifier
    /// - `InvalidRecord`: the stored tree breaks ordinal or link ordering rules
    pub async fn read_record(&self, identifier: &str) -> Result<ReadOutcome, MappingError> {
        let record = self
            .store
            .get_record(identifier)
            .await?
            .ok_or_else(|| MappingError::record_not_found(identifier))?;
        record
            .validate()
            .map_err(|e| MappingError::invalid_record(identifier, e))?;

        let mut linked = HashMap::new();
        self.prefetch_links(&record, &mut linked).await?;
        Ok(self.materialize(&record, &linked))
    }

    /// Materialize every record of a record set, ordered by identifier
    ///
    /// Malformed records are skipped with a warning.
    pub async fn read_record_set(
        &self,
        record_set: &str,
    ) -> Result<Vec<(String, ReadOutcome)>, MappingError> {
        let records: Vec<Record> = self
            .store
            .list_records(record_set)
            .await?
            .into_iter()
            .filter(|record| match record.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Skipping malformed record {}: {}", record.identifier, e);
                    false
                }
            })
            .collect();
        let mut linked = HashMap::new();
        for record in &records {
            self.prefetch_links(record, &mut linked).await?;
        }

        let outcomes: Vec<(String, ReadOutcome)> = records
            .iter()
            .map(|record| (record.identifier.clone(), self.materialize(record, &linked)))
            .collect();
        tracing::info!("Read {} records from set {}", outcomes.len(), record_set);
        Ok(outcomes)
    }

    /// Serialize `object` into a new record
    ///
    /// # Errors
    ///
    /// - `DuplicateIdentifier`: the identifier is taken; the store is untouched
    /// - `UnresolvedRoot`: the root object has no class in the main standard
    /// - `Io`: the store rejected the record
    pub async fn write_record(
        &self,
        object: &ObjectRef,
        context: WriteContext,
    ) -> Result<WriteOutcome, MappingError> {
        let identifier = context
            .identifier
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        if self.store.record_exists(&identifier).await? {
            return Err(MappingError::duplicate_identifier(identifier));
        }

        let mut record = Record::new(&identifier, &context.record_set, &context.profile);
        record.owner = context.user.clone();
        let outcome = self.serialize(object, record, &context)?;

        self.store
            .create_record(outcome.record.clone())
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists { identifier } => {
                    MappingError::duplicate_identifier(identifier)
                }
                other => MappingError::Io(other),
            })?;
        self.register_linkables(&outcome);

        tracing::info!(
            "Wrote record {} ({} nodes, {} dropped attributes)",
            identifier,
            outcome.record.len(),
            outcome.report.failures.len()
        );
        Ok(outcome)
    }

    /// Re-serialize an existing record from `object`
    ///
    /// The creation time survives; the identifier in `context` is ignored.
    pub async fn replace_record(
        &self,
        identifier: &str,
        object: &ObjectRef,
        context: WriteContext,
    ) -> Result<WriteOutcome, MappingError> {
        let existing = self
            .store
            .get_record(identifier)
            .await?
            .ok_or_else(|| MappingError::record_not_found(identifier))?;

        let mut record = Record::new(identifier, &context.record_set, &context.profile);
        record.created_at = existing.created_at;
        record.owner = context.user.clone().or(existing.owner);
        let outcome = self.serialize(object, record, &context)?;

        self.store.update_record(outcome.record.clone()).await?;
        self.linkables.forget_record(identifier);
        self.register_linkables(&outcome);

        tracing::info!("Replaced record {} ({} nodes)", identifier, outcome.record.len());
        Ok(outcome)
    }

    /// Delete a record; returns whether it existed
    pub async fn delete_record(&self, identifier: &str) -> Result<bool, MappingError> {
        let existed = self.store.delete_record(identifier).await?;
        let forgotten = self.linkables.forget_record(identifier);
        tracing::info!(
            "Deleted record {} (existed: {}, {} linkables forgotten)",
            identifier,
            existed,
            forgotten
        );
        Ok(existed)
    }

    /// Persist the resolution cache when a cache path is configured
    pub fn shutdown(&self) -> Result<(), MappingError> {
        let pruned = self.linkables.prune();
        if pruned > 0 {
            tracing::debug!("Pruned {} dead linkable entries", pruned);
        }
        if let Some(path) = &self.config.registry_cache_path {
            persistence::save_cache(&self.resolver, path)?;
        }
        tracing::info!("Catalog service shut down");
        Ok(())
    }

    fn materialize(&self, record: &Record, linked: &HashMap<String, Record>) -> ReadOutcome {
        let outcome = Materializer::new(&self.resolver, &self.options)
            .with_linked_records(linked)
            .read(record);
        if !outcome.report.is_clean() {
            tracing::warn!(
                "Record {} read with {} dropped attributes",
                record.identifier,
                outcome.report.failures.len()
            );
        }
        outcome
    }

    fn serialize(
        &self,
        object: &ObjectRef,
        record: Record,
        context: &WriteContext,
    ) -> Result<WriteOutcome, MappingError> {
        let main_standard = context
            .main_standard
            .as_deref()
            .unwrap_or(&self.options.main_standard);
        Serializer::new(&self.resolver, &self.options, record)
            .main_standard(main_standard)
            .with_linkables(&self.linkables)
            .write(object)
    }

    fn register_linkables(&self, outcome: &WriteOutcome) {
        for (object, node) in &outcome.linkables {
            self.linkables
                .register(object, &outcome.record.identifier, *node);
        }
    }

    /// Fetch every record reachable through cross-record links of `record`
    ///
    /// Missing or malformed targets are skipped; the reader reports their
    /// links.
    async fn prefetch_links(
        &self,
        record: &Record,
        linked: &mut HashMap<String, Record>,
    ) -> Result<(), MappingError> {
        let mut visited: HashSet<String> = linked.keys().cloned().collect();
        visited.insert(record.identifier.clone());
        let mut pending: Vec<String> = record
            .external_links()
            .into_iter()
            .filter(|id| !visited.contains(id))
            .collect();

        while let Some(identifier) = pending.pop() {
            if !visited.insert(identifier.clone()) {
                continue;
            }
            match self.store.get_record(&identifier).await? {
                Some(target) => {
                    if let Err(e) = target.validate() {
                        tracing::warn!(
                            "Record {} links to malformed record {}: {}",
                            record.identifier,
                            identifier,
                            e
                        );
                        continue;
                    }
                    pending.extend(
                        target
                            .external_links()
                            .into_iter()
                            .filter(|id| !visited.contains(id)),
                    );
                    linked.insert(identifier, target);
                }
                None => tracing::warn!(
                    "Record {} links to missing record {}",
                    record.identifier,
                    identifier
                ),
            }
        }
        Ok(())
    }
}
