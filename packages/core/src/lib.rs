//! MDCatalog Core Mapping Layer
//!
//! This crate stores OGC metadata documents (ISO 19115, Dublin Core/CSW,
//! Ebrim, SensorML) as generic value trees and maps them to and from typed
//! object graphs.
//!
//! # Architecture
//!
//! - **Generic storage**: every record is a tree of value nodes tagged with
//!   a schema path, independent of the runtime model
//! - **Standard-aware resolution**: schema classes resolve to runtime types
//!   through per-standard namespaces and a name transform chain, cached
//! - **Identity-preserving mapping**: shared sub-objects and cycles survive
//!   a write/read round trip as linked nodes
//!
//! # Modules
//!
//! - [`models`] - Value trees, schema classes, runtime objects
//! - [`registry`] - Standards, runtime type catalog, type resolver
//! - [`mapping`] - Materializer (read) and serializer (write)
//! - [`db`] - Record store boundary with an in-memory driver
//! - [`services`] - Catalog service tying store and mapper together
//! - [`config`] - Mapper configuration

pub mod config;
pub mod db;
pub mod mapping;
pub mod models;
pub mod registry;
pub mod services;

// Re-export commonly used types
pub use config::{MapperConfig, MappingOptions};
pub use mapping::{MappingError, MappingReport, Materializer, Serializer};
pub use models::*;
pub use registry::{MappingMode, MetadataRegistry, TypeResolver};
pub use services::*;
