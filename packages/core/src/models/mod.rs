//! Data Models
//!
//! This module contains the data structures shared by the mapper:
//!
//! - [`Record`] / [`ValueNode`] - the generic persisted value tree
//! - [`SchemaClass`] / [`SchemaRepository`] - schema-side class definitions
//! - [`MetadataObject`] / [`ObjectRef`] - typed runtime objects
//! - [`metadata`] - the builtin runtime model (ISO 19115, Dublin Core,
//!   Ebrim, SensorML)

pub mod core_schemas;
pub mod metadata;
pub mod object;
pub mod path;
pub mod schema;
pub mod value_tree;
pub mod values;


pub use object::{AttributeMap, MetadataObject, ObjectRef, UnknownAttribute, WeakObjectRef};
pub use path::{Path, PathSegment};
pub use schema::{ClassKey, CodeListEntry, SchemaClass, SchemaProperty, SchemaRepository, Standard};
pub use value_tree::{LinkTarget, NodeId, NodeKind, Record, TreeError, ValueNode};
pub use values::{
    CodeValue, InternationalString, Locale, QualifiedName, UnitOfMeasure, UnlimitedInteger, Value,
    ValueKind,
};
