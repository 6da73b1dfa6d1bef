//! Type Resolution Registry
//!
//! Everything the mapper needs to connect schema classes and runtime types:
//!
//! - [`standards`] - standard → runtime namespaces, main standard →
//!   compatible standards
//! - [`types`] - runtime type descriptors and accessor tables
//! - [`transforms`] - the ordered name transform chain
//! - [`resolver`] - cached resolution in both directions
//! - [`persistence`] - `key=value` persistence of the resolution cache
//!
//! [`MetadataRegistry`] bundles the immutable tables; it is built once at
//! startup from the builtin model plus any [`StandardProvider`] plugins.

pub mod persistence;
pub mod resolver;
pub mod standards;
pub mod transforms;
pub mod types;

#[cfg(test)]
mod resolver_test;

pub use resolver::{CacheKey, RuntimeType, TypeResolver};
pub use standards::{
    MappingMode, NamespaceEntry, StandardCatalog, StandardCatalogBuilder, StandardProvider,
};
pub use transforms::NameTransform;
pub use types::{
    AssignError, Cardinality, PropertyAccessor, TypeCatalog, TypeDescriptor, TypeKind,
};

use crate::models::core_schemas;
use crate::models::{SchemaRepository, Standard};

/// Immutable schema, standard and runtime type tables
#[derive(Debug)]
pub struct MetadataRegistry {
    standards: StandardCatalog,
    schemas: SchemaRepository,
    types: TypeCatalog,
}

impl MetadataRegistry {
    /// Registry with only the builtin standards and runtime model
    pub fn builtin() -> Self {
        RegistryBuilder::new().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn standards(&self) -> &StandardCatalog {
        &self.standards
    }

    pub fn schemas(&self) -> &SchemaRepository {
        &self.schemas
    }

    pub fn types(&self) -> &TypeCatalog {
        &self.types
    }
}

/// Collects builtin tables and plugin contributions
pub struct RegistryBuilder {
    standards: StandardCatalogBuilder,
    schemas: SchemaRepository,
    types: TypeCatalog,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            standards: StandardCatalogBuilder::new(),
            schemas: core_schemas::builtin_repository(),
            types: TypeCatalog::builtin(),
        }
    }

    pub fn with_provider(mut self, provider: &dyn StandardProvider) -> Self {
        self.standards.add_provider(provider);
        for class in provider.schema_classes() {
            self.schemas.insert(class);
        }
        provider.register_types(&mut self.types);
        self
    }

    /// Merge additional schema classes from a JSON array
    pub fn with_schema_json(mut self, json: &str) -> Result<Self, serde_json::Error> {
        let count = self.schemas.extend_from_json(json)?;
        tracing::debug!("Loaded {} schema classes from JSON", count);
        Ok(self)
    }

    pub fn build(self) -> MetadataRegistry {
        let standards = self.standards.build();
        let mut schemas = self.schemas;
        // The schema repository mirrors the merged compatibility lists.
        let merged: Vec<Standard> = standards
            .standards()
            .map(|(name, list)| Standard {
                name: name.to_string(),
                compatible_standards: list.to_vec(),
            })
            .collect();
        for standard in merged {
            schemas.insert_standard(standard);
        }

        tracing::info!(
            "Metadata registry ready: {} schema classes, {} runtime types",
            schemas.len(),
            self.types.len()
        );
        MetadataRegistry {
            standards,
            schemas,
            types: self.types,
        }
    }
}
