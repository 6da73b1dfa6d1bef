//! Cached type resolution
//!
//! ## Read direction
//!
//! `(mode, standard, class) → RuntimeType`, tried in order:
//!
//! 1. resolution cache
//! 2. primitive table (`CharacterString` → text, `Date` → date...)
//! 3. legacy renames (`CI_Date` → `DefaultCitationDate`...)
//! 4. candidate namespaces of the standard × the name transform chain
//!
//! Hits are cached. Misses are remembered and logged once, so an
//! unresolvable class costs one chain evaluation per process.
//!
//! ## Write direction
//!
//! `(object type, main standard) → SchemaClass`: the nominal class name is
//! the runtime type's root element (or its name without conventional
//! prefix/suffix), probed in each compatible standard of the main standard.
//!
//! The resolver is shared by concurrent calls; all caches sit behind
//! `RwLock`s and a racing miss only recomputes the same answer.

use crate::models::{ObjectRef, SchemaClass, ValueKind};
use crate::registry::standards::MappingMode;
use crate::registry::transforms::NameTransform;
use crate::registry::types::{TypeDescriptor, TypeKind};
use crate::registry::MetadataRegistry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Schema primitive names and the scalar kind they map to
const PRIMITIVES: &[(&str, ValueKind)] = &[
    ("CharacterString", ValueKind::Text),
    ("Date", ValueKind::Date),
    ("DateTime", ValueKind::Date),
    ("Decimal", ValueKind::Decimal),
    ("Real", ValueKind::Decimal),
    ("Integer", ValueKind::Integer),
    ("Boolean", ValueKind::Boolean),
    ("URL", ValueKind::Uri),
    ("URI", ValueKind::Uri),
    ("LanguageCode", ValueKind::Locale),
    ("PT_Locale", ValueKind::Locale),
    ("PT_FreeText", ValueKind::FreeText),
    ("QName", ValueKind::QualifiedName),
    ("UnlimitedInteger", ValueKind::UnlimitedInteger),
    ("UomCode", ValueKind::Unit),
];

/// Schema classes whose runtime type the transform chain cannot find
const LEGACY_RENAMES: &[(&str, &str)] = &[
    ("RS_Identifier", "iso19115.DefaultIdentifier"),
    ("CI_Date", "iso19115.DefaultCitationDate"),
    ("MD_Identification", "iso19115.DefaultDataIdentification"),
];

const PRIMITIVE_MARKER: &str = "primitive:";

/// What a schema class materializes into
#[derive(Debug, Clone)]
pub enum RuntimeType {
    Primitive(ValueKind),
    Described(Arc<TypeDescriptor>),
}

impl RuntimeType {
    /// Persistable name: `primitive:<kind>` or the qualified type name
    pub fn name(&self) -> String {
        match self {
            RuntimeType::Primitive(kind) => format!("{}{}", PRIMITIVE_MARKER, kind),
            RuntimeType::Described(descriptor) => descriptor.qualified_name(),
        }
    }

    /// Value kind produced for this type
    pub fn value_kind(&self) -> ValueKind {
        match self {
            RuntimeType::Primitive(kind) => *kind,
            RuntimeType::Described(descriptor) => match descriptor.kind {
                TypeKind::Object => ValueKind::Object,
                TypeKind::CodeList => ValueKind::Code,
                TypeKind::Enumeration => ValueKind::Enumeration,
            },
        }
    }

    pub fn descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
        match self {
            RuntimeType::Described(descriptor) => Some(descriptor),
            RuntimeType::Primitive(_) => None,
        }
    }
}

impl PartialEq for RuntimeType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeType::Primitive(a), RuntimeType::Primitive(b)) => a == b,
            (RuntimeType::Described(a), RuntimeType::Described(b)) => {
                Arc::ptr_eq(a, b) || a.qualified_name() == b.qualified_name()
            }
            _ => false,
        }
    }
}

/// Read-side cache key, rendered `<mode>-<standard>:<class>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub mode: MappingMode,
    pub standard: String,
    pub class_name: String,
}

impl CacheKey {
    pub fn new(mode: MappingMode, standard: &str, class_name: &str) -> Self {
        Self {
            mode,
            standard: standard.to_string(),
            class_name: class_name.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}:{}", self.mode, self.standard, self.class_name)
    }
}

impl FromStr for CacheKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, rest) = s
            .split_once('-')
            .ok_or_else(|| format!("Missing mode in cache key: {}", s))?;
        let (standard, class_name) = rest
            .split_once(':')
            .ok_or_else(|| format!("Missing class in cache key: {}", s))?;
        if standard.is_empty() || class_name.is_empty() {
            return Err(format!("Incomplete cache key: {}", s));
        }
        Ok(Self::new(mode.parse()?, standard, class_name))
    }
}

/// Shared, cached resolver over a [`MetadataRegistry`]
pub struct TypeResolver {
    registry: Arc<MetadataRegistry>,
    read_cache: RwLock<HashMap<CacheKey, RuntimeType>>,
    failures: RwLock<HashSet<CacheKey>>,
    write_cache: RwLock<HashMap<(String, String), Option<Arc<SchemaClass>>>>,
    chain_evaluations: AtomicUsize,
}

impl TypeResolver {
    pub fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self {
            registry,
            read_cache: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashSet::new()),
            write_cache: RwLock::new(HashMap::new()),
            chain_evaluations: AtomicUsize::new(0),
        }
    }

    pub fn builtin() -> Self {
        Self::new(Arc::new(MetadataRegistry::builtin()))
    }

    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Runtime type of a schema class (read direction)
    pub fn resolve_type(
        &self,
        mode: MappingMode,
        standard: &str,
        class_name: &str,
    ) -> Option<RuntimeType> {
        let key = CacheKey::new(mode, standard, class_name);
        if let Some(hit) = self
            .read_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Some(hit.clone());
        }
        if self
            .failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
        {
            return None;
        }

        let resolved = primitive_kind(class_name)
            .map(RuntimeType::Primitive)
            .or_else(|| self.legacy(class_name))
            .or_else(|| self.search_namespaces(&key));

        match &resolved {
            Some(runtime) => {
                tracing::debug!("Resolved {} to {}", key, runtime.name());
                self.read_cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, runtime.clone());
            }
            None => {
                let first = self
                    .failures
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key.clone());
                if first {
                    tracing::warn!("No runtime type for schema class {}", key);
                }
            }
        }
        resolved
    }

    fn legacy(&self, class_name: &str) -> Option<RuntimeType> {
        LEGACY_RENAMES
            .iter()
            .find(|(name, _)| *name == class_name)
            .and_then(|(_, runtime)| self.registry.types().get(runtime))
            .map(RuntimeType::Described)
    }

    fn search_namespaces(&self, key: &CacheKey) -> Option<RuntimeType> {
        self.chain_evaluations.fetch_add(1, Ordering::Relaxed);
        let standards = self.registry.standards();
        let prefix = standards.dialect_prefix(&key.standard);
        let candidates = NameTransform::candidates(&key.class_name, prefix);

        for namespace in standards.namespaces_for(key.mode, &key.standard) {
            for candidate in &candidates {
                if let Some(descriptor) = self.registry.types().lookup(namespace, candidate) {
                    return Some(RuntimeType::Described(descriptor));
                }
            }
        }
        None
    }

    /// Schema class of a runtime object (write direction)
    pub fn resolve_class(
        &self,
        object: &ObjectRef,
        main_standard: &str,
    ) -> Option<Arc<SchemaClass>> {
        self.resolve_class_of(object.type_name(), main_standard)
    }

    pub fn resolve_class_of(
        &self,
        type_name: &str,
        main_standard: &str,
    ) -> Option<Arc<SchemaClass>> {
        let key = (type_name.to_string(), main_standard.to_string());
        if let Some(hit) = self
            .write_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return hit.clone();
        }

        let nominal = match self.registry.types().get(type_name) {
            Some(descriptor) => descriptor
                .root_element
                .map(str::to_string)
                .unwrap_or_else(|| nominal_class_name(descriptor.name)),
            None => nominal_class_name(type_name.rsplit('.').next().unwrap_or(type_name)),
        };

        let schemas = self.registry.schemas();
        let mut resolved = None;
        for standard in self.registry.standards().compatible_standards(main_standard) {
            let found = schemas
                .class(&standard, &nominal)
                .or_else(|| schemas.class(&standard, &format!("TM_{}", nominal)))
                .or_else(|| {
                    nominal
                        .strip_prefix("Time")
                        .and_then(|rest| schemas.class(&standard, &format!("TM_{}", rest)))
                });
            if found.is_some() {
                resolved = found;
                break;
            }
        }

        match &resolved {
            Some(class) => tracing::debug!("Object type {} written as {}", type_name, class.key()),
            None => tracing::warn!(
                "No schema class for object type {} under main standard {}",
                type_name,
                main_standard
            ),
        }
        self.write_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, resolved.clone());
        resolved
    }

    /// Number of full namespace × transform searches run so far
    pub fn chain_evaluations(&self) -> usize {
        self.chain_evaluations.load(Ordering::Relaxed)
    }

    pub fn cached_types(&self) -> usize {
        self.read_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of the read cache as `(key, runtime name)` pairs, sorted by key
    pub fn export_cache(&self) -> Vec<(String, String)> {
        let cache = self.read_cache.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(String, String)> = cache
            .iter()
            .map(|(key, runtime)| (key.to_string(), runtime.name()))
            .collect();
        entries.sort();
        entries
    }

    /// Seed the read cache; entries naming unknown keys or types are skipped
    pub fn import_cache(&self, entries: &[(String, String)]) -> usize {
        let mut cache = self.read_cache.write().unwrap_or_else(PoisonError::into_inner);
        let mut imported = 0;
        for (raw_key, runtime_name) in entries {
            let key = match raw_key.parse::<CacheKey>() {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Skipping cache entry: {}", e);
                    continue;
                }
            };
            match self.runtime_by_name(runtime_name) {
                Some(runtime) => {
                    cache.insert(key, runtime);
                    imported += 1;
                }
                None => {
                    tracing::warn!("Skipping cache entry {}: unknown type {}", key, runtime_name)
                }
            }
        }
        imported
    }

    fn runtime_by_name(&self, name: &str) -> Option<RuntimeType> {
        match name.strip_prefix(PRIMITIVE_MARKER) {
            Some(kind) => kind.parse::<ValueKind>().ok().map(RuntimeType::Primitive),
            None => self.registry.types().get(name).map(RuntimeType::Described),
        }
    }
}

pub fn primitive_kind(class_name: &str) -> Option<ValueKind> {
    PRIMITIVES
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, kind)| *kind)
}

/// `DefaultCitation` → `Citation`, `ExtrinsicObjectType` → `ExtrinsicObject`
pub fn nominal_class_name(type_name: &str) -> String {
    let name = type_name
        .strip_prefix("Default")
        .or_else(|| type_name.strip_prefix("Abstract"))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(type_name);
    ["Impl", "Type", "Entry"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix).filter(|rest| !rest.is_empty()))
        .unwrap_or(name)
        .to_string()
}
