//! Runtime Type Catalog
//!
//! The explicit replacement for runtime reflection. Every runtime metadata
//! type is described once, at startup, by a [`TypeDescriptor`]:
//!
//! - its qualified name (`namespace.TypeName`) and optional root element
//! - how to construct a default instance
//! - an accessor table: one [`PropertyAccessor`] per runtime attribute,
//!   with typed getter/setter closures and the value kind they accept
//!
//! Code lists and enumerations are registered as descriptors without a
//! constructor; they only make a schema code list resolvable to a runtime
//! type.

use crate::models::object::{MetadataObject, ObjectRef};
use crate::models::values::{
    CodeValue, InternationalString, Locale, QualifiedName, UnitOfMeasure, UnlimitedInteger, Value,
    ValueKind,
};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Why a setter refused a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignError {
    #[error("Expected a {expected} value, got {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    #[error("Accessor applied to an object of type {0}")]
    WrongReceiver(&'static str),

    #[error("Value rejected: {0}")]
    Rejected(String),
}

impl AssignError {
    pub fn mismatch(expected: ValueKind, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.kind(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

type Getter = Arc<dyn Fn(&dyn MetadataObject) -> Vec<Value> + Send + Sync>;
type Setter = Arc<dyn Fn(&mut dyn MetadataObject, Value) -> Result<(), AssignError> + Send + Sync>;

/// Typed access to one runtime attribute
///
/// Setters on `Many` attributes append; setters on `One` attributes replace.
#[derive(Clone)]
pub struct PropertyAccessor {
    pub name: &'static str,
    pub kind: ValueKind,
    pub cardinality: Cardinality,
    /// Code list backing an `Enumeration`/`Code` attribute
    pub code_list: Option<&'static str>,
    getter: Getter,
    setter: Setter,
}

impl PropertyAccessor {
    pub fn new<T: MetadataObject>(
        name: &'static str,
        kind: ValueKind,
        cardinality: Cardinality,
        get: fn(&T) -> Vec<Value>,
        set: fn(&mut T, Value) -> Result<(), AssignError>,
    ) -> Self {
        Self {
            name,
            kind,
            cardinality,
            code_list: None,
            getter: Arc::new(move |object| {
                object
                    .as_any()
                    .downcast_ref::<T>()
                    .map(get)
                    .unwrap_or_default()
            }),
            setter: Arc::new(move |object, value| {
                let type_name = object.type_name();
                match object.as_any_mut().downcast_mut::<T>() {
                    Some(target) => set(target, value),
                    None => Err(AssignError::WrongReceiver(type_name)),
                }
            }),
        }
    }

    pub fn one<T: MetadataObject>(
        name: &'static str,
        kind: ValueKind,
        get: fn(&T) -> Vec<Value>,
        set: fn(&mut T, Value) -> Result<(), AssignError>,
    ) -> Self {
        Self::new(name, kind, Cardinality::One, get, set)
    }

    pub fn many<T: MetadataObject>(
        name: &'static str,
        kind: ValueKind,
        get: fn(&T) -> Vec<Value>,
        set: fn(&mut T, Value) -> Result<(), AssignError>,
    ) -> Self {
        Self::new(name, kind, Cardinality::Many, get, set)
    }

    pub fn with_code_list(mut self, code_list: &'static str) -> Self {
        self.code_list = Some(code_list);
        self
    }

    pub fn get(&self, object: &dyn MetadataObject) -> Vec<Value> {
        (self.getter)(object)
    }

    pub fn set(&self, object: &mut dyn MetadataObject, value: Value) -> Result<(), AssignError> {
        (self.setter)(object, value)
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("cardinality", &self.cardinality)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Object,
    CodeList,
    Enumeration,
}

pub struct TypeDescriptor {
    pub namespace: &'static str,
    pub name: &'static str,
    /// Declared root element, used to name the schema class on write
    pub root_element: Option<&'static str>,
    pub kind: TypeKind,
    constructor: Option<fn() -> ObjectRef>,
    properties: Vec<PropertyAccessor>,
}

impl TypeDescriptor {
    pub fn object(
        namespace: &'static str,
        name: &'static str,
        constructor: fn() -> ObjectRef,
    ) -> Self {
        Self {
            namespace,
            name,
            root_element: None,
            kind: TypeKind::Object,
            constructor: Some(constructor),
            properties: Vec::new(),
        }
    }

    pub fn code_list(namespace: &'static str, name: &'static str) -> Self {
        Self {
            namespace,
            name,
            root_element: None,
            kind: TypeKind::CodeList,
            constructor: None,
            properties: Vec::new(),
        }
    }

    pub fn enumeration(namespace: &'static str, name: &'static str) -> Self {
        Self {
            kind: TypeKind::Enumeration,
            ..Self::code_list(namespace, name)
        }
    }

    pub fn root_element(mut self, element: &'static str) -> Self {
        self.root_element = Some(element);
        self
    }

    pub fn property(mut self, accessor: PropertyAccessor) -> Self {
        self.properties.push(accessor);
        self
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Fresh default instance; `None` for code lists and enumerations
    pub fn instantiate(&self) -> Option<ObjectRef> {
        self.constructor.map(|construct| construct())
    }

    pub fn accessor(&self, name: &str) -> Option<&PropertyAccessor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn properties(&self) -> &[PropertyAccessor] {
        &self.properties
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.qualified_name())
            .field("kind", &self.kind)
            .field("properties", &self.properties.len())
            .finish()
    }
}

/// All runtime types, keyed by qualified name
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every builtin runtime model registered
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        crate::models::metadata::register_builtin_types(&mut catalog);
        catalog
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) {
        let name = descriptor.qualified_name();
        if self.types.insert(name.clone(), Arc::new(descriptor)).is_some() {
            tracing::debug!("Runtime type {} re-registered", name);
        }
    }

    pub fn get(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(qualified_name).cloned()
    }

    pub fn lookup(&self, namespace: &str, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.get(&format!("{}.{}", namespace, name))
    }

    /// Descriptor of a live object
    pub fn describe(&self, object: &dyn MetadataObject) -> Option<Arc<TypeDescriptor>> {
        self.get(object.type_name())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// Value extraction used by setters. Each returns a type mismatch for the
// wrong variant so the mapper can try coercion.

pub fn expect_text(value: Value) -> Result<String, AssignError> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(AssignError::mismatch(ValueKind::Text, &other)),
    }
}

pub fn expect_uri(value: Value) -> Result<String, AssignError> {
    match value {
        Value::Uri(uri) => Ok(uri),
        other => Err(AssignError::mismatch(ValueKind::Uri, &other)),
    }
}

pub fn expect_integer(value: Value) -> Result<i64, AssignError> {
    match value {
        Value::Integer(n) => Ok(n),
        other => Err(AssignError::mismatch(ValueKind::Integer, &other)),
    }
}

pub fn expect_decimal(value: Value) -> Result<f64, AssignError> {
    match value {
        Value::Decimal(n) => Ok(n),
        other => Err(AssignError::mismatch(ValueKind::Decimal, &other)),
    }
}

pub fn expect_boolean(value: Value) -> Result<bool, AssignError> {
    match value {
        Value::Boolean(b) => Ok(b),
        other => Err(AssignError::mismatch(ValueKind::Boolean, &other)),
    }
}

pub fn expect_date(value: Value) -> Result<DateTime<FixedOffset>, AssignError> {
    match value {
        Value::Date(date) => Ok(date),
        other => Err(AssignError::mismatch(ValueKind::Date, &other)),
    }
}

pub fn expect_locale(value: Value) -> Result<Locale, AssignError> {
    match value {
        Value::Locale(locale) => Ok(locale),
        other => Err(AssignError::mismatch(ValueKind::Locale, &other)),
    }
}

pub fn expect_free_text(value: Value) -> Result<InternationalString, AssignError> {
    match value {
        Value::FreeText(text) => Ok(text),
        other => Err(AssignError::mismatch(ValueKind::FreeText, &other)),
    }
}

pub fn expect_code(value: Value) -> Result<CodeValue, AssignError> {
    match value {
        Value::Code(code) => Ok(code),
        other => Err(AssignError::mismatch(ValueKind::Code, &other)),
    }
}

pub fn expect_enumeration(value: Value) -> Result<CodeValue, AssignError> {
    match value {
        Value::Enumeration(member) => Ok(member),
        other => Err(AssignError::mismatch(ValueKind::Enumeration, &other)),
    }
}

pub fn expect_unit(value: Value) -> Result<UnitOfMeasure, AssignError> {
    match value {
        Value::Unit(unit) => Ok(unit),
        other => Err(AssignError::mismatch(ValueKind::Unit, &other)),
    }
}

pub fn expect_qualified_name(value: Value) -> Result<QualifiedName, AssignError> {
    match value {
        Value::QualifiedName(name) => Ok(name),
        other => Err(AssignError::mismatch(ValueKind::QualifiedName, &other)),
    }
}

pub fn expect_unlimited(value: Value) -> Result<UnlimitedInteger, AssignError> {
    match value {
        Value::UnlimitedInteger(n) => Ok(n),
        other => Err(AssignError::mismatch(ValueKind::UnlimitedInteger, &other)),
    }
}

/// Object reference, optionally checked against the expected runtime type
pub fn expect_object(
    value: Value,
    expected: Option<&'static str>,
) -> Result<ObjectRef, AssignError> {
    match value {
        Value::Object(object) => match expected {
            Some(type_name) if object.type_name() != type_name => Err(AssignError::Rejected(
                format!("expected {}, got {}", type_name, object.type_name()),
            )),
            _ => Ok(object),
        },
        other => Err(AssignError::mismatch(ValueKind::Object, &other)),
    }
}

// Getter helpers

pub fn opt<T: Clone>(value: &Option<T>, wrap: fn(T) -> Value) -> Vec<Value> {
    value.iter().cloned().map(wrap).collect()
}

pub fn all<T: Clone>(values: &[T], wrap: fn(T) -> Value) -> Vec<Value> {
    values.iter().cloned().map(wrap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Sample {
        title: Option<String>,
        keywords: Vec<String>,
    }

    crate::metadata_object!(Sample, "test.Sample");

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::object("test", "Sample", || ObjectRef::new(Sample::default()))
            .root_element("SampleRoot")
            .property(PropertyAccessor::one::<Sample>(
                "title",
                ValueKind::Text,
                |s| opt(&s.title, Value::Text),
                |s, v| {
                    s.title = Some(expect_text(v)?);
                    Ok(())
                },
            ))
            .property(PropertyAccessor::many::<Sample>(
                "keywords",
                ValueKind::Text,
                |s| all(&s.keywords, Value::Text),
                |s, v| {
                    s.keywords.push(expect_text(v)?);
                    Ok(())
                },
            ))
    }

    #[test]
    fn test_accessors_read_and_write_through_trait_objects() {
        let descriptor = descriptor();
        let object = descriptor.instantiate().unwrap();

        {
            let mut guard = object.write();
            let title = descriptor.accessor("title").unwrap();
            title.set(&mut *guard, Value::text("Lakes")).unwrap();
            let keywords = descriptor.accessor("keywords").unwrap();
            keywords.set(&mut *guard, Value::text("water")).unwrap();
            keywords.set(&mut *guard, Value::text("ice")).unwrap();
        }

        let guard = object.read();
        assert_eq!(
            descriptor.accessor("title").unwrap().get(&*guard),
            vec![Value::text("Lakes")]
        );
        assert_eq!(descriptor.accessor("keywords").unwrap().get(&*guard).len(), 2);
    }

    #[test]
    fn test_setter_reports_type_mismatch() {
        let descriptor = descriptor();
        let object = descriptor.instantiate().unwrap();
        let mut guard = object.write();

        let result = descriptor
            .accessor("title")
            .unwrap()
            .set(&mut *guard, Value::Integer(3));
        assert_eq!(
            result,
            Err(AssignError::TypeMismatch {
                expected: ValueKind::Text,
                found: ValueKind::Integer
            })
        );
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = TypeCatalog::new();
        catalog.register(descriptor());
        catalog.register(TypeDescriptor::code_list("test", "Role"));

        assert!(catalog.lookup("test", "Sample").is_some());
        assert_eq!(catalog.lookup("test", "Role").unwrap().kind, TypeKind::CodeList);
        assert!(catalog.lookup("other", "Sample").is_none());

        let object = ObjectRef::new(Sample::default());
        let described = catalog.describe(&*object.read()).unwrap();
        assert_eq!(described.root_element, Some("SampleRoot"));
    }
}
