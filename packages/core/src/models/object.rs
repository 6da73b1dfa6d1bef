//! Typed Metadata Objects
//!
//! Runtime metadata types (ISO 19115 metadata, Dublin Core records, Ebrim
//! registry objects, SensorML systems...) implement [`MetadataObject`].
//! Instances are shared through [`ObjectRef`] so that one object can appear
//! several times in a graph, including as its own descendant.
//!
//! Properties are reached through two capabilities:
//!
//! - A per-type accessor table registered in the
//!   [`TypeCatalog`](crate::registry::TypeCatalog)
//! - An optional [`AttributeMap`] view for types that store their
//!   attributes in a generic map (Dublin Core records)

use crate::models::values::Value;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use thiserror::Error;

/// Behaviour shared by every runtime metadata type
pub trait MetadataObject: Any + Send + Sync {
    /// Qualified runtime type name (`namespace.TypeName`)
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn attribute_map(&self) -> Option<&AttributeMap> {
        None
    }

    fn attribute_map_mut(&mut self) -> Option<&mut AttributeMap> {
        None
    }

    /// Internal identifier slot (`id`/`uuid` attributes)
    fn internal_id(&self) -> Option<&str> {
        None
    }

    /// Returns false when the type has no internal identifier slot
    fn set_internal_id(&mut self, _id: String) -> bool {
        false
    }

    /// External link slot (`xlink:href`)
    fn external_link(&self) -> Option<&str> {
        None
    }

    /// Returns false when the type has no external link slot
    fn set_external_link(&mut self, _href: String) -> bool {
        false
    }
}

/// Implements the boilerplate part of [`MetadataObject`] for a struct
///
/// Extra trait items (attribute map, identifier slots) can follow the type name.
#[macro_export]
macro_rules! metadata_object {
    ($ty:ty, $name:expr $(, $($extra:tt)*)?) => {
        impl $crate::models::MetadataObject for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            $($($extra)*)?
        }
    };
}

/// Shared, lockable handle to a metadata object
///
/// Equality and hashing use object identity, which is what the identity
/// tracker and the linkable entity map key on. The type name is kept next
/// to the lock so it can be read while the object is write-locked.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn MetadataObject>>, &'static str);

impl ObjectRef {
    pub fn new<T: MetadataObject>(object: T) -> Self {
        let type_name = object.type_name();
        Self(Arc::new(RwLock::new(object)), type_name)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, dyn MetadataObject> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, dyn MetadataObject> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Address-based identity, stable while any handle is alive
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.identity() == other.identity()
    }

    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0), self.1)
    }

    pub fn type_name(&self) -> &'static str {
        self.1
    }

    /// Run `f` against the concrete type, if the object is a `T`
    pub fn with<T: MetadataObject, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.read();
        guard.as_any().downcast_ref::<T>().map(f)
    }

    /// Mutable variant of [`ObjectRef::with`]
    pub fn with_mut<T: MetadataObject, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.write();
        guard.as_any_mut().downcast_mut::<T>().map(f)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl std::hash::Hash for ObjectRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

// Graphs may be cyclic, so Debug never descends into the object.
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}@{:#x})", self.1, self.identity())
    }
}

/// Non-owning handle, used by long-lived maps that must not keep graphs alive
#[derive(Clone)]
pub struct WeakObjectRef(Weak<RwLock<dyn MetadataObject>>, &'static str);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(|inner| ObjectRef(inner, self.1))
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakObjectRef(alive: {})", self.0.strong_count() > 0)
    }
}

/// Rejected attribute-map insertion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Attribute '{name}' is not accepted by this attribute map")]
pub struct UnknownAttribute {
    pub name: String,
}

/// Generic attribute storage for types without a fixed field layout
///
/// Only names listed in `accepted` can be inserted; values keep their
/// insertion order per attribute.
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    accepted: &'static [&'static str],
    entries: Vec<(String, Vec<Value>)>,
}

impl AttributeMap {
    pub fn new(accepted: &'static [&'static str]) -> Self {
        Self {
            accepted,
            entries: Vec::new(),
        }
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.accepted.contains(&name)
    }

    pub fn insert(&mut self, name: &str, value: Value) -> Result<(), UnknownAttribute> {
        if !self.accepts(name) {
            return Err(UnknownAttribute {
                name: name.to_string(),
            });
        }
        match self.entries.iter_mut().find(|(key, _)| key.as_str() == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name.to_string(), vec![value])),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> &[Value] {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// First value of an attribute, as text
    pub fn first_text(&self, name: &str) -> Option<&str> {
        self.get(name).first().and_then(Value::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        self_ref: Option<ObjectRef>,
    }

    crate::metadata_object!(Probe, "test.Probe");

    #[test]
    fn test_object_ref_identity() {
        let a = ObjectRef::new(Probe::default());
        let b = a.clone();
        let c = ObjectRef::new(Probe::default());

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_debug_does_not_follow_cycles() {
        let a = ObjectRef::new(Probe::default());
        let inner = a.clone();
        a.with_mut(|p: &mut Probe| p.self_ref = Some(inner));

        let rendered = format!("{:?}", a);
        assert!(rendered.starts_with("ObjectRef(test.Probe@"));
    }

    #[test]
    fn test_weak_ref_expires() {
        let a = ObjectRef::new(Probe::default());
        let weak = a.downgrade();
        assert!(weak.upgrade().is_some());
        drop(a);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_attribute_map_rejects_unknown_names() {
        let mut map = AttributeMap::new(&["title", "subjects"]);

        assert!(map.insert("title", Value::text("Lakes")).is_ok());
        assert!(map.insert("subjects", Value::text("water")).is_ok());
        assert!(map.insert("subjects", Value::text("hydrology")).is_ok());
        assert_eq!(
            map.insert("subject", Value::text("x")),
            Err(UnknownAttribute {
                name: "subject".to_string()
            })
        );

        assert_eq!(map.get("subjects").len(), 2);
        assert_eq!(map.first_text("title"), Some("Lakes"));
        assert!(map.get("missing").is_empty());
    }
}
