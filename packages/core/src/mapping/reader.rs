//! Tree Materializer
//!
//! Builds a typed object graph from a [`Record`]. Dispatch is on the node
//! payload and the runtime type its schema class resolves to:
//!
//! | Node        | Runtime type           | Result                              |
//! |-------------|------------------------|-------------------------------------|
//! | `Text`      | primitive              | parsed scalar                       |
//! | `Text`      | code list/enumeration  | code looked up in the schema list   |
//! | `Composite` | primitive              | free text, locale, qname, unlimited |
//! | `Composite` | object type            | new instance, children assigned     |
//! | `Linked`    | -                      | the object produced for the target  |
//!
//! Objects are registered in the call's [`IdentityTracker`] before their
//! children are read, so links back to an ancestor resolve to the instance
//! under construction.
//!
//! ## Attribute assignment
//!
//! For each materialized child, in order:
//!
//! 1. attribute map insertion (plural spellings retried when enabled)
//! 2. the accessor named by the corrected attribute name
//! 3. the internal id / external link slots
//! 4. the accessor again, after coercion (list → elements, text → unit or
//!    code, integer → decimal...)
//!
//! A child that fits none of these is dropped and reported; the object
//! itself is still returned.

use crate::config::MappingOptions;
use crate::mapping::corrections::{self, SpecialSlot};
use crate::mapping::error::{FailureReason, MappingReport};
use crate::mapping::literals;
use crate::mapping::tracker::IdentityTracker;
use crate::models::{
    ClassKey, CodeValue, InternationalString, Locale, NodeId, NodeKind, ObjectRef, QualifiedName,
    Record, SchemaRepository, UnitOfMeasure, UnlimitedInteger, Value, ValueKind, ValueNode,
};
use crate::registry::{
    AssignError, Cardinality, PropertyAccessor, RuntimeType, TypeDescriptor, TypeKind,
    TypeResolver,
};
use std::collections::{HashMap, HashSet};

/// Result of reading one record
#[derive(Debug)]
pub struct ReadOutcome {
    /// `None` when the root has no schema class or resolves to no object type
    pub object: Option<ObjectRef>,
    pub report: MappingReport,
}

/// One materialize call; build a new one per record
pub struct Materializer<'a> {
    resolver: &'a TypeResolver,
    options: &'a MappingOptions,
    linked_records: Option<&'a HashMap<String, Record>>,
    tracker: IdentityTracker,
    // Link targets being followed; a target seen twice is a link loop.
    following: HashSet<(String, NodeId)>,
    report: MappingReport,
}

impl<'a> Materializer<'a> {
    pub fn new(resolver: &'a TypeResolver, options: &'a MappingOptions) -> Self {
        Self {
            resolver,
            options,
            linked_records: None,
            tracker: IdentityTracker::new(),
            following: HashSet::new(),
            report: MappingReport::new(),
        }
    }

    /// Records that links of the materialized record may point into
    pub fn with_linked_records(mut self, records: &'a HashMap<String, Record>) -> Self {
        self.linked_records = Some(records);
        self
    }

    /// Materialize the root of `record`
    pub fn read(mut self, record: &Record) -> ReadOutcome {
        let object = match record.root.and_then(|root| self.materialize(record, root)) {
            Some(Value::Object(object)) => Some(object),
            Some(other) => {
                tracing::debug!(
                    "Root of {} is a {} value, not an object",
                    record.identifier,
                    other.kind()
                );
                None
            }
            None => None,
        };
        if object.is_none() {
            tracing::debug!("Record {} materialized to nothing", record.identifier);
        }
        ReadOutcome {
            object,
            report: self.report,
        }
    }

    /// Materialize one node; `None` means the node contributes nothing
    pub fn materialize(&mut self, record: &Record, id: NodeId) -> Option<Value> {
        let node = record.node(id)?;
        if let NodeKind::Linked(target) = &node.kind {
            let target_record = target.record.as_deref().unwrap_or(&record.identifier);
            return self.follow_link(record, node, target_record, target.node);
        }
        if let Some(hit) = self.tracker.lookup_read(&record.identifier, id) {
            return Some(hit);
        }

        let Some(class) = node.schema_class.as_ref() else {
            tracing::debug!("Node {} of {} has no schema class", id, record.identifier);
            return None;
        };
        let Some(runtime) =
            self.resolver
                .resolve_type(self.options.mode, &class.standard, &class.name)
        else {
            self.drop_node(
                node,
                FailureReason::UnresolvedType,
                format!("no runtime type for {}", class),
            );
            return None;
        };

        match (&node.kind, runtime) {
            (NodeKind::Text(literal), RuntimeType::Primitive(kind)) => {
                self.parse_leaf(node, kind, literal)
            }
            (NodeKind::Text(literal), RuntimeType::Described(descriptor)) => {
                self.parse_code(node, class, &descriptor, literal)
            }
            (NodeKind::Composite, RuntimeType::Primitive(kind)) => {
                self.assemble(record, node, kind)
            }
            (NodeKind::Composite, RuntimeType::Described(descriptor)) => {
                self.build_object(record, node, &descriptor)
            }
            (NodeKind::Linked(_), _) => None,
        }
    }

    pub fn report(&self) -> &MappingReport {
        &self.report
    }

    fn follow_link(
        &mut self,
        record: &Record,
        node: &ValueNode,
        target_record: &str,
        target: NodeId,
    ) -> Option<Value> {
        if let Some(hit) = self.tracker.lookup_read(target_record, target) {
            tracing::debug!("Link {} resolved to {}{}", node.id, target_record, target);
            return Some(hit);
        }
        let key = (target_record.to_string(), target);
        if !self.following.insert(key.clone()) {
            self.drop_node(
                node,
                FailureReason::UnresolvedType,
                format!("link loop through {}{}", target_record, target),
            );
            return None;
        }

        let value = if target_record == record.identifier {
            self.materialize(record, target)
        } else {
            let linked = self.linked_records;
            match linked.and_then(|records| records.get(target_record)) {
                Some(other) => self.materialize(other, target),
                None => {
                    self.drop_node(
                        node,
                        FailureReason::UnresolvedType,
                        format!("linked record {} is not loaded", target_record),
                    );
                    None
                }
            }
        };
        self.following.remove(&key);
        value
    }

    fn parse_leaf(&mut self, node: &ValueNode, kind: ValueKind, literal: &str) -> Option<Value> {
        match literals::parse_literal(kind, literal, self.options.utc_offset) {
            Ok(value) => value,
            Err(detail) => {
                self.drop_node(node, FailureReason::MalformedLiteral, detail);
                None
            }
        }
    }

    /// Code lists are stored by numeric code; enumerations also accept names
    fn parse_code(
        &mut self,
        node: &ValueNode,
        class: &ClassKey,
        descriptor: &TypeDescriptor,
        literal: &str,
    ) -> Option<Value> {
        if descriptor.kind == TypeKind::Object {
            self.drop_node(
                node,
                FailureReason::MalformedLiteral,
                format!("{} cannot be read from a literal", descriptor.qualified_name()),
            );
            return None;
        }
        let Some(list) = self
            .resolver
            .registry()
            .schemas()
            .get(class)
            .filter(|c| c.is_codelist)
        else {
            self.drop_node(
                node,
                FailureReason::UnresolvedType,
                format!("{} has no code list definition", class),
            );
            return None;
        };

        let trimmed = literal.trim();
        let entry = match trimmed.parse::<i32>() {
            Ok(code) => list.code_for(code),
            Err(_) if descriptor.kind == TypeKind::Enumeration => list.entry_named(trimmed),
            Err(_) => {
                self.drop_node(
                    node,
                    FailureReason::MalformedLiteral,
                    format!("'{}' is not a numeric {} code", literal, list.name),
                );
                return None;
            }
        };
        let Some(entry) = entry else {
            self.drop_node(
                node,
                FailureReason::UnmatchedCode,
                format!("'{}' is not a member of {}", literal, list.name),
            );
            return None;
        };

        let value = CodeValue::new(&list.name, &entry.name);
        Some(match descriptor.kind {
            TypeKind::Enumeration => Value::Enumeration(value),
            _ => Value::Code(value),
        })
    }

    /// Composite forms of primitive values, each with a fixed child layout
    fn assemble(&mut self, record: &Record, node: &ValueNode, kind: ValueKind) -> Option<Value> {
        let id = node.id;
        let missing = |part: &str| format!("{} without {}", kind, part);

        let value = match kind {
            ValueKind::FreeText => {
                let Some(base) = record.child_text(id, "value") else {
                    self.drop_node(node, FailureReason::MalformedLiteral, missing("value"));
                    return None;
                };
                let mut text = InternationalString::new(base);
                for group in record.children_by_property(id, "textGroup") {
                    let locale = record
                        .child_text(group.id, "locale")
                        .and_then(literals::parse_locale_entry);
                    match (locale, record.child_text(group.id, "value")) {
                        (Some(locale), Some(translated)) => {
                            text = text.with_translation(locale, translated);
                        }
                        _ => self.report.drop_attribute(
                            group.path.to_string(),
                            "textGroup",
                            FailureReason::MalformedLiteral,
                            "localized entry without locale or value",
                        ),
                    }
                }
                Value::FreeText(text)
            }
            ValueKind::Locale => {
                let Some(language) = record.child_text(id, "languageCode") else {
                    self.drop_node(node, FailureReason::MalformedLiteral, missing("languageCode"));
                    return None;
                };
                Value::Locale(match record.child_text(id, "country") {
                    Some(country) => Locale::with_country(language.trim(), country.trim()),
                    None => Locale::new(language.trim()),
                })
            }
            ValueKind::QualifiedName => {
                let Some(local) = record.child_text(id, "localPart") else {
                    self.drop_node(node, FailureReason::MalformedLiteral, missing("localPart"));
                    return None;
                };
                let namespace = record.child_text(id, "namespaceURI").map(str::to_string);
                Value::QualifiedName(QualifiedName::new(namespace, local))
            }
            ValueKind::UnlimitedInteger => {
                let infinite = record
                    .child_text(id, "isInfinite")
                    .and_then(|flag| literals::parse_boolean(flag.trim()).ok().flatten())
                    .unwrap_or(false);
                if infinite {
                    Value::UnlimitedInteger(UnlimitedInteger::infinite())
                } else {
                    match record.child_text(id, "value").map(|v| v.trim().parse::<i64>()) {
                        Some(Ok(n)) => Value::UnlimitedInteger(UnlimitedInteger::finite(n)),
                        _ => {
                            let detail = missing("a numeric value");
                            self.drop_node(node, FailureReason::MalformedLiteral, detail);
                            return None;
                        }
                    }
                }
            }
            other => {
                self.drop_node(
                    node,
                    FailureReason::MalformedLiteral,
                    format!("{} values have no composite form", other),
                );
                return None;
            }
        };
        Some(value)
    }

    fn build_object(
        &mut self,
        record: &Record,
        node: &ValueNode,
        descriptor: &TypeDescriptor,
    ) -> Option<Value> {
        let Some(object) = descriptor.instantiate() else {
            self.drop_node(
                node,
                FailureReason::UnresolvedType,
                format!("{} is not an object type", descriptor.qualified_name()),
            );
            return None;
        };

        let value = Value::Object(object.clone());
        self.tracker
            .begin_read(&record.identifier, node.id, value.clone());

        for child in record.children(node.id) {
            let Some(child_value) = self.materialize(record, child.id) else {
                continue;
            };
            self.assign(&object, descriptor, child, child_value);
        }

        self.tracker.complete_read(&record.identifier, node.id);
        Some(value)
    }

    fn assign(
        &mut self,
        object: &ObjectRef,
        descriptor: &TypeDescriptor,
        child: &ValueNode,
        value: Value,
    ) {
        let Some(property) = child.property() else {
            return;
        };
        let owner = child
            .path
            .segments()
            .last()
            .map(|segment| segment.class_name.as_str())
            .unwrap_or_default();
        let attribute = corrections::runtime_attribute(owner, property);
        let mut guard = object.write();

        if let Some(map) = guard.attribute_map_mut() {
            let mut names = vec![attribute.to_string()];
            if self.options.pluralize_attribute_names {
                names.extend(corrections::plural_variants(attribute));
            }
            if names
                .iter()
                .any(|name| map.insert(name, value.clone()).is_ok())
            {
                return;
            }
        }

        let accessor = descriptor.accessor(attribute);
        let mismatched = match accessor.map(|a| a.set(&mut *guard, value.clone())) {
            Some(Ok(())) => return,
            Some(Err(AssignError::TypeMismatch { .. })) => accessor,
            Some(Err(error)) => {
                drop(guard);
                self.drop_node(child, FailureReason::UnresolvedAccessor, error.to_string());
                return;
            }
            None => None,
        };

        if let (Some(slot), Some(text)) = (corrections::special_slot(property), value.as_str()) {
            let stored = match slot {
                SpecialSlot::InternalId => guard.set_internal_id(text.to_string()),
                SpecialSlot::ExternalLink => guard.set_external_link(text.to_string()),
            };
            if stored {
                return;
            }
        }

        if let Some(accessor) = mismatched {
            let found = value.kind();
            let schemas = self.resolver.registry().schemas();
            let applied = coerce(schemas, accessor, value).map(|values| {
                values
                    .into_iter()
                    .all(|coerced| accessor.set(&mut *guard, coerced).is_ok())
            });
            drop(guard);
            match applied {
                Some(true) => {}
                Some(false) => self.drop_node(
                    child,
                    FailureReason::MalformedLiteral,
                    format!("coerced {} value rejected by '{}'", found, attribute),
                ),
                None => self.drop_node(
                    child,
                    FailureReason::MalformedLiteral,
                    format!("cannot convert {} to {} for '{}'", found, accessor.kind, attribute),
                ),
            }
            return;
        }

        drop(guard);
        self.drop_node(
            child,
            FailureReason::UnresolvedAccessor,
            format!("{} has no attribute '{}'", object.type_name(), attribute),
        );
    }

    fn drop_node(&mut self, node: &ValueNode, reason: FailureReason, detail: String) {
        let attribute = node
            .property()
            .map(str::to_string)
            .or_else(|| node.schema_class.as_ref().map(|c| c.name.clone()))
            .unwrap_or_else(|| "root".to_string());
        self.report
            .drop_attribute(node.path.to_string(), attribute, reason, detail);
    }
}

/// Values to hand an accessor that refused `value` as-is
fn coerce(
    schemas: &SchemaRepository,
    accessor: &PropertyAccessor,
    value: Value,
) -> Option<Vec<Value>> {
    let single = |value: Value| Some(vec![value]);
    match (accessor.kind, value) {
        (_, Value::List(items)) => Some(match accessor.cardinality {
            Cardinality::Many => items,
            Cardinality::One => items.into_iter().take(1).collect(),
        }),
        (ValueKind::Unit, Value::Text(text)) => {
            UnitOfMeasure::parse(text.trim()).map(|unit| vec![Value::Unit(unit)])
        }
        (kind @ (ValueKind::Enumeration | ValueKind::Code), Value::Text(text)) => {
            let list = schemas.find_code_list(accessor.code_list?)?;
            let entry = list.entry_named(text.trim())?;
            let code = CodeValue::new(&list.name, &entry.name);
            single(if kind == ValueKind::Enumeration {
                Value::Enumeration(code)
            } else {
                Value::Code(code)
            })
        }
        (ValueKind::Decimal, Value::Integer(n)) => single(Value::Decimal(n as f64)),
        (ValueKind::Text, Value::Uri(uri)) => single(Value::Text(literals::restore_uri(&uri))),
        (ValueKind::Text, Value::FreeText(text)) => single(Value::Text(text.value)),
        (ValueKind::FreeText, Value::Text(text)) => {
            single(Value::FreeText(InternationalString::new(text)))
        }
        (ValueKind::Uri, Value::Text(text)) => {
            literals::parse_uri(&text).ok().map(|uri| vec![Value::Uri(uri)])
        }
        (ValueKind::Text, Value::Locale(locale)) => single(Value::Text(locale.tag())),
        _ => None,
    }
}
