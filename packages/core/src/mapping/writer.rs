//! Graph Serializer
//!
//! Rebuilds a [`Record`] from a typed object graph. The root object's
//! schema class is resolved against the main standard; each property of
//! the class (superclass properties first) is read through the object's
//! attribute map, accessor table or identifier slots and written under a
//! child [`Path`].
//!
//! Objects are written once per call. A second occurrence (shared
//! sub-object or cycle) becomes a `Linked` node pointing at the first one;
//! an object already persisted in another record, known through
//! [`LinkableEntities`], becomes a cross-record link.
//!
//! Literal forms:
//!
//! - code list members → numeric code (member looked up by name)
//! - enumeration members → lower-cased name
//! - dates → `yyyy-MM-ddT00:00:00<tz>` at midnight, full timestamp otherwise
//! - URIs → `%5C` escapes restored to backslashes

use crate::config::MappingOptions;
use crate::mapping::corrections::{self, SpecialSlot};
use crate::mapping::error::{FailureReason, MappingError, MappingReport};
use crate::mapping::literals;
use crate::mapping::tracker::{IdentityTracker, LinkableEntities};
use crate::models::core_schemas::ISO_19103;
use crate::models::{
    ClassKey, CodeValue, InternationalString, LinkTarget, Locale, NodeId, NodeKind, ObjectRef,
    Path, QualifiedName, Record, SchemaClass, UnlimitedInteger, Value, ValueKind,
};
use crate::registry::resolver::primitive_kind;
use crate::registry::{TypeDescriptor, TypeResolver};
use std::sync::Arc;

/// Result of writing one object graph
#[derive(Debug)]
pub struct WriteOutcome {
    pub record: Record,
    pub report: MappingReport,
    /// Linkable objects written in full by this call, with their nodes
    pub linkables: Vec<(ObjectRef, NodeId)>,
}

/// One serialize call; build a new one per record
pub struct Serializer<'a> {
    resolver: &'a TypeResolver,
    options: &'a MappingOptions,
    main_standard: &'a str,
    linkables: Option<&'a LinkableEntities>,
    tracker: IdentityTracker,
    report: MappingReport,
    record: Record,
    written_linkables: Vec<(ObjectRef, NodeId)>,
}

impl<'a> Serializer<'a> {
    /// Serializer filling `record`, which must not have a root yet
    pub fn new(resolver: &'a TypeResolver, options: &'a MappingOptions, record: Record) -> Self {
        Self {
            resolver,
            options,
            main_standard: &options.main_standard,
            linkables: None,
            tracker: IdentityTracker::new(),
            report: MappingReport::new(),
            record,
            written_linkables: Vec::new(),
        }
    }

    /// Override the configured main standard for this call
    pub fn main_standard(mut self, standard: &'a str) -> Self {
        self.main_standard = standard;
        self
    }

    pub fn with_linkables(mut self, linkables: &'a LinkableEntities) -> Self {
        self.linkables = Some(linkables);
        self
    }

    /// Write `root` and everything reachable from it
    pub fn write(mut self, root: &ObjectRef) -> Result<WriteOutcome, MappingError> {
        let class = self
            .resolver
            .resolve_class(root, self.main_standard)
            .ok_or_else(|| MappingError::unresolved_root(root.type_name(), self.main_standard))?;

        let path = Path::root(&class.standard, &class.name);
        let id = self
            .record
            .add_root(path.clone(), Some(class.key()), NodeKind::Composite);
        self.write_object(root, &class, id, &path);

        tracing::debug!(
            "Serialized {} into {} nodes of record {}",
            root.type_name(),
            self.record.len(),
            self.record.identifier
        );
        Ok(WriteOutcome {
            record: self.record,
            report: self.report,
            linkables: self.written_linkables,
        })
    }

    /// Serialize one property value under `parent`; returns the nodes added
    pub fn serialize(
        &mut self,
        parent: NodeId,
        path: &Path,
        declared: &ClassKey,
        value: &Value,
    ) -> Vec<NodeId> {
        let declared_kind = primitive_kind(&declared.name);
        let added = match value {
            Value::List(items) => {
                return items
                    .iter()
                    .flat_map(|item| self.serialize(parent, path, declared, item))
                    .collect()
            }
            Value::Object(object) => self.serialize_object(parent, path, declared, object),
            Value::FreeText(text) if declared_kind == Some(ValueKind::FreeText) => {
                self.free_text(parent, path, declared, text)
            }
            Value::Locale(locale) if declared.name == "PT_Locale" => {
                self.locale_pair(parent, path, declared, locale)
            }
            Value::QualifiedName(name) if declared_kind == Some(ValueKind::QualifiedName) => {
                self.qualified_name(parent, path, declared, name)
            }
            Value::UnlimitedInteger(n) if declared_kind == Some(ValueKind::UnlimitedInteger) => {
                self.unlimited(parent, path, declared, n)
            }
            Value::Code(code) | Value::Enumeration(code) => {
                self.code(parent, path, declared, code, matches!(value, Value::Enumeration(_)))
            }
            scalar => {
                let text = self.literal(scalar);
                self.leaf(parent, path.clone(), declared.clone(), text)
            }
        };
        added.into_iter().collect()
    }

    fn write_object(
        &mut self,
        object: &ObjectRef,
        class: &Arc<SchemaClass>,
        id: NodeId,
        path: &Path,
    ) {
        self.tracker.begin_write(object, id);
        if self.options.is_linkable(&class.name) {
            self.written_linkables.push((object.clone(), id));
        }

        let resolver = self.resolver;
        let descriptor = resolver.registry().types().get(object.type_name());
        for (owner, property) in resolver.registry().schemas().all_properties(class) {
            let values =
                self.property_values(object, descriptor.as_deref(), &owner.name, &property.name);
            if values.is_empty() {
                continue;
            }
            let child_path = path.child(&owner.standard, &owner.name, &property.name);
            for value in &values {
                self.serialize(id, &child_path, &property.type_class, value);
            }
        }

        self.tracker.complete_write(object);
    }

    /// Current values of `owner.property`, read through the same naming
    /// rules the reader assigns with
    fn property_values(
        &self,
        object: &ObjectRef,
        descriptor: Option<&TypeDescriptor>,
        owner: &str,
        property: &str,
    ) -> Vec<Value> {
        let attribute = corrections::runtime_attribute(owner, property);
        let guard = object.read();

        if let Some(map) = guard.attribute_map() {
            let mut names = vec![attribute.to_string()];
            if self.options.pluralize_attribute_names {
                names.extend(corrections::plural_variants(attribute));
            }
            if let Some(name) = names.iter().find(|name| map.accepts(name)) {
                return map.get(name).to_vec();
            }
        }

        if let Some(accessor) = descriptor.and_then(|d| d.accessor(attribute)) {
            return accessor.get(&*guard);
        }

        let slot = match corrections::special_slot(property) {
            Some(SpecialSlot::InternalId) => guard.internal_id(),
            Some(SpecialSlot::ExternalLink) => guard.external_link(),
            None => {
                tracing::trace!(
                    "{} has no attribute for {}.{}",
                    object.type_name(),
                    owner,
                    property
                );
                None
            }
        };
        slot.map(|text| vec![Value::text(text)]).unwrap_or_default()
    }

    fn serialize_object(
        &mut self,
        parent: NodeId,
        path: &Path,
        declared: &ClassKey,
        object: &ObjectRef,
    ) -> Option<NodeId> {
        if let Some((record, node)) = self.linkables.and_then(|l| l.lookup(object)) {
            if record != self.record.identifier {
                let class = self
                    .resolver
                    .resolve_class(object, self.main_standard)
                    .map(|c| c.key())
                    .unwrap_or_else(|| declared.clone());
                tracing::debug!("{:?} linked to record {}{}", object, record, node);
                return self.add(
                    parent,
                    path.clone(),
                    Some(class),
                    NodeKind::Linked(LinkTarget::external(record, node)),
                );
            }
        }

        if let Some(target) = self.tracker.lookup_write(object) {
            let class = self
                .record
                .node(target)
                .and_then(|node| node.schema_class.clone());
            tracing::debug!("{:?} already written as {}", object, target);
            return self.add(
                parent,
                path.clone(),
                class,
                NodeKind::Linked(LinkTarget::local(target)),
            );
        }

        let Some(class) = self.resolver.resolve_class(object, self.main_standard) else {
            self.report.drop_attribute(
                path.to_string(),
                path.property().unwrap_or_default(),
                FailureReason::UnresolvedType,
                format!("no schema class for {}", object.type_name()),
            );
            return None;
        };
        let id = self.add(parent, path.clone(), Some(class.key()), NodeKind::Composite)?;
        self.write_object(object, &class, id, path);
        Some(id)
    }

    /// Base value, then one `textGroup` (value, `#locale-<tag>`) per translation
    fn free_text(
        &mut self,
        parent: NodeId,
        path: &Path,
        declared: &ClassKey,
        text: &InternationalString,
    ) -> Option<NodeId> {
        let id = self.add(parent, path.clone(), Some(declared.clone()), NodeKind::Composite)?;
        self.part(id, path, declared, "value", text.value.clone());

        let group_class = self.property_class(declared, "textGroup");
        let group_path = path.child(&declared.standard, &declared.name, "textGroup");
        for (locale, translated) in &text.translations {
            let Some(group) = self.add(
                id,
                group_path.clone(),
                Some(group_class.clone()),
                NodeKind::Composite,
            ) else {
                continue;
            };
            self.part(group, &group_path, &group_class, "value", translated.clone());
            self.part(group, &group_path, &group_class, "locale", literals::locale_entry(locale));
        }
        Some(id)
    }

    fn locale_pair(
        &mut self,
        parent: NodeId,
        path: &Path,
        declared: &ClassKey,
        locale: &Locale,
    ) -> Option<NodeId> {
        let id = self.add(parent, path.clone(), Some(declared.clone()), NodeKind::Composite)?;
        self.part(id, path, declared, "languageCode", locale.language.clone());
        if let Some(country) = &locale.country {
            self.part(id, path, declared, "country", country.clone());
        }
        Some(id)
    }

    fn qualified_name(
        &mut self,
        parent: NodeId,
        path: &Path,
        declared: &ClassKey,
        name: &QualifiedName,
    ) -> Option<NodeId> {
        let id = self.add(parent, path.clone(), Some(declared.clone()), NodeKind::Composite)?;
        if let Some(namespace) = &name.namespace {
            self.part(id, path, declared, "namespaceURI", namespace.clone());
        }
        self.part(id, path, declared, "localPart", name.local_part.clone());
        Some(id)
    }

    fn unlimited(
        &mut self,
        parent: NodeId,
        path: &Path,
        declared: &ClassKey,
        n: &UnlimitedInteger,
    ) -> Option<NodeId> {
        let id = self.add(parent, path.clone(), Some(declared.clone()), NodeKind::Composite)?;
        if !n.infinite {
            self.part(id, path, declared, "value", n.value.to_string());
        }
        self.part(id, path, declared, "isInfinite", n.infinite.to_string());
        Some(id)
    }

    fn code(
        &mut self,
        parent: NodeId,
        path: &Path,
        declared: &ClassKey,
        code: &CodeValue,
        enumeration: bool,
    ) -> Option<NodeId> {
        let schemas = self.resolver.registry().schemas();
        let list = schemas
            .get(declared)
            .filter(|class| class.is_codelist)
            .or_else(|| schemas.find_code_list(&code.list));
        let class = list.as_ref().map_or_else(|| declared.clone(), |l| l.key());

        if enumeration {
            return self.leaf(parent, path.clone(), class, code.identifier.to_lowercase());
        }
        match list.as_ref().and_then(|l| l.entry_named(&code.identifier)) {
            Some(entry) => {
                let literal = entry.code.to_string();
                self.leaf(parent, path.clone(), class, literal)
            }
            None => {
                self.report.drop_attribute(
                    path.to_string(),
                    path.property().unwrap_or_default(),
                    FailureReason::UnmatchedCode,
                    format!("'{}' is not a member of {}", code.identifier, code.list),
                );
                None
            }
        }
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Date(date) => literals::format_date(date, self.options.utc_offset),
            Value::Uri(uri) => literals::restore_uri(uri),
            Value::Locale(locale) => locale.tag(),
            Value::FreeText(text) => text.value.clone(),
            Value::Unit(unit) => unit.symbol().to_string(),
            Value::QualifiedName(name) => match &name.namespace {
                Some(namespace) => format!("{{{}}}{}", namespace, name.local_part),
                None => name.local_part.clone(),
            },
            Value::UnlimitedInteger(n) if n.infinite => "*".to_string(),
            Value::UnlimitedInteger(n) => n.value.to_string(),
            Value::Text(text) => text.clone(),
            Value::Integer(n) => n.to_string(),
            Value::Decimal(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Code(code) | Value::Enumeration(code) => code.identifier.clone(),
            Value::Object(_) | Value::List(_) => String::new(),
        }
    }

    /// Text child `property` of a fixed-shape composite
    fn part(
        &mut self,
        parent: NodeId,
        path: &Path,
        owner: &ClassKey,
        property: &str,
        text: String,
    ) {
        let class = self.property_class(owner, property);
        let child_path = path.child(&owner.standard, &owner.name, property);
        self.leaf(parent, child_path, class, text);
    }

    fn leaf(
        &mut self,
        parent: NodeId,
        path: Path,
        class: ClassKey,
        text: String,
    ) -> Option<NodeId> {
        self.add(parent, path, Some(class), NodeKind::Text(text))
    }

    fn add(
        &mut self,
        parent: NodeId,
        path: Path,
        class: Option<ClassKey>,
        kind: NodeKind,
    ) -> Option<NodeId> {
        match self.record.add_child(parent, path, class, kind) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Cannot add node to {}: {}", self.record.identifier, e);
                None
            }
        }
    }

    /// Declared type of `owner.property`, text when undeclared
    fn property_class(&self, owner: &ClassKey, property: &str) -> ClassKey {
        self.resolver
            .registry()
            .schemas()
            .get(owner)
            .and_then(|class| {
                class
                    .properties
                    .iter()
                    .find(|p| p.name == property)
                    .map(|p| p.type_class.clone())
            })
            .unwrap_or_else(|| ClassKey::new(ISO_19103, "CharacterString"))
    }
}
