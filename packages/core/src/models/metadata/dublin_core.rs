//! Dublin Core / CSW records
//!
//! `RecordType` keeps its attributes in an [`AttributeMap`]: the CSW record
//! is an open bag of Dublin Core elements rather than a fixed structure.
//! The accepted keys use the plural runtime names for repeatable elements.

use crate::metadata_object;
use crate::models::object::{AttributeMap, ObjectRef};
use crate::models::values::{Value, ValueKind};
use crate::registry::types::{expect_text, opt, PropertyAccessor, TypeCatalog, TypeDescriptor};

pub const CSW_NAMESPACE: &str = "csw";
pub const OWS_NAMESPACE: &str = "ows";

pub const RECORD: &str = "csw.RecordType";
pub const BOUNDING_BOX: &str = "ows.BoundingBoxType";

pub const RECORD_ATTRIBUTES: &[&str] = &[
    "identifier",
    "title",
    "type",
    "subjects",
    "format",
    "abstract",
    "creators",
    "modified",
    "language",
    "boundingBoxes",
];

#[derive(Debug, Clone)]
pub struct RecordType {
    pub attributes: AttributeMap,
}

impl Default for RecordType {
    fn default() -> Self {
        Self {
            attributes: AttributeMap::new(RECORD_ATTRIBUTES),
        }
    }
}

metadata_object!(
    RecordType,
    RECORD,
    fn attribute_map(&self) -> Option<&AttributeMap> {
        Some(&self.attributes)
    }

    fn attribute_map_mut(&mut self) -> Option<&mut AttributeMap> {
        Some(&mut self.attributes)
    }
);

impl RecordType {
    /// Convenience setter for text elements; unknown names are ignored
    pub fn with_text(mut self, name: &str, text: &str) -> Self {
        if let Err(e) = self.attributes.insert(name, Value::text(text)) {
            tracing::debug!("{}", e);
        }
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BoundingBoxType {
    pub lower_corner: Option<String>,
    pub upper_corner: Option<String>,
    pub crs: Option<String>,
}

metadata_object!(BoundingBoxType, BOUNDING_BOX);

pub(crate) fn register(catalog: &mut TypeCatalog) {
    // Record has no accessor table: every attribute goes through the map.
    catalog.register(
        TypeDescriptor::object(CSW_NAMESPACE, "RecordType", || {
            ObjectRef::new(RecordType::default())
        })
        .root_element("Record"),
    );

    catalog.register(
        TypeDescriptor::object(OWS_NAMESPACE, "BoundingBoxType", || {
            ObjectRef::new(BoundingBoxType::default())
        })
        .root_element("BoundingBox")
        .property(PropertyAccessor::one::<BoundingBoxType>(
            "lowerCorner",
            ValueKind::Text,
            |b| opt(&b.lower_corner, Value::Text),
            |b, v| {
                b.lower_corner = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<BoundingBoxType>(
            "upperCorner",
            ValueKind::Text,
            |b| opt(&b.upper_corner, Value::Text),
            |b, v| {
                b.upper_corner = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<BoundingBoxType>(
            "crs",
            ValueKind::Text,
            |b| opt(&b.crs, Value::Text),
            |b, v| {
                b.crs = Some(expect_text(v)?);
                Ok(())
            },
        )),
    );
}
