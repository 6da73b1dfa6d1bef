//! Ebrim registry objects (versions 3.0 and 2.5)

use crate::metadata_object;
use crate::models::object::ObjectRef;
use crate::models::values::{InternationalString, Value, ValueKind};
use crate::registry::types::{
    all, expect_boolean, expect_free_text, expect_object, expect_text, expect_uri, opt,
    PropertyAccessor, TypeCatalog, TypeDescriptor,
};

pub const V30_NAMESPACE: &str = "ebrim30";
pub const V25_NAMESPACE: &str = "ebrim25";

pub const EXTRINSIC_OBJECT_V30: &str = "ebrim30.ExtrinsicObjectType";
pub const SLOT_V30: &str = "ebrim30.SlotType";
pub const EXTRINSIC_OBJECT_V25: &str = "ebrim25.ExtrinsicObjectType";
pub const SLOT_V25: &str = "ebrim25.SlotType";

/// Ebrim 3.0 extrinsic object
#[derive(Debug, Default, Clone)]
pub struct ExtrinsicObjectType {
    pub id: Option<String>,
    pub lid: Option<String>,
    pub object_type: Option<String>,
    pub name: Option<InternationalString>,
    pub description: Option<InternationalString>,
    pub slots: Vec<ObjectRef>,
    pub mime_type: Option<String>,
    pub is_opaque: Option<bool>,
}

metadata_object!(
    ExtrinsicObjectType,
    EXTRINSIC_OBJECT_V30,
    fn internal_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_internal_id(&mut self, id: String) -> bool {
        self.id = Some(id);
        true
    }
);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SlotType {
    pub name: Option<String>,
    pub slot_type: Option<String>,
    pub values: Vec<String>,
}

metadata_object!(SlotType, SLOT_V30);

impl SlotType {
    pub fn new(name: &str, values: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            slot_type: None,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Ebrim 2.5 extrinsic object
#[derive(Debug, Default, Clone)]
pub struct ExtrinsicObject25 {
    pub id: Option<String>,
    pub object_type: Option<String>,
    pub name: Option<InternationalString>,
    pub slots: Vec<ObjectRef>,
    pub mime_type: Option<String>,
}

metadata_object!(
    ExtrinsicObject25,
    EXTRINSIC_OBJECT_V25,
    fn internal_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_internal_id(&mut self, id: String) -> bool {
        self.id = Some(id);
        true
    }
);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Slot25 {
    pub name: Option<String>,
    pub values: Vec<String>,
}

metadata_object!(Slot25, SLOT_V25);

pub(crate) fn register(catalog: &mut TypeCatalog) {
    catalog.register(
        TypeDescriptor::object(V30_NAMESPACE, "ExtrinsicObjectType", || {
            ObjectRef::new(ExtrinsicObjectType::default())
        })
        .root_element("ExtrinsicObject")
        .property(PropertyAccessor::one::<ExtrinsicObjectType>(
            "lid",
            ValueKind::Uri,
            |o| opt(&o.lid, Value::Uri),
            |o, v| {
                o.lid = Some(expect_uri(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<ExtrinsicObjectType>(
            "objectType",
            ValueKind::Uri,
            |o| opt(&o.object_type, Value::Uri),
            |o, v| {
                o.object_type = Some(expect_uri(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<ExtrinsicObjectType>(
            "name",
            ValueKind::FreeText,
            |o| opt(&o.name, Value::FreeText),
            |o, v| {
                o.name = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<ExtrinsicObjectType>(
            "description",
            ValueKind::FreeText,
            |o| opt(&o.description, Value::FreeText),
            |o, v| {
                o.description = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<ExtrinsicObjectType>(
            "slots",
            ValueKind::Object,
            |o| all(&o.slots, Value::Object),
            |o, v| {
                o.slots.push(expect_object(v, Some(SLOT_V30))?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<ExtrinsicObjectType>(
            "mimeType",
            ValueKind::Text,
            |o| opt(&o.mime_type, Value::Text),
            |o, v| {
                o.mime_type = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<ExtrinsicObjectType>(
            "isOpaque",
            ValueKind::Boolean,
            |o| opt(&o.is_opaque, Value::Boolean),
            |o, v| {
                o.is_opaque = Some(expect_boolean(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(V30_NAMESPACE, "SlotType", || {
            ObjectRef::new(SlotType::default())
        })
        .root_element("Slot")
        .property(PropertyAccessor::one::<SlotType>(
            "name",
            ValueKind::Text,
            |s| opt(&s.name, Value::Text),
            |s, v| {
                s.name = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<SlotType>(
            "slotType",
            ValueKind::Text,
            |s| opt(&s.slot_type, Value::Text),
            |s, v| {
                s.slot_type = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<SlotType>(
            "value",
            ValueKind::Text,
            |s| all(&s.values, Value::Text),
            |s, v| {
                s.values.push(expect_text(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(V25_NAMESPACE, "ExtrinsicObjectType", || {
            ObjectRef::new(ExtrinsicObject25::default())
        })
        .root_element("ExtrinsicObject")
        .property(PropertyAccessor::one::<ExtrinsicObject25>(
            "objectType",
            ValueKind::Uri,
            |o| opt(&o.object_type, Value::Uri),
            |o, v| {
                o.object_type = Some(expect_uri(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<ExtrinsicObject25>(
            "name",
            ValueKind::FreeText,
            |o| opt(&o.name, Value::FreeText),
            |o, v| {
                o.name = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<ExtrinsicObject25>(
            "slots",
            ValueKind::Object,
            |o| all(&o.slots, Value::Object),
            |o, v| {
                o.slots.push(expect_object(v, Some(SLOT_V25))?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<ExtrinsicObject25>(
            "mimeType",
            ValueKind::Text,
            |o| opt(&o.mime_type, Value::Text),
            |o, v| {
                o.mime_type = Some(expect_text(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(V25_NAMESPACE, "SlotType", || {
            ObjectRef::new(Slot25::default())
        })
        .root_element("Slot")
        .property(PropertyAccessor::one::<Slot25>(
            "name",
            ValueKind::Text,
            |s| opt(&s.name, Value::Text),
            |s, v| {
                s.name = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<Slot25>(
            "value",
            ValueKind::Text,
            |s| all(&s.values, Value::Text),
            |s, v| {
                s.values.push(expect_text(v)?);
                Ok(())
            },
        )),
    );
}
