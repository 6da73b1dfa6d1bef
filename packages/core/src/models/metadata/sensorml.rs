//! SensorML systems and SWE components

use crate::metadata_object;
use crate::models::object::ObjectRef;
use crate::models::values::{UnitOfMeasure, Value, ValueKind};
use crate::registry::types::{
    all, expect_decimal, expect_object, expect_text, expect_unit, expect_uri, opt,
    PropertyAccessor, TypeCatalog, TypeDescriptor,
};

pub const SENSORML_NAMESPACE: &str = "sensorml";
pub const SWE_NAMESPACE: &str = "swe";

pub const SYSTEM: &str = "sensorml.SystemType";
pub const QUANTITY: &str = "swe.QuantityType";

#[derive(Debug, Default, Clone)]
pub struct SystemType {
    pub id: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub valid_time: Option<ObjectRef>,
    pub outputs: Vec<ObjectRef>,
}

metadata_object!(
    SystemType,
    SYSTEM,
    fn internal_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_internal_id(&mut self, id: String) -> bool {
        self.id = Some(id);
        true
    }
);

/// A measured quantity with its unit
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuantityType {
    pub definition: Option<String>,
    pub uom: Option<UnitOfMeasure>,
    pub value: Option<f64>,
}

metadata_object!(QuantityType, QUANTITY);

pub(crate) fn register(catalog: &mut TypeCatalog) {
    catalog.register(
        TypeDescriptor::object(SENSORML_NAMESPACE, "SystemType", || {
            ObjectRef::new(SystemType::default())
        })
        .root_element("System")
        .property(PropertyAccessor::one::<SystemType>(
            "description",
            ValueKind::Text,
            |s| opt(&s.description, Value::Text),
            |s, v| {
                s.description = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<SystemType>(
            "keywords",
            ValueKind::Text,
            |s| all(&s.keywords, Value::Text),
            |s, v| {
                s.keywords.push(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<SystemType>(
            "validTime",
            ValueKind::Object,
            |s| opt(&s.valid_time, Value::Object),
            |s, v| {
                s.valid_time = Some(expect_object(v, None)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<SystemType>(
            "outputs",
            ValueKind::Object,
            |s| all(&s.outputs, Value::Object),
            |s, v| {
                s.outputs.push(expect_object(v, Some(QUANTITY))?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(SWE_NAMESPACE, "QuantityType", || {
            ObjectRef::new(QuantityType::default())
        })
        .root_element("Quantity")
        .property(PropertyAccessor::one::<QuantityType>(
            "definition",
            ValueKind::Uri,
            |q| opt(&q.definition, Value::Uri),
            |q, v| {
                q.definition = Some(expect_uri(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<QuantityType>(
            "uom",
            ValueKind::Unit,
            |q| opt(&q.uom, Value::Unit),
            |q, v| {
                q.uom = Some(expect_unit(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<QuantityType>(
            "value",
            ValueKind::Decimal,
            |q| opt(&q.value, Value::Decimal),
            |q, v| {
                q.value = Some(expect_decimal(v)?);
                Ok(())
            },
        )),
    );
}
