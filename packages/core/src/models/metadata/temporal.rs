//! Temporal primitives
//!
//! Two runtime families describe the same ISO 19108 schema classes:
//! `iso19108.*` in ISO 19115 mode and the GML flavoured `gml.Time*` types in
//! SensorML mode.

use crate::metadata_object;
use crate::models::object::ObjectRef;
use crate::models::values::{Value, ValueKind};
use crate::registry::types::{expect_date, opt, PropertyAccessor, TypeCatalog, TypeDescriptor};
use chrono::{DateTime, FixedOffset};

pub const ISO_NAMESPACE: &str = "iso19108";
pub const GML_NAMESPACE: &str = "gml";

pub const PERIOD: &str = "iso19108.DefaultPeriod";
pub const INSTANT: &str = "iso19108.DefaultInstant";
pub const GML_PERIOD: &str = "gml.TimePeriod";
pub const GML_INSTANT: &str = "gml.TimeInstant";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DefaultPeriod {
    pub begin: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
}

metadata_object!(DefaultPeriod, PERIOD);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DefaultInstant {
    pub position: Option<DateTime<FixedOffset>>,
}

metadata_object!(DefaultInstant, INSTANT);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimePeriod {
    pub begin: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
}

metadata_object!(TimePeriod, GML_PERIOD);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimeInstant {
    pub position: Option<DateTime<FixedOffset>>,
}

metadata_object!(TimeInstant, GML_INSTANT);

pub(crate) fn register(catalog: &mut TypeCatalog) {
    catalog.register(
        TypeDescriptor::object(ISO_NAMESPACE, "DefaultPeriod", || {
            ObjectRef::new(DefaultPeriod::default())
        })
        .root_element("TM_Period")
        .property(PropertyAccessor::one::<DefaultPeriod>(
            "begin",
            ValueKind::Date,
            |p| opt(&p.begin, Value::Date),
            |p, v| {
                p.begin = Some(expect_date(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultPeriod>(
            "end",
            ValueKind::Date,
            |p| opt(&p.end, Value::Date),
            |p, v| {
                p.end = Some(expect_date(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(ISO_NAMESPACE, "DefaultInstant", || {
            ObjectRef::new(DefaultInstant::default())
        })
        .root_element("TM_Instant")
        .property(PropertyAccessor::one::<DefaultInstant>(
            "position",
            ValueKind::Date,
            |i| opt(&i.position, Value::Date),
            |i, v| {
                i.position = Some(expect_date(v)?);
                Ok(())
            },
        )),
    );

    // GML types declare no root element; the writer derives TM_Period from
    // the type name.
    catalog.register(
        TypeDescriptor::object(GML_NAMESPACE, "TimePeriod", || {
            ObjectRef::new(TimePeriod::default())
        })
        .property(PropertyAccessor::one::<TimePeriod>(
            "begin",
            ValueKind::Date,
            |p| opt(&p.begin, Value::Date),
            |p, v| {
                p.begin = Some(expect_date(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<TimePeriod>(
            "end",
            ValueKind::Date,
            |p| opt(&p.end, Value::Date),
            |p, v| {
                p.end = Some(expect_date(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(GML_NAMESPACE, "TimeInstant", || {
            ObjectRef::new(TimeInstant::default())
        })
        .property(PropertyAccessor::one::<TimeInstant>(
            "position",
            ValueKind::Date,
            |i| opt(&i.position, Value::Date),
            |i, v| {
                i.position = Some(expect_date(v)?);
                Ok(())
            },
        )),
    );
}
