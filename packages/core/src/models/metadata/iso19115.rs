//! ISO 19115 Runtime Model
//!
//! Typed metadata objects for the ISO 19115 core profile. Field names follow
//! Rust conventions; accessor names follow the runtime attribute names the
//! mapper computes from schema property names (plural for multi-valued
//! attributes, see `mapping::corrections`).

use crate::metadata_object;
use crate::models::object::ObjectRef;
use crate::models::values::{CodeValue, InternationalString, Locale, Value, ValueKind};
use crate::registry::types::{
    all, expect_boolean, expect_code, expect_date, expect_decimal, expect_enumeration,
    expect_free_text, expect_locale, expect_object, expect_text, expect_uri, opt,
    PropertyAccessor, TypeCatalog, TypeDescriptor,
};
use chrono::{DateTime, FixedOffset};

pub const NAMESPACE: &str = "iso19115";

pub const METADATA: &str = "iso19115.DefaultMetadata";
pub const RESPONSIBLE_PARTY: &str = "iso19115.DefaultResponsibleParty";
pub const CONTACT: &str = "iso19115.DefaultContact";
pub const ONLINE_RESOURCE: &str = "iso19115.DefaultOnlineResource";
pub const CITATION: &str = "iso19115.DefaultCitation";
pub const CITATION_DATE: &str = "iso19115.DefaultCitationDate";
pub const IDENTIFIER: &str = "iso19115.DefaultIdentifier";
pub const DATA_IDENTIFICATION: &str = "iso19115.DefaultDataIdentification";
pub const EXTENT: &str = "iso19115.DefaultExtent";
pub const BOUNDING_BOX: &str = "iso19115.DefaultGeographicBoundingBox";
pub const TEMPORAL_EXTENT: &str = "iso19115.DefaultTemporalExtent";

/// Root metadata entity (`MD_Metadata`)
#[derive(Debug, Default, Clone)]
pub struct DefaultMetadata {
    pub file_identifier: Option<String>,
    pub language: Option<Locale>,
    pub character_set: Option<CodeValue>,
    pub hierarchy_levels: Vec<CodeValue>,
    pub contacts: Vec<ObjectRef>,
    pub date_stamp: Option<DateTime<FixedOffset>>,
    pub metadata_standard_name: Option<String>,
    pub identification_info: Vec<ObjectRef>,
}

metadata_object!(DefaultMetadata, METADATA);

#[derive(Debug, Default, Clone)]
pub struct DefaultResponsibleParty {
    pub uuid: Option<String>,
    pub individual_name: Option<String>,
    pub organisation_name: Option<InternationalString>,
    pub position_name: Option<InternationalString>,
    pub contact_info: Option<ObjectRef>,
    pub role: Option<CodeValue>,
}

metadata_object!(
    DefaultResponsibleParty,
    RESPONSIBLE_PARTY,
    fn internal_id(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn set_internal_id(&mut self, id: String) -> bool {
        self.uuid = Some(id);
        true
    }
);

#[derive(Debug, Default, Clone)]
pub struct DefaultContact {
    pub online_resource: Option<ObjectRef>,
    pub contact_instructions: Option<InternationalString>,
}

metadata_object!(DefaultContact, CONTACT);

#[derive(Debug, Default, Clone)]
pub struct DefaultOnlineResource {
    pub linkage: Option<String>,
    pub protocol: Option<String>,
    pub name: Option<String>,
}

metadata_object!(DefaultOnlineResource, ONLINE_RESOURCE);

#[derive(Debug, Default, Clone)]
pub struct DefaultCitation {
    pub href: Option<String>,
    pub title: Option<InternationalString>,
    pub edition: Option<InternationalString>,
    pub dates: Vec<ObjectRef>,
    pub identifiers: Vec<ObjectRef>,
    pub cited_responsible_parties: Vec<ObjectRef>,
}

metadata_object!(
    DefaultCitation,
    CITATION,
    fn external_link(&self) -> Option<&str> {
        self.href.as_deref()
    }

    fn set_external_link(&mut self, href: String) -> bool {
        self.href = Some(href);
        true
    }
);

/// Reference date of a citation (`CI_Date`)
#[derive(Debug, Default, Clone)]
pub struct DefaultCitationDate {
    pub date: Option<DateTime<FixedOffset>>,
    pub date_type: Option<CodeValue>,
}

metadata_object!(DefaultCitationDate, CITATION_DATE);

#[derive(Debug, Default, Clone)]
pub struct DefaultIdentifier {
    pub code: Option<String>,
    pub code_space: Option<String>,
    pub authority: Option<ObjectRef>,
}

metadata_object!(DefaultIdentifier, IDENTIFIER);

#[derive(Debug, Default, Clone)]
pub struct DefaultDataIdentification {
    pub citation: Option<ObjectRef>,
    pub abstracts: Option<InternationalString>,
    pub point_of_contacts: Vec<ObjectRef>,
    pub languages: Vec<Locale>,
    pub topic_categories: Vec<CodeValue>,
    pub extents: Vec<ObjectRef>,
}

metadata_object!(DefaultDataIdentification, DATA_IDENTIFICATION);

#[derive(Debug, Default, Clone)]
pub struct DefaultExtent {
    pub description: Option<InternationalString>,
    pub geographic_elements: Vec<ObjectRef>,
    pub temporal_element: Vec<ObjectRef>,
}

metadata_object!(DefaultExtent, EXTENT);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DefaultGeographicBoundingBox {
    pub extent_type_code: Option<bool>,
    pub west_bound_longitude: Option<f64>,
    pub east_bound_longitude: Option<f64>,
    pub south_bound_latitude: Option<f64>,
    pub north_bound_latitude: Option<f64>,
}

metadata_object!(DefaultGeographicBoundingBox, BOUNDING_BOX);

impl DefaultGeographicBoundingBox {
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            extent_type_code: Some(true),
            west_bound_longitude: Some(west),
            east_bound_longitude: Some(east),
            south_bound_latitude: Some(south),
            north_bound_latitude: Some(north),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct DefaultTemporalExtent {
    pub extent: Option<ObjectRef>,
}

metadata_object!(DefaultTemporalExtent, TEMPORAL_EXTENT);

pub(crate) fn register(catalog: &mut TypeCatalog) {
    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultMetadata", || {
            ObjectRef::new(DefaultMetadata::default())
        })
        .root_element("MD_Metadata")
        .property(PropertyAccessor::one::<DefaultMetadata>(
            "fileIdentifier",
            ValueKind::Text,
            |m| opt(&m.file_identifier, Value::Text),
            |m, v| {
                m.file_identifier = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultMetadata>(
            "language",
            ValueKind::Locale,
            |m| opt(&m.language, Value::Locale),
            |m, v| {
                m.language = Some(expect_locale(v)?);
                Ok(())
            },
        ))
        .property(
            PropertyAccessor::one::<DefaultMetadata>(
                "characterSet",
                ValueKind::Code,
                |m| opt(&m.character_set, Value::Code),
                |m, v| {
                    m.character_set = Some(expect_code(v)?);
                    Ok(())
                },
            )
            .with_code_list("MD_CharacterSetCode"),
        )
        .property(
            PropertyAccessor::many::<DefaultMetadata>(
                "hierarchyLevels",
                ValueKind::Code,
                |m| all(&m.hierarchy_levels, Value::Code),
                |m, v| {
                    m.hierarchy_levels.push(expect_code(v)?);
                    Ok(())
                },
            )
            .with_code_list("MD_ScopeCode"),
        )
        .property(PropertyAccessor::many::<DefaultMetadata>(
            "contacts",
            ValueKind::Object,
            |m| all(&m.contacts, Value::Object),
            |m, v| {
                m.contacts.push(expect_object(v, None)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultMetadata>(
            "dateStamp",
            ValueKind::Date,
            |m| opt(&m.date_stamp, Value::Date),
            |m, v| {
                m.date_stamp = Some(expect_date(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultMetadata>(
            "metadataStandardName",
            ValueKind::Text,
            |m| opt(&m.metadata_standard_name, Value::Text),
            |m, v| {
                m.metadata_standard_name = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultMetadata>(
            "identificationInfo",
            ValueKind::Object,
            |m| all(&m.identification_info, Value::Object),
            |m, v| {
                m.identification_info.push(expect_object(v, None)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultResponsibleParty", || {
            ObjectRef::new(DefaultResponsibleParty::default())
        })
        .root_element("CI_ResponsibleParty")
        .property(PropertyAccessor::one::<DefaultResponsibleParty>(
            "individualName",
            ValueKind::Text,
            |p| opt(&p.individual_name, Value::Text),
            |p, v| {
                p.individual_name = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultResponsibleParty>(
            "organisationName",
            ValueKind::FreeText,
            |p| opt(&p.organisation_name, Value::FreeText),
            |p, v| {
                p.organisation_name = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultResponsibleParty>(
            "positionName",
            ValueKind::FreeText,
            |p| opt(&p.position_name, Value::FreeText),
            |p, v| {
                p.position_name = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultResponsibleParty>(
            "contactInfo",
            ValueKind::Object,
            |p| opt(&p.contact_info, Value::Object),
            |p, v| {
                p.contact_info = Some(expect_object(v, Some(CONTACT))?);
                Ok(())
            },
        ))
        .property(
            PropertyAccessor::one::<DefaultResponsibleParty>(
                "role",
                ValueKind::Code,
                |p| opt(&p.role, Value::Code),
                |p, v| {
                    p.role = Some(expect_code(v)?);
                    Ok(())
                },
            )
            .with_code_list("CI_RoleCode"),
        ),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultContact", || {
            ObjectRef::new(DefaultContact::default())
        })
        .root_element("CI_Contact")
        .property(PropertyAccessor::one::<DefaultContact>(
            "onlineResource",
            ValueKind::Object,
            |c| opt(&c.online_resource, Value::Object),
            |c, v| {
                c.online_resource = Some(expect_object(v, Some(ONLINE_RESOURCE))?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultContact>(
            "contactInstructions",
            ValueKind::FreeText,
            |c| opt(&c.contact_instructions, Value::FreeText),
            |c, v| {
                c.contact_instructions = Some(expect_free_text(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultOnlineResource", || {
            ObjectRef::new(DefaultOnlineResource::default())
        })
        .root_element("CI_OnlineResource")
        .property(PropertyAccessor::one::<DefaultOnlineResource>(
            "linkage",
            ValueKind::Uri,
            |r| opt(&r.linkage, Value::Uri),
            |r, v| {
                r.linkage = Some(expect_uri(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultOnlineResource>(
            "protocol",
            ValueKind::Text,
            |r| opt(&r.protocol, Value::Text),
            |r, v| {
                r.protocol = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultOnlineResource>(
            "name",
            ValueKind::Text,
            |r| opt(&r.name, Value::Text),
            |r, v| {
                r.name = Some(expect_text(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultCitation", || {
            ObjectRef::new(DefaultCitation::default())
        })
        .root_element("CI_Citation")
        .property(PropertyAccessor::one::<DefaultCitation>(
            "title",
            ValueKind::FreeText,
            |c| opt(&c.title, Value::FreeText),
            |c, v| {
                c.title = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultCitation>(
            "edition",
            ValueKind::FreeText,
            |c| opt(&c.edition, Value::FreeText),
            |c, v| {
                c.edition = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultCitation>(
            "dates",
            ValueKind::Object,
            |c| all(&c.dates, Value::Object),
            |c, v| {
                c.dates.push(expect_object(v, Some(CITATION_DATE))?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultCitation>(
            "identifiers",
            ValueKind::Object,
            |c| all(&c.identifiers, Value::Object),
            |c, v| {
                c.identifiers.push(expect_object(v, None)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultCitation>(
            "citedResponsibleParties",
            ValueKind::Object,
            |c| all(&c.cited_responsible_parties, Value::Object),
            |c, v| {
                c.cited_responsible_parties.push(expect_object(v, None)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultCitationDate", || {
            ObjectRef::new(DefaultCitationDate::default())
        })
        .root_element("CI_Date")
        .property(PropertyAccessor::one::<DefaultCitationDate>(
            "date",
            ValueKind::Date,
            |d| opt(&d.date, Value::Date),
            |d, v| {
                d.date = Some(expect_date(v)?);
                Ok(())
            },
        ))
        .property(
            PropertyAccessor::one::<DefaultCitationDate>(
                "dateType",
                ValueKind::Code,
                |d| opt(&d.date_type, Value::Code),
                |d, v| {
                    d.date_type = Some(expect_code(v)?);
                    Ok(())
                },
            )
            .with_code_list("CI_DateTypeCode"),
        ),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultIdentifier", || {
            ObjectRef::new(DefaultIdentifier::default())
        })
        .root_element("MD_Identifier")
        .property(PropertyAccessor::one::<DefaultIdentifier>(
            "code",
            ValueKind::Text,
            |i| opt(&i.code, Value::Text),
            |i, v| {
                i.code = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultIdentifier>(
            "codeSpace",
            ValueKind::Text,
            |i| opt(&i.code_space, Value::Text),
            |i, v| {
                i.code_space = Some(expect_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultIdentifier>(
            "authority",
            ValueKind::Object,
            |i| opt(&i.authority, Value::Object),
            |i, v| {
                i.authority = Some(expect_object(v, Some(CITATION))?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultDataIdentification", || {
            ObjectRef::new(DefaultDataIdentification::default())
        })
        .root_element("MD_DataIdentification")
        .property(PropertyAccessor::one::<DefaultDataIdentification>(
            "citation",
            ValueKind::Object,
            |d| opt(&d.citation, Value::Object),
            |d, v| {
                d.citation = Some(expect_object(v, None)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultDataIdentification>(
            "abstracts",
            ValueKind::FreeText,
            |d| opt(&d.abstracts, Value::FreeText),
            |d, v| {
                d.abstracts = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultDataIdentification>(
            "pointOfContacts",
            ValueKind::Object,
            |d| all(&d.point_of_contacts, Value::Object),
            |d, v| {
                d.point_of_contacts.push(expect_object(v, None)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultDataIdentification>(
            "languages",
            ValueKind::Locale,
            |d| all(&d.languages, Value::Locale),
            |d, v| {
                d.languages.push(expect_locale(v)?);
                Ok(())
            },
        ))
        .property(
            PropertyAccessor::many::<DefaultDataIdentification>(
                "topicCategories",
                ValueKind::Enumeration,
                |d| all(&d.topic_categories, Value::Enumeration),
                |d, v| {
                    d.topic_categories.push(expect_enumeration(v)?);
                    Ok(())
                },
            )
            .with_code_list("MD_TopicCategoryCode"),
        )
        .property(PropertyAccessor::many::<DefaultDataIdentification>(
            "extents",
            ValueKind::Object,
            |d| all(&d.extents, Value::Object),
            |d, v| {
                d.extents.push(expect_object(v, Some(EXTENT))?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultExtent", || {
            ObjectRef::new(DefaultExtent::default())
        })
        .root_element("EX_Extent")
        .property(PropertyAccessor::one::<DefaultExtent>(
            "description",
            ValueKind::FreeText,
            |e| opt(&e.description, Value::FreeText),
            |e, v| {
                e.description = Some(expect_free_text(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultExtent>(
            "geographicElements",
            ValueKind::Object,
            |e| all(&e.geographic_elements, Value::Object),
            |e, v| {
                e.geographic_elements.push(expect_object(v, None)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::many::<DefaultExtent>(
            "temporalElement",
            ValueKind::Object,
            |e| all(&e.temporal_element, Value::Object),
            |e, v| {
                e.temporal_element
                    .push(expect_object(v, Some(TEMPORAL_EXTENT))?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultGeographicBoundingBox", || {
            ObjectRef::new(DefaultGeographicBoundingBox::default())
        })
        .root_element("EX_GeographicBoundingBox")
        .property(PropertyAccessor::one::<DefaultGeographicBoundingBox>(
            "extentTypeCode",
            ValueKind::Boolean,
            |b| opt(&b.extent_type_code, Value::Boolean),
            |b, v| {
                b.extent_type_code = Some(expect_boolean(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultGeographicBoundingBox>(
            "westBoundLongitude",
            ValueKind::Decimal,
            |b| opt(&b.west_bound_longitude, Value::Decimal),
            |b, v| {
                b.west_bound_longitude = Some(expect_decimal(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultGeographicBoundingBox>(
            "eastBoundLongitude",
            ValueKind::Decimal,
            |b| opt(&b.east_bound_longitude, Value::Decimal),
            |b, v| {
                b.east_bound_longitude = Some(expect_decimal(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultGeographicBoundingBox>(
            "southBoundLatitude",
            ValueKind::Decimal,
            |b| opt(&b.south_bound_latitude, Value::Decimal),
            |b, v| {
                b.south_bound_latitude = Some(expect_decimal(v)?);
                Ok(())
            },
        ))
        .property(PropertyAccessor::one::<DefaultGeographicBoundingBox>(
            "northBoundLatitude",
            ValueKind::Decimal,
            |b| opt(&b.north_bound_latitude, Value::Decimal),
            |b, v| {
                b.north_bound_latitude = Some(expect_decimal(v)?);
                Ok(())
            },
        )),
    );

    catalog.register(
        TypeDescriptor::object(NAMESPACE, "DefaultTemporalExtent", || {
            ObjectRef::new(DefaultTemporalExtent::default())
        })
        .root_element("EX_TemporalExtent")
        .property(PropertyAccessor::one::<DefaultTemporalExtent>(
            "extent",
            ValueKind::Object,
            |t| opt(&t.extent, Value::Object),
            |t, v| {
                t.extent = Some(expect_object(v, None)?);
                Ok(())
            },
        )),
    );

    // Code lists and enumerations
    catalog.register(TypeDescriptor::code_list(NAMESPACE, "CharacterSet"));
    catalog.register(TypeDescriptor::code_list(NAMESPACE, "ScopeCode"));
    catalog.register(TypeDescriptor::code_list(NAMESPACE, "Role"));
    catalog.register(TypeDescriptor::code_list(NAMESPACE, "DateType"));
    catalog.register(TypeDescriptor::enumeration(NAMESPACE, "TopicCategory"));
}
