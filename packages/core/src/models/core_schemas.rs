//! Core Schema Definitions
//!
//! Canonical schema classes shipped with the catalog. These describe the
//! generic side of every builtin runtime type and cannot be changed by users;
//! additional classes can be merged with
//! [`SchemaRepository::extend_from_json`].
//!
//! ## Standards
//!
//! - **ISO 19115** (+ FRA, 19115-2, 19119, 19110, MDWEB) - geographic metadata
//! - **ISO 19108** - temporal primitives
//! - **ISO 19103** - primitive and multilingual types
//! - **Catalog Web Service** / **OGC Web Service** - CSW Dublin Core records
//! - **Ebrim v3.0** / **Ebrim v2.5** - registry information model
//! - **SensorML** / **Sensor Web Enablement** - sensor descriptions
//!
//! ## Usage
//!
//! Call [`builtin_repository`] once at startup and share the result.

use crate::models::schema::{SchemaClass, SchemaRepository, Standard};

pub const ISO_19115: &str = "ISO 19115";
pub const ISO_19115_FRA: &str = "ISO 19115 FRA";
pub const ISO_19115_2: &str = "ISO 19115-2";
pub const ISO_19108: &str = "ISO 19108";
pub const ISO_19103: &str = "ISO 19103";
pub const ISO_19119: &str = "ISO 19119";
pub const ISO_19110: &str = "ISO 19110";
pub const MDWEB: &str = "MDWEB";
pub const CSW: &str = "Catalog Web Service";
pub const DUBLIN_CORE: &str = "DublinCore";
pub const DUBLIN_CORE_TERMS: &str = "DublinCore-terms";
pub const OWS: &str = "OGC Web Service";
pub const FILTER: &str = "OGC Filter";
pub const EBRIM_30: &str = "Ebrim v3.0";
pub const WRS_10: &str = "Web Registry Service v1.0";
pub const EBRIM_25: &str = "Ebrim v2.5";
pub const WRS_09: &str = "Web Registry Service v0.9";
pub const SENSORML: &str = "SensorML";
pub const SWE: &str = "Sensor Web Enablement";

/// Every builtin standard with its ordered compatible-standard list
pub fn builtin_standards() -> Vec<Standard> {
    vec![
        Standard::new(
            ISO_19115,
            &[
                ISO_19115_FRA,
                ISO_19115,
                ISO_19115_2,
                ISO_19108,
                ISO_19103,
                ISO_19119,
                ISO_19110,
                MDWEB,
            ],
        ),
        Standard::new(ISO_19115_FRA, &[ISO_19115_FRA, ISO_19115, ISO_19108, ISO_19103]),
        Standard::new(ISO_19115_2, &[ISO_19115_2, ISO_19115, ISO_19108, ISO_19103]),
        Standard::new(ISO_19108, &[ISO_19108, ISO_19103]),
        Standard::new(ISO_19103, &[ISO_19103]),
        Standard::new(ISO_19119, &[ISO_19119, ISO_19115, ISO_19103]),
        Standard::new(ISO_19110, &[ISO_19110, ISO_19103]),
        Standard::new(MDWEB, &[MDWEB, ISO_19115, ISO_19103]),
        Standard::new(CSW, &[CSW, DUBLIN_CORE, DUBLIN_CORE_TERMS, OWS, FILTER]),
        Standard::new(DUBLIN_CORE, &[DUBLIN_CORE, DUBLIN_CORE_TERMS]),
        Standard::new(DUBLIN_CORE_TERMS, &[DUBLIN_CORE_TERMS, DUBLIN_CORE]),
        Standard::new(OWS, &[OWS]),
        Standard::new(FILTER, &[FILTER]),
        Standard::new(EBRIM_30, &[EBRIM_30, WRS_10, ISO_19103]),
        Standard::new(WRS_10, &[WRS_10, EBRIM_30]),
        Standard::new(EBRIM_25, &[EBRIM_25, WRS_09, ISO_19103]),
        Standard::new(WRS_09, &[WRS_09, EBRIM_25]),
        Standard::new(SENSORML, &[SENSORML, SWE, ISO_19108, ISO_19103]),
        Standard::new(SWE, &[SWE, ISO_19103]),
    ]
}

/// Repository seeded with every builtin standard and schema class
pub fn builtin_repository() -> SchemaRepository {
    let mut repo = SchemaRepository::new();
    for standard in builtin_standards() {
        repo.insert_standard(standard);
    }
    for class in primitive_classes()
        .into_iter()
        .chain(iso19115_classes())
        .chain(temporal_classes())
        .chain(csw_classes())
        .chain(ebrim_classes())
        .chain(sensorml_classes())
    {
        repo.insert(class);
    }
    tracing::debug!("Seeded schema repository with {} classes", repo.len());
    repo
}

fn primitive_classes() -> Vec<SchemaClass> {
    let mut classes: Vec<SchemaClass> = [
        "CharacterString",
        "Date",
        "DateTime",
        "Decimal",
        "Real",
        "Integer",
        "Boolean",
        "URL",
        "URI",
        "LanguageCode",
        "UomCode",
    ]
    .iter()
    .map(|name| SchemaClass::primitive(ISO_19103, name))
    .collect();

    // Multi-part values with a fixed sub-tree shape
    classes.push(
        SchemaClass::composite(ISO_19103, "PT_Locale")
            .property("languageCode", ISO_19103, "LanguageCode")
            .property("country", ISO_19103, "CharacterString"),
    );
    classes.push(
        SchemaClass::composite(ISO_19103, "PT_FreeText")
            .property("value", ISO_19103, "CharacterString")
            .many("textGroup", ISO_19103, "LocalisedCharacterString"),
    );
    classes.push(
        SchemaClass::composite(ISO_19103, "LocalisedCharacterString")
            .property("value", ISO_19103, "CharacterString")
            .property("locale", ISO_19103, "CharacterString"),
    );
    classes.push(
        SchemaClass::composite(ISO_19103, "QName")
            .property("namespaceURI", ISO_19103, "URI")
            .property("localPart", ISO_19103, "CharacterString"),
    );
    classes.push(
        SchemaClass::composite(ISO_19103, "UnlimitedInteger")
            .property("value", ISO_19103, "Integer")
            .property("isInfinite", ISO_19103, "Boolean"),
    );
    classes
}

fn iso19115_classes() -> Vec<SchemaClass> {
    vec![
        SchemaClass::composite(ISO_19115, "MD_Metadata")
            .property("fileIdentifier", ISO_19103, "CharacterString")
            .property("language", ISO_19103, "PT_Locale")
            .property("characterSet", ISO_19115, "MD_CharacterSetCode")
            .many("hierarchyLevel", ISO_19115, "MD_ScopeCode")
            .property_with("contact", ISO_19115, "CI_ResponsibleParty", 1, None)
            .property_with("dateStamp", ISO_19103, "Date", 1, Some(1))
            .property("metadataStandardName", ISO_19103, "CharacterString")
            .many("identificationInfo", ISO_19115, "MD_Identification"),
        SchemaClass::composite(ISO_19115, "CI_ResponsibleParty")
            .property("uuid", ISO_19103, "CharacterString")
            .property("individualName", ISO_19103, "CharacterString")
            .property("organisationName", ISO_19103, "PT_FreeText")
            .property("positionName", ISO_19103, "PT_FreeText")
            .property("contactInfo", ISO_19115, "CI_Contact")
            .property_with("role", ISO_19115, "CI_RoleCode", 1, Some(1)),
        SchemaClass::composite(ISO_19115, "CI_Contact")
            .property("onlineResource", ISO_19115, "CI_OnlineResource")
            .property("contactInstructions", ISO_19103, "PT_FreeText"),
        SchemaClass::composite(ISO_19115, "CI_OnlineResource")
            .property_with("linkage", ISO_19103, "URL", 1, Some(1))
            .property("protocol", ISO_19103, "CharacterString")
            .property("name", ISO_19103, "CharacterString"),
        SchemaClass::composite(ISO_19115, "CI_Citation")
            .property("href", ISO_19103, "URI")
            .property_with("title", ISO_19103, "PT_FreeText", 1, Some(1))
            .many("date", ISO_19115, "CI_Date")
            .property("edition", ISO_19103, "PT_FreeText")
            .many("identifier", ISO_19115, "MD_Identifier")
            .many("citedResponsibleParty", ISO_19115, "CI_ResponsibleParty"),
        SchemaClass::composite(ISO_19115, "CI_Date")
            .property_with("date", ISO_19103, "DateTime", 1, Some(1))
            .property_with("dateType", ISO_19115, "CI_DateTypeCode", 1, Some(1)),
        SchemaClass::composite(ISO_19115, "MD_Identifier")
            .property("authority", ISO_19115, "CI_Citation")
            .property_with("code", ISO_19103, "CharacterString", 1, Some(1)),
        SchemaClass::composite(ISO_19115, "RS_Identifier")
            .extends(ISO_19115, "MD_Identifier")
            .property("codeSpace", ISO_19103, "CharacterString"),
        SchemaClass::composite(ISO_19115, "MD_Identification")
            .property_with("citation", ISO_19115, "CI_Citation", 1, Some(1))
            .property_with("abstract", ISO_19103, "PT_FreeText", 1, Some(1))
            .many("pointOfContact", ISO_19115, "CI_ResponsibleParty"),
        SchemaClass::composite(ISO_19115, "MD_DataIdentification")
            .extends(ISO_19115, "MD_Identification")
            .many("language", ISO_19103, "LanguageCode")
            .many("topicCategory", ISO_19115, "MD_TopicCategoryCode")
            .many("extent", ISO_19115, "EX_Extent"),
        SchemaClass::composite(ISO_19115, "EX_Extent")
            .property("description", ISO_19103, "PT_FreeText")
            .many("geographicElement", ISO_19115, "EX_GeographicExtent")
            .many("temporalElement", ISO_19115, "EX_TemporalExtent"),
        SchemaClass::composite(ISO_19115, "EX_GeographicExtent").property(
            "extentTypeCode",
            ISO_19103,
            "Boolean",
        ),
        SchemaClass::composite(ISO_19115, "EX_GeographicBoundingBox")
            .extends(ISO_19115, "EX_GeographicExtent")
            .property("westBoundLongitude", ISO_19103, "Decimal")
            .property("eastBoundLongitude", ISO_19103, "Decimal")
            .property("southBoundLatitude", ISO_19103, "Decimal")
            .property("northBoundLatitude", ISO_19103, "Decimal"),
        SchemaClass::composite(ISO_19115, "EX_TemporalExtent").property(
            "extent",
            ISO_19108,
            "TM_Primitive",
        ),
        SchemaClass::composite(ISO_19115_2, "MI_Metadata").extends(ISO_19115, "MD_Metadata"),
        SchemaClass::code_list(
            ISO_19115,
            "MD_CharacterSetCode",
            &[
                "ucs2", "ucs4", "utf7", "utf8", "utf16", "8859part1", "8859part2", "shiftJIS",
                "eucJP", "usAscii",
            ],
        ),
        SchemaClass::code_list(
            ISO_19115,
            "MD_ScopeCode",
            &[
                "attribute",
                "attributeType",
                "collectionHardware",
                "collectionSession",
                "dataset",
                "series",
                "nonGeographicDataset",
                "dimensionGroup",
                "feature",
                "featureType",
                "propertyType",
                "fieldSession",
                "software",
                "service",
                "model",
                "tile",
            ],
        ),
        SchemaClass::code_list(
            ISO_19115,
            "CI_RoleCode",
            &[
                "resourceProvider",
                "custodian",
                "owner",
                "user",
                "distributor",
                "originator",
                "pointOfContact",
                "principalInvestigator",
                "processor",
                "publisher",
                "author",
            ],
        ),
        SchemaClass::code_list(
            ISO_19115,
            "CI_DateTypeCode",
            &["creation", "publication", "revision"],
        ),
        SchemaClass::code_list(
            ISO_19115,
            "MD_TopicCategoryCode",
            &[
                "farming",
                "biota",
                "boundaries",
                "climatologyMeteorologyAtmosphere",
                "economy",
                "elevation",
                "environment",
                "geoscientificInformation",
                "health",
                "imageryBaseMapsEarthCover",
                "intelligenceMilitary",
                "inlandWaters",
                "location",
                "oceans",
                "planningCadastre",
                "society",
                "structure",
                "transportation",
                "utilitiesCommunication",
            ],
        ),
    ]
}

fn temporal_classes() -> Vec<SchemaClass> {
    vec![
        SchemaClass::composite(ISO_19108, "TM_Primitive"),
        SchemaClass::composite(ISO_19108, "TM_Period")
            .extends(ISO_19108, "TM_Primitive")
            .property("begin", ISO_19103, "DateTime")
            .property("end", ISO_19103, "DateTime"),
        SchemaClass::composite(ISO_19108, "TM_Instant")
            .extends(ISO_19108, "TM_Primitive")
            .property("position", ISO_19103, "DateTime"),
    ]
}

fn csw_classes() -> Vec<SchemaClass> {
    vec![
        SchemaClass::composite(CSW, "Record")
            .property("identifier", ISO_19103, "CharacterString")
            .property("title", ISO_19103, "CharacterString")
            .property("type", ISO_19103, "CharacterString")
            .many("subject", ISO_19103, "CharacterString")
            .property("format", ISO_19103, "CharacterString")
            .property("abstract", ISO_19103, "CharacterString")
            .many("creator", ISO_19103, "CharacterString")
            .property("modified", ISO_19103, "Date")
            .property("language", ISO_19103, "CharacterString")
            .many("boundingBox", OWS, "BoundingBox"),
        SchemaClass::composite(OWS, "BoundingBox")
            .property("lowerCorner", ISO_19103, "CharacterString")
            .property("upperCorner", ISO_19103, "CharacterString")
            .property("crs", ISO_19103, "CharacterString"),
    ]
}

fn ebrim_classes() -> Vec<SchemaClass> {
    vec![
        SchemaClass::composite(EBRIM_30, "RegistryObject")
            .property("id", ISO_19103, "CharacterString")
            .property("lid", ISO_19103, "URI")
            .property("objectType", ISO_19103, "URI")
            .property("name", ISO_19103, "PT_FreeText")
            .property("description", ISO_19103, "PT_FreeText")
            .many("slot", EBRIM_30, "Slot"),
        SchemaClass::composite(EBRIM_30, "ExtrinsicObject")
            .extends(EBRIM_30, "RegistryObject")
            .property("mimeType", ISO_19103, "CharacterString")
            .property("isOpaque", ISO_19103, "Boolean"),
        SchemaClass::composite(EBRIM_30, "Slot")
            .property("name", ISO_19103, "CharacterString")
            .property("slotType", ISO_19103, "CharacterString")
            .many("value", ISO_19103, "CharacterString"),
        SchemaClass::composite(EBRIM_25, "RegistryObject")
            .property("id", ISO_19103, "CharacterString")
            .property("objectType", ISO_19103, "URI")
            .property("name", ISO_19103, "PT_FreeText")
            .many("slot", EBRIM_25, "Slot"),
        SchemaClass::composite(EBRIM_25, "ExtrinsicObject")
            .extends(EBRIM_25, "RegistryObject")
            .property("mimeType", ISO_19103, "CharacterString"),
        SchemaClass::composite(EBRIM_25, "Slot")
            .property("name", ISO_19103, "CharacterString")
            .many("value", ISO_19103, "CharacterString"),
    ]
}

fn sensorml_classes() -> Vec<SchemaClass> {
    vec![
        SchemaClass::composite(SENSORML, "System")
            .property("id", ISO_19103, "CharacterString")
            .property("description", ISO_19103, "CharacterString")
            .many("keywords", ISO_19103, "CharacterString")
            .property("validTime", ISO_19108, "TM_Period")
            .many("outputs", SWE, "Quantity"),
        SchemaClass::composite(SWE, "Quantity")
            .property("definition", ISO_19103, "URI")
            .property("uom", ISO_19103, "UomCode")
            .property("value", ISO_19103, "Real"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_property_type_is_known() {
        let repo = builtin_repository();
        for standard in builtin_standards() {
            for name in &standard.compatible_standards {
                assert!(repo.standard(name).is_some(), "unknown standard {}", name);
            }
        }

        let all_keys: Vec<_> = [
            (ISO_19115, "MD_Metadata"),
            (ISO_19115, "MD_DataIdentification"),
            (CSW, "Record"),
            (EBRIM_30, "ExtrinsicObject"),
            (EBRIM_25, "ExtrinsicObject"),
            (SENSORML, "System"),
        ]
        .iter()
        .map(|(s, n)| repo.class(s, n).unwrap())
        .collect();

        for class in all_keys {
            for (_, property) in repo.all_properties(&class) {
                assert!(
                    repo.get(&property.type_class).is_some(),
                    "{} references unknown {}",
                    class.name,
                    property.type_class
                );
            }
        }
    }

    #[test]
    fn test_iso_compatible_standards_order() {
        let repo = builtin_repository();
        let iso = repo.standard(ISO_19115).unwrap();

        assert_eq!(iso.compatible_standards[0], ISO_19115_FRA);
        assert_eq!(iso.compatible_standards.len(), 8);
        assert!(repo.is_compatible(SENSORML, ISO_19108));
    }

    #[test]
    fn test_code_lists_are_numbered_from_one() {
        let repo = builtin_repository();
        let roles = repo.class(ISO_19115, "CI_RoleCode").unwrap();

        assert_eq!(roles.code_for(1).unwrap().name, "resourceProvider");
        assert_eq!(roles.entry_named("author").unwrap().code, 11);
    }
}
