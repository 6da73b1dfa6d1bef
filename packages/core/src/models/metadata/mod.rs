//! Builtin Runtime Model
//!
//! Typed metadata objects for the standards shipped with the catalog:
//!
//! - [`iso19115`] - ISO 19115 metadata, citations, contacts and extents
//! - [`temporal`] - ISO 19108 periods and instants, plus their GML flavour
//! - [`dublin_core`] - CSW/Dublin Core records and OWS bounding boxes
//! - [`ebrim`] - Ebrim 3.0 and 2.5 registry objects
//! - [`sensorml`] - SensorML systems and SWE quantities
//!
//! Each module registers its [`TypeDescriptor`](crate::registry::TypeDescriptor)s
//! through [`register_builtin_types`].

pub mod dublin_core;
pub mod ebrim;
pub mod iso19115;
pub mod sensorml;
pub mod temporal;

pub use dublin_core::{BoundingBoxType, RecordType};
pub use ebrim::{ExtrinsicObject25, ExtrinsicObjectType, Slot25, SlotType};
pub use iso19115::{
    DefaultCitation, DefaultCitationDate, DefaultContact, DefaultDataIdentification,
    DefaultExtent, DefaultGeographicBoundingBox, DefaultIdentifier, DefaultMetadata,
    DefaultOnlineResource, DefaultResponsibleParty, DefaultTemporalExtent,
};
pub use sensorml::{QuantityType, SystemType};
pub use temporal::{DefaultInstant, DefaultPeriod, TimeInstant, TimePeriod};

use crate::registry::types::TypeCatalog;

pub fn register_builtin_types(catalog: &mut TypeCatalog) {
    iso19115::register(catalog);
    temporal::register(catalog);
    dublin_core::register(catalog);
    ebrim::register(catalog);
    sensorml::register(catalog);
    tracing::debug!("Registered {} builtin runtime types", catalog.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object::ObjectRef;
    use crate::models::values::Value;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = TypeCatalog::builtin();

        let metadata = catalog.get(iso19115::METADATA).unwrap();
        assert_eq!(metadata.root_element, Some("MD_Metadata"));
        assert!(metadata.accessor("contacts").is_some());
        assert!(metadata.accessor("contact").is_none());

        assert!(catalog.get(temporal::GML_PERIOD).unwrap().root_element.is_none());
        assert!(catalog.lookup("iso19115", "Role").unwrap().instantiate().is_none());
    }

    #[test]
    fn test_instantiated_type_matches_descriptor() {
        let catalog = TypeCatalog::builtin();
        for name in [
            iso19115::RESPONSIBLE_PARTY,
            dublin_core::RECORD,
            ebrim::EXTRINSIC_OBJECT_V30,
            sensorml::QUANTITY,
        ] {
            let object = catalog.get(name).unwrap().instantiate().unwrap();
            assert_eq!(object.type_name(), name);
        }
    }

    #[test]
    fn test_record_type_uses_attribute_map() {
        let record = ObjectRef::new(RecordType::default().with_text("title", "Lakes"));
        let guard = record.read();
        let map = guard.attribute_map().unwrap();

        assert_eq!(map.get("title"), &[Value::text("Lakes")]);
        assert!(map.accepts("boundingBoxes"));
        assert!(!map.accepts("boundingBox"));
    }
}
