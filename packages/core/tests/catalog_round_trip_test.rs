//! Integration tests for CatalogService round trips
//!
//! Tests cover:
//! - ISO 19115 graphs with shared sub-objects
//! - Cross-record links through registered linkables
//! - Dublin Core records written under the CSW main standard
//! - SensorML systems in sensor mapping mode
//! - Record replacement and record set reads

use anyhow::Result;
use chrono::{FixedOffset, TimeZone};
use mdcatalog_core::{
    config::MapperConfig,
    db::{InMemoryRecordStore, RecordStore},
    models::core_schemas::{CSW, SENSORML},
    models::metadata::{
        DefaultCitation, DefaultDataIdentification, DefaultExtent, DefaultGeographicBoundingBox,
        DefaultMetadata, DefaultResponsibleParty, QuantityType, RecordType, SystemType,
        TimePeriod,
    },
    models::{CodeValue, InternationalString, Locale, NodeKind, ObjectRef, UnitOfMeasure},
    registry::{MappingMode, MetadataRegistry},
    services::{CatalogService, WriteContext},
};
use std::sync::Arc;

/// Test helper: Create a service over a fresh in-memory store
async fn create_test_env(
    config: MapperConfig,
) -> Result<(CatalogService, Arc<InMemoryRecordStore>)> {
    let store = Arc::new(InMemoryRecordStore::new());
    let service =
        CatalogService::new(config, store.clone(), Arc::new(MetadataRegistry::builtin())).await?;
    Ok((service, store))
}

fn party(name: &str) -> ObjectRef {
    ObjectRef::new(DefaultResponsibleParty {
        individual_name: Some(name.to_string()),
        organisation_name: Some(InternationalString::new("Lake Institute")),
        role: Some(CodeValue::new("CI_RoleCode", "pointOfContact")),
        ..Default::default()
    })
}

fn lake_metadata(contact: &ObjectRef) -> ObjectRef {
    let citation = ObjectRef::new(DefaultCitation {
        title: Some(
            InternationalString::new("Alpine lakes")
                .with_translation(Locale::new("fr"), "Lacs alpins"),
        ),
        cited_responsible_parties: vec![contact.clone()],
        ..Default::default()
    });
    let extent = ObjectRef::new(DefaultExtent {
        geographic_elements: vec![ObjectRef::new(DefaultGeographicBoundingBox::new(
            5.9, 10.5, 45.8, 47.8,
        ))],
        ..Default::default()
    });
    let identification = ObjectRef::new(DefaultDataIdentification {
        citation: Some(citation),
        abstracts: Some(InternationalString::new("Survey of alpine lakes")),
        point_of_contacts: vec![contact.clone()],
        topic_categories: vec![CodeValue::new("MD_TopicCategoryCode", "inlandWaters")],
        extents: vec![extent],
        ..Default::default()
    });
    ObjectRef::new(DefaultMetadata {
        file_identifier: Some("urn:lakes:alpine".to_string()),
        language: Some(Locale::with_country("fr", "CH")),
        character_set: Some(CodeValue::new("MD_CharacterSetCode", "utf8")),
        contacts: vec![contact.clone()],
        date_stamp: Some(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 5, 0, 0, 0)
                .unwrap(),
        ),
        identification_info: vec![identification],
        ..Default::default()
    })
}

// =========================================================================
// ISO 19115 Round Trips
// =========================================================================

#[tokio::test]
async fn test_iso_metadata_round_trip_preserves_sharing() -> Result<()> {
    let (service, store) = create_test_env(MapperConfig::default()).await?;
    let written = service
        .write_record(
            &lake_metadata(&party("A. Hydro")),
            WriteContext::new("lakes", "iso19115").with_identifier("alpine"),
        )
        .await?;
    assert!(written.report.is_clean(), "{:?}", written.report);

    let stored = store.get_record("alpine").await?.expect("record stored");
    stored.validate()?;

    let outcome = service.read_record("alpine").await?;
    assert!(outcome.report.is_clean(), "{:?}", outcome.report);
    let metadata = outcome.object.expect("root object");

    let (contact, identification) = metadata
        .with(|m: &DefaultMetadata| {
            assert_eq!(m.file_identifier.as_deref(), Some("urn:lakes:alpine"));
            assert_eq!(m.language, Some(Locale::with_country("fr", "CH")));
            (m.contacts[0].clone(), m.identification_info[0].clone())
        })
        .expect("metadata type");

    let (point, citation, extent) = identification
        .with(|d: &DefaultDataIdentification| {
            assert_eq!(
                d.topic_categories,
                vec![CodeValue::new("MD_TopicCategoryCode", "inlandWaters")]
            );
            assert_eq!(
                d.abstracts.as_ref().map(|a| a.value.as_str()),
                Some("Survey of alpine lakes")
            );
            (
                d.point_of_contacts[0].clone(),
                d.citation.clone().expect("citation"),
                d.extents[0].clone(),
            )
        })
        .expect("identification type");
    assert!(point.ptr_eq(&contact));

    citation
        .with(|c: &DefaultCitation| {
            let title = c.title.as_ref().expect("title");
            assert_eq!(title.value, "Alpine lakes");
            assert_eq!(title.translation(&Locale::new("fr")), Some("Lacs alpins"));
            assert!(c.cited_responsible_parties[0].ptr_eq(&contact));
        })
        .expect("citation type");

    let bbox = extent
        .with(|e: &DefaultExtent| e.geographic_elements[0].clone())
        .expect("extent type");
    let west = bbox
        .with(|b: &DefaultGeographicBoundingBox| b.west_bound_longitude)
        .expect("bounding box type");
    assert_eq!(west, Some(5.9));
    Ok(())
}

#[tokio::test]
async fn test_linkable_party_is_linked_across_records() -> Result<()> {
    let (service, store) = create_test_env(MapperConfig::default()).await?;
    let contact = party("A. Hydro");

    service
        .write_record(
            &contact,
            WriteContext::new("contacts", "iso19115").with_identifier("party-1"),
        )
        .await?;
    service
        .write_record(
            &lake_metadata(&contact),
            WriteContext::new("lakes", "iso19115").with_identifier("alpine"),
        )
        .await?;

    let stored = store.get_record("alpine").await?.expect("record stored");
    assert!(stored.external_links().contains("party-1"));
    let root = stored.root.expect("root");
    let contact_node = stored
        .children_by_property(root, "contact")
        .next()
        .expect("contact node");
    assert!(matches!(contact_node.kind, NodeKind::Linked(_)));

    let outcome = service.read_record("alpine").await?;
    assert!(outcome.report.is_clean(), "{:?}", outcome.report);
    let name = outcome
        .object
        .expect("root object")
        .with(|m: &DefaultMetadata| {
            m.contacts[0]
                .with(|p: &DefaultResponsibleParty| p.individual_name.clone())
                .flatten()
        })
        .flatten();
    assert_eq!(name.as_deref(), Some("A. Hydro"));
    Ok(())
}

#[tokio::test]
async fn test_replace_keeps_creation_time() -> Result<()> {
    let (service, store) = create_test_env(MapperConfig::default()).await?;
    let context = WriteContext::new("lakes", "iso19115").with_identifier("alpine");
    service
        .write_record(&lake_metadata(&party("A. Hydro")), context.clone())
        .await?;
    let before = store.get_record("alpine").await?.expect("record stored");

    let replacement = ObjectRef::new(DefaultMetadata {
        file_identifier: Some("urn:lakes:replaced".to_string()),
        ..Default::default()
    });
    service.replace_record("alpine", &replacement, context).await?;

    let after = store.get_record("alpine").await?.expect("record stored");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
    let root = after.root.expect("root");
    assert_eq!(after.child_text(root, "fileIdentifier"), Some("urn:lakes:replaced"));
    Ok(())
}

// =========================================================================
// Other Standards
// =========================================================================

#[tokio::test]
async fn test_dublin_core_record_under_csw() -> Result<()> {
    let (service, _store) = create_test_env(MapperConfig::default()).await?;
    let record = ObjectRef::new(
        RecordType::default()
            .with_text("identifier", "dc-1")
            .with_text("title", "Alpine lakes")
            .with_text("subjects", "water")
            .with_text("subjects", "glaciers"),
    );

    service
        .write_record(
            &record,
            WriteContext::new("dc", "csw")
                .with_identifier("dc-1")
                .with_main_standard(CSW),
        )
        .await?;

    let outcome = service.read_record("dc-1").await?;
    assert!(outcome.report.is_clean(), "{:?}", outcome.report);
    outcome
        .object
        .expect("root object")
        .with(|r: &RecordType| {
            assert_eq!(r.attributes.first_text("title"), Some("Alpine lakes"));
            assert_eq!(r.attributes.get("subjects").len(), 2);
        })
        .expect("record type");
    Ok(())
}

#[tokio::test]
async fn test_sensorml_system_round_trip() -> Result<()> {
    let config = MapperConfig {
        main_standard: SENSORML.to_string(),
        mode: MappingMode::SensorMl,
        ..MapperConfig::default()
    };
    let (service, _store) = create_test_env(config).await?;

    let utc = FixedOffset::east_opt(0).unwrap();
    let system = ObjectRef::new(SystemType {
        id: Some("station-12".to_string()),
        keywords: vec!["lake".to_string(), "temperature".to_string()],
        valid_time: Some(ObjectRef::new(TimePeriod {
            begin: Some(utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 0).unwrap()),
            end: None,
        })),
        outputs: vec![ObjectRef::new(QuantityType {
            definition: Some("urn:ogc:def:property:OGC:temperature".to_string()),
            uom: UnitOfMeasure::parse("Cel"),
            value: Some(21.5),
        })],
        ..Default::default()
    });

    service
        .write_record(
            &system,
            WriteContext::new("sensors", "sensorml").with_identifier("station-12"),
        )
        .await?;

    let outcome = service.read_record("station-12").await?;
    assert!(outcome.report.is_clean(), "{:?}", outcome.report);
    let (id, keywords, valid_time, output) = outcome
        .object
        .expect("root object")
        .with(|s: &SystemType| {
            (
                s.id.clone(),
                s.keywords.clone(),
                s.valid_time.clone(),
                s.outputs[0].clone(),
            )
        })
        .expect("system type");
    assert_eq!(id.as_deref(), Some("station-12"));
    assert_eq!(keywords, vec!["lake", "temperature"]);

    let begin = valid_time
        .expect("valid time")
        .with(|p: &TimePeriod| p.begin)
        .flatten();
    assert_eq!(begin, Some(utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 0).unwrap()));

    output
        .with(|q: &QuantityType| {
            assert_eq!(q.uom.as_ref().map(UnitOfMeasure::symbol), Some("Cel"));
            assert_eq!(q.value, Some(21.5));
        })
        .expect("quantity type");
    Ok(())
}

// =========================================================================
// Record Sets
// =========================================================================

#[tokio::test]
async fn test_read_record_set() -> Result<()> {
    let (service, _store) = create_test_env(MapperConfig::default()).await?;
    for id in ["b", "a"] {
        let metadata = ObjectRef::new(DefaultMetadata {
            file_identifier: Some(format!("urn:lakes:{}", id)),
            ..Default::default()
        });
        service
            .write_record(&metadata, WriteContext::new("lakes", "iso19115").with_identifier(id))
            .await?;
    }
    service
        .write_record(
            &ObjectRef::new(DefaultMetadata::default()),
            WriteContext::new("rivers", "iso19115").with_identifier("c"),
        )
        .await?;

    let outcomes = service.read_record_set("lakes").await?;
    let ids: Vec<&str> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(outcomes.iter().all(|(_, o)| o.object.is_some()));
    Ok(())
}
