//! Tests for the graph serializer

#[cfg(test)]
mod tests {
    use crate::config::MappingOptions;
    use crate::mapping::{FailureReason, LinkableEntities, MappingError, Materializer, Serializer};
    use crate::models::core_schemas::{CSW, ISO_19115};
    use crate::models::metadata::{
        DefaultCitation, DefaultCitationDate, DefaultDataIdentification, DefaultIdentifier,
        DefaultMetadata, DefaultResponsibleParty, RecordType,
    };
    use crate::models::{
        CodeValue, InternationalString, Locale, NodeId, NodeKind, ObjectRef, Record, ValueNode,
    };
    use crate::registry::TypeResolver;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn empty(identifier: &str) -> Record {
        Record::new(identifier, "catalog", "test")
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn party(name: &str, role: &str) -> ObjectRef {
        ObjectRef::new(DefaultResponsibleParty {
            individual_name: Some(name.to_string()),
            role: Some(CodeValue::new("CI_RoleCode", role)),
            ..Default::default()
        })
    }

    fn sample_metadata() -> ObjectRef {
        ObjectRef::new(DefaultMetadata {
            file_identifier: Some("urn:lakes:1".to_string()),
            language: Some(Locale::with_country("fr", "FR")),
            character_set: Some(CodeValue::new("MD_CharacterSetCode", "utf8")),
            hierarchy_levels: vec![
                CodeValue::new("MD_ScopeCode", "dataset"),
                CodeValue::new("MD_ScopeCode", "series"),
            ],
            contacts: vec![party("A. Hydro", "author"), party("B. Limno", "owner")],
            date_stamp: Some(utc().with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()),
            ..Default::default()
        })
    }

    fn texts<'a>(record: &'a Record, parent: NodeId, property: &'a str) -> Vec<&'a str> {
        record
            .children_by_property(parent, property)
            .filter_map(ValueNode::text)
            .collect()
    }

    // ========================================================================
    // Tree Shape
    // ========================================================================

    #[test]
    fn test_metadata_tree_shape() {
        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let outcome = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&sample_metadata())
            .unwrap();
        assert!(outcome.report.is_clean(), "{:?}", outcome.report);

        let record = outcome.record;
        let root = record.root.unwrap();
        assert_eq!(record.root_node().unwrap().path.to_string(), "ISO 19115:MD_Metadata");
        assert_eq!(record.child_text(root, "fileIdentifier"), Some("urn:lakes:1"));
        assert_eq!(record.child_text(root, "characterSet"), Some("4"));
        assert_eq!(texts(&record, root, "hierarchyLevel"), vec!["5", "6"]);
        assert_eq!(
            record.child_text(root, "dateStamp"),
            Some("2024-03-05T00:00:00+00:00")
        );

        let language = record.children_by_property(root, "language").next().unwrap();
        assert_eq!(record.child_text(language.id, "languageCode"), Some("fr"));
        assert_eq!(record.child_text(language.id, "country"), Some("FR"));

        let contacts: Vec<&ValueNode> = record.children_by_property(root, "contact").collect();
        assert_eq!(contacts.iter().map(|c| c.ordinal).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(record.child_text(contacts[0].id, "individualName"), Some("A. Hydro"));
        assert_eq!(record.child_text(contacts[0].id, "role"), Some("11"));
        assert_eq!(record.child_text(contacts[1].id, "individualName"), Some("B. Limno"));

        assert!(record.validate().is_ok());
        assert_eq!(outcome.linkables.len(), 2);
    }

    #[test]
    fn test_dates_are_normalized_to_configured_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let date = ObjectRef::new(DefaultCitationDate {
            date: Some(plus_two.with_ymd_and_hms(2024, 3, 5, 10, 15, 30).unwrap()),
            date_type: Some(CodeValue::new("CI_DateTypeCode", "creation")),
        });
        let citation = ObjectRef::new(DefaultCitation {
            title: Some(InternationalString::new("Lakes")),
            dates: vec![date],
            ..Default::default()
        });

        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let record = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&citation)
            .unwrap()
            .record;

        let root = record.root.unwrap();
        let date = record.children_by_property(root, "date").next().unwrap();
        assert_eq!(record.child_text(date.id, "date"), Some("2024-03-05T08:15:30+00:00"));
        assert_eq!(record.child_text(date.id, "dateType"), Some("1"));
    }

    #[test]
    fn test_free_text_writes_text_groups() {
        let citation = ObjectRef::new(DefaultCitation {
            title: Some(
                InternationalString::new("Lakes").with_translation(Locale::new("fr"), "Lacs"),
            ),
            ..Default::default()
        });

        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let record = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&citation)
            .unwrap()
            .record;

        let root = record.root.unwrap();
        let title = record.children_by_property(root, "title").next().unwrap();
        assert!(title.is_composite());
        assert_eq!(record.child_text(title.id, "value"), Some("Lakes"));

        let group = record.children_by_property(title.id, "textGroup").next().unwrap();
        assert_eq!(record.child_text(group.id, "value"), Some("Lacs"));
        assert_eq!(record.child_text(group.id, "locale"), Some("#locale-fr"));
    }

    // ========================================================================
    // Codes
    // ========================================================================

    #[test]
    fn test_unmatched_code_is_dropped() {
        let metadata = ObjectRef::new(DefaultMetadata {
            file_identifier: Some("kept".to_string()),
            character_set: Some(CodeValue::new("MD_CharacterSetCode", "klingon")),
            ..Default::default()
        });

        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let outcome = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&metadata)
            .unwrap();

        assert_eq!(outcome.report.count(&FailureReason::UnmatchedCode), 1);
        let root = outcome.record.root.unwrap();
        assert!(outcome.record.child_text(root, "characterSet").is_none());
        assert_eq!(outcome.record.child_text(root, "fileIdentifier"), Some("kept"));
    }

    #[test]
    fn test_enumerations_write_lowercase_names() {
        let identification = ObjectRef::new(DefaultDataIdentification {
            topic_categories: vec![CodeValue::new("MD_TopicCategoryCode", "inlandWaters")],
            languages: vec![Locale::with_country("en", "GB")],
            ..Default::default()
        });

        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let record = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&identification)
            .unwrap()
            .record;

        let root = record.root.unwrap();
        assert_eq!(record.child_text(root, "topicCategory"), Some("inlandwaters"));
        assert_eq!(record.child_text(root, "language"), Some("en_GB"));
    }

    // ========================================================================
    // Identity and Links
    // ========================================================================

    #[test]
    fn test_cycle_writes_one_subtree_and_a_link() {
        let citation = ObjectRef::new(DefaultCitation {
            title: Some(InternationalString::new("Lakes")),
            ..Default::default()
        });
        let identifier = ObjectRef::new(DefaultIdentifier {
            code: Some("LAKES-1".to_string()),
            authority: Some(citation.clone()),
            ..Default::default()
        });
        citation
            .with_mut(|c: &mut DefaultCitation| c.identifiers.push(identifier.clone()))
            .unwrap();

        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let record = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&citation)
            .unwrap()
            .record;

        assert!(record.validate().is_ok());
        let root = record.root.unwrap();
        let citations = record
            .nodes()
            .iter()
            .filter(|n| n.is_composite())
            .filter(|n| n.schema_class.as_ref().map(|c| c.name.as_str()) == Some("CI_Citation"))
            .count();
        assert_eq!(citations, 1);

        let ident = record.children_by_property(root, "identifier").next().unwrap();
        let authority = record.children_by_property(ident.id, "authority").next().unwrap();
        let target = authority.link().unwrap();
        assert_eq!(target.record, None);
        assert_eq!(target.node, root);
        assert_eq!(
            authority.schema_class.as_ref().map(|c| c.name.as_str()),
            Some("CI_Citation")
        );
    }

    #[test]
    fn test_shared_object_is_linked_after_first_write() {
        let contact = party("A. Hydro", "author");
        let identification = ObjectRef::new(DefaultDataIdentification {
            point_of_contacts: vec![contact.clone()],
            ..Default::default()
        });
        let metadata = ObjectRef::new(DefaultMetadata {
            contacts: vec![contact],
            identification_info: vec![identification],
            ..Default::default()
        });

        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let outcome = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&metadata)
            .unwrap();
        let record = &outcome.record;
        assert!(record.validate().is_ok());

        let root = record.root.unwrap();
        let written = record.children_by_property(root, "contact").next().unwrap();
        let info = record.children_by_property(root, "identificationInfo").next().unwrap();
        let point = record.children_by_property(info.id, "pointOfContact").next().unwrap();
        assert_eq!(point.link().map(|t| t.node), Some(written.id));
        assert_eq!(outcome.linkables.len(), 1);
    }

    #[test]
    fn test_known_linkable_becomes_external_link() {
        let contact = party("A. Hydro", "author");
        let linkables = LinkableEntities::new();
        linkables.register(&contact, "contacts", NodeId(0));

        let metadata = ObjectRef::new(DefaultMetadata {
            contacts: vec![contact],
            ..Default::default()
        });

        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let outcome = Serializer::new(&resolver, &options, empty("rec-1"))
            .with_linkables(&linkables)
            .write(&metadata)
            .unwrap();
        let record = &outcome.record;

        let root = record.root.unwrap();
        let node = record.children_by_property(root, "contact").next().unwrap();
        match &node.kind {
            NodeKind::Linked(target) => {
                assert_eq!(target.record.as_deref(), Some("contacts"));
                assert_eq!(target.node, NodeId(0));
            }
            other => panic!("expected a link, got {:?}", other),
        }
        assert!(record.external_links().contains("contacts"));
        assert!(outcome.linkables.is_empty());
    }

    // ========================================================================
    // Main Standard
    // ========================================================================

    #[test]
    fn test_root_outside_main_standard_is_rejected() {
        let citation = ObjectRef::new(DefaultCitation::default());
        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();

        let error = Serializer::new(&resolver, &options, empty("rec-1"))
            .main_standard(CSW)
            .write(&citation)
            .unwrap_err();
        assert!(matches!(error, MappingError::UnresolvedRoot { .. }));
    }

    #[test]
    fn test_dublin_core_record_under_csw() {
        let dc = ObjectRef::new(
            RecordType::default()
                .with_text("identifier", "dc-1")
                .with_text("title", "Lakes")
                .with_text("subjects", "water")
                .with_text("subjects", "ice"),
        );
        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();

        let record = Serializer::new(&resolver, &options, empty("dc-1"))
            .main_standard(CSW)
            .write(&dc)
            .unwrap()
            .record;

        let root = record.root.unwrap();
        assert_eq!(record.root_node().unwrap().path.to_string(), "Catalog Web Service:Record");
        assert_eq!(record.child_text(root, "title"), Some("Lakes"));
        assert_eq!(texts(&record, root, "subject"), vec!["water", "ice"]);
        let ordinals: Vec<u32> = record
            .children_by_property(root, "subject")
            .map(|n| n.ordinal)
            .collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    // ========================================================================
    // Round Trip
    // ========================================================================

    #[test]
    fn test_written_record_reads_back() {
        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let written = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&sample_metadata())
            .unwrap();

        let outcome = Materializer::new(&resolver, &options).read(&written.record);
        assert!(outcome.report.is_clean(), "{:?}", outcome.report);

        let expected: DateTime<FixedOffset> = utc().with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        outcome
            .object
            .unwrap()
            .with(|m: &DefaultMetadata| {
                assert_eq!(m.file_identifier.as_deref(), Some("urn:lakes:1"));
                assert_eq!(m.language, Some(Locale::with_country("fr", "FR")));
                assert_eq!(m.character_set, Some(CodeValue::new("MD_CharacterSetCode", "utf8")));
                assert_eq!(m.hierarchy_levels.len(), 2);
                assert_eq!(m.date_stamp, Some(expected));
                assert_eq!(m.contacts.len(), 2);
                let role = m.contacts[0].with(|p: &DefaultResponsibleParty| p.role.clone());
                assert_eq!(role, Some(Some(CodeValue::new("CI_RoleCode", "author"))));
            })
            .unwrap();
    }

    #[test]
    fn test_root_class_matches_main_standard() {
        let resolver = TypeResolver::builtin();
        let options = MappingOptions::default();
        let record = Serializer::new(&resolver, &options, empty("rec-1"))
            .write(&party("A. Hydro", "author"))
            .unwrap()
            .record;
        let class = record.root_node().unwrap().schema_class.clone().unwrap();
        assert_eq!(class.standard, ISO_19115);
        assert_eq!(class.name, "CI_ResponsibleParty");
    }
}
