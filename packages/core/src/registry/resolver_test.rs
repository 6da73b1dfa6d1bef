//! Tests for type resolution in both directions

#[cfg(test)]
mod tests {
    use crate::models::core_schemas::*;
    use crate::models::metadata::{iso19115, temporal, DefaultCitation, TimePeriod};
    use crate::models::{ObjectRef, SchemaClass, ValueKind};
    use crate::registry::resolver::nominal_class_name;
    use crate::registry::{
        CacheKey, MappingMode, MetadataRegistry, NamespaceEntry, PropertyAccessor, RuntimeType,
        StandardProvider, TypeCatalog, TypeDescriptor, TypeResolver,
    };
    use std::sync::Arc;

    fn described(runtime: Option<RuntimeType>) -> String {
        runtime
            .and_then(|r| r.descriptor().map(|d| d.qualified_name()))
            .unwrap_or_default()
    }

    // ========================================================================
    // Read Direction
    // ========================================================================

    #[test]
    fn test_primitives_bypass_namespaces() {
        let resolver = TypeResolver::builtin();

        assert_eq!(
            resolver.resolve_type(MappingMode::Iso19115, ISO_19103, "CharacterString"),
            Some(RuntimeType::Primitive(ValueKind::Text))
        );
        assert_eq!(
            resolver.resolve_type(MappingMode::Iso19115, ISO_19103, "PT_FreeText"),
            Some(RuntimeType::Primitive(ValueKind::FreeText))
        );
        assert_eq!(resolver.chain_evaluations(), 0);
    }

    #[test]
    fn test_iso_classes_resolve_through_chain() {
        let resolver = TypeResolver::builtin();
        let mode = MappingMode::Iso19115;

        assert_eq!(
            described(resolver.resolve_type(mode, ISO_19115, "CI_ResponsibleParty")),
            iso19115::RESPONSIBLE_PARTY
        );
        assert_eq!(
            described(resolver.resolve_type(mode, ISO_19115, "CI_RoleCode")),
            "iso19115.Role"
        );
        assert_eq!(
            described(resolver.resolve_type(mode, ISO_19115, "MD_TopicCategoryCode")),
            "iso19115.TopicCategory"
        );
        assert_eq!(
            resolver
                .resolve_type(mode, ISO_19115, "MD_TopicCategoryCode")
                .map(|r| r.value_kind()),
            Some(ValueKind::Enumeration)
        );
        // MD_Metadata subclass in ISO 19115-2 falls back to the ISO namespace
        assert_eq!(
            described(resolver.resolve_type(mode, ISO_19115_2, "MI_Metadata")),
            iso19115::METADATA
        );
    }

    #[test]
    fn test_legacy_renames() {
        let resolver = TypeResolver::builtin();
        let mode = MappingMode::Iso19115;

        assert_eq!(
            described(resolver.resolve_type(mode, ISO_19115, "CI_Date")),
            iso19115::CITATION_DATE
        );
        assert_eq!(
            described(resolver.resolve_type(mode, ISO_19115, "MD_Identification")),
            iso19115::DATA_IDENTIFICATION
        );
        assert_eq!(resolver.chain_evaluations(), 0);
    }

    #[test]
    fn test_temporal_types_follow_mode() {
        let resolver = TypeResolver::builtin();

        assert_eq!(
            described(resolver.resolve_type(MappingMode::Iso19115, ISO_19108, "TM_Period")),
            temporal::PERIOD
        );
        assert_eq!(
            described(resolver.resolve_type(MappingMode::SensorMl, ISO_19108, "TM_Period")),
            temporal::GML_PERIOD
        );
    }

    #[test]
    fn test_dialect_namespaces() {
        let resolver = TypeResolver::builtin();
        let mode = MappingMode::Iso19115;

        assert_eq!(described(resolver.resolve_type(mode, CSW, "Record")), "csw.RecordType");
        assert_eq!(
            described(resolver.resolve_type(mode, EBRIM_30, "ExtrinsicObject")),
            "ebrim30.ExtrinsicObjectType"
        );
        assert_eq!(
            described(resolver.resolve_type(mode, EBRIM_25, "ExtrinsicObject")),
            "ebrim25.ExtrinsicObjectType"
        );
        assert_eq!(
            described(resolver.resolve_type(mode, SWE, "Quantity")),
            "swe.QuantityType"
        );
    }

    #[test]
    fn test_resolution_is_cached() {
        let resolver = TypeResolver::builtin();
        let mode = MappingMode::Iso19115;

        let first = resolver.resolve_type(mode, ISO_19115, "CI_Citation").unwrap();
        assert_eq!(resolver.chain_evaluations(), 1);
        let second = resolver.resolve_type(mode, ISO_19115, "CI_Citation").unwrap();
        assert_eq!(resolver.chain_evaluations(), 1);

        let (a, b) = (first.descriptor().unwrap(), second.descriptor().unwrap());
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_failures_are_remembered() {
        let resolver = TypeResolver::builtin();
        let mode = MappingMode::Iso19115;

        assert!(resolver.resolve_type(mode, ISO_19115, "MD_Unknown").is_none());
        assert!(resolver.resolve_type(mode, ISO_19115, "MD_Unknown").is_none());
        assert_eq!(resolver.chain_evaluations(), 1);
        assert_eq!(resolver.cached_types(), 0);
    }

    #[test]
    fn test_cache_key_format() {
        let key = CacheKey::new(MappingMode::Iso19115, "DublinCore-terms", "Record");
        assert_eq!(key.to_string(), "iso19115-DublinCore-terms:Record");
        assert_eq!(key.to_string().parse::<CacheKey>(), Ok(key));
        assert!("iso19115-Record".parse::<CacheKey>().is_err());
        assert!("xml-ISO 19115:Record".parse::<CacheKey>().is_err());
    }

    // ========================================================================
    // Write Direction
    // ========================================================================

    #[test]
    fn test_nominal_names() {
        assert_eq!(nominal_class_name("DefaultCitation"), "Citation");
        assert_eq!(nominal_class_name("ExtrinsicObjectType"), "ExtrinsicObject");
        assert_eq!(nominal_class_name("TimePeriod"), "TimePeriod");
        assert_eq!(nominal_class_name("Type"), "Type");
    }

    #[test]
    fn test_root_element_names_the_class() {
        let resolver = TypeResolver::builtin();
        let citation = ObjectRef::new(DefaultCitation::default());

        let class = resolver.resolve_class(&citation, ISO_19115).unwrap();
        assert_eq!(class.name, "CI_Citation");
        assert_eq!(class.standard, ISO_19115);
    }

    #[test]
    fn test_temporal_probes_find_tm_classes() {
        let resolver = TypeResolver::builtin();
        let period = ObjectRef::new(TimePeriod::default());

        let class = resolver.resolve_class(&period, SENSORML).unwrap();
        assert_eq!(class.name, "TM_Period");
        assert_eq!(class.standard, ISO_19108);
    }

    #[test]
    fn test_incompatible_main_standard_fails() {
        let resolver = TypeResolver::builtin();
        let citation = ObjectRef::new(DefaultCitation::default());

        assert!(resolver.resolve_class(&citation, CSW).is_none());
        assert!(resolver.resolve_class(&citation, CSW).is_none());
    }

    // ========================================================================
    // Plugins
    // ========================================================================

    #[derive(Debug, Default)]
    struct Theme {
        keyword: Option<String>,
    }

    crate::metadata_object!(Theme, "inspire.ThemeType");

    struct InspireProvider;

    impl StandardProvider for InspireProvider {
        fn name(&self) -> &str {
            "inspire"
        }

        fn namespaces(&self) -> Vec<NamespaceEntry> {
            vec![NamespaceEntry::new(None, "INSPIRE", &["inspire"])]
        }

        fn compatible_standards(&self) -> Vec<(String, Vec<String>)> {
            vec![(
                "INSPIRE".to_string(),
                vec!["INSPIRE".to_string(), ISO_19103.to_string()],
            )]
        }

        fn schema_classes(&self) -> Vec<SchemaClass> {
            vec![SchemaClass::composite("INSPIRE", "Theme").property(
                "keyword",
                ISO_19103,
                "CharacterString",
            )]
        }

        fn register_types(&self, catalog: &mut TypeCatalog) {
            catalog.register(
                TypeDescriptor::object("inspire", "ThemeType", || ObjectRef::new(Theme::default()))
                    .property(PropertyAccessor::one::<Theme>(
                        "keyword",
                        ValueKind::Text,
                        |t| crate::registry::types::opt(&t.keyword, crate::models::Value::Text),
                        |t, v| {
                            t.keyword = Some(crate::registry::types::expect_text(v)?);
                            Ok(())
                        },
                    )),
            );
        }
    }

    #[test]
    fn test_provider_types_resolve_both_ways() {
        let registry = MetadataRegistry::builder()
            .with_provider(&InspireProvider)
            .build();
        let resolver = TypeResolver::new(Arc::new(registry));

        assert_eq!(
            described(resolver.resolve_type(MappingMode::Iso19115, "INSPIRE", "Theme")),
            "inspire.ThemeType"
        );

        let theme = ObjectRef::new(Theme::default());
        let class = resolver.resolve_class(&theme, "INSPIRE").unwrap();
        assert_eq!(class.name, "Theme");
        assert!(resolver.registry().schemas().is_compatible("INSPIRE", ISO_19103));
    }
}
