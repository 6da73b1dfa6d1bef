//! Schema ↔ runtime attribute naming
//!
//! Schema property names are singular (`contact`), runtime attributes of
//! multi-valued properties are plural (`contacts`). A handful of names
//! differ only for one owner class (`CI_Citation.date` is `dates`, but
//! `CI_Date.date` stays `date`), so entries may be scoped to the class that
//! declares the property.

/// Slots every metadata object may carry outside its accessor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialSlot {
    InternalId,
    ExternalLink,
}

/// `(owner class, schema property, runtime attribute)`; `None` owners match any class
const CORRECTIONS: &[(Option<&str>, &str, &str)] = &[
    (Some("MD_Identification"), "abstract", "abstracts"),
    (None, "contact", "contacts"),
    (None, "pointOfContact", "pointOfContacts"),
    (None, "citedResponsibleParty", "citedResponsibleParties"),
    (None, "geographicElement", "geographicElements"),
    (Some("CI_Citation"), "date", "dates"),
    (Some("CI_Citation"), "identifier", "identifiers"),
    (None, "hierarchyLevel", "hierarchyLevels"),
    (None, "topicCategory", "topicCategories"),
    (Some("MD_DataIdentification"), "language", "languages"),
    (Some("MD_DataIdentification"), "extent", "extents"),
    (None, "slot", "slots"),
];

/// Runtime attribute name for `owner_class.property`
pub fn runtime_attribute<'a>(owner_class: &str, property: &'a str) -> &'a str {
    CORRECTIONS
        .iter()
        .find(|(owner, schema, _)| {
            *schema == property && owner.map_or(true, |owner| owner == owner_class)
        })
        .map(|(_, _, runtime)| *runtime)
        .unwrap_or(property)
}

pub fn special_slot(property: &str) -> Option<SpecialSlot> {
    match property {
        "id" | "uuid" => Some(SpecialSlot::InternalId),
        "href" | "xlinkHref" => Some(SpecialSlot::ExternalLink),
        _ => None,
    }
}

/// Plural spellings tried when an attribute map rejects a name
///
/// `subject` → `subjects`, `category` → `categories`, `box` → `boxes`
pub fn plural_variants(name: &str) -> Vec<String> {
    let mut variants = vec![format!("{}s", name)];
    if let Some(stem) = name.strip_suffix('y') {
        variants.push(format!("{}ies", stem));
    }
    variants.push(format!("{}es", name));
    variants
}
