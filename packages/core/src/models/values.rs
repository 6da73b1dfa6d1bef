//! Metadata Values
//!
//! This module defines the values carried by metadata objects and exchanged
//! between the value tree and the typed object graph:
//!
//! - Scalars (text, numbers, booleans, dates, URIs)
//! - Special composites with a fixed persisted shape (free text, locale,
//!   qualified name, unlimited integer)
//! - Code list and enumeration members
//! - References to other metadata objects ([`ObjectRef`])
//!
//! Every value has a [`ValueKind`]; property accessors declare the kind they
//! accept so the mapper can coerce mismatched values before giving up.

use crate::models::object::ObjectRef;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A language tag with an optional country part (`fr`, `fr_FR`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Locale {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: None,
        }
    }

    pub fn with_country(language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: Some(country.into()),
        }
    }

    /// Tag in `language_COUNTRY` form
    pub fn tag(&self) -> String {
        match &self.country {
            Some(country) => format!("{}_{}", self.language, country),
            None => self.language.clone(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Free text with a base value and per-locale translations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InternationalString {
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub translations: Vec<(Locale, String)>,
}

impl InternationalString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            translations: Vec::new(),
        }
    }

    pub fn with_translation(mut self, locale: Locale, text: impl Into<String>) -> Self {
        self.translations.push((locale, text.into()));
        self
    }

    pub fn translation(&self, locale: &Locale) -> Option<&str> {
        self.translations
            .iter()
            .find(|(l, _)| l == locale)
            .map(|(_, text)| text.as_str())
    }
}

/// Member of a code list or enumeration
///
/// `list` is the schema class name of the code list (e.g. `CI_RoleCode`),
/// `identifier` the member name (e.g. `pointOfContact`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeValue {
    pub list: String,
    pub identifier: String,
}

impl CodeValue {
    pub fn new(list: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            identifier: identifier.into(),
        }
    }
}

/// Namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub local_part: String,
}

impl QualifiedName {
    pub fn new(namespace: Option<String>, local_part: impl Into<String>) -> Self {
        Self {
            namespace,
            local_part: local_part.into(),
        }
    }
}

/// Integer that may also be unbounded (`maxOccurs="unbounded"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnlimitedInteger {
    pub value: i64,
    pub infinite: bool,
}

impl UnlimitedInteger {
    pub fn finite(value: i64) -> Self {
        Self {
            value,
            infinite: false,
        }
    }

    pub fn infinite() -> Self {
        Self {
            value: i64::MAX,
            infinite: true,
        }
    }
}

/// Unit of measure symbol (`m`, `Cel`, `urn:ogc:def:uom:...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitOfMeasure(pub String);

impl UnitOfMeasure {
    /// Parse a unit symbol; blank symbols are rejected
    pub fn parse(symbol: &str) -> Option<Self> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }
}

/// Kind tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    Uri,
    Locale,
    QualifiedName,
    UnlimitedInteger,
    FreeText,
    Code,
    Enumeration,
    Unit,
    Object,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "Text",
            Self::Integer => "Integer",
            Self::Decimal => "Decimal",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::Uri => "Uri",
            Self::Locale => "Locale",
            Self::QualifiedName => "QualifiedName",
            Self::UnlimitedInteger => "UnlimitedInteger",
            Self::FreeText => "FreeText",
            Self::Code => "Code",
            Self::Enumeration => "Enumeration",
            Self::Unit => "Unit",
            Self::Object => "Object",
            Self::List => "List",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Text" => Ok(Self::Text),
            "Integer" => Ok(Self::Integer),
            "Decimal" => Ok(Self::Decimal),
            "Boolean" => Ok(Self::Boolean),
            "Date" => Ok(Self::Date),
            "Uri" => Ok(Self::Uri),
            "Locale" => Ok(Self::Locale),
            "QualifiedName" => Ok(Self::QualifiedName),
            "UnlimitedInteger" => Ok(Self::UnlimitedInteger),
            "FreeText" => Ok(Self::FreeText),
            "Code" => Ok(Self::Code),
            "Enumeration" => Ok(Self::Enumeration),
            "Unit" => Ok(Self::Unit),
            "Object" => Ok(Self::Object),
            "List" => Ok(Self::List),
            _ => Err(format!("Unknown value kind: {}", s)),
        }
    }
}

/// A value held by a metadata object property
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Date(DateTime<FixedOffset>),
    Uri(String),
    Locale(Locale),
    QualifiedName(QualifiedName),
    UnlimitedInteger(UnlimitedInteger),
    FreeText(InternationalString),
    Code(CodeValue),
    Enumeration(CodeValue),
    Unit(UnitOfMeasure),
    Object(ObjectRef),
    List(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::Uri(_) => ValueKind::Uri,
            Self::Locale(_) => ValueKind::Locale,
            Self::QualifiedName(_) => ValueKind::QualifiedName,
            Self::UnlimitedInteger(_) => ValueKind::UnlimitedInteger,
            Self::FreeText(_) => ValueKind::FreeText,
            Self::Code(_) => ValueKind::Code,
            Self::Enumeration(_) => ValueKind::Enumeration,
            Self::Unit(_) => ValueKind::Unit,
            Self::Object(_) => ValueKind::Object,
            Self::List(_) => ValueKind::List,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the textual payload of text-like values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Uri(s) => Some(s),
            Self::FreeText(f) => Some(&f.value),
            _ => None,
        }
    }
}

/// Objects compare by identity, everything else structurally
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Uri(a), Self::Uri(b)) => a == b,
            (Self::Locale(a), Self::Locale(b)) => a == b,
            (Self::QualifiedName(a), Self::QualifiedName(b)) => a == b,
            (Self::UnlimitedInteger(a), Self::UnlimitedInteger(b)) => a == b,
            (Self::FreeText(a), Self::FreeText(b)) => a == b,
            (Self::Code(a), Self::Code(b)) => a == b,
            (Self::Enumeration(a), Self::Enumeration(b)) => a == b,
            (Self::Unit(a), Self::Unit(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_tag() {
        assert_eq!(Locale::new("en").tag(), "en");
        assert_eq!(Locale::with_country("fr", "FR").tag(), "fr_FR");
    }

    #[test]
    fn test_international_string_translation_lookup() {
        let text = InternationalString::new("Lakes")
            .with_translation(Locale::new("fr"), "Lacs")
            .with_translation(Locale::new("de"), "Seen");

        assert_eq!(text.translation(&Locale::new("fr")), Some("Lacs"));
        assert_eq!(text.translation(&Locale::new("es")), None);
    }

    #[test]
    fn test_unit_of_measure_rejects_blank() {
        assert!(UnitOfMeasure::parse("  ").is_none());
        assert!(UnitOfMeasure::parse("deg C").is_none());
        assert_eq!(UnitOfMeasure::parse(" Cel ").unwrap().symbol(), "Cel");
    }

    #[test]
    fn test_value_kind_roundtrips_through_display() {
        for kind in [ValueKind::Text, ValueKind::FreeText, ValueKind::Enumeration] {
            let parsed: ValueKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
