//! Standard/Namespace Catalog
//!
//! Static tables answering two questions for the type resolver:
//!
//! - **Read side**: which runtime namespaces may hold the runtime type of a
//!   schema class from standard `S` (in mapping mode `M`)?
//! - **Write side**: which standards may hold the schema class of an object
//!   written into a record whose main standard is `S`?
//!
//! Plugins ([`StandardProvider`]) add entries at startup. Everything is
//! merged once by [`StandardCatalogBuilder::build`]; the resulting catalog
//! is immutable.

use crate::models::core_schemas::{self, *};
use crate::models::SchemaClass;
use crate::registry::types::TypeCatalog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Which runtime model family the mapper targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    #[default]
    Iso19115,
    SensorMl,
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingMode::Iso19115 => write!(f, "iso19115"),
            MappingMode::SensorMl => write!(f, "sensorml"),
        }
    }
}

impl FromStr for MappingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iso19115" => Ok(MappingMode::Iso19115),
            "sensorml" => Ok(MappingMode::SensorMl),
            _ => Err(format!("Unknown mapping mode: {}", s)),
        }
    }
}

/// Candidate namespaces contributed for one standard
///
/// `mode: None` applies to every mapping mode; a mode-specific entry wins
/// over the generic one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub mode: Option<MappingMode>,
    pub standard: String,
    pub namespaces: Vec<String>,
}

impl NamespaceEntry {
    pub fn new(mode: Option<MappingMode>, standard: &str, namespaces: &[&str]) -> Self {
        Self {
            mode,
            standard: standard.to_string(),
            namespaces: namespaces.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Extension point for additional standards
///
/// Providers are registered once, before the registry is built. Every
/// method has an empty default so a provider only overrides what it adds.
pub trait StandardProvider: Send + Sync {
    fn name(&self) -> &str;

    fn namespaces(&self) -> Vec<NamespaceEntry> {
        Vec::new()
    }

    /// `(main standard, compatible standards)` pairs
    fn compatible_standards(&self) -> Vec<(String, Vec<String>)> {
        Vec::new()
    }

    /// `(standard, prefix)` pairs used by the dialect-prefix name transform
    fn dialect_prefixes(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn schema_classes(&self) -> Vec<SchemaClass> {
        Vec::new()
    }

    fn register_types(&self, _catalog: &mut TypeCatalog) {}
}

/// Immutable merged namespace and compatibility tables
#[derive(Debug, Clone)]
pub struct StandardCatalog {
    namespaces: HashMap<(Option<MappingMode>, String), Vec<String>>,
    default_namespaces: Vec<String>,
    compatible: HashMap<String, Vec<String>>,
    dialect_prefixes: HashMap<String, String>,
}

impl StandardCatalog {
    pub fn builtin() -> Self {
        StandardCatalogBuilder::new().build()
    }

    /// Ordered runtime namespaces to search for classes of `standard`
    pub fn namespaces_for(&self, mode: MappingMode, standard: &str) -> &[String] {
        self.namespaces
            .get(&(Some(mode), standard.to_string()))
            .or_else(|| self.namespaces.get(&(None, standard.to_string())))
            .unwrap_or(&self.default_namespaces)
    }

    /// Ordered standards probed when writing a record of `main_standard`
    ///
    /// Unknown standards are only compatible with themselves.
    pub fn compatible_standards(&self, main_standard: &str) -> Vec<String> {
        self.compatible
            .get(main_standard)
            .cloned()
            .unwrap_or_else(|| vec![main_standard.to_string()])
    }

    pub fn dialect_prefix(&self, standard: &str) -> Option<&str> {
        self.dialect_prefixes.get(standard).map(String::as_str)
    }

    pub fn knows_standard(&self, standard: &str) -> bool {
        self.compatible.contains_key(standard)
            || self.namespaces.keys().any(|(_, s)| s == standard)
    }

    pub fn standards(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.compatible
            .iter()
            .map(|(name, list)| (name.as_str(), list.as_slice()))
    }
}

/// Collects builtin and plugin entries before freezing them
#[derive(Debug, Clone)]
pub struct StandardCatalogBuilder {
    namespaces: HashMap<(Option<MappingMode>, String), Vec<String>>,
    compatible: HashMap<String, Vec<String>>,
    dialect_prefixes: HashMap<String, String>,
}

impl Default for StandardCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardCatalogBuilder {
    /// Builder seeded with the builtin tables
    pub fn new() -> Self {
        let mut builder = Self {
            namespaces: HashMap::new(),
            compatible: HashMap::new(),
            dialect_prefixes: HashMap::new(),
        };

        let csw_group = ["csw", "dublincore", "ows", "filter"];
        for standard in [CSW, DUBLIN_CORE, DUBLIN_CORE_TERMS, OWS, FILTER] {
            builder.add_namespaces(NamespaceEntry::new(None, standard, &csw_group));
        }
        for standard in [EBRIM_30, WRS_10] {
            builder.add_namespaces(NamespaceEntry::new(None, standard, &["ebrim30", "wrs10"]));
        }
        for standard in [EBRIM_25, WRS_09] {
            builder.add_namespaces(NamespaceEntry::new(None, standard, &["ebrim25", "wrs09"]));
        }
        builder.add_namespaces(NamespaceEntry::new(None, SENSORML, &["sensorml", "swe", "gml"]));
        builder.add_namespaces(NamespaceEntry::new(None, SWE, &["swe"]));
        builder.add_namespaces(NamespaceEntry::new(
            Some(MappingMode::Iso19115),
            ISO_19108,
            &["iso19108"],
        ));
        builder.add_namespaces(NamespaceEntry::new(
            Some(MappingMode::SensorMl),
            ISO_19108,
            &["gml"],
        ));
        builder.add_namespaces(NamespaceEntry::new(None, ISO_19115_2, &["iso19115_2", "iso19115"]));
        builder.add_namespaces(NamespaceEntry::new(None, MDWEB, &["mdweb"]));

        for standard in core_schemas::builtin_standards() {
            builder.add_compatible(&standard.name, standard.compatible_standards);
        }

        builder.add_dialect_prefix(ISO_19108, "Time");
        builder
    }

    /// Append namespaces for a standard, keeping existing ones first
    pub fn add_namespaces(&mut self, entry: NamespaceEntry) {
        let list = self
            .namespaces
            .entry((entry.mode, entry.standard))
            .or_default();
        for namespace in entry.namespaces {
            if !list.contains(&namespace) {
                list.push(namespace);
            }
        }
    }

    pub fn add_compatible(&mut self, main_standard: &str, standards: Vec<String>) {
        let list = self.compatible.entry(main_standard.to_string()).or_default();
        for standard in standards {
            if !list.contains(&standard) {
                list.push(standard);
            }
        }
    }

    pub fn add_dialect_prefix(&mut self, standard: &str, prefix: &str) {
        self.dialect_prefixes
            .insert(standard.to_string(), prefix.to_string());
    }

    /// Merge everything a provider contributes to the standard tables
    pub fn add_provider(&mut self, provider: &dyn StandardProvider) {
        for entry in provider.namespaces() {
            self.add_namespaces(entry);
        }
        for (main, standards) in provider.compatible_standards() {
            self.add_compatible(&main, standards);
        }
        for (standard, prefix) in provider.dialect_prefixes() {
            self.add_dialect_prefix(&standard, &prefix);
        }
        tracing::info!("Merged standard provider '{}'", provider.name());
    }

    pub fn build(self) -> StandardCatalog {
        StandardCatalog {
            namespaces: self.namespaces,
            default_namespaces: vec!["iso19115".to_string(), "gml".to_string()],
            compatible: self.compatible,
            dialect_prefixes: self.dialect_prefixes,
        }
    }
}
