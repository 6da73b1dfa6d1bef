/// Configuration for the metadata mapper and catalog service
use crate::mapping::MappingError;
use crate::registry::MappingMode;
use chrono::FixedOffset;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Mapper configuration, usually loaded from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Standard whose compatible standards are probed when writing
    pub main_standard: String,

    /// Namespace selection mode for temporal classes
    pub mode: MappingMode,

    /// Offset serialized dates are normalized to (`±HH:MM` or `Z`)
    pub utc_offset: String,

    /// Persisted resolution cache, restored at startup and saved on shutdown
    pub registry_cache_path: Option<PathBuf>,

    /// Schema classes whose instances can be linked from other records
    pub linkable_classes: Vec<String>,

    /// Retry attribute-map insertion with plural spellings of the name
    pub pluralize_attribute_names: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            main_standard: crate::models::core_schemas::ISO_19115.to_string(),
            mode: MappingMode::Iso19115,
            utc_offset: "+00:00".to_string(),
            registry_cache_path: None,
            linkable_classes: vec!["CI_ResponsibleParty".to_string()],
            pluralize_attribute_names: true,
        }
    }
}

impl MapperConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, MappingError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MappingError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            MappingError::configuration(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate().map_err(MappingError::configuration)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.main_standard.trim().is_empty() {
            return Err("main_standard cannot be empty".to_string());
        }

        parse_utc_offset(&self.utc_offset)?;

        if self.linkable_classes.iter().any(|c| c.trim().is_empty()) {
            return Err("linkable_classes cannot contain empty names".to_string());
        }

        Ok(())
    }

    /// Resolved per-call options
    pub fn mapping_options(&self) -> Result<MappingOptions, String> {
        Ok(MappingOptions {
            mode: self.mode,
            main_standard: self.main_standard.clone(),
            utc_offset: parse_utc_offset(&self.utc_offset)?,
            pluralize_attribute_names: self.pluralize_attribute_names,
            linkable_classes: self.linkable_classes.clone(),
        })
    }
}

/// Options the reader and writer consult on every call
#[derive(Debug, Clone, PartialEq)]
pub struct MappingOptions {
    pub mode: MappingMode,
    pub main_standard: String,
    pub utc_offset: FixedOffset,
    pub pluralize_attribute_names: bool,
    pub linkable_classes: Vec<String>,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            mode: MappingMode::Iso19115,
            main_standard: crate::models::core_schemas::ISO_19115.to_string(),
            utc_offset: FixedOffset::east_opt(0).unwrap_or_else(|| unreachable!()),
            pluralize_attribute_names: true,
            linkable_classes: vec!["CI_ResponsibleParty".to_string()],
        }
    }
}

impl MappingOptions {
    pub fn is_linkable(&self, class_name: &str) -> bool {
        self.linkable_classes.iter().any(|c| c == class_name)
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `Z`
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset, String> {
    if text == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(|| "invalid offset".to_string());
    }
    let pattern = Regex::new(r"^([+-])(\d{2}):(\d{2})$").map_err(|e| e.to_string())?;
    let caps = pattern
        .captures(text)
        .ok_or_else(|| format!("utc_offset '{}' must look like +HH:MM", text))?;

    let hours: i32 = caps[2].parse().map_err(|_| format!("bad hours in '{}'", text))?;
    let minutes: i32 = caps[3].parse().map_err(|_| format!("bad minutes in '{}'", text))?;
    if hours > 14 || minutes > 59 {
        return Err(format!("utc_offset '{}' is out of range", text));
    }
    let seconds = (hours * 3600 + minutes * 60) * if &caps[1] == "-" { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or_else(|| format!("utc_offset '{}' is out of range", text))
}
