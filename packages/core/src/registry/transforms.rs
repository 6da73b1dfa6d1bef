//! Name transform chain
//!
//! Schema class names rarely match runtime type names (`CI_RoleCode` is
//! `Role`, `ExtrinsicObject` is `ExtrinsicObjectType`, `TM_Period` is
//! `DefaultPeriod` or `TimePeriod`...). The resolver tries each stage of
//! [`NameTransform::CHAIN`] in order and stops at the first candidate that
//! names a registered runtime type.
//!
//! Every stage starts from the original class name. Stages after the two
//! stripping stages work on the *base* name: known prefix and `Code`
//! suffix removed.

/// ISO package prefixes removed by [`NameTransform::StripPrefix`]
pub const KNOWN_PREFIXES: &[&str] = &[
    "MD", "CI", "EX", "DQ", "LI", "RS", "SV", "FC", "TM", "MI", "LE", "PT", "DS", "SC",
];

const PROPERTY_TYPE_TAIL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTransform {
    AsIs,
    StripPrefix,
    StripCodeSuffix,
    AppendImpl,
    TypeSuffix,
    EntrySuffix,
    DefaultPrefix,
    DialectPrefix,
    PropertyType,
    AbstractPrefix,
}

impl NameTransform {
    pub const CHAIN: [NameTransform; 10] = [
        NameTransform::AsIs,
        NameTransform::StripPrefix,
        NameTransform::StripCodeSuffix,
        NameTransform::AppendImpl,
        NameTransform::TypeSuffix,
        NameTransform::EntrySuffix,
        NameTransform::DefaultPrefix,
        NameTransform::DialectPrefix,
        NameTransform::PropertyType,
        NameTransform::AbstractPrefix,
    ];

    /// Candidate runtime name, or `None` when the stage does not apply
    pub fn apply(&self, class_name: &str, dialect_prefix: Option<&str>) -> Option<String> {
        match self {
            NameTransform::AsIs => Some(class_name.to_string()),
            NameTransform::StripPrefix => strip_prefix(class_name).map(str::to_string),
            NameTransform::StripCodeSuffix => {
                strip_code_suffix(strip_prefix(class_name).unwrap_or(class_name))
                    .map(str::to_string)
            }
            NameTransform::AppendImpl => Some(format!("{}Impl", base_name(class_name))),
            NameTransform::TypeSuffix => Some(format!("{}Type", base_name(class_name))),
            NameTransform::EntrySuffix => Some(format!("{}Entry", base_name(class_name))),
            NameTransform::DefaultPrefix => Some(format!("Default{}", base_name(class_name))),
            NameTransform::DialectPrefix => {
                dialect_prefix.map(|prefix| format!("{}{}", prefix, base_name(class_name)))
            }
            NameTransform::PropertyType => {
                let base = base_name(class_name);
                let skip = base.chars().count().saturating_sub(PROPERTY_TYPE_TAIL);
                let tail: String = base.chars().skip(skip).collect();
                Some(format!("{}PropertyType", tail))
            }
            NameTransform::AbstractPrefix => Some(format!("Abstract{}", base_name(class_name))),
        }
    }

    /// All distinct candidates in chain order
    pub fn candidates(class_name: &str, dialect_prefix: Option<&str>) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::with_capacity(Self::CHAIN.len());
        for stage in Self::CHAIN {
            if let Some(candidate) = stage.apply(class_name, dialect_prefix) {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }
}

/// `MD_Metadata` → `Metadata`; only known package prefixes are removed
pub fn strip_prefix(name: &str) -> Option<&str> {
    let (prefix, rest) = name.split_once('_')?;
    if KNOWN_PREFIXES.contains(&prefix) && !rest.is_empty() {
        Some(rest)
    } else {
        None
    }
}

/// `RoleCode` → `Role`, but `CodeSpace`-style names are left alone
pub fn strip_code_suffix(name: &str) -> Option<&str> {
    if name.contains("CodeSpace") {
        return None;
    }
    name.strip_suffix("Code").filter(|rest| !rest.is_empty())
}

pub fn base_name(name: &str) -> &str {
    let stripped = strip_prefix(name).unwrap_or(name);
    strip_code_suffix(stripped).unwrap_or(stripped)
}
