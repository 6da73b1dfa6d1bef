//! Mapping Error Types
//!
//! Two kinds of failure exist on the mapping path:
//!
//! - [`MappingError`] aborts a whole call (bad configuration, store I/O,
//!   duplicate identifier, malformed stored record, unresolvable root
//!   object)
//! - [`AttributeFailure`] drops a single attribute; it is logged and
//!   collected into the call's [`MappingReport`], and the containing object
//!   is still returned

use crate::db::StoreError;
use crate::models::TreeError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a mapping call
#[derive(Error, Debug)]
pub enum MappingError {
    /// Invalid configuration or unusable store at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Underlying store failure
    #[error("Mapping I/O error: {0}")]
    Io(#[from] StoreError),

    /// Write target identifier already exists
    #[error("Duplicate record identifier: {identifier}")]
    DuplicateIdentifier { identifier: String },

    /// Requested record does not exist
    #[error("Record not found: {identifier}")]
    RecordNotFound { identifier: String },

    /// A stored record breaks the value tree invariants
    #[error("Record {identifier} is malformed: {source}")]
    InvalidRecord {
        identifier: String,
        source: TreeError,
    },

    /// The root object has no schema class in the main standard
    #[error("No schema class for root object of type {type_name} in {standard}")]
    UnresolvedRoot { type_name: String, standard: String },

    /// Registry cache file could not be read or written
    #[error("Registry cache persistence failed for {path}: {source}")]
    CachePersistence {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MappingError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a duplicate identifier error
    pub fn duplicate_identifier(identifier: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            identifier: identifier.into(),
        }
    }

    /// Create a record not found error
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::RecordNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create an invalid record error
    pub fn invalid_record(identifier: impl Into<String>, source: TreeError) -> Self {
        Self::InvalidRecord {
            identifier: identifier.into(),
            source,
        }
    }

    /// Create an unresolved root error
    pub fn unresolved_root(type_name: impl Into<String>, standard: impl Into<String>) -> Self {
        Self::UnresolvedRoot {
            type_name: type_name.into(),
            standard: standard.into(),
        }
    }

    /// Create a cache persistence error
    pub fn cache_persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CachePersistence {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    /// No runtime type (read) or schema class (write) could be found
    UnresolvedType,
    /// The object has no accessor, map entry or slot for the attribute
    UnresolvedAccessor,
    /// A literal could not be parsed into the target type
    MalformedLiteral,
    /// A code list value or name has no entry in the code list
    UnmatchedCode,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::UnresolvedType => write!(f, "unresolved type"),
            FailureReason::UnresolvedAccessor => write!(f, "unresolved accessor"),
            FailureReason::MalformedLiteral => write!(f, "malformed literal"),
            FailureReason::UnmatchedCode => write!(f, "unmatched code"),
        }
    }
}

/// One dropped attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFailure {
    /// Rendered schema path of the attribute
    pub path: String,
    pub attribute: String,
    pub reason: FailureReason,
    pub detail: String,
}

impl fmt::Display for AttributeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) dropped: {}: {}",
            self.attribute, self.path, self.reason, self.detail
        )
    }
}

/// Attribute failures collected during one mapping call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingReport {
    pub failures: Vec<AttributeFailure>,
}

impl MappingReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a dropped attribute
    pub fn drop_attribute(
        &mut self,
        path: impl Into<String>,
        attribute: impl Into<String>,
        reason: FailureReason,
        detail: impl Into<String>,
    ) {
        let failure = AttributeFailure {
            path: path.into(),
            attribute: attribute.into(),
            reason,
            detail: detail.into(),
        };
        tracing::warn!("{}", failure);
        self.failures.push(failure);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, reason: &FailureReason) -> usize {
        self.failures.iter().filter(|f| &f.reason == reason).count()
    }

    pub fn merge(&mut self, other: MappingReport) {
        self.failures.extend(other.failures);
    }
}
