//! Record Store Error Types
//!
//! This module defines error types for the storage driver boundary. The
//! mapper never sees driver internals; everything a driver can report is
//! folded into [`StoreError`].

use thiserror::Error;

/// Storage driver errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this identifier
    #[error("Record not found: {identifier}")]
    NotFound { identifier: String },

    /// A record with this identifier is already stored
    #[error("Record already exists: {identifier}")]
    AlreadyExists { identifier: String },

    /// The store cannot be reached or refused the health check
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// Underlying I/O or encoding failure
    #[error("Record store I/O failed: {context}")]
    Io { context: String },
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
        }
    }

    /// Create an already exists error
    pub fn already_exists(identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            identifier: identifier.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an I/O error with context
    pub fn io(context: impl Into<String>) -> Self {
        Self::Io {
            context: context.into(),
        }
    }
}
