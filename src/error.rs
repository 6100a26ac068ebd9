//! Custom error types for simple-audit
//!
//! This module defines the error hierarchy for audit capture, storage and
//! diffing using thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// An entity or field value could not be turned into storable data
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The audit store rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored change log is not a field mapping
    #[error("Malformed change log in audit record {record_id}: {reason}")]
    MalformedChangeLog { record_id: u64, reason: String },

    /// A declared audited field is neither an attribute nor an association
    #[error("{auditable_type} has no attribute or association named '{field}'")]
    UnknownField {
        auditable_type: String,
        field: String,
    },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl AuditError {
    /// Create a "not found" error for audit records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Audit record",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from the audit store
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
