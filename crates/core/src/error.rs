//! Error types for waymark-core
//!
//! Two families of failure exist:
//! - Schema misconfiguration, raised while an adapter is being constructed
//!   and fatal to that construction
//! - Store failures, raised by storage collaborators and passed through
//!   unchanged by the adapter

use thiserror::Error;

/// Result type alias for waymark-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Refusals of the serialization guard
///
/// Every variant names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// Field is stored as plain text but no application-level
    /// serialization is registered for it
    #[error("field `{field}` is stored in a plain `{sql_type}` column with no serialization")]
    UnserializedMetadata {
        /// Offending field
        field: String,
        /// Native type identifier of the column
        sql_type: String,
    },

    /// Field is serialized by the application on top of a column the store
    /// already treats as structured data
    #[error("field `{field}` is serialized on top of a native `{sql_type}` column")]
    IncompatibleSerialization {
        /// Offending field
        field: String,
        /// Native type identifier of the column
        sql_type: String,
    },

    /// Record type has no column for the field
    #[error("table `{table}` has no `{field}` column")]
    MissingColumn {
        /// Missing field
        field: String,
        /// Table of the record type
        table: String,
    },
}

/// Core error types
#[derive(Debug, Error)]
pub enum Error {
    /// Schema rejected at adapter construction
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// Storage engine failure (connectivity, constraints, ...)
    #[error("storage error: {0}")]
    Storage(String),

    /// Metadata could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl ToString) -> Self {
        Self::Storage(msg.to_string())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl ToString) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Create a configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Check whether this error comes from the serialization guard
    pub fn is_guard(&self) -> bool {
        matches!(self, Error::Guard(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
