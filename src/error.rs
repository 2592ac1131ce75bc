//! Unified error types for Waymark.
//!
//! This module provides a clean error type that wraps internal errors
//! and presents a consistent interface to users.

use thiserror::Error;
use waymark_core::GuardError;

/// All Waymark errors.
///
/// This is the canonical error type for all Waymark operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Metadata is stored as plain text with no serialization registered
    #[error("field `{field}` is stored in a plain `{sql_type}` column with no serialization")]
    UnserializedMetadata {
        /// Offending field
        field: String,
        /// Declared native type of the column
        sql_type: String,
    },

    /// Metadata is serialized on top of a natively structured column
    #[error("field `{field}` is serialized on top of a native `{sql_type}` column")]
    IncompatibleSerialization {
        /// Offending field
        field: String,
        /// Declared native type of the column
        sql_type: String,
    },

    /// Record type lacks a required column
    #[error("table `{table}` has no `{field}` column")]
    MissingColumn {
        /// Missing field
        field: String,
        /// Table of the record type
        table: String,
    },

    /// Storage engine failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Metadata encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for Waymark operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error comes from a mis-declared record type.
    ///
    /// These are raised while an adapter is being constructed and will
    /// fail the same way every time until the schema changes.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            Error::UnserializedMetadata { .. }
                | Error::IncompatibleSerialization { .. }
                | Error::MissingColumn { .. }
                | Error::InvalidConfig(_)
        )
    }

    /// Check if this is a storage engine failure.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

impl From<GuardError> for Error {
    fn from(e: GuardError) -> Self {
        match e {
            GuardError::UnserializedMetadata { field, sql_type } => {
                Error::UnserializedMetadata { field, sql_type }
            }
            GuardError::IncompatibleSerialization { field, sql_type } => {
                Error::IncompatibleSerialization { field, sql_type }
            }
            GuardError::MissingColumn { field, table } => Error::MissingColumn { field, table },
        }
    }
}

// Convert from internal core errors
impl From<waymark_core::Error> for Error {
    fn from(e: waymark_core::Error) -> Self {
        use waymark_core::Error as CoreError;
        match e {
            CoreError::Guard(guard) => guard.into(),
            CoreError::Storage(msg) => Error::Storage(msg),
            CoreError::Serialization(msg) => Error::Serialization(msg),
            CoreError::InvalidConfig(msg) => Error::InvalidConfig(msg),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
