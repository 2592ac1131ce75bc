//! Serialization guard
//!
//! Checks once, when an adapter is built, that the metadata field's
//! application-level serialization agrees with how the store natively
//! treats the column.
//!
//! | Native column | Serialization registered | Outcome |
//! |---------------|--------------------------|---------|
//! | structured (`json`, `jsonb`) | yes | `IncompatibleSerialization` |
//! | structured | no | store encodes natively |
//! | plain (anything else, `""` included) | yes | application encodes |
//! | plain | no | `UnserializedMetadata` |
//!
//! The guard reads only in-memory schema metadata and never touches the store.

use crate::error::GuardError;
use crate::schema::{NativeType, SerializationFormat, TransitionSchema, METADATA_COLUMN};
use tracing::{debug, warn};

/// How metadata travels to the store once the guard has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataEncoding {
    /// The column is structured, the store encodes it
    Native,
    /// The application encodes the field with this format before storing
    Serialized(SerializationFormat),
}

/// Decide whether a (native type, serialization) pairing is usable
///
/// Pure function over the metadata column's native type identifier and its
/// registered serialization, if any.
pub fn check_metadata_serialization(
    sql_type: &str,
    serialization: Option<SerializationFormat>,
) -> Result<MetadataEncoding, GuardError> {
    match (NativeType::classify(sql_type), serialization) {
        (NativeType::Structured, Some(_)) => Err(GuardError::IncompatibleSerialization {
            field: METADATA_COLUMN.to_string(),
            sql_type: sql_type.to_string(),
        }),
        (NativeType::Plain, None) => Err(GuardError::UnserializedMetadata {
            field: METADATA_COLUMN.to_string(),
            sql_type: sql_type.to_string(),
        }),
        (NativeType::Structured, None) => Ok(MetadataEncoding::Native),
        (NativeType::Plain, Some(format)) => Ok(MetadataEncoding::Serialized(format)),
    }
}

/// Run the guard against a record type's schema
pub fn verify_schema(schema: &TransitionSchema) -> Result<MetadataEncoding, GuardError> {
    let sql_type = schema
        .metadata_sql_type()
        .ok_or_else(|| GuardError::MissingColumn {
            field: METADATA_COLUMN.to_string(),
            table: schema.table().to_string(),
        })?;

    match check_metadata_serialization(sql_type, schema.serialization(METADATA_COLUMN)) {
        Ok(encoding) => {
            debug!(table = schema.table(), ?encoding, "metadata serialization accepted");
            Ok(encoding)
        }
        Err(e) => {
            warn!(table = schema.table(), error = %e, "metadata serialization rejected");
            Err(e)
        }
    }
}
