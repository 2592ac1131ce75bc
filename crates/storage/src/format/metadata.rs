//! Metadata column codec
//!
//! The codec follows the encoding the serialization guard settled on:
//!
//! | Encoding | Stored as |
//! |----------|-----------|
//! | `Native` | JSON text handed to the store's structured column |
//! | `Serialized(Json)` | JSON text |
//! | `Serialized(MessagePack)` | MessagePack bytes |
//!
//! A schema the guard rejects yields no codec. Stores keep the refusal and
//! report it on every metadata access instead of writing unreadable rows.

use waymark_core::{
    verify_schema, Error, GuardError, Metadata, MetadataEncoding, Result, SerializationFormat,
    TransitionSchema,
};

/// Metadata as it sits in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedMetadata {
    /// Text payload
    Text(String),
    /// Binary payload
    Blob(Vec<u8>),
}

/// Encodes and decodes the metadata column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataCodec {
    encoding: MetadataEncoding,
}

impl MetadataCodec {
    /// Codec for an encoding the guard already accepted
    pub fn new(encoding: MetadataEncoding) -> Self {
        Self { encoding }
    }

    /// Run the guard on `schema` and build the matching codec
    pub fn for_schema(schema: &TransitionSchema) -> std::result::Result<Self, GuardError> {
        verify_schema(schema).map(Self::new)
    }

    /// Check if the store encodes the column itself
    pub fn is_native(&self) -> bool {
        matches!(self.encoding, MetadataEncoding::Native)
    }

    /// Encode metadata for storage
    pub fn encode(&self, metadata: &Metadata) -> Result<EncodedMetadata> {
        match self.encoding {
            MetadataEncoding::Native | MetadataEncoding::Serialized(SerializationFormat::Json) => {
                Ok(EncodedMetadata::Text(serde_json::to_string(metadata)?))
            }
            MetadataEncoding::Serialized(SerializationFormat::MessagePack) => {
                rmp_serde::to_vec_named(metadata)
                    .map(EncodedMetadata::Blob)
                    .map_err(Error::serialization)
            }
        }
    }

    /// Decode metadata read from storage
    ///
    /// A missing payload decodes to empty metadata.
    pub fn decode(&self, stored: Option<&EncodedMetadata>) -> Result<Metadata> {
        let Some(stored) = stored else {
            return Ok(Metadata::new());
        };

        const MSGPACK: MetadataEncoding =
            MetadataEncoding::Serialized(SerializationFormat::MessagePack);

        match (self.encoding, stored) {
            (MSGPACK, EncodedMetadata::Blob(bytes)) => {
                rmp_serde::from_slice(bytes).map_err(Error::serialization)
            }
            (MSGPACK, EncodedMetadata::Text(_)) => {
                Err(Error::serialization("expected MessagePack bytes, found text"))
            }
            (_, EncodedMetadata::Text(text)) => Ok(serde_json::from_str(text)?),
            (_, EncodedMetadata::Blob(bytes)) => Ok(serde_json::from_slice(bytes)?),
        }
    }
}
