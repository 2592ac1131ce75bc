//! Stored byte formats for transition rows.
//!
//! This module centralizes all serialization logic for persisted metadata.
//! Keeping serialization separate from operational logic (how rows are
//! written and queried) lets both stores share one set of rules.
//!
//! # Module Structure
//!
//! - `metadata`: Metadata column codec driven by the record-type schema

pub mod metadata;

pub use metadata::{EncodedMetadata, MetadataCodec};
