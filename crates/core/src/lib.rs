//! Core types and contracts for waymark
//!
//! This crate defines:
//! - Domain types: owners, transition drafts and records
//! - Record-type schema and the serialization guard run at adapter construction
//! - Collaborator contracts: [`TransitionStore`] and [`Observer`]
//! - The error taxonomy shared by every other crate

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod guard;
pub mod owner;
pub mod schema;
pub mod traits;
pub mod types;

pub use error::{Error, GuardError, Result};
pub use guard::{check_metadata_serialization, verify_schema, MetadataEncoding};
pub use owner::{Association, Owner};
pub use schema::{
    ColumnDef, NativeType, SerializationFormat, TransitionSchema, TransitionSchemaBuilder,
    METADATA_COLUMN,
};
pub use traits::{Observer, TransitionStore};
pub use types::{Metadata, NewTransition, OwnerRef, SortKey, TransitionRecord};
