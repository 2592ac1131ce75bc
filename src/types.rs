//! Public types for the Waymark API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Domain types
pub use waymark_core::{Metadata, NewTransition, Owner, OwnerRef, SortKey, TransitionRecord};

// Record-type schema
pub use waymark_core::{
    ColumnDef, MetadataEncoding, NativeType, SerializationFormat, TransitionSchema,
    TransitionSchemaBuilder, METADATA_COLUMN,
};

// Collaborator contracts
pub use waymark_core::{Observer, TransitionStore};

// Adapter and observers
pub use waymark_adapter::{
    observer_fn, FnObserver, NullObserver, ObservedTransition, Phase, RecordingObserver,
    TransitionHistory,
};

// Stores
pub use waymark_storage::{MemoryStore, QueryCounts, QueryStats, SqliteStore, SORT_KEY_STEP};
