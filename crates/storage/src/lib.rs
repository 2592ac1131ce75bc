//! Storage layer for waymark
//!
//! This crate implements the row stores transition records live in:
//! - MemoryStore: owner-sharded in-process store
//! - SqliteStore: relational store over SQLite
//! - Metadata codec shared by both, driven by the record-type schema
//! - Query statistics for observing round-trips

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod memory;
pub mod sqlite;
pub mod stats;

pub use format::{EncodedMetadata, MetadataCodec};
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, SORT_KEY_STEP};
pub use stats::{QueryCounts, QueryStats};
