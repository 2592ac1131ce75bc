//! # Waymark
//!
//! Append-only state transition history with a cached "last transition".
//!
//! Waymark records every state change of an owning entity (an order, a
//! shipment, a job) as an immutable row, and answers "what was the most
//! recent transition" without a round-trip whenever it can.
//!
//! ## Quick Start
//!
//! ```ignore
//! use waymark::prelude::*;
//!
//! let marks = Waymark::open("./transitions.db")?;
//!
//! let mut order = marks.history("order", 42)?;
//! order.create(None, "pending", None)?;
//! order.create(Some("pending"), "paid", Some(metadata))?;
//!
//! // Served from the adapter's cache slot, no query
//! let last = order.last()?;
//! ```
//!
//! ## Metadata declaration
//!
//! Each transition carries a metadata mapping. The record type must store
//! it in exactly one way:
//!
//! | Column type | Serialization registered | Result |
//! |-------------|--------------------------|--------|
//! | `json` / `jsonb` | no | stored natively |
//! | anything else | yes | serialized by the application |
//! | `json` / `jsonb` | yes | [`Error::IncompatibleSerialization`] |
//! | anything else | no | [`Error::UnserializedMetadata`] |
//!
//! The check runs when an adapter is constructed.
//!
//! ## Reading the last transition
//!
//! [`TransitionHistory::last`] looks, in order, at the adapter's cache slot,
//! the owner's preloaded association ([`Waymark::preload`]) and finally the
//! store. `last_with(true)` skips the cache slot.

#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use config::{WaymarkConfig, DEFAULT_METADATA_SQL_TYPE, DEFAULT_TABLE};
pub use database::{Backend, History, Waymark, WaymarkBuilder};
pub use error::{Error, Result};

// Re-export types
pub use types::*;
