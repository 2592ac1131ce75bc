//! Convenient imports for Waymark.
//!
//! ```ignore
//! use waymark::prelude::*;
//!
//! let marks = Waymark::ephemeral()?;
//! marks.history("order", 1)?.create(None, "pending", None)?;
//! ```

// Main entry point
pub use crate::database::{Waymark, WaymarkBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{Metadata, Owner, OwnerRef, SerializationFormat, TransitionRecord};

// Adapter
pub use crate::types::{observer_fn, NullObserver, Observer, TransitionHistory};

// Re-export serde_json for convenience
pub use serde_json::json;
