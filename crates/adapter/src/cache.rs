//! Last-transition cache slot
//!
//! ```text
//!   Empty ──(last resolves / create)──▶ Populated(value)
//!   Populated ──(create / forced last)──▶ Populated(new value)
//!   Populated ──(plain last)──▶ Populated(same value)
//! ```
//!
//! There is no way back to `Empty`. A populated slot may hold "no
//! transition" when the owner had none at resolution time.

use std::sync::Arc;
use waymark_core::TransitionRecord;

/// Process-local memory of an owner's last transition
#[derive(Debug, Clone, Default)]
pub enum CacheSlot {
    /// Nothing resolved yet
    #[default]
    Empty,
    /// Last known answer
    Populated(Option<Arc<TransitionRecord>>),
}

impl CacheSlot {
    /// Cached answer, `None` while empty
    pub fn get(&self) -> Option<&Option<Arc<TransitionRecord>>> {
        match self {
            CacheSlot::Empty => None,
            CacheSlot::Populated(value) => Some(value),
        }
    }

    /// Replace the cached answer
    pub fn fill(&mut self, value: Option<Arc<TransitionRecord>>) {
        *self = CacheSlot::Populated(value);
    }

    /// Check if an answer is cached
    pub fn is_populated(&self) -> bool {
        matches!(self, CacheSlot::Populated(_))
    }
}
