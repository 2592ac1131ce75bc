//! Core types for transition history
//!
//! This module defines the fundamental types used throughout the system:
//! - [`OwnerRef`]: Identity of the model whose state is tracked
//! - [`SortKey`]: Store-assigned ordering key of a transition
//! - [`NewTransition`]: Draft of a transition before it is persisted
//! - [`TransitionRecord`]: One persisted state change

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque key/value metadata attached to a transition
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Identity of an owning entity
///
/// An owner is addressed by its model name and primary key, the same pair
/// a relational store uses to scope the owner's transition rows.
///
/// # Examples
///
/// ```
/// use waymark_core::types::OwnerRef;
///
/// let owner = OwnerRef::new("order", 42);
/// assert_eq!(owner.to_string(), "order#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    /// Model name of the owning entity
    pub model: String,
    /// Primary key of the owning entity
    pub id: i64,
}

impl OwnerRef {
    /// Create a new owner reference
    pub fn new(model: impl Into<String>, id: i64) -> Self {
        Self {
            model: model.into(),
            id,
        }
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.model, self.id)
    }
}

// Orders by: model → id
impl Ord for OwnerRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.model.cmp(&other.model).then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for OwnerRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering key of a transition within its owner's history
///
/// Assigned by the store, strictly increasing per owner. The record with the
/// greatest sort key is the owner's last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortKey(pub u64);

impl SortKey {
    /// Raw value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SortKey {
    fn from(value: u64) -> Self {
        SortKey(value)
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transition that has not been written yet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewTransition {
    /// State being left, `None` for the initial transition
    pub from_state: Option<String>,
    /// State being entered
    pub to_state: String,
    /// Caller supplied metadata
    pub metadata: Metadata,
}

impl NewTransition {
    /// Create a draft with empty metadata
    pub fn new(from_state: Option<&str>, to_state: impl Into<String>) -> Self {
        Self {
            from_state: from_state.map(str::to_owned),
            to_state: to_state.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach metadata to the draft
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One persisted state change of an owning entity
///
/// Records are immutable once the store hands them out. They are never
/// deleted through this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    id: i64,
    owner: OwnerRef,
    from_state: Option<String>,
    to_state: String,
    metadata: Metadata,
    sort_key: SortKey,
    created_at: DateTime<Utc>,
}

impl TransitionRecord {
    /// Assemble a record from its persisted parts
    ///
    /// Only stores call this; everything else receives records from a store.
    pub fn from_parts(
        id: i64,
        owner: OwnerRef,
        draft: NewTransition,
        sort_key: SortKey,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            from_state: draft.from_state,
            to_state: draft.to_state,
            metadata: draft.metadata,
            sort_key,
            created_at,
        }
    }

    /// Row identifier assigned by the store
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Owner this transition belongs to
    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    /// State that was left, `None` for the initial transition
    pub fn from_state(&self) -> Option<&str> {
        self.from_state.as_deref()
    }

    /// State that was entered
    pub fn to_state(&self) -> &str {
        &self.to_state
    }

    /// Metadata recorded with the transition
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Position of the transition in its owner's history
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Time the store accepted the transition
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
