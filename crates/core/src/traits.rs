//! Collaborator contracts
//!
//! The adapter talks to two collaborators:
//! - [`TransitionStore`]: the row store holding transition records
//! - [`Observer`]: whoever wants to hear about accepted transitions

use crate::error::Result;
use crate::schema::TransitionSchema;
use crate::types::{NewTransition, OwnerRef, TransitionRecord};
use std::sync::Arc;

/// Storage engine for transition records
///
/// ## Contract
///
/// - `insert` assigns the record's id, sort key and creation time. Sort keys
///   are strictly increasing per owner.
/// - `last` returns the record with the greatest sort key, `None` when the
///   owner has no transitions. Not finding anything is not an error.
/// - `history` returns all records of the owner in ascending sort-key order.
/// - Failures are reported as they happen. No retries.
pub trait TransitionStore {
    /// Static metadata of the transition record type
    fn schema(&self) -> &TransitionSchema;

    /// Persist a new transition for `owner`
    fn insert(&self, owner: &OwnerRef, draft: &NewTransition) -> Result<TransitionRecord>;

    /// Most recent transition of `owner`
    fn last(&self, owner: &OwnerRef) -> Result<Option<TransitionRecord>>;

    /// Every transition of `owner`, oldest first
    fn history(&self, owner: &OwnerRef) -> Result<Vec<TransitionRecord>>;
}

impl<S: TransitionStore + ?Sized> TransitionStore for &S {
    fn schema(&self) -> &TransitionSchema {
        (**self).schema()
    }

    fn insert(&self, owner: &OwnerRef, draft: &NewTransition) -> Result<TransitionRecord> {
        (**self).insert(owner, draft)
    }

    fn last(&self, owner: &OwnerRef) -> Result<Option<TransitionRecord>> {
        (**self).last(owner)
    }

    fn history(&self, owner: &OwnerRef) -> Result<Vec<TransitionRecord>> {
        (**self).history(owner)
    }
}

impl<S: TransitionStore + ?Sized> TransitionStore for Box<S> {
    fn schema(&self) -> &TransitionSchema {
        (**self).schema()
    }

    fn insert(&self, owner: &OwnerRef, draft: &NewTransition) -> Result<TransitionRecord> {
        (**self).insert(owner, draft)
    }

    fn last(&self, owner: &OwnerRef) -> Result<Option<TransitionRecord>> {
        (**self).last(owner)
    }

    fn history(&self, owner: &OwnerRef) -> Result<Vec<TransitionRecord>> {
        (**self).history(owner)
    }
}

impl<S: TransitionStore + ?Sized> TransitionStore for Arc<S> {
    fn schema(&self) -> &TransitionSchema {
        (**self).schema()
    }

    fn insert(&self, owner: &OwnerRef, draft: &NewTransition) -> Result<TransitionRecord> {
        (**self).insert(owner, draft)
    }

    fn last(&self, owner: &OwnerRef) -> Result<Option<TransitionRecord>> {
        (**self).last(owner)
    }

    fn history(&self, owner: &OwnerRef) -> Result<Vec<TransitionRecord>> {
        (**self).history(owner)
    }
}

/// Receives notifications about transitions
///
/// Notification is best-effort: nothing an observer does changes whether a
/// transition was persisted.
pub trait Observer {
    /// Called before the store is asked to persist `draft`
    fn before_transition(&self, _owner: &OwnerRef, _draft: &NewTransition) {}

    /// Called once `record` is persisted and visible through the adapter
    fn after_transition(&self, owner: &OwnerRef, record: &TransitionRecord);
}

impl<O: Observer + ?Sized> Observer for &O {
    fn before_transition(&self, owner: &OwnerRef, draft: &NewTransition) {
        (**self).before_transition(owner, draft)
    }

    fn after_transition(&self, owner: &OwnerRef, record: &TransitionRecord) {
        (**self).after_transition(owner, record)
    }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn before_transition(&self, owner: &OwnerRef, draft: &NewTransition) {
        (**self).before_transition(owner, draft)
    }

    fn after_transition(&self, owner: &OwnerRef, record: &TransitionRecord) {
        (**self).after_transition(owner, record)
    }
}

impl<O: Observer + ?Sized> Observer for Arc<O> {
    fn before_transition(&self, owner: &OwnerRef, draft: &NewTransition) {
        (**self).before_transition(owner, draft)
    }

    fn after_transition(&self, owner: &OwnerRef, record: &TransitionRecord) {
        (**self).after_transition(owner, record)
    }
}
