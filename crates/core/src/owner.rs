//! Owning entities and their transition association
//!
//! An [`Owner`] is the model whose state is tracked. Like an ORM model it
//! carries an association to its transition records that starts unloaded
//! and can be materialized in memory by the caller. Once materialized, the
//! adapter answers from memory instead of asking the store.
//!
//! Clones of an `Owner` share one association.

use crate::error::Result;
use crate::traits::TransitionStore;
use crate::types::{OwnerRef, TransitionRecord};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Transition records of one owner, possibly materialized in memory
#[derive(Debug, Clone, Default)]
pub struct Association {
    loaded: Arc<RwLock<Option<Vec<Arc<TransitionRecord>>>>>,
}

impl Association {
    /// Check if the collection is materialized
    pub fn is_loaded(&self) -> bool {
        self.loaded.read().is_some()
    }

    /// Materialize from already fetched records
    ///
    /// Records are kept in ascending sort-key order regardless of the order
    /// they arrive in.
    pub fn materialize(&self, records: Vec<TransitionRecord>) -> usize {
        let mut records: Vec<_> = records.into_iter().map(Arc::new).collect();
        records.sort_by_key(|r| r.sort_key());
        let count = records.len();
        *self.loaded.write() = Some(records);
        count
    }

    /// Snapshot of the materialized records, `None` if not loaded
    pub fn records(&self) -> Option<Vec<Arc<TransitionRecord>>> {
        self.loaded.read().clone()
    }

    /// Greatest sort-key record of the materialized collection
    ///
    /// Outer `None`: not loaded. Inner `None`: loaded but empty.
    pub fn last(&self) -> Option<Option<Arc<TransitionRecord>>> {
        self.loaded
            .read()
            .as_ref()
            .map(|records| records.iter().max_by_key(|r| r.sort_key()).cloned())
    }

    /// Add a freshly persisted record if the collection is materialized
    ///
    /// Returns `false` when nothing was loaded; the record will be picked up
    /// by the next load.
    pub fn append_if_loaded(&self, record: Arc<TransitionRecord>) -> bool {
        match self.loaded.write().as_mut() {
            Some(records) => {
                records.push(record);
                true
            }
            None => false,
        }
    }
}

/// Entity whose transitions are recorded
#[derive(Debug, Clone)]
pub struct Owner {
    reference: OwnerRef,
    transitions: Association,
}

impl Owner {
    /// Create an owner with an unloaded association
    pub fn new(model: impl Into<String>, id: i64) -> Self {
        Self::from_ref(OwnerRef::new(model, id))
    }

    /// Create an owner from an existing reference
    pub fn from_ref(reference: OwnerRef) -> Self {
        Self {
            reference,
            transitions: Association::default(),
        }
    }

    /// Identity of this owner
    pub fn reference(&self) -> &OwnerRef {
        &self.reference
    }

    /// Transition association
    pub fn transitions(&self) -> &Association {
        &self.transitions
    }

    /// Materialize the transition association from `store`
    ///
    /// Issues one history query. Returns the number of records loaded.
    pub fn preload<S: TransitionStore + ?Sized>(&self, store: &S) -> Result<usize> {
        let records = store.history(&self.reference)?;
        let count = self.transitions.materialize(records);
        debug!(owner = %self.reference, count, "preloaded transitions");
        Ok(count)
    }
}
