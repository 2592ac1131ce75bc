//! Transition history adapter
//!
//! Appends transitions for one owner and answers "what was the last
//! transition" with as few store round-trips as possible.
//!
//! ## Design
//!
//! TransitionHistory is a facade over a [`TransitionStore`] bound to one
//! [`Owner`]. It provides:
//! - Construction gated by the serialization guard
//! - `create`: persist, then seed the cache slot, then notify the observer
//! - `last`: cache slot → preloaded association → store query
//! - `history`: preloaded association → store query
//!
//! ## Consistency
//!
//! Within one adapter, `create` followed by `last` always sees the new
//! record. Different adapters bound to the same owner each keep their own
//! slot and may go stale relative to each other; `last_with(true)` re-reads.
//!
//! Methods that touch the slot take `&mut self`. Sharing one adapter across
//! threads needs a lock around it.

use crate::cache::CacheSlot;
use std::sync::Arc;
use tracing::{debug, info};
use waymark_core::{
    verify_schema, Metadata, NewTransition, Observer, Owner, Result, TransitionRecord,
    TransitionStore,
};

/// Read/write protocol for one owner's transition history
pub struct TransitionHistory<S, O> {
    store: S,
    owner: Owner,
    observer: O,
    cache: CacheSlot,
}

impl<S: TransitionStore, O: Observer> TransitionHistory<S, O> {
    /// Bind an adapter to `owner`
    ///
    /// Runs the serialization guard over the store's record-type schema
    /// before anything else. A rejected schema fails here, before any
    /// transition is attempted.
    ///
    /// ## Errors
    ///
    /// - `UnserializedMetadata`: plain metadata column, no serialization registered
    /// - `IncompatibleSerialization`: structured column with serialization registered
    /// - `MissingColumn`: the record type has no metadata column
    pub fn new(store: S, owner: Owner, observer: O) -> Result<Self> {
        let encoding = verify_schema(store.schema())?;
        debug!(
            owner = %owner.reference(),
            table = store.schema().table(),
            ?encoding,
            "adapter bound"
        );
        Ok(Self {
            store,
            owner,
            observer,
            cache: CacheSlot::default(),
        })
    }

    /// Persist a transition and make it the last one
    ///
    /// `None` metadata is stored as an empty mapping. On success the cache
    /// slot holds the new record, so the next `last` needs no round-trip.
    /// On failure the slot is left as it was and the store's error is
    /// returned unchanged.
    ///
    /// The observer is told before the write and after the slot is updated.
    /// Nothing it does affects the outcome of `create`.
    pub fn create(
        &mut self,
        from: Option<&str>,
        to: &str,
        metadata: Option<Metadata>,
    ) -> Result<Arc<TransitionRecord>> {
        let draft = NewTransition {
            from_state: from.map(str::to_owned),
            to_state: to.to_owned(),
            metadata: metadata.unwrap_or_default(),
        };
        let owner = self.owner.reference();

        self.observer.before_transition(owner, &draft);

        let record = Arc::new(self.store.insert(owner, &draft)?);
        self.owner.transitions().append_if_loaded(Arc::clone(&record));
        self.cache.fill(Some(Arc::clone(&record)));

        info!(
            %owner,
            from = ?record.from_state(),
            to = record.to_state(),
            sort_key = %record.sort_key(),
            "transition recorded"
        );

        self.observer.after_transition(owner, &record);
        Ok(record)
    }

    /// Most recent transition, `None` if the owner has none
    ///
    /// Same as `last_with(false)`.
    pub fn last(&mut self) -> Result<Option<Arc<TransitionRecord>>> {
        self.last_with(false)
    }

    /// Most recent transition, optionally bypassing the cache slot
    ///
    /// Resolution order:
    /// 1. The cache slot, unless `force_reload`
    /// 2. The owner's preloaded association, if materialized (no query)
    /// 3. One store query for the greatest sort key
    ///
    /// Whatever 2 or 3 produce, an empty answer included, is written to the
    /// slot before returning.
    pub fn last_with(&mut self, force_reload: bool) -> Result<Option<Arc<TransitionRecord>>> {
        if !force_reload {
            if let Some(cached) = self.cache.get() {
                debug!(owner = %self.owner.reference(), source = "cache", "last transition");
                return Ok(cached.clone());
            }
        }

        let resolved = match self.owner.transitions().last() {
            Some(last) => {
                debug!(owner = %self.owner.reference(), source = "preloaded", "last transition");
                last
            }
            None => {
                debug!(owner = %self.owner.reference(), source = "store", "last transition");
                self.store.last(self.owner.reference())?.map(Arc::new)
            }
        };

        self.cache.fill(resolved.clone());
        Ok(resolved)
    }

    /// Every transition of the owner, oldest first
    ///
    /// Served from the preloaded association when materialized, otherwise
    /// with one store query. Does not touch the cache slot.
    pub fn history(&self) -> Result<Vec<Arc<TransitionRecord>>> {
        if let Some(records) = self.owner.transitions().records() {
            return Ok(records);
        }
        Ok(self
            .store
            .history(self.owner.reference())?
            .into_iter()
            .map(Arc::new)
            .collect())
    }

    /// State entered by the last transition
    pub fn current_state(&mut self) -> Result<Option<String>> {
        Ok(self.last()?.map(|record| record.to_state().to_owned()))
    }

    /// Owner this adapter is bound to
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Check if the cache slot holds an answer
    pub fn is_cached(&self) -> bool {
        self.cache.is_populated()
    }
}

impl<S, O> std::fmt::Debug for TransitionHistory<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionHistory")
            .field("owner", self.owner.reference())
            .field("cache", &self.cache)
            .finish()
    }
}
