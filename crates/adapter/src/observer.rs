//! Ready-made observers

use parking_lot::Mutex;
use waymark_core::{NewTransition, Observer, OwnerRef, SortKey, TransitionRecord};

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn after_transition(&self, _owner: &OwnerRef, _record: &TransitionRecord) {}
}

/// Adapts a closure into an [`Observer`] notified after each transition
pub struct FnObserver<F>(F);

/// Wrap `f` as an observer
///
/// # Example
///
/// ```ignore
/// let observer = observer_fn(|owner, record| {
///     println!("{} entered {}", owner, record.to_state());
/// });
/// ```
pub fn observer_fn<F>(f: F) -> FnObserver<F>
where
    F: Fn(&OwnerRef, &TransitionRecord),
{
    FnObserver(f)
}

impl<F> Observer for FnObserver<F>
where
    F: Fn(&OwnerRef, &TransitionRecord),
{
    fn after_transition(&self, owner: &OwnerRef, record: &TransitionRecord) {
        (self.0)(owner, record)
    }
}

impl<F> std::fmt::Debug for FnObserver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnObserver")
    }
}

/// When a notification was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the store was asked to persist
    Before,
    /// After the transition was persisted
    After,
}

/// One notification seen by a [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTransition {
    /// Delivery phase
    pub phase: Phase,
    /// Owner of the transition
    pub owner: OwnerRef,
    /// State left
    pub from_state: Option<String>,
    /// State entered
    pub to_state: String,
    /// Sort key, known only after persisting
    pub sort_key: Option<SortKey>,
}

/// Observer that keeps every notification in order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<ObservedTransition>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications so far, oldest first
    pub fn events(&self) -> Vec<ObservedTransition> {
        self.seen.lock().clone()
    }

    /// Notifications of one phase
    pub fn events_in(&self, phase: Phase) -> Vec<ObservedTransition> {
        self.seen
            .lock()
            .iter()
            .filter(|e| e.phase == phase)
            .cloned()
            .collect()
    }

    /// Number of notifications so far
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Check if nothing was observed
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

impl Observer for RecordingObserver {
    fn before_transition(&self, owner: &OwnerRef, draft: &NewTransition) {
        self.seen.lock().push(ObservedTransition {
            phase: Phase::Before,
            owner: owner.clone(),
            from_state: draft.from_state.clone(),
            to_state: draft.to_state.clone(),
            sort_key: None,
        });
    }

    fn after_transition(&self, owner: &OwnerRef, record: &TransitionRecord) {
        self.seen.lock().push(ObservedTransition {
            phase: Phase::After,
            owner: owner.clone(),
            from_state: record.from_state().map(str::to_owned),
            to_state: record.to_state().to_owned(),
            sort_key: Some(record.sort_key()),
        });
    }
}
