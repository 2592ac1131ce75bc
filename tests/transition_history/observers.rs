//! Observer notification around `create`

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use waymark::{observer_fn, Phase, RecordingObserver, TransitionRecord};

#[test]
fn test_observer_sees_persisted_record() {
    for fx in fixtures() {
        let observer = RecordingObserver::new();
        let mut history =
            TransitionHistory::new(Arc::clone(&fx.store), Owner::new("order", 1), &observer)
                .unwrap();

        let created = history.create(Some("new"), "paid", None).unwrap();

        let events = observer.events();
        assert_eq!(events.len(), 2, "{}", fx.name);
        assert_eq!(events[0].phase, Phase::Before);
        assert_eq!(events[0].sort_key, None);
        assert_eq!(events[1].phase, Phase::After);
        assert_eq!(events[1].from_state.as_deref(), Some("new"));
        assert_eq!(events[1].sort_key, Some(created.sort_key()), "{}", fx.name);
    }
}

#[test]
fn test_after_hook_runs_once_per_create() {
    for fx in fixtures() {
        let calls = AtomicUsize::new(0);
        let observer = observer_fn(|_, _: &TransitionRecord| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        let mut history =
            TransitionHistory::new(Arc::clone(&fx.store), Owner::new("order", 1), &observer)
                .unwrap();

        history.create(None, "a", None).unwrap();
        history.create(Some("a"), "b", None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2, "{}", fx.name);
    }
}

#[test]
fn test_observer_sees_cache_already_seeded() {
    let fx = &fixtures()[0];
    let seen = Mutex::new(Vec::new());
    let observer = observer_fn(|owner, record: &TransitionRecord| {
        seen.lock().unwrap().push((owner.to_string(), record.to_state().to_owned()));
    });
    let mut history =
        TransitionHistory::new(Arc::clone(&fx.store), Owner::new("order", 3), &observer).unwrap();

    history.create(None, "a", None).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("order#3".to_string(), "a".to_string())]
    );
    assert!(history.is_cached());
}

#[test]
fn test_failed_create_skips_after_hook() {
    let store = Arc::new(MemoryStore::new(TransitionSchema::standard(
        "transitions",
        "TEXT",
        Some(SerializationFormat::Json),
    )));
    let observer = RecordingObserver::new();
    let mut history =
        TransitionHistory::new(Arc::clone(&store), Owner::new("order", 1), &observer).unwrap();

    store.fail_next_insert("unique violation");
    assert!(history.create(None, "a", None).is_err());

    assert_eq!(observer.events_in(Phase::Before).len(), 1);
    assert!(observer.events_in(Phase::After).is_empty());
}
