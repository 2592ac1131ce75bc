//! Last-transition resolution and the cache slot

use crate::*;
use serde_json::json;

// =============================================================================
// CACHE SHORT-CIRCUIT
// =============================================================================

#[test]
fn test_create_then_last_issues_no_query() {
    for fx in fixtures() {
        let mut history = fx.adapter(1);
        let meta = common::metadata(&[("by", json!("alice")), ("attempt", json!(2))]);

        history.create(Some("a"), "b", Some(meta.clone())).unwrap();
        let before = fx.counts();

        let last = history.last().unwrap().expect("a transition");
        assert_eq!(last.from_state(), Some("a"), "{}", fx.name);
        assert_eq!(last.to_state(), "b", "{}", fx.name);
        assert_eq!(last.metadata(), &meta, "{}", fx.name);
        assert_eq!(fx.counts(), before, "{}: last hit the store", fx.name);
    }
}

#[test]
fn test_second_create_wins() {
    for fx in fixtures() {
        let mut history = fx.adapter(1);
        history.create(Some("a"), "b", None).unwrap();
        history.create(Some("b"), "c", None).unwrap();

        assert_eq!(history.last().unwrap().unwrap().to_state(), "c", "{}", fx.name);

        let mut fresh = fx.adapter(1);
        assert_eq!(fresh.last().unwrap().unwrap().to_state(), "c", "{}", fx.name);
    }
}

#[test]
fn test_repeated_last_resolves_once() {
    for fx in fixtures() {
        fx.adapter(1).create(None, "a", None).unwrap();

        let mut history = fx.adapter(1);
        let first = history.last().unwrap().unwrap();
        for _ in 0..5 {
            let again = history.last().unwrap().unwrap();
            assert!(Arc::ptr_eq(&first, &again), "{}", fx.name);
        }
        assert_eq!(fx.counts().last_queries, 1, "{}", fx.name);
    }
}

// =============================================================================
// EMPTY HISTORY
// =============================================================================

#[test]
fn test_last_without_transitions_is_none() {
    for fx in fixtures() {
        let mut history = fx.adapter(99);
        assert!(history.last().unwrap().is_none(), "{}", fx.name);
        assert!(history.last().unwrap().is_none(), "{}", fx.name);
        assert!(history.history().unwrap().is_empty(), "{}", fx.name);
        assert_eq!(fx.counts().last_queries, 1, "{}", fx.name);
    }
}

#[test]
fn test_cached_none_replaced_by_create() {
    for fx in fixtures() {
        let mut history = fx.adapter(1);
        assert!(history.last().unwrap().is_none());

        history.create(None, "a", None).unwrap();
        assert_eq!(history.last().unwrap().unwrap().to_state(), "a", "{}", fx.name);
    }
}

// =============================================================================
// FORCED RELOAD
// =============================================================================

#[test]
fn test_force_reload_rederives_and_recaches() {
    for fx in fixtures() {
        let mut ours = fx.adapter(1);
        ours.create(None, "a", None).unwrap();

        fx.adapter(1).create(Some("a"), "b", None).unwrap();

        assert_eq!(ours.last().unwrap().unwrap().to_state(), "a", "{}", fx.name);

        let queries = fx.counts().last_queries;
        let reloaded = ours.last_with(true).unwrap().unwrap();
        assert_eq!(reloaded.to_state(), "b", "{}", fx.name);
        assert_eq!(fx.counts().last_queries, queries + 1, "{}", fx.name);

        let cached = ours.last().unwrap().unwrap();
        assert!(Arc::ptr_eq(&reloaded, &cached), "{}", fx.name);
        assert_eq!(fx.counts().last_queries, queries + 1, "{}", fx.name);
    }
}

// =============================================================================
// OWNER ISOLATION AND ORDERING
// =============================================================================

#[test]
fn test_owners_do_not_share_history() {
    for fx in fixtures() {
        fx.adapter(1).create(None, "one", None).unwrap();
        fx.adapter(2).create(None, "two", None).unwrap();

        let mut shipment = fx.adapter_for(Owner::new("shipment", 1));
        assert!(shipment.last().unwrap().is_none(), "{}", fx.name);
        assert_eq!(fx.adapter(1).last().unwrap().unwrap().to_state(), "one");
        assert_eq!(fx.adapter(2).last().unwrap().unwrap().to_state(), "two");
    }
}

#[test]
fn test_sort_keys_strictly_increase() {
    for fx in fixtures() {
        let mut history = fx.adapter(1);
        let states = ["a", "b", "c", "d"];
        let mut previous: Option<&str> = None;
        for state in states {
            history.create(previous, state, None).unwrap();
            previous = Some(state);
        }

        let records = history.history().unwrap();
        let to: Vec<_> = records.iter().map(|r| r.to_state()).collect();
        assert_eq!(to, states, "{}", fx.name);
        assert!(
            records.windows(2).all(|w| w[0].sort_key() < w[1].sort_key()),
            "{}",
            fx.name
        );
    }
}

#[test]
fn test_failed_create_leaves_slot_untouched() {
    common::init_tracing();
    let store = Arc::new(MemoryStore::new(TransitionSchema::standard(
        "transitions",
        "TEXT",
        Some(SerializationFormat::Json),
    )));
    let mut history =
        TransitionHistory::new(Arc::clone(&store), Owner::new("order", 1), NullObserver).unwrap();
    history.create(None, "a", None).unwrap();

    store.fail_next_insert("deadlock detected");
    let err = waymark::Error::from(history.create(Some("a"), "b", None).unwrap_err());
    assert!(err.is_storage());
    assert_eq!(err.to_string(), "storage error: deadlock detected");

    assert_eq!(history.last().unwrap().unwrap().to_state(), "a");
    assert_eq!(store.row_count(&waymark::OwnerRef::new("order", 1)), 1);
    assert_eq!(store.stats().snapshot().last_queries, 0);
}
