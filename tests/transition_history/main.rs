//! Transition History Integration Tests
//!
//! Every behavioural property of the adapter is checked against each
//! store: the in-process store, SQLite in memory and SQLite on disk.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test transition_history
//!
//! # Cache behaviour only
//! cargo test --test transition_history last_transition::
//! ```

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use tempfile::TempDir;
use waymark::{
    Backend, History, MemoryStore, NullObserver, Owner, QueryCounts, SerializationFormat,
    SqliteStore, TransitionHistory, TransitionSchema,
};

mod durability;
mod last_transition;
mod observers;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// One store under test, with access to its query counters
pub struct Fixture {
    pub name: &'static str,
    pub store: Backend,
    counts: Box<dyn Fn() -> QueryCounts>,
    _dir: Option<TempDir>,
}

impl Fixture {
    /// Query counters so far
    pub fn counts(&self) -> QueryCounts {
        (self.counts)()
    }

    /// Adapter with no observer bound to `order#id`
    pub fn adapter(&self, id: i64) -> History {
        self.adapter_for(Owner::new("order", id))
    }

    /// Adapter with no observer bound to `owner`
    pub fn adapter_for(&self, owner: Owner) -> History {
        TransitionHistory::new(Arc::clone(&self.store), owner, NullObserver)
            .unwrap_or_else(|e| panic!("{}: adapter construction failed: {}", self.name, e))
    }
}

fn memory_fixture(schema: TransitionSchema) -> Fixture {
    let store = Arc::new(MemoryStore::new(schema));
    let stats = Arc::clone(&store);
    Fixture {
        name: "memory",
        store,
        counts: Box::new(move || stats.stats().snapshot()),
        _dir: None,
    }
}

fn sqlite_fixture(schema: TransitionSchema) -> Fixture {
    let store = Arc::new(SqliteStore::in_memory(schema).expect("open in-memory sqlite"));
    let stats = Arc::clone(&store);
    Fixture {
        name: "sqlite-memory",
        store,
        counts: Box::new(move || stats.stats().snapshot()),
        _dir: None,
    }
}

fn sqlite_file_fixture(schema: TransitionSchema) -> Fixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = Arc::new(
        SqliteStore::open(dir.path().join("transitions.db"), schema).expect("open sqlite file"),
    );
    let stats = Arc::clone(&store);
    Fixture {
        name: "sqlite-file",
        store,
        counts: Box::new(move || stats.stats().snapshot()),
        _dir: Some(dir),
    }
}

/// Every store, over the given schema
pub fn fixtures_with(schema: impl Fn() -> TransitionSchema) -> Vec<Fixture> {
    common::init_tracing();
    vec![
        memory_fixture(schema()),
        sqlite_fixture(schema()),
        sqlite_file_fixture(schema()),
    ]
}

/// Every store, over a `TEXT` metadata column serialized as JSON
pub fn fixtures() -> Vec<Fixture> {
    fixtures_with(|| {
        TransitionSchema::standard("transitions", "TEXT", Some(SerializationFormat::Json))
    })
}
