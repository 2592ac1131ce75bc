//! Query statistics
//!
//! Every store counts the round-trips it serves. The counters make cache
//! behaviour observable: a `last()` answered from the adapter's cache or
//! from a preloaded association leaves them untouched.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters of a store
#[derive(Debug, Default)]
pub struct QueryStats {
    inserts: AtomicU64,
    last_queries: AtomicU64,
    history_queries: AtomicU64,
}

/// Point-in-time copy of [`QueryStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCounts {
    /// Rows inserted
    pub inserts: u64,
    /// Last-transition queries served
    pub last_queries: u64,
    /// History queries served
    pub history_queries: u64,
}

impl QueryCounts {
    /// Read queries of any kind
    pub fn reads(&self) -> u64 {
        self.last_queries + self.history_queries
    }

    /// All round-trips
    pub fn total(&self) -> u64 {
        self.inserts + self.reads()
    }
}

impl QueryStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_last(&self) {
        self.last_queries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_history(&self) {
        self.history_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counts
    pub fn snapshot(&self) -> QueryCounts {
        QueryCounts {
            inserts: self.inserts.load(Ordering::Relaxed),
            last_queries: self.last_queries.load(Ordering::Relaxed),
            history_queries: self.history_queries.load(Ordering::Relaxed),
        }
    }
}
