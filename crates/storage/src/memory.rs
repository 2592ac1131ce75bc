//! In-process row store
//!
//! Rows are sharded by owner with DashMap, so owners never contend with
//! each other. Sort keys come from one global atomic counter, which keeps
//! them strictly increasing within every owner.
//!
//! # Design
//!
//! - DashMap: sharded by OwnerRef, lock-free reads
//! - Vec per owner: rows in insertion order, which is sort-key order
//! - Metadata is kept encoded the way the schema says, and decoded on read

use crate::format::{EncodedMetadata, MetadataCodec};
use crate::stats::QueryStats;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use waymark_core::{
    Error, GuardError, NewTransition, OwnerRef, Result, SortKey, TransitionRecord,
    TransitionSchema, TransitionStore,
};

/// One stored transition row
#[derive(Debug, Clone)]
struct StoredRow {
    id: i64,
    from_state: Option<String>,
    to_state: String,
    metadata: EncodedMetadata,
    sort_key: SortKey,
    created_at: DateTime<Utc>,
}

/// Per-owner shard
#[derive(Debug, Default)]
struct Shard {
    rows: Vec<StoredRow>,
}

/// Sharded in-memory transition store
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - reads take a shared guard on the owner's shard only
/// - inserts lock the target owner's shard only
///
/// # Example
///
/// ```ignore
/// use waymark_core::TransitionSchema;
/// use waymark_storage::MemoryStore;
///
/// let store = MemoryStore::new(TransitionSchema::standard("transitions", "json", None));
/// ```
pub struct MemoryStore {
    schema: TransitionSchema,
    codec: std::result::Result<MetadataCodec, GuardError>,
    shards: DashMap<OwnerRef, Shard>,
    /// Last assigned sort key, shared by all owners
    version: AtomicU64,
    next_id: AtomicU64,
    fail_next: Mutex<Option<String>>,
    stats: QueryStats,
}

impl MemoryStore {
    /// Create an empty store for `schema`
    ///
    /// The store accepts any schema. If the serialization guard rejects it,
    /// every metadata access reports that refusal.
    pub fn new(schema: TransitionSchema) -> Self {
        Self::with_capacity(schema, 0)
    }

    /// Create with an expected number of owners
    pub fn with_capacity(schema: TransitionSchema, owners: usize) -> Self {
        let codec = MetadataCodec::for_schema(&schema);
        Self {
            schema,
            codec,
            shards: DashMap::with_capacity(owners),
            version: AtomicU64::new(0),
            next_id: AtomicU64::new(0),
            fail_next: Mutex::new(None),
            stats: QueryStats::new(),
        }
    }

    /// Query counters
    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }

    /// Make the next `insert` fail with a storage error without writing
    pub fn fail_next_insert(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    /// Number of owners with at least one row
    pub fn owner_count(&self) -> usize {
        self.shards.len()
    }

    /// Rows stored for one owner
    pub fn row_count(&self, owner: &OwnerRef) -> usize {
        self.shards
            .get(owner)
            .map(|shard| shard.rows.len())
            .unwrap_or(0)
    }

    /// Rows stored across all owners
    pub fn total_rows(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().rows.len()).sum()
    }

    fn codec(&self) -> Result<MetadataCodec> {
        self.codec.clone().map_err(Error::from)
    }

    #[inline]
    fn next_sort_key(&self) -> SortKey {
        SortKey(self.version.fetch_add(1, Ordering::AcqRel) + 1)
    }

    fn hydrate(&self, owner: &OwnerRef, row: &StoredRow) -> Result<TransitionRecord> {
        let metadata = self.codec()?.decode(Some(&row.metadata))?;
        let draft = NewTransition {
            from_state: row.from_state.clone(),
            to_state: row.to_state.clone(),
            metadata,
        };
        Ok(TransitionRecord::from_parts(
            row.id,
            owner.clone(),
            draft,
            row.sort_key,
            row.created_at,
        ))
    }
}

impl TransitionStore for MemoryStore {
    fn schema(&self) -> &TransitionSchema {
        &self.schema
    }

    fn insert(&self, owner: &OwnerRef, draft: &NewTransition) -> Result<TransitionRecord> {
        if let Some(message) = self.fail_next.lock().take() {
            return Err(Error::Storage(message));
        }

        let metadata = self.codec()?.encode(&draft.metadata)?;

        let mut shard = self.shards.entry(owner.clone()).or_default();
        // Allocated under the shard guard so per-owner order matches sort-key order
        let row = StoredRow {
            id: self.next_id.fetch_add(1, Ordering::AcqRel) as i64 + 1,
            from_state: draft.from_state.clone(),
            to_state: draft.to_state.clone(),
            metadata,
            sort_key: self.next_sort_key(),
            created_at: Utc::now(),
        };
        shard.rows.push(row.clone());
        drop(shard);
        self.stats.record_insert();

        debug!(%owner, sort_key = %row.sort_key, "stored transition");
        Ok(TransitionRecord::from_parts(
            row.id,
            owner.clone(),
            draft.clone(),
            row.sort_key,
            row.created_at,
        ))
    }

    fn last(&self, owner: &OwnerRef) -> Result<Option<TransitionRecord>> {
        self.stats.record_last();

        let row = self
            .shards
            .get(owner)
            .and_then(|shard| shard.rows.iter().max_by_key(|r| r.sort_key).cloned());

        row.map(|row| self.hydrate(owner, &row)).transpose()
    }

    fn history(&self, owner: &OwnerRef) -> Result<Vec<TransitionRecord>> {
        self.stats.record_history();

        let mut rows = self
            .shards
            .get(owner)
            .map(|shard| shard.rows.clone())
            .unwrap_or_default();
        rows.sort_by_key(|r| r.sort_key);

        rows.iter().map(|row| self.hydrate(owner, row)).collect()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("table", &self.schema.table())
            .field("owner_count", &self.owner_count())
            .field("version", &self.version.load(Ordering::Acquire))
            .field("total_rows", &self.total_rows())
            .finish()
    }
}
