//! Relational row store over SQLite
//!
//! One table per transition record type, created on open if missing. The
//! metadata column is declared with the schema's native type identifier, so
//! the table on disk matches what the serialization guard reasoned about.
//!
//! ## Queries
//!
//! | Operation | SQL |
//! |-----------|-----|
//! | `insert` | `MAX(sort_key) + 10` for the owner, then `INSERT`, in one transaction |
//! | `last` | `ORDER BY sort_key DESC LIMIT 1` |
//! | `history` | `ORDER BY sort_key ASC` |
//!
//! Structured metadata columns receive their payload through `json(?)`, so
//! SQLite validates and stores it as a JSON document.

use crate::format::{EncodedMetadata, MetadataCodec};
use crate::stats::QueryStats;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use waymark_core::{
    Error, GuardError, NewTransition, OwnerRef, Result, SortKey, TransitionRecord,
    TransitionSchema, TransitionStore, METADATA_COLUMN,
};

/// Gap between consecutive sort keys of one owner
pub const SORT_KEY_STEP: i64 = 10;

/// How long a writer waits for another connection's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl ToSql for EncodedMetadata {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            EncodedMetadata::Text(text) => ToSqlOutput::from(text.as_str()),
            EncodedMetadata::Blob(bytes) => ToSqlOutput::from(bytes.as_slice()),
        })
    }
}

fn storage_err(e: rusqlite::Error) -> Error {
    Error::storage(e)
}

/// Row as read, before metadata is decoded
struct RawRow {
    id: i64,
    from_state: Option<String>,
    to_state: String,
    metadata: Option<EncodedMetadata>,
    sort_key: i64,
    created_at: String,
}

impl RawRow {
    const COLUMNS: &'static str = "id, from_state, to_state, metadata, sort_key, created_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let metadata = match row.get_ref(3)? {
            ValueRef::Null => None,
            ValueRef::Text(bytes) => Some(EncodedMetadata::Text(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
            ValueRef::Blob(bytes) => Some(EncodedMetadata::Blob(bytes.to_vec())),
            ValueRef::Integer(n) => Some(EncodedMetadata::Text(n.to_string())),
            ValueRef::Real(n) => Some(EncodedMetadata::Text(n.to_string())),
        };
        Ok(Self {
            id: row.get(0)?,
            from_state: row.get(1)?,
            to_state: row.get(2)?,
            metadata,
            sort_key: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

/// SQLite-backed transition store
///
/// The connection sits behind a mutex, so one store can be shared between
/// threads and adapters.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    schema: TransitionSchema,
    codec: std::result::Result<MetadataCodec, GuardError>,
    stats: QueryStats,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>, schema: TransitionSchema) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(storage_err)?;
        info!(path = %path.display(), table = schema.table(), "opened transition store");
        Self::bootstrap(conn, schema)
    }

    /// Open a private in-memory database
    pub fn in_memory(schema: TransitionSchema) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::bootstrap(conn, schema)
    }

    fn bootstrap(conn: Connection, schema: TransitionSchema) -> Result<Self> {
        validate_identifier(schema.table())?;
        let metadata_type = schema.metadata_sql_type().unwrap_or("");
        validate_type_name(metadata_type)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(storage_err)?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_model TEXT NOT NULL,
                owner_id INTEGER NOT NULL,
                from_state TEXT,
                to_state TEXT NOT NULL,
                metadata {metadata_type},
                sort_key INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (owner_model, owner_id, sort_key)
            );",
            table = schema.table(),
        ))
        .map_err(storage_err)?;

        // An existing table keeps its own metadata type; the guard must see that one
        let stored = stored_column_type(&conn, schema.table(), METADATA_COLUMN)?;
        let schema = reconcile_schema(schema, stored);

        let codec = MetadataCodec::for_schema(&schema);
        Ok(Self {
            conn: Mutex::new(conn),
            schema,
            codec,
            stats: QueryStats::new(),
        })
    }

    /// Query counters
    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }

    /// Rows stored for one owner
    pub fn row_count(&self, owner: &OwnerRef) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE owner_model = ?1 AND owner_id = ?2",
                    self.schema.table()
                ),
                params![owner.model, owner.id],
                |row| row.get(0),
            )
            .map_err(storage_err)?;
        usize::try_from(count).map_err(Error::storage)
    }

    fn codec(&self) -> Result<MetadataCodec> {
        self.codec.clone().map_err(Error::from)
    }

    fn hydrate(&self, owner: &OwnerRef, raw: RawRow) -> Result<TransitionRecord> {
        let metadata = self.codec()?.decode(raw.metadata.as_ref())?;
        let sort_key = u64::try_from(raw.sort_key).map_err(Error::storage)?;
        let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
            .map_err(Error::storage)?
            .with_timezone(&Utc);
        let draft = NewTransition {
            from_state: raw.from_state,
            to_state: raw.to_state,
            metadata,
        };
        Ok(TransitionRecord::from_parts(
            raw.id,
            owner.clone(),
            draft,
            SortKey(sort_key),
            created_at,
        ))
    }
}

impl TransitionStore for SqliteStore {
    fn schema(&self) -> &TransitionSchema {
        &self.schema
    }

    fn insert(&self, owner: &OwnerRef, draft: &NewTransition) -> Result<TransitionRecord> {
        let codec = self.codec()?;
        let metadata = codec.encode(&draft.metadata)?;
        let metadata_expr = if codec.is_native() { "json(?5)" } else { "?5" };
        let table = self.schema.table();
        let created_at = Utc::now();

        let mut conn = self.conn.lock();
        // Take the write lock up front so the MAX read and the insert never race
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage_err)?;
        let sort_key: i64 = tx
            .query_row(
                &format!(
                    "SELECT COALESCE(MAX(sort_key), 0) + ?3 FROM {table}
                     WHERE owner_model = ?1 AND owner_id = ?2"
                ),
                params![owner.model, owner.id, SORT_KEY_STEP],
                |row| row.get(0),
            )
            .map_err(storage_err)?;
        tx.execute(
            &format!(
                "INSERT INTO {table}
                 (owner_model, owner_id, from_state, to_state, metadata, sort_key, created_at)
                 VALUES (?1, ?2, ?3, ?4, {metadata_expr}, ?6, ?7)"
            ),
            params![
                owner.model,
                owner.id,
                draft.from_state,
                draft.to_state,
                metadata,
                sort_key,
                created_at.to_rfc3339(),
            ],
        )
        .map_err(storage_err)?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(storage_err)?;
        drop(conn);
        self.stats.record_insert();

        debug!(%owner, sort_key, table, "stored transition");
        let sort_key = u64::try_from(sort_key).map_err(Error::storage)?;
        Ok(TransitionRecord::from_parts(
            id,
            owner.clone(),
            draft.clone(),
            SortKey(sort_key),
            created_at,
        ))
    }

    fn last(&self, owner: &OwnerRef) -> Result<Option<TransitionRecord>> {
        self.stats.record_last();

        let raw = {
            let conn = self.conn.lock();
            conn.query_row(
                &format!(
                    "SELECT {} FROM {} WHERE owner_model = ?1 AND owner_id = ?2
                     ORDER BY sort_key DESC LIMIT 1",
                    RawRow::COLUMNS,
                    self.schema.table()
                ),
                params![owner.model, owner.id],
                RawRow::from_row,
            )
            .optional()
            .map_err(storage_err)?
        };

        raw.map(|raw| self.hydrate(owner, raw)).transpose()
    }

    fn history(&self, owner: &OwnerRef) -> Result<Vec<TransitionRecord>> {
        self.stats.record_history();

        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM {} WHERE owner_model = ?1 AND owner_id = ?2
                     ORDER BY sort_key ASC",
                    RawRow::COLUMNS,
                    self.schema.table()
                ))
                .map_err(storage_err)?;
            let rows = stmt
                .query_map(params![owner.model, owner.id], RawRow::from_row)
                .map_err(storage_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(storage_err)?;
            rows
        };

        rows.into_iter().map(|raw| self.hydrate(owner, raw)).collect()
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("table", &self.schema.table())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// Declared type of `column` in the live table, `None` if the column is absent
fn stored_column_type(conn: &Connection, table: &str, column: &str) -> Result<Option<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .map_err(storage_err)?;
    let mut rows = stmt.query([]).map_err(storage_err)?;
    while let Some(row) = rows.next().map_err(storage_err)? {
        let name: String = row.get(1).map_err(storage_err)?;
        if name == column {
            return row.get(2).map(Some).map_err(storage_err);
        }
    }
    Ok(None)
}

fn reconcile_schema(schema: TransitionSchema, stored: Option<String>) -> TransitionSchema {
    let declared = schema.metadata_sql_type().map(str::to_owned);
    match stored {
        Some(stored)
            if declared
                .as_deref()
                .is_some_and(|d| d.trim().eq_ignore_ascii_case(stored.trim())) =>
        {
            schema
        }
        Some(stored) => {
            warn!(
                table = schema.table(),
                declared = ?declared,
                stored = %stored,
                "metadata column type differs from declaration, using stored type"
            );
            schema.with_column(METADATA_COLUMN, stored)
        }
        None => {
            warn!(table = schema.table(), "existing table has no metadata column");
            schema.without_column(METADATA_COLUMN)
        }
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass
fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::invalid_config(format!("invalid table name `{}`", name)))
    }
}

fn validate_type_name(sql_type: &str) -> Result<()> {
    if sql_type
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
    {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "invalid column type `{}`",
            sql_type
        )))
    }
}
