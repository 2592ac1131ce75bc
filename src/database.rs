//! Main entry point for Waymark.
//!
//! This module provides the `Waymark` struct, which owns a transition store
//! and hands out adapters bound to individual owners.

use crate::config::{WaymarkConfig, DEFAULT_METADATA_SQL_TYPE, DEFAULT_TABLE};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use waymark_adapter::{NullObserver, TransitionHistory};
use waymark_core::{Observer, Owner, SerializationFormat, TransitionSchema, TransitionStore};
use waymark_storage::{MemoryStore, SqliteStore};

/// Type-erased store shared by every adapter of one [`Waymark`].
pub type Backend = Arc<dyn TransitionStore + Send + Sync>;

/// Adapter handed out by [`Waymark::adapter`].
pub type History<O = NullObserver> = TransitionHistory<Backend, O>;

/// The Waymark transition log.
///
/// Create one with [`Waymark::open`], [`Waymark::ephemeral`] or
/// [`Waymark::builder`], then bind adapters to owners.
///
/// # Example
///
/// ```ignore
/// use waymark::prelude::*;
///
/// let marks = Waymark::open("./transitions.db")?;
///
/// let mut order = marks.history("order", 42)?;
/// order.create(Some("pending"), "paid", None)?;
///
/// assert_eq!(order.current_state()?.as_deref(), Some("paid"));
/// ```
#[derive(Clone)]
pub struct Waymark {
    store: Backend,
    path: Option<PathBuf>,
}

impl Waymark {
    /// Open a SQLite database at the given path.
    ///
    /// Uses default settings: table `transitions`, a `TEXT` metadata
    /// column and JSON serialization.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an in-memory SQLite database with default settings.
    ///
    /// Creates no files. All data is lost when the last handle is dropped.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().ephemeral().open()
    }

    /// Create a builder for configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let marks = Waymark::builder()
    ///     .table("order_transitions")
    ///     .metadata_sql_type("jsonb")
    ///     .no_serialization()
    ///     .open_memory()?;
    /// ```
    pub fn builder() -> WaymarkBuilder {
        WaymarkBuilder::new()
    }

    /// Wrap an existing store.
    pub fn with_store(store: Backend) -> Self {
        Self { store, path: None }
    }

    /// Bind an adapter to `owner`.
    ///
    /// Fails with a misconfiguration error if the record type's metadata
    /// declaration is rejected.
    pub fn adapter<O: Observer>(&self, owner: Owner, observer: O) -> Result<History<O>> {
        TransitionHistory::new(Arc::clone(&self.store), owner, observer).map_err(Error::from)
    }

    /// Bind an adapter with no observer to the owner `model#id`.
    pub fn history(&self, model: &str, id: i64) -> Result<History> {
        self.adapter(self.owner(model, id), NullObserver)
    }

    /// Create an owner handle with an unloaded association.
    pub fn owner(&self, model: &str, id: i64) -> Owner {
        Owner::new(model, id)
    }

    /// Materialize the owner's association, returning how many records it holds.
    pub fn preload(&self, owner: &Owner) -> Result<usize> {
        owner.preload(&*self.store).map_err(Error::from)
    }

    /// Record-type schema of the store.
    pub fn schema(&self) -> &TransitionSchema {
        self.store.schema()
    }

    /// Underlying store.
    pub fn store(&self) -> &Backend {
        &self.store
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if this database has no backing file.
    pub fn is_ephemeral(&self) -> bool {
        self.path.is_none()
    }
}

impl std::fmt::Debug for Waymark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waymark")
            .field("table", &self.store.schema().table())
            .field("path", &self.path)
            .finish()
    }
}

/// Builder for Waymark configuration.
///
/// # Example
///
/// ```ignore
/// // On disk, metadata serialized as MessagePack into a BLOB column
/// let marks = Waymark::builder()
///     .path("./transitions.db")
///     .metadata_sql_type("BLOB")
///     .serialize_metadata(SerializationFormat::MessagePack)
///     .open()?;
///
/// // Unit testing: in-process store, nothing touches disk
/// let marks = Waymark::builder().open_memory()?;
/// ```
#[derive(Debug, Clone)]
pub struct WaymarkBuilder {
    path: Option<PathBuf>,
    table: String,
    metadata_sql_type: String,
    serialization: Option<SerializationFormat>,
}

impl WaymarkBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            path: None,
            table: DEFAULT_TABLE.to_string(),
            metadata_sql_type: DEFAULT_METADATA_SQL_TYPE.to_string(),
            serialization: Some(SerializationFormat::Json),
        }
    }

    /// Create a builder from a parsed configuration.
    pub fn from_config(config: &WaymarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            path: config.path.clone(),
            table: config.table.clone(),
            metadata_sql_type: config.metadata_sql_type.clone(),
            serialization: config.serialization_format()?,
        })
    }

    /// Set the database file path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an in-memory database (no files).
    pub fn ephemeral(mut self) -> Self {
        self.path = None;
        self
    }

    /// Set the transition table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the declared native type of the metadata column.
    ///
    /// `json` and `jsonb` are structured; anything else is plain.
    pub fn metadata_sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.metadata_sql_type = sql_type.into();
        self
    }

    /// Register application-level serialization for metadata.
    pub fn serialize_metadata(mut self, format: SerializationFormat) -> Self {
        self.serialization = Some(format);
        self
    }

    /// Store metadata without application-level serialization.
    ///
    /// Only valid together with a structured metadata column.
    pub fn no_serialization(mut self) -> Self {
        self.serialization = None;
        self
    }

    /// Record-type schema described by this builder.
    pub fn schema(&self) -> TransitionSchema {
        TransitionSchema::standard(
            self.table.clone(),
            self.metadata_sql_type.clone(),
            self.serialization,
        )
    }

    /// Open a SQLite-backed Waymark.
    ///
    /// Uses the configured path, or an in-memory database if none is set.
    pub fn open(self) -> Result<Waymark> {
        self.check_table()?;
        let schema = self.schema();
        let store = match &self.path {
            Some(path) => SqliteStore::open(path, schema)?,
            None => SqliteStore::in_memory(schema)?,
        };
        info!(table = %self.table, path = ?self.path, "waymark opened");
        Ok(Waymark {
            store: Arc::new(store),
            path: self.path,
        })
    }

    /// Open a Waymark over the in-process store.
    ///
    /// Any configured path is ignored.
    pub fn open_memory(self) -> Result<Waymark> {
        self.check_table()?;
        let store = MemoryStore::new(self.schema());
        info!(table = %self.table, "waymark opened in memory");
        Ok(Waymark {
            store: Arc::new(store),
            path: None,
        })
    }

    fn check_table(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(Error::InvalidConfig("table name is empty".into()));
        }
        Ok(())
    }
}

impl Default for WaymarkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
