//! Record-type schema
//!
//! A [`TransitionSchema`] is the static, in-memory description of a
//! transition record type: its table, the native type identifier of each
//! column, and which fields the application serializes itself before
//! handing them to the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the metadata field. Fixed by convention.
pub const METADATA_COLUMN: &str = "metadata";

/// Application-level codec registered for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    /// JSON text
    Json,
    /// MessagePack bytes
    #[serde(rename = "messagepack")]
    MessagePack,
}

impl SerializationFormat {
    /// Parse a format name as written in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "messagepack" | "msgpack" => Some(Self::MessagePack),
            _ => None,
        }
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::MessagePack => "messagepack",
        }
    }
}

/// How the store itself treats a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    /// The store understands structured documents in this column
    Structured,
    /// Plain text/blob storage, structure is the application's problem
    Plain,
}

impl NativeType {
    /// Classify a native type identifier
    ///
    /// `json` and `jsonb` (any case, surrounding whitespace ignored) are
    /// structured. Everything else, the empty identifier included, is plain.
    pub fn classify(sql_type: &str) -> Self {
        let normalized = sql_type.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "json" | "jsonb" => NativeType::Structured,
            _ => NativeType::Plain,
        }
    }

    /// Check if the store understands structured data natively
    pub fn is_structured(&self) -> bool {
        matches!(self, NativeType::Structured)
    }
}

/// Column of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Native type identifier as declared to the store
    pub sql_type: String,
}

impl ColumnDef {
    /// Create a column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// Static description of a transition record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSchema {
    table: String,
    columns: BTreeMap<String, ColumnDef>,
    serialized: BTreeMap<String, SerializationFormat>,
}

impl TransitionSchema {
    /// Start building a schema for `table`
    pub fn builder(table: impl Into<String>) -> TransitionSchemaBuilder {
        TransitionSchemaBuilder {
            table: table.into(),
            columns: BTreeMap::new(),
            serialized: BTreeMap::new(),
        }
    }

    /// Conventional transition table
    ///
    /// Columns: `id`, `owner_model`, `owner_id`, `from_state`, `to_state`,
    /// `metadata`, `sort_key`, `created_at`. The metadata column is declared
    /// with `metadata_sql_type` and registered for `serialization` if given.
    pub fn standard(
        table: impl Into<String>,
        metadata_sql_type: impl Into<String>,
        serialization: Option<SerializationFormat>,
    ) -> Self {
        let mut builder = Self::builder(table)
            .column("id", "INTEGER")
            .column("owner_model", "TEXT")
            .column("owner_id", "INTEGER")
            .column("from_state", "TEXT")
            .column("to_state", "TEXT")
            .column(METADATA_COLUMN, metadata_sql_type)
            .column("sort_key", "INTEGER")
            .column("created_at", "TEXT");
        if let Some(format) = serialization {
            builder = builder.serialize(METADATA_COLUMN, format);
        }
        builder.build()
    }

    /// Table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name)
    }

    /// Iterate columns in name order
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.values()
    }

    /// Serialization registered for a field, if any
    pub fn serialization(&self, field: &str) -> Option<SerializationFormat> {
        self.serialized.get(field).copied()
    }

    /// Native type identifier of the metadata column
    pub fn metadata_sql_type(&self) -> Option<&str> {
        self.column(METADATA_COLUMN).map(|c| c.sql_type.as_str())
    }

    /// Replace or add a column, keeping everything else
    ///
    /// Stores use this to swap a declared type for the one actually stored.
    pub fn with_column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let def = ColumnDef::new(name, sql_type);
        self.columns.insert(def.name.clone(), def);
        self
    }

    /// Drop a column the store does not have
    pub fn without_column(mut self, name: &str) -> Self {
        self.columns.remove(name);
        self
    }
}

/// Builder for [`TransitionSchema`]
#[derive(Debug, Clone)]
pub struct TransitionSchemaBuilder {
    table: String,
    columns: BTreeMap<String, ColumnDef>,
    serialized: BTreeMap<String, SerializationFormat>,
}

impl TransitionSchemaBuilder {
    /// Declare a column; redeclaring replaces the earlier definition
    pub fn column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let def = ColumnDef::new(name, sql_type);
        self.columns.insert(def.name.clone(), def);
        self
    }

    /// Register application-level serialization for a field
    pub fn serialize(mut self, field: impl Into<String>, format: SerializationFormat) -> Self {
        self.serialized.insert(field.into(), format);
        self
    }

    /// Finish the schema
    pub fn build(self) -> TransitionSchema {
        TransitionSchema {
            table: self.table,
            columns: self.columns,
            serialized: self.serialized,
        }
    }
}
