//! File-based configuration.
//!
//! ```toml
//! path = "./transitions.db"
//! table = "order_transitions"
//! metadata_sql_type = "TEXT"
//! serialization = "json"
//! ```
//!
//! Every key is optional. Omitting `path` opens an in-memory database.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use waymark_core::SerializationFormat;

/// Default transition table name.
pub const DEFAULT_TABLE: &str = "transitions";

/// Default declared type of the metadata column.
pub const DEFAULT_METADATA_SQL_TYPE: &str = "TEXT";

/// Serialization value meaning "no application-level serialization".
const NO_SERIALIZATION: &str = "none";

/// Deserializable Waymark configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaymarkConfig {
    /// Database file; `None` for an in-memory database
    pub path: Option<PathBuf>,
    /// Transition table name
    pub table: String,
    /// Declared native type of the metadata column
    pub metadata_sql_type: String,
    /// `json`, `messagepack` or `none`
    pub serialization: String,
}

impl Default for WaymarkConfig {
    fn default() -> Self {
        Self {
            path: None,
            table: DEFAULT_TABLE.to_string(),
            metadata_sql_type: DEFAULT_METADATA_SQL_TYPE.to_string(),
            serialization: SerializationFormat::Json.name().to_string(),
        }
    }
}

impl WaymarkConfig {
    /// Parse a configuration from TOML text.
    ///
    /// The result is validated before it is returned.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Check every value without opening anything.
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(Error::InvalidConfig("table name is empty".into()));
        }
        self.serialization_format()?;
        Ok(())
    }

    /// Resolve the `serialization` value.
    ///
    /// `Ok(None)` means no serialization is registered.
    pub fn serialization_format(&self) -> Result<Option<SerializationFormat>> {
        let name = self.serialization.trim();
        if name.eq_ignore_ascii_case(NO_SERIALIZATION) {
            return Ok(None);
        }
        SerializationFormat::from_name(name).map(Some).ok_or_else(|| {
            Error::InvalidConfig(format!("unknown serialization format `{}`", name))
        })
    }
}
