use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SqlMapperError;

use super::database::Database;

/// Marker that selects an in-process, non-persistent database.
pub const MEMORY_MARKER: &str = ":memory:";

/// Where a [`Database`] keeps its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DbLocation {
    /// Ephemeral in-process store; discarded when the connection closes.
    Memory,
    /// A database file on disk.
    File(PathBuf),
}

impl DbLocation {
    #[must_use]
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::Memory => f.write_str(MEMORY_MARKER),
            DbLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&str> for DbLocation {
    fn from(value: &str) -> Self {
        if value == MEMORY_MARKER {
            DbLocation::Memory
        } else {
            DbLocation::File(PathBuf::from(value))
        }
    }
}

impl From<String> for DbLocation {
    fn from(value: String) -> Self {
        DbLocation::from(value.as_str())
    }
}

impl From<&Path> for DbLocation {
    fn from(value: &Path) -> Self {
        DbLocation::File(value.to_path_buf())
    }
}

impl From<PathBuf> for DbLocation {
    fn from(value: PathBuf) -> Self {
        DbLocation::File(value)
    }
}

impl From<DbLocation> for String {
    fn from(value: DbLocation) -> Self {
        value.to_string()
    }
}

/// Options for opening a [`Database`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    pub location: DbLocation,
    /// Enforce foreign key constraints (`PRAGMA foreign_keys = ON`).
    pub foreign_keys: bool,
    /// Switch file databases to `journal_mode = WAL`. Ignored for in-memory databases.
    pub wal: bool,
    /// Prefix of the savepoint names issued by nested transactions.
    pub savepoint_prefix: String,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            location: DbLocation::Memory,
            foreign_keys: true,
            wal: false,
            savepoint_prefix: "mapper".to_string(),
        }
    }
}

impl DatabaseOptions {
    #[must_use]
    pub fn new(location: impl Into<DbLocation>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder(location: impl Into<DbLocation>) -> DatabaseOptionsBuilder {
        DatabaseOptionsBuilder::new(location)
    }

    /// Parse options from a JSON document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::ConfigError` if the document is malformed or names an
    /// unusable savepoint prefix.
    pub fn from_json(document: &str) -> Result<Self, SqlMapperError> {
        let opts: DatabaseOptions = serde_json::from_str(document)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Savepoint names are spliced into SQL, so the prefix must be a plain identifier.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::ConfigError` if the prefix is empty or not an identifier.
    pub fn validate(&self) -> Result<(), SqlMapperError> {
        let prefix = &self.savepoint_prefix;
        let valid = prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(SqlMapperError::ConfigError(format!(
                "savepoint prefix {prefix:?} is not a valid identifier"
            )))
        }
    }
}

/// Fluent builder for [`DatabaseOptions`].
#[derive(Debug, Clone)]
pub struct DatabaseOptionsBuilder {
    opts: DatabaseOptions,
}

impl DatabaseOptionsBuilder {
    #[must_use]
    pub fn new(location: impl Into<DbLocation>) -> Self {
        Self {
            opts: DatabaseOptions::new(location),
        }
    }

    #[must_use]
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.opts.foreign_keys = enabled;
        self
    }

    #[must_use]
    pub fn wal(mut self, enabled: bool) -> Self {
        self.opts.wal = enabled;
        self
    }

    #[must_use]
    pub fn savepoint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.opts.savepoint_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn finish(self) -> DatabaseOptions {
        self.opts
    }

    /// Open a [`Database`] with the collected options.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the options are invalid or the connection cannot be opened.
    pub fn open(self) -> Result<Database, SqlMapperError> {
        Database::with_options(self.finish())
    }
}
