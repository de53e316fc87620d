use thiserror::Error;

use crate::types::Id;

#[derive(Debug, Error)]
pub enum SqlMapperError {
    #[error(transparent)]
    SqliteError(rusqlite::Error),

    /// A UNIQUE, CHECK, NOT NULL, PRIMARY KEY or FOREIGN KEY constraint failed.
    #[error("Integrity error: {0}")]
    IntegrityError(rusqlite::Error),

    #[error("No row in table {table} with id {id}")]
    NotFound { table: String, id: Id },

    #[error("Type {0} is not registered as storable")]
    NotRegistered(&'static str),

    #[error("Type {0} is already registered as storable")]
    AlreadyRegistered(&'static str),

    #[error("Column {column} returned from table {table} is not a declared field")]
    SchemaMismatch { table: String, column: String },

    #[error("Type {type_name} has no declared field {field}")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    #[error("Instance of {0} has no id; it was never saved or has been deleted")]
    NotPersisted(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Value conversion error: {0}")]
    ConversionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlMapperError {
    /// True when the underlying engine rejected a write because of a constraint.
    #[must_use]
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Self::IntegrityError(_))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<rusqlite::Error> for SqlMapperError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                SqlMapperError::IntegrityError(err)
            }
            _ => SqlMapperError::SqliteError(err),
        }
    }
}

impl From<serde_json::Error> for SqlMapperError {
    fn from(err: serde_json::Error) -> Self {
        SqlMapperError::ConfigError(format!("invalid options document: {err}"))
    }
}
