use crate::error::SqlMapperError;
use crate::types::RowValues;

/// Convert a single `RowValue` to a rusqlite `Value`.
///
/// Timestamps are written as `YYYY-MM-DD HH:MM:SS[.fff]` text and JSON as its compact
/// serialization, which is what `FromRowValues` parses back.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> rusqlite::types::Value {
    match value {
        RowValues::Int(i) => rusqlite::types::Value::Integer(*i),
        RowValues::Float(f) => rusqlite::types::Value::Real(*f),
        RowValues::Text(s) => rusqlite::types::Value::Text(s.clone()),
        RowValues::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => {
            rusqlite::types::Value::Text(dt.format("%F %T%.f").to_string())
        }
        RowValues::Null => rusqlite::types::Value::Null,
        RowValues::JSON(jval) => rusqlite::types::Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
    }
}

/// Convert a rusqlite `Value` read from a row into a `RowValues`.
#[must_use]
pub fn sqlite_value_to_row_value(value: rusqlite::types::Value) -> RowValues {
    match value {
        rusqlite::types::Value::Null => RowValues::Null,
        rusqlite::types::Value::Integer(i) => RowValues::Int(i),
        rusqlite::types::Value::Real(f) => RowValues::Float(f),
        rusqlite::types::Value::Text(s) => RowValues::Text(s),
        rusqlite::types::Value::Blob(b) => RowValues::Blob(b),
    }
}

/// Positional `SQLite` parameter container.
#[derive(Debug, Clone, Default)]
pub struct Params(pub Vec<rusqlite::types::Value>);

impl Params {
    /// Convert mapper values into `SQLite` values.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::ConversionError` if a parameter cannot be converted.
    pub fn convert(params: &[RowValues]) -> Result<Self, SqlMapperError> {
        let mut vec_values = Vec::with_capacity(params.len());
        for p in params {
            if let RowValues::Float(f) = p
                && f.is_nan()
            {
                return Err(SqlMapperError::ConversionError(
                    "NaN cannot be bound as a SQLite parameter".into(),
                ));
            }
            vec_values.push(row_value_to_sqlite_value(p));
        }
        Ok(Params(vec_values))
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[rusqlite::types::Value] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
