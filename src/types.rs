use std::fmt;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::SqlMapperError;

/// Values that can be stored in a mapped field or bound as query parameters.
///
/// Field values of a storable record travel through this enum on their way in and
/// out of `SQLite`:
/// ```rust
/// use sqlite_mapper::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::from(Some(true)),
///     RowValues::from(None::<String>),
/// ];
/// assert!(params[3].is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value, stored as 0/1
    Bool(bool),
    /// Timestamp value, stored as text
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value, stored as text
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(dt);
                }
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "integer",
            RowValues::Float(_) => "real",
            RowValues::Text(_) => "text",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::Null => "null",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "blob",
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_owned())
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl From<Id> for RowValues {
    fn from(value: Id) -> Self {
        match value {
            Id::Int(i) => RowValues::Int(i),
            Id::Text(s) => RowValues::Text(s),
        }
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Convert a value read from a row back into a field's Rust type.
pub trait FromRowValues: Sized {
    /// Build `Self` from a stored value.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::ConversionError` when the stored value has an incompatible type.
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError>;
}

fn mismatch(expected: &str, value: &RowValues) -> SqlMapperError {
    SqlMapperError::ConversionError(format!("expected {expected}, found {}", value.kind()))
}

impl FromRowValues for RowValues {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        Ok(value)
    }
}

impl FromRowValues for i64 {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        value.as_int().copied().ok_or_else(|| mismatch("integer", &value))
    }
}

impl FromRowValues for i32 {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        let wide = i64::from_row_values(value)?;
        i32::try_from(wide)
            .map_err(|_| SqlMapperError::ConversionError(format!("{wide} does not fit in i32")))
    }
}

impl FromRowValues for f64 {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        value.as_float().ok_or_else(|| mismatch("real", &value))
    }
}

impl FromRowValues for bool {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        value.as_bool().copied().ok_or_else(|| mismatch("bool", &value))
    }
}

impl FromRowValues for String {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        match value {
            RowValues::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromRowValues for NaiveDateTime {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        value.as_timestamp().ok_or_else(|| mismatch("timestamp", &value))
    }
}

impl FromRowValues for JsonValue {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        match value {
            RowValues::JSON(json) => Ok(json),
            RowValues::Text(s) => serde_json::from_str(&s)
                .map_err(|e| SqlMapperError::ConversionError(format!("invalid json: {e}"))),
            other => Err(mismatch("json", &other)),
        }
    }
}

impl FromRowValues for Vec<u8> {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        match value {
            RowValues::Blob(bytes) => Ok(bytes),
            other => Err(mismatch("blob", &other)),
        }
    }
}

impl<T: FromRowValues> FromRowValues for Option<T> {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_row_values(value).map(Some)
        }
    }
}

/// Primary key value of a persisted record.
///
/// Autoincrement keys are integers; UUID keys are stored as hyphenated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Id {
    Int(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(i) => write!(f, "{i}"),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Int(value)
    }
}

impl From<i32> for Id {
    fn from(value: i32) -> Self {
        Id::Int(i64::from(value))
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Text(value.to_owned())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id::Text(value)
    }
}

impl From<Uuid> for Id {
    fn from(value: Uuid) -> Self {
        Id::Text(value.hyphenated().to_string())
    }
}

impl FromRowValues for Id {
    fn from_row_values(value: RowValues) -> Result<Self, SqlMapperError> {
        match value {
            RowValues::Int(i) => Ok(Id::Int(i)),
            RowValues::Text(s) => Ok(Id::Text(s)),
            other => Err(mismatch("integer or text id", &other)),
        }
    }
}
