use rusqlite::types::Value;

use crate::error::SqlMapperError;
use crate::types::RowValues;

use super::params::sqlite_value_to_row_value;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `SqlMapperError` if the value cannot be read from the row.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, SqlMapperError> {
    let value: Value = row.get(idx)?;
    Ok(sqlite_value_to_row_value(value))
}

/// Extract every column of a `SQLite` row, in column order.
///
/// # Errors
///
/// Returns `SqlMapperError` if any value cannot be read from the row.
pub fn extract_row(row: &rusqlite::Row, column_count: usize) -> Result<Vec<RowValues>, SqlMapperError> {
    let mut row_values = Vec::with_capacity(column_count);
    for i in 0..column_count {
        row_values.push(sqlite_extract_value_sync(row, i)?);
    }
    Ok(row_values)
}
