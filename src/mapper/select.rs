use std::marker::PhantomData;

use tracing::debug;

use crate::error::SqlMapperError;
use crate::primary_key::PK_FIELD;
use crate::registry::{ClassMeta, Registry};
use crate::sqlite::{Cursor, CursorRows};
use crate::storable::Storable;
use crate::types::{FromRowValues, Id, RowValues};

use super::sql::select_sql;

/// Lazily materialized result of [`filter`] or [`get_all`].
///
/// Holds its statement open until dropped. Rows are produced on demand and can be walked
/// only once.
pub struct Query<'r, T> {
    cursor: Cursor<'r>,
    meta: &'r ClassMeta,
    _record: PhantomData<fn() -> T>,
}

impl<'r, T: Storable> Query<'r, T> {
    /// Stream the matching records.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::ExecutionError` if the query was already iterated, or the
    /// engine's error if execution fails.
    pub fn iter(&mut self) -> Result<QueryIter<'_, T>, SqlMapperError> {
        let meta = self.meta;
        let rows = self.cursor.rows()?;
        Ok(QueryIter {
            rows,
            meta,
            _record: PhantomData,
        })
    }

    /// The first matching record, if any; the rest are never read.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if execution or materialization fails.
    pub fn first(mut self) -> Result<Option<T>, SqlMapperError> {
        let next = self.iter()?.next();
        next.transpose()
    }

    /// Materialize every matching record.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if execution or materialization of any row fails.
    pub fn all(mut self) -> Result<Vec<T>, SqlMapperError> {
        let records: Result<Vec<T>, SqlMapperError> = self.iter()?.collect();
        records
    }
}

/// Iterator over the records of a [`Query`].
pub struct QueryIter<'c, T> {
    rows: CursorRows<'c>,
    meta: &'c ClassMeta,
    _record: PhantomData<fn() -> T>,
}

impl<T: Storable> Iterator for QueryIter<'_, T> {
    type Item = Result<T, SqlMapperError>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.rows.next()?;
        Some(values.and_then(|values| read_row(self.meta, self.rows.column_names(), values)))
    }
}

/// Build a fresh record from one result row.
///
/// Every column must be a declared field of `T`; anything else means the table and the
/// metadata disagree.
///
/// # Errors
///
/// Returns `SqlMapperError::SchemaMismatch` for an undeclared column, or
/// `SqlMapperError::ConversionError` if a value does not fit its field.
pub fn read_row<T: Storable>(
    meta: &ClassMeta,
    column_names: &[String],
    values: Vec<RowValues>,
) -> Result<T, SqlMapperError> {
    let mut record = T::default();
    for (column, value) in column_names.iter().zip(values) {
        check_column(meta, column)?;
        if column == PK_FIELD {
            record.set_id(Option::<Id>::from_row_values(value)?);
        } else {
            record.set_field_value(column, value)?;
        }
    }
    Ok(record)
}

fn check_column(meta: &ClassMeta, column: &str) -> Result<(), SqlMapperError> {
    if meta.has_field(column) {
        Ok(())
    } else {
        Err(SqlMapperError::SchemaMismatch {
            table: meta.table_name().to_string(),
            column: column.to_string(),
        })
    }
}

/// Records of `T` matching a literal SQL boolean expression.
///
/// `predicate` is passed to `SQLite` untouched and may use `?` placeholders bound from
/// `params` in order.
///
/// # Errors
///
/// Returns `SqlMapperError` if `T` is not registered, the statement cannot be prepared, or the
/// table has columns `T` does not declare.
pub fn filter<'r, T: Storable>(
    registry: &'r Registry,
    predicate: &str,
    params: &[RowValues],
) -> Result<Query<'r, T>, SqlMapperError> {
    let (meta, database) = registry.resolve::<T>()?;
    let cursor = database.cursor(&select_sql(meta, predicate), params)?;
    for column in cursor.column_names() {
        check_column(meta, column)?;
    }
    Ok(Query {
        cursor,
        meta,
        _record: PhantomData,
    })
}

/// Every record of `T`.
///
/// # Errors
///
/// See [`filter`].
pub fn get_all<T: Storable>(registry: &Registry) -> Result<Query<'_, T>, SqlMapperError> {
    // SQLite has no boolean literal; 1 is true.
    filter(registry, "1", &[])
}

/// The record of `T` with the given id.
///
/// # Errors
///
/// Returns `SqlMapperError::NotFound` if no row has that id, or any error of [`filter`].
pub fn get<T: Storable>(registry: &Registry, id: impl Into<Id>) -> Result<T, SqlMapperError> {
    let id = id.into();
    let found = filter::<T>(registry, &format!("{PK_FIELD} = ?"), &[RowValues::from(id.clone())])?
        .first()?;
    match found {
        Some(record) => Ok(record),
        None => {
            let table = registry.meta::<T>()?.table_name().to_string();
            debug!(%table, %id, "get found no row");
            Err(SqlMapperError::NotFound { table, id })
        }
    }
}
