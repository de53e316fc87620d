use tracing::debug;

use crate::error::SqlMapperError;
use crate::primary_key::{PK_FIELD, PrimaryKey};
use crate::registry::{ClassMeta, Registry};
use crate::sqlite::Database;
use crate::storable::Storable;
use crate::types::{FromRowValues, Id, RowValues};

use super::sql::{delete_sql, insert_sql, stored_id_sql, update_sql};

/// Insert `record` if it has no id yet, otherwise update its row.
///
/// # Errors
///
/// See [`create`] and [`update`].
pub fn save<T: Storable>(registry: &Registry, record: &mut T) -> Result<(), SqlMapperError> {
    if record.id().is_none() {
        create(registry, record)
    } else {
        update(registry, record)
    }
}

/// Insert `record` as a new row.
///
/// A preset id is inserted as given. An unset id is generated first for UUID keys, or taken
/// from the engine's rowid after the insert for autoincrement keys. An `Assigned` key left
/// unset must be filled in by the table itself (an `INTEGER PRIMARY KEY` column); the stored
/// value is read back. If the insert fails the record's id is left as it was before the call.
///
/// # Errors
///
/// Returns `SqlMapperError::IntegrityError` if a constraint rejects the row,
/// `SqlMapperError::ConfigError` if an unset `Assigned` key was stored as NULL (the row is
/// not kept), or any other error from the engine or from reading the record's fields.
pub fn create<T: Storable>(registry: &Registry, record: &mut T) -> Result<(), SqlMapperError> {
    let (meta, database) = registry.resolve::<T>()?;
    let preset = record.id().cloned();
    meta.primary_key().generate_id(record.id_mut());

    let inserted = if meta.primary_key() == PrimaryKey::Assigned && preset.is_none() {
        database.transaction(|| insert_reading_back_id(meta, database, record))
    } else {
        insert(meta, database, record)
    };
    if let Err(err) = inserted {
        record.set_id(preset);
        return Err(err);
    }

    meta.primary_key()
        .save_generated_id(record.id_mut(), database.last_insert_rowid());
    debug!(table = meta.table_name(), id = ?record.id(), "record created");
    Ok(())
}

fn insert<T: Storable>(
    meta: &ClassMeta,
    database: &Database,
    record: &T,
) -> Result<(), SqlMapperError> {
    let values = record_values(meta, record)?;
    database.execute(&insert_sql(meta), &values)?;
    Ok(())
}

fn insert_reading_back_id<T: Storable>(
    meta: &ClassMeta,
    database: &Database,
    record: &mut T,
) -> Result<(), SqlMapperError> {
    insert(meta, database, record)?;
    let stored = database.select(
        &stored_id_sql(meta),
        &[RowValues::Int(database.last_insert_rowid())],
    )?;
    let value = stored
        .results
        .first()
        .and_then(|row| row.get(PK_FIELD))
        .cloned()
        .unwrap_or(RowValues::Null);
    match Option::<Id>::from_row_values(value)? {
        Some(id) => {
            record.set_id(Some(id));
            Ok(())
        }
        None => Err(SqlMapperError::ConfigError(format!(
            "table {} stored no {PK_FIELD} for a new {}; set the id before create or declare \
             the column INTEGER PRIMARY KEY",
            meta.table_name(),
            meta.type_name()
        ))),
    }
}

/// Rewrite every non-key field of the row with `record`'s id.
///
/// The statement is issued even if nothing changed. A type without non-key fields has
/// nothing to update.
///
/// # Errors
///
/// Returns `SqlMapperError::NotPersisted` if `record` has no id,
/// `SqlMapperError::IntegrityError` if a constraint rejects the new values, or any other
/// engine error.
pub fn update<T: Storable>(registry: &Registry, record: &T) -> Result<(), SqlMapperError> {
    let (meta, database) = registry.resolve::<T>()?;
    let id = persisted_id(meta, record)?;
    let Some(sql) = update_sql(meta) else {
        return Ok(());
    };

    let mut values = Vec::with_capacity(meta.fields().len());
    for field in meta.non_key_fields() {
        values.push(field_value(meta, record, field.name())?);
    }
    values.push(RowValues::from(id));

    let changed = database.execute(&sql, &values)?;
    debug!(table = meta.table_name(), id = ?record.id(), changed, "record updated");
    Ok(())
}

/// Delete `record`'s row and clear its id, so saving it again inserts a new row.
///
/// # Errors
///
/// See [`delete_but_keep_id`].
pub fn delete<T: Storable>(registry: &Registry, record: &mut T) -> Result<(), SqlMapperError> {
    delete_but_keep_id(registry, record)?;
    record.set_id(None);
    Ok(())
}

/// Delete `record`'s row, leaving the record untouched.
///
/// # Errors
///
/// Returns `SqlMapperError::NotPersisted` if `record` has no id,
/// `SqlMapperError::IntegrityError` if a foreign key still references the row, or any other
/// engine error.
pub fn delete_but_keep_id<T: Storable>(registry: &Registry, record: &T) -> Result<(), SqlMapperError> {
    let (meta, database) = registry.resolve::<T>()?;
    let id = persisted_id(meta, record)?;
    let changed = database.execute(&delete_sql(meta), &[RowValues::from(id)])?;
    debug!(table = meta.table_name(), id = ?record.id(), changed, "record deleted");
    Ok(())
}

fn persisted_id<T: Storable>(meta: &ClassMeta, record: &T) -> Result<Id, SqlMapperError> {
    record
        .id()
        .cloned()
        .ok_or(SqlMapperError::NotPersisted(meta.type_name()))
}

fn record_values<T: Storable>(meta: &ClassMeta, record: &T) -> Result<Vec<RowValues>, SqlMapperError> {
    meta.fields()
        .iter()
        .map(|field| field_value(meta, record, field.name()))
        .collect()
}

fn field_value<T: Storable>(
    meta: &ClassMeta,
    record: &T,
    name: &str,
) -> Result<RowValues, SqlMapperError> {
    if name == PK_FIELD {
        return Ok(RowValues::from(record.id().cloned()));
    }
    record
        .field_value(name)
        .ok_or_else(|| SqlMapperError::UnknownField {
            type_name: meta.type_name(),
            field: name.to_string(),
        })
}
