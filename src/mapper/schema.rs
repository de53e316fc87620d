use tracing::debug;

use crate::error::SqlMapperError;
use crate::registry::Registry;
use crate::storable::Storable;
use crate::types::RowValues;

use super::sql::{TABLE_EXISTS_SQL, create_table_sql};

/// Whether the table `T` is mapped to exists in its database.
///
/// # Errors
///
/// Returns `SqlMapperError` if `T` is not registered or the catalog query fails.
pub fn table_exists<T: Storable>(registry: &Registry) -> Result<bool, SqlMapperError> {
    let (meta, database) = registry.resolve::<T>()?;
    let mut cursor = database.cursor(
        TABLE_EXISTS_SQL,
        &[RowValues::Text(meta.table_name().to_string())],
    )?;
    let exists = cursor.rows()?.next().transpose()?.is_some();
    Ok(exists)
}

/// Create the table for `T` from its field declarations and table constraints.
///
/// # Errors
///
/// Returns `SqlMapperError` if `T` is not registered or the engine rejects the statement (for
/// example because the table already exists).
pub fn create_table<T: Storable>(registry: &Registry) -> Result<(), SqlMapperError> {
    let (meta, database) = registry.resolve::<T>()?;
    let sql = create_table_sql(meta);
    database.execute_batch(&sql)?;
    debug!(table = meta.table_name(), "table created");
    Ok(())
}
