//! SQL text generated from class metadata. Columns always follow the canonical
//! (alphabetical) field order of [`ClassMeta::fields`].

use crate::primary_key::PK_FIELD;
use crate::registry::ClassMeta;

pub(crate) fn select_sql(meta: &ClassMeta, predicate: &str) -> String {
    format!("SELECT * FROM {} WHERE {predicate}", meta.table_name())
}

pub(crate) fn insert_sql(meta: &ClassMeta) -> String {
    let columns: Vec<&str> = meta.fields().iter().map(|f| f.name()).collect();
    let placeholders = vec!["?"; columns.len()];
    format!(
        "INSERT INTO {}({}) VALUES ({})",
        meta.table_name(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `None` when the type has nothing besides its key to update.
pub(crate) fn update_sql(meta: &ClassMeta) -> Option<String> {
    let assignments: Vec<String> = meta
        .non_key_fields()
        .map(|f| format!("{} = ?", f.name()))
        .collect();
    if assignments.is_empty() {
        return None;
    }
    Some(format!(
        "UPDATE {} SET {} WHERE {PK_FIELD} = ?",
        meta.table_name(),
        assignments.join(", ")
    ))
}

pub(crate) fn delete_sql(meta: &ClassMeta) -> String {
    format!("DELETE FROM {} WHERE {PK_FIELD} = ?", meta.table_name())
}

/// The key of the row just inserted, looked up by rowid.
pub(crate) fn stored_id_sql(meta: &ClassMeta) -> String {
    format!("SELECT {PK_FIELD} FROM {} WHERE rowid = ?", meta.table_name())
}

pub(crate) const TABLE_EXISTS_SQL: &str =
    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?";

pub(crate) fn create_table_sql(meta: &ClassMeta) -> String {
    let definitions: Vec<String> = meta
        .fields()
        .iter()
        .map(crate::field::Field::column_definition)
        .chain(meta.constraints().iter().cloned())
        .collect();
    format!(
        "CREATE TABLE {}(\n    {}\n)",
        meta.table_name(),
        definitions.join(",\n    ")
    )
}
