use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row from a raw query result, with access by column name or index.
///
/// ```
/// use sqlite_mapper::{Database, RowValues};
///
/// # fn main() -> Result<(), sqlite_mapper::SqlMapperError> {
/// let db = Database::open_in_memory()?;
/// let result = db.select("SELECT 7 AS n, 'seven' AS word", &[])?;
/// let row = &result.results[0];
/// assert_eq!(row.get("word"), Some(&RowValues::Text("seven".into())));
/// assert_eq!(row.get_column_index("n"), Some(0));
/// assert_eq!(row.get_by_index(0), Some(&RowValues::Int(7)));
/// assert_eq!(row.get("missing"), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    column_index: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }
}

/// Fully buffered result of a raw query.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>) -> ResultSet {
        let column_index = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        ResultSet {
            results: Vec::new(),
            column_names,
            column_index,
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Add a row to the result set; values must follow the column order.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        self.results.push(CustomDbRow {
            column_names: Arc::clone(&self.column_names),
            rows: row_values,
            column_index: Arc::clone(&self.column_index),
        });
    }
}
