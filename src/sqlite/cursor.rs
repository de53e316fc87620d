use std::sync::Arc;

use rusqlite::{Connection, Statement, params_from_iter};
use tracing::debug;

use crate::error::SqlMapperError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::extract_row;

/// A prepared statement with its parameters bound, scoped to one use.
///
/// The statement is finalized when the cursor is dropped, whether its rows were read to the
/// end, abandoned part way, or never read because an error propagated first. Rows can be
/// streamed once; the cursor is not restartable.
pub struct Cursor<'db> {
    stmt: Statement<'db>,
    params: Params,
    column_names: Arc<Vec<String>>,
    consumed: bool,
}

impl<'db> Cursor<'db> {
    pub(crate) fn open(
        conn: &'db Connection,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Self, SqlMapperError> {
        let params = Params::convert(params)?;
        debug!(sql, params = params.len(), "sqlite cursor");
        let stmt = conn.prepare(sql)?;
        let expected = stmt.parameter_count();
        if expected != params.len() {
            return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected).into());
        }
        let column_names = Arc::new(
            stmt.column_names()
                .iter()
                .map(std::string::ToString::to_string)
                .collect(),
        );
        Ok(Self {
            stmt,
            params,
            column_names,
            consumed: false,
        })
    }

    /// Column names of the result, in result order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Start executing and stream the result rows.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::ExecutionError` if the cursor was already consumed, or the
    /// engine's error if execution fails.
    pub fn rows(&mut self) -> Result<CursorRows<'_>, SqlMapperError> {
        if self.consumed {
            return Err(SqlMapperError::ExecutionError(
                "cursor already consumed; filter results are single pass".into(),
            ));
        }
        self.consumed = true;
        let column_count = self.column_names.len();
        let rows = self
            .stmt
            .query(params_from_iter(self.params.as_values().iter()))?;
        Ok(CursorRows {
            rows,
            column_names: Arc::clone(&self.column_names),
            column_count,
        })
    }

    /// Run the statement to completion and return the number of changed rows.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::IntegrityError` on a constraint violation, or the engine's
    /// error for any other failure.
    pub fn execute(mut self) -> Result<usize, SqlMapperError> {
        if self.consumed {
            return Err(SqlMapperError::ExecutionError(
                "cursor already consumed".into(),
            ));
        }
        self.consumed = true;
        let changed = self
            .stmt
            .execute(params_from_iter(self.params.as_values().iter()))?;
        Ok(changed)
    }

    /// Buffer every remaining row into a [`ResultSet`].
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if execution or value extraction fails.
    pub fn fetch_all(mut self) -> Result<ResultSet, SqlMapperError> {
        let mut result_set = ResultSet::new(Arc::clone(&self.column_names));
        for row in self.rows()? {
            result_set.add_row_values(row?);
        }
        Ok(result_set)
    }
}

/// Forward-only stream of rows from a [`Cursor`].
pub struct CursorRows<'c> {
    rows: rusqlite::Rows<'c>,
    column_names: Arc<Vec<String>>,
    column_count: usize,
}

impl CursorRows<'_> {
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
}

impl Iterator for CursorRows<'_> {
    type Item = Result<Vec<RowValues>, SqlMapperError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next() {
            Ok(Some(row)) => Some(extract_row(row, self.column_count)),
            Ok(None) => None,
            Err(err) => Some(Err(err.into())),
        }
    }
}
