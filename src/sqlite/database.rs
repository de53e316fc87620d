use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::SqlMapperError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::config::{DatabaseOptions, DbLocation};
use super::cursor::Cursor;
use super::savepoint::Savepoint;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Owns one `SQLite` connection and the nested-transaction state on top of it.
///
/// The driver never begins transactions on its own: outside of a savepoint every statement
/// commits as soon as it finishes, and every transaction boundary comes from
/// [`savepoint`](Database::savepoint) / [`transaction`](Database::transaction).
///
/// ```rust
/// use sqlite_mapper::prelude::*;
///
/// # fn main() -> Result<(), SqlMapperError> {
/// let db = Database::open_in_memory()?;
/// db.execute_batch("CREATE TABLE t(id INTEGER PRIMARY KEY, v)")?;
/// db.transaction(|| db.execute("INSERT INTO t(v) VALUES (?)", &[RowValues::Int(7)]))?;
/// assert_eq!(db.select("SELECT v FROM t", &[])?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Database {
    connection: Connection,
    options: DatabaseOptions,
    handle: u64,
    open_savepoints: RefCell<Vec<u64>>,
    next_serial: Cell<u64>,
}

impl Database {
    /// Open a database at `location` (`":memory:"` or a file path) with default options.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the connection cannot be opened or configured.
    pub fn open(location: impl Into<DbLocation>) -> Result<Self, SqlMapperError> {
        Self::with_options(DatabaseOptions::new(location))
    }

    /// Open a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the connection cannot be opened or configured.
    pub fn open_in_memory() -> Result<Self, SqlMapperError> {
        Self::open(DbLocation::Memory)
    }

    /// Open a database with explicit options.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the options are invalid or the connection cannot be opened.
    pub fn with_options(options: DatabaseOptions) -> Result<Self, SqlMapperError> {
        options.validate()?;
        let connection = open_connection(&options)?;
        Ok(Self {
            connection,
            options,
            handle: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
            open_savepoints: RefCell::new(Vec::new()),
            next_serial: Cell::new(0),
        })
    }

    /// Re-open this handle on another location, replacing the current connection.
    ///
    /// Requires exclusive access, so no cursor or savepoint can survive it; the nesting
    /// counter starts again at zero.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the new connection cannot be opened; the old one stays in use.
    pub fn connect(&mut self, location: impl Into<DbLocation>) -> Result<(), SqlMapperError> {
        let mut options = self.options.clone();
        options.location = location.into();
        let connection = open_connection(&options)?;
        let open = self.open_savepoints.get_mut().len();
        if open > 0 {
            warn!(handle = self.handle, open, "reconnect discards open savepoints");
        }
        self.connection = connection;
        self.options = options;
        self.open_savepoints.get_mut().clear();
        Ok(())
    }

    #[must_use]
    pub fn location(&self) -> &DbLocation {
        &self.options.location
    }

    #[must_use]
    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Process-unique number of this handle; scopes its savepoint names.
    #[must_use]
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// The underlying connection, for work the mapper does not cover.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Number of savepoints currently open on this handle.
    #[must_use]
    pub fn open_transactions(&self) -> usize {
        self.open_savepoints.borrow().len()
    }

    /// Whether foreign key constraints are currently enforced.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the pragma cannot be read.
    pub fn pragma_foreign_keys(&self) -> Result<bool, SqlMapperError> {
        Ok(self
            .connection
            .pragma_query_value(None, "foreign_keys", |row| row.get::<_, bool>(0))?)
    }

    /// # Errors
    ///
    /// Returns `SqlMapperError` if the pragma cannot be set.
    pub fn enable_foreign_keys(&self) -> Result<(), SqlMapperError> {
        set_foreign_keys(&self.connection, true)
    }

    /// # Errors
    ///
    /// Returns `SqlMapperError` if the pragma cannot be set.
    pub fn disable_foreign_keys(&self) -> Result<(), SqlMapperError> {
        set_foreign_keys(&self.connection, false)
    }

    /// Prepare `sql` and bind `params`, returning a cursor scoped to the caller.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the statement cannot be prepared or the parameters do not
    /// match its placeholders. The statement is finalized before the error is returned.
    pub fn cursor(&self, sql: &str, params: &[RowValues]) -> Result<Cursor<'_>, SqlMapperError> {
        Cursor::open(&self.connection, sql, params)
    }

    /// Execute a statement whose result is not needed; returns the changed row count.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::IntegrityError` on a constraint violation, or the engine's error
    /// for any other failure.
    pub fn execute(&self, sql: &str, params: &[RowValues]) -> Result<usize, SqlMapperError> {
        self.cursor(sql, params)?.execute()
    }

    /// Execute a query and buffer its rows.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if preparation, execution or value extraction fails.
    pub fn select(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, SqlMapperError> {
        self.cursor(sql, params)?.fetch_all()
    }

    /// Execute a script of `;`-separated statements without parameters.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlMapperError> {
        debug!(sql, "sqlite batch");
        Ok(self.connection.execute_batch(sql)?)
    }

    /// Rowid assigned by the most recent successful INSERT on this connection.
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        self.connection.last_insert_rowid()
    }

    /// Open a nested transaction level and return its guard.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the engine refuses the `SAVEPOINT` statement.
    pub fn savepoint(&self) -> Result<Savepoint<'_>, SqlMapperError> {
        Savepoint::begin(self)
    }

    /// Run `body` inside a nested transaction.
    ///
    /// `Ok` releases the savepoint (committing when it is the outermost one). `Err` rolls back
    /// everything written since entry, including work of inner transactions that already
    /// completed, and returns the error unchanged. A panic inside `body` rolls back as well.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `body`, or a `SqlMapperError` (converted into `E`) if the
    /// savepoint cannot be opened or released.
    pub fn transaction<R, E, F>(&self, body: F) -> Result<R, E>
    where
        F: FnOnce() -> Result<R, E>,
        E: From<SqlMapperError>,
    {
        let savepoint = self.savepoint()?;
        match body() {
            Ok(value) => {
                savepoint.release()?;
                Ok(value)
            }
            Err(err) => {
                let name = savepoint.name().to_owned();
                if let Err(rollback_err) = savepoint.rollback() {
                    warn!(savepoint = %name, error = %rollback_err, "rollback failed; returning original error");
                }
                Err(err)
            }
        }
    }

    pub(crate) fn push_savepoint(&self) -> u64 {
        let serial = self.next_serial.get();
        self.next_serial.set(serial + 1);
        self.open_savepoints.borrow_mut().push(serial);
        serial
    }

    pub(crate) fn savepoint_is_open(&self, serial: u64) -> bool {
        self.open_savepoints.borrow().contains(&serial)
    }

    pub(crate) fn truncate_savepoints(&self, depth: usize) {
        self.open_savepoints.borrow_mut().truncate(depth);
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("handle", &self.handle)
            .field("location", &self.options.location)
            .field("open_transactions", &self.open_transactions())
            .finish()
    }
}

fn open_connection(options: &DatabaseOptions) -> Result<Connection, SqlMapperError> {
    let connection = match &options.location {
        DbLocation::Memory => Connection::open_in_memory()?,
        DbLocation::File(path) => Connection::open(path)?,
    };
    set_foreign_keys(&connection, options.foreign_keys)?;
    if options.wal && !options.location.is_memory() {
        let mode: String = connection.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get(0)
        })?;
        debug!(journal_mode = %mode, "journal mode set");
    }
    debug!(location = %options.location, foreign_keys = options.foreign_keys, "sqlite connection opened");
    Ok(connection)
}

fn set_foreign_keys(connection: &Connection, enabled: bool) -> Result<(), SqlMapperError> {
    connection.pragma_update(None, "foreign_keys", enabled)?;
    Ok(())
}
