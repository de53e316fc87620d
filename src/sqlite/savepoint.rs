use tracing::{debug, warn};

use crate::error::SqlMapperError;

use super::database::Database;

/// Guard for one level of a nested transaction.
///
/// Created by [`Database::savepoint`]. Call [`release`](Savepoint::release) to keep the work
/// or [`rollback`](Savepoint::rollback) to discard it. Dropping an unfinished guard rolls back,
/// so an early return or a panic never leaves the savepoint open.
///
/// Finishing a savepoint also finishes every savepoint opened inside it, as `SQLite` does;
/// guards for those inner savepoints become inert.
#[must_use = "dropping a savepoint guard rolls back its work"]
pub struct Savepoint<'db> {
    db: &'db Database,
    name: String,
    serial: u64,
    depth: usize,
    finished: bool,
}

impl<'db> Savepoint<'db> {
    pub(crate) fn begin(db: &'db Database) -> Result<Self, SqlMapperError> {
        let depth = db.open_transactions();
        let name = format!("{}_{}_{}", db.options().savepoint_prefix, db.handle(), depth);
        db.connection().execute_batch(&format!("SAVEPOINT {name}"))?;
        let serial = db.push_savepoint();
        debug!(savepoint = %name, depth, "savepoint opened");
        Ok(Self {
            db,
            name,
            serial,
            depth,
            finished: false,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth of this savepoint; the outermost one is 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Keep the work done since the savepoint was opened.
    ///
    /// Releasing the outermost savepoint commits. If the release itself fails (for example a
    /// deferred foreign key check), the work is rolled back and the release error returned.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if an enclosing savepoint already finished this one, or the
    /// engine refuses the release.
    pub fn release(mut self) -> Result<(), SqlMapperError> {
        self.finished = true;
        self.ensure_open()?;
        let released = self
            .db
            .connection()
            .execute_batch(&format!("RELEASE SAVEPOINT {}", self.name));
        let result = match released {
            Ok(()) => {
                debug!(savepoint = %self.name, "savepoint released");
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = self.undo() {
                    warn!(savepoint = %self.name, error = %rollback_err, "rollback after failed release also failed");
                }
                Err(err.into())
            }
        };
        self.db.truncate_savepoints(self.depth);
        result
    }

    /// Discard the work done since the savepoint was opened.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if an enclosing savepoint already finished this one, or the
    /// engine fails to roll back.
    pub fn rollback(mut self) -> Result<(), SqlMapperError> {
        self.finished = true;
        self.ensure_open()?;
        let result = self.undo();
        self.db.truncate_savepoints(self.depth);
        result
    }

    fn ensure_open(&self) -> Result<(), SqlMapperError> {
        if self.db.savepoint_is_open(self.serial) {
            Ok(())
        } else {
            Err(SqlMapperError::ExecutionError(format!(
                "savepoint {} was already finished by an enclosing savepoint",
                self.name
            )))
        }
    }

    // ROLLBACK TO keeps the savepoint on the stack; release it so the enclosing scope sees
    // exactly its pre-entry state and the depth numbering stays in step.
    fn undo(&self) -> Result<(), SqlMapperError> {
        self.db.connection().execute_batch(&format!(
            "ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}",
            name = self.name
        ))?;
        debug!(savepoint = %self.name, "savepoint rolled back");
        Ok(())
    }
}

impl Drop for Savepoint<'_> {
    fn drop(&mut self) {
        if self.finished || !self.db.savepoint_is_open(self.serial) {
            return;
        }
        if let Err(err) = self.undo() {
            warn!(savepoint = %self.name, error = %err, "rollback of abandoned savepoint failed");
        }
        self.db.truncate_savepoints(self.depth);
    }
}
