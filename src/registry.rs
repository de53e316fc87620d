use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use crate::error::SqlMapperError;
use crate::field::Field;
use crate::primary_key::{PK_FIELD, PrimaryKey};
use crate::sqlite::Database;
use crate::storable::Storable;

/// Name under which the registry keeps its default database.
pub const DEFAULT_DATABASE: &str = "default";

/// Persistence configuration of one storable type.
#[derive(Debug, Clone)]
pub struct ClassMeta {
    type_name: &'static str,
    fields: Vec<Field>,
    primary_key: PrimaryKey,
    database: String,
    table_name: String,
    constraints: Vec<String>,
}

impl ClassMeta {
    fn for_type<T: Storable>() -> Result<Self, SqlMapperError> {
        let type_name = T::type_name();
        let mut fields: Vec<Field> = T::fields().into_iter().collect();
        let id_fields = fields.iter().filter(|f| f.name() == PK_FIELD).count();
        let pk_declared = fields
            .iter()
            .find(|f| f.name() == PK_FIELD)
            .is_some_and(|f| f.sql_declaration() == T::PRIMARY_KEY.sql_declaration());
        if id_fields != 1 || !pk_declared {
            return Err(SqlMapperError::ConfigError(format!(
                "{type_name} must declare exactly one `{PK_FIELD}` field from its primary key"
            )));
        }
        fields.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(Self {
            type_name,
            fields,
            primary_key: T::PRIMARY_KEY,
            database: DEFAULT_DATABASE.to_string(),
            table_name: format!("{}s", type_name.to_lowercase()),
            constraints: Vec::new(),
        })
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All fields, `id` included, sorted by name. This is the column order of generated SQL.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    /// Fields other than `id`, in canonical order.
    pub fn non_key_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.name() != PK_FIELD)
    }

    #[must_use]
    pub fn primary_key(&self) -> PrimaryKey {
        self.primary_key
    }

    /// Name of the registry database this type is bound to.
    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Raw table constraints, in the order they were added.
    #[must_use]
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }
}

/// Metadata of every storable type plus the databases they are bound to.
///
/// Built once at startup and passed by reference to the [`mapper`](crate::mapper)
/// functions. A fresh registry owns an in-memory default database; more databases can be
/// added by name and types rebound to them.
///
/// ```rust
/// use sqlite_mapper::prelude::*;
///
/// storable! {
///     pub struct Item: Autoincrement { pub label: String }
/// }
///
/// # fn main() -> Result<(), SqlMapperError> {
/// let mut registry = Registry::new()?;
/// registry
///     .register::<Item>()?
///     .table_name("inventory")
///     .constraint("UNIQUE(label)");
/// assert_eq!(registry.meta::<Item>()?.table_name(), "inventory");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Registry {
    default_database: Database,
    databases: HashMap<String, Database>,
    classes: HashMap<TypeId, ClassMeta>,
}

impl Registry {
    /// Registry whose default database is a fresh in-memory one.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if the in-memory database cannot be opened.
    pub fn new() -> Result<Self, SqlMapperError> {
        Ok(Self::with_default_database(Database::open_in_memory()?))
    }

    #[must_use]
    pub fn with_default_database(database: Database) -> Self {
        Self {
            default_database: database,
            databases: HashMap::new(),
            classes: HashMap::new(),
        }
    }

    /// Add (or replace) a named database. Returns the database previously under that name.
    pub fn add_database(&mut self, name: impl Into<String>, database: Database) -> Option<Database> {
        let name = name.into();
        if name == DEFAULT_DATABASE {
            return Some(std::mem::replace(&mut self.default_database, database));
        }
        self.databases.insert(name, database)
    }

    /// # Errors
    ///
    /// Returns `SqlMapperError::ConfigError` if no database has that name.
    pub fn database(&self, name: &str) -> Result<&Database, SqlMapperError> {
        if name == DEFAULT_DATABASE {
            return Ok(&self.default_database);
        }
        self.databases.get(name).ok_or_else(|| unknown_database(name))
    }

    /// # Errors
    ///
    /// Returns `SqlMapperError::ConfigError` if no database has that name.
    pub fn database_mut(&mut self, name: &str) -> Result<&mut Database, SqlMapperError> {
        if name == DEFAULT_DATABASE {
            return Ok(&mut self.default_database);
        }
        self.databases.get_mut(name).ok_or_else(|| unknown_database(name))
    }

    #[must_use]
    pub fn default_database(&self) -> &Database {
        &self.default_database
    }

    pub fn default_database_mut(&mut self) -> &mut Database {
        &mut self.default_database
    }

    /// Enroll `T`, bound to the default database under its default table name.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::AlreadyRegistered` if `T` was registered before, or
    /// `SqlMapperError::ConfigError` if its fields do not include exactly one primary key.
    pub fn register<T: Storable>(&mut self) -> Result<ClassConfig<'_>, SqlMapperError> {
        let type_id = TypeId::of::<T>();
        if self.classes.contains_key(&type_id) {
            return Err(SqlMapperError::AlreadyRegistered(T::type_name()));
        }
        let meta = ClassMeta::for_type::<T>()?;
        debug!(
            type_name = meta.type_name,
            table = %meta.table_name,
            fields = meta.fields.len(),
            "storable registered"
        );
        let meta = self.classes.entry(type_id).or_insert(meta);
        Ok(ClassConfig {
            meta,
            databases: &self.databases,
        })
    }

    /// Configuration handle for an already registered type.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::NotRegistered` if `T` is unknown.
    pub fn configure<T: Storable>(&mut self) -> Result<ClassConfig<'_>, SqlMapperError> {
        let Some(meta) = self.classes.get_mut(&TypeId::of::<T>()) else {
            return Err(SqlMapperError::NotRegistered(T::type_name()));
        };
        Ok(ClassConfig {
            meta,
            databases: &self.databases,
        })
    }

    /// Bind `T` to the database registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if `T` is not registered or `name` is unknown.
    pub fn set_database<T: Storable>(&mut self, name: &str) -> Result<(), SqlMapperError> {
        self.configure::<T>()?.database(name).map(|_| ())
    }

    /// # Errors
    ///
    /// Returns `SqlMapperError::NotRegistered` if `T` is unknown.
    pub fn set_table_name<T: Storable>(&mut self, name: &str) -> Result<(), SqlMapperError> {
        self.configure::<T>()?.table_name(name);
        Ok(())
    }

    /// Append a table constraint used by [`create_table`](crate::mapper::create_table).
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::NotRegistered` if `T` is unknown.
    pub fn add_constraint<T: Storable>(&mut self, constraint: &str) -> Result<(), SqlMapperError> {
        self.configure::<T>()?.constraint(constraint);
        Ok(())
    }

    #[must_use]
    pub fn is_registered<T: Storable>(&self) -> bool {
        self.classes.contains_key(&TypeId::of::<T>())
    }

    /// # Errors
    ///
    /// Returns `SqlMapperError::NotRegistered` if `T` is unknown.
    pub fn meta<T: Storable>(&self) -> Result<&ClassMeta, SqlMapperError> {
        self.classes
            .get(&TypeId::of::<T>())
            .ok_or(SqlMapperError::NotRegistered(T::type_name()))
    }

    /// The database `T` is currently bound to.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError` if `T` is not registered.
    pub fn database_for<T: Storable>(&self) -> Result<&Database, SqlMapperError> {
        Ok(self.resolve::<T>()?.1)
    }

    /// Run `body` in a nested transaction on the default database.
    ///
    /// # Errors
    ///
    /// See [`Database::transaction`].
    pub fn transaction<R, E, F>(&self, body: F) -> Result<R, E>
    where
        F: FnOnce() -> Result<R, E>,
        E: From<SqlMapperError>,
    {
        self.default_database.transaction(body)
    }

    pub(crate) fn resolve<T: Storable>(&self) -> Result<(&ClassMeta, &Database), SqlMapperError> {
        let meta = self.meta::<T>()?;
        let database = self.database(&meta.database)?;
        Ok((meta, database))
    }
}

fn unknown_database(name: &str) -> SqlMapperError {
    SqlMapperError::ConfigError(format!("unknown database {name:?}"))
}

/// Chained configuration of one registered type. Last write wins for database and table
/// name; constraints accumulate.
#[derive(Debug)]
pub struct ClassConfig<'r> {
    meta: &'r mut ClassMeta,
    databases: &'r HashMap<String, Database>,
}

impl ClassConfig<'_> {
    /// Bind the type to the database registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::ConfigError` if no database has that name.
    pub fn database(self, name: &str) -> Result<Self, SqlMapperError> {
        if name != DEFAULT_DATABASE && !self.databases.contains_key(name) {
            return Err(unknown_database(name));
        }
        self.meta.database = name.to_string();
        Ok(self)
    }

    pub fn table_name(self, name: &str) -> Self {
        self.meta.table_name = name.to_string();
        self
    }

    pub fn constraint(self, constraint: &str) -> Self {
        self.meta.constraints.push(constraint.to_string());
        self
    }

    #[must_use]
    pub fn meta(&self) -> &ClassMeta {
        self.meta
    }
}
