//! Object mapper for `SQLite`.
//!
//! Maps a record type to a table and each record to one row. Relations between records are
//! intentionally not modelled; foreign keys and other constraints live in the database.
//! Queries are plain SQL predicates passed through to `SQLite`.
//!
//! ```rust
//! use sqlite_mapper::prelude::*;
//!
//! storable! {
//!     #[derive(Debug)]
//!     pub struct Person: Autoincrement {
//!         pub name: String => "TEXT NOT NULL",
//!     }
//! }
//!
//! # fn main() -> Result<(), SqlMapperError> {
//! let mut registry = Registry::new()?;
//! registry.register::<Person>()?;
//! mapper::create_table::<Person>(&registry)?;
//!
//! let mut ada = Person::make(|p| p.name = Some("Ada".into()));
//! registry.transaction(|| mapper::save(&registry, &mut ada))?;
//!
//! let id = ada.id.clone().expect("assigned on insert");
//! let loaded: Person = mapper::get(&registry, id)?;
//! assert_eq!(loaded.name.as_deref(), Some("Ada"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod field;
mod macros;
pub mod mapper;
pub mod prelude;
pub mod primary_key;
pub mod registry;
pub mod results;
pub mod sqlite;
pub mod storable;
pub mod types;

pub use error::SqlMapperError;
pub use field::{Field, FieldSet};
pub use primary_key::{PK_FIELD, PrimaryKey, UuidVersion};
pub use registry::{ClassConfig, ClassMeta, DEFAULT_DATABASE, Registry};
pub use results::{CustomDbRow, ResultSet};
pub use sqlite::{Cursor, Database, DatabaseOptions, DatabaseOptionsBuilder, DbLocation, Savepoint};
pub use storable::Storable;
pub use types::{FromRowValues, Id, RowValues};
