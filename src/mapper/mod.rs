//! CRUD operations on storable records.
//!
//! Every function takes the [`Registry`](crate::Registry) holding the record type's metadata
//! and runs on the database that type is bound to.

mod dml;
mod schema;
mod select;
mod sql;

pub use dml::{create, delete, delete_but_keep_id, save, update};
pub use schema::{create_table, table_exists};
pub use select::{Query, QueryIter, filter, get, get_all, read_row};
