//! Convenient imports for common functionality.
//!
//! ```rust
//! use sqlite_mapper::prelude::*;
//! ```

pub use crate::error::SqlMapperError;
pub use crate::field::{Field, FieldSet};
pub use crate::mapper;
pub use crate::primary_key::{PrimaryKey, UuidVersion};
pub use crate::registry::{ClassMeta, Registry};
pub use crate::sqlite::{Database, DatabaseOptions, DbLocation, Savepoint};
pub use crate::storable::Storable;
pub use crate::storable;
pub use crate::types::{FromRowValues, Id, RowValues};
