use crate::error::SqlMapperError;
use crate::field::FieldSet;
use crate::primary_key::PrimaryKey;
use crate::types::{Id, RowValues};

/// A record type that maps to rows of one table.
///
/// Fields are declared statically. `Default` is the factory: it must produce a record whose
/// `id` is `None` and whose declared fields are unset, although a hand-written `Default` may
/// pre-populate fields it wants to start with. Most types implement this trait through
/// [`storable!`](crate::storable); composing the fields of other storable types is done by
/// hand with [`FieldSet::extend_from`].
pub trait Storable: Default + 'static {
    /// Id-generation policy; also supplies the declaration of the `id` column.
    const PRIMARY_KEY: PrimaryKey;

    /// Declare every mapped field except `id`.
    fn declare_fields(fields: &mut FieldSet);

    fn id(&self) -> Option<&Id>;

    fn id_mut(&mut self) -> &mut Option<Id>;

    /// Current value of a declared non-key field, or `None` if `field` is not declared.
    fn field_value(&self, field: &str) -> Option<RowValues>;

    /// Assign a value read from the database to a declared non-key field.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::UnknownField` if `field` is not declared, or
    /// `SqlMapperError::ConversionError` if the value does not fit the field's type.
    fn set_field_value(&mut self, field: &str, value: RowValues) -> Result<(), SqlMapperError>;

    /// Name used for the default table name and in error messages.
    #[must_use]
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// All mapped fields, `id` first, in declaration order.
    #[must_use]
    fn fields() -> FieldSet {
        let mut fields = FieldSet::new();
        fields.add(Self::PRIMARY_KEY.field());
        Self::declare_fields(&mut fields);
        fields
    }

    /// Build a zero-valued record and let `init` populate it.
    #[must_use]
    fn make(init: impl FnOnce(&mut Self)) -> Self {
        let mut record = Self::default();
        init(&mut record);
        record
    }

    fn set_id(&mut self, id: Option<Id>) {
        *self.id_mut() = id;
    }
}
