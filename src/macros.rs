/// Declare a storable struct.
///
/// Every declared field is stored as `Option<T>` and starts out `None`; a `pub id` field is
/// added. The primary key strategy follows the struct name: `Autoincrement`, `Assigned`,
/// `Uuid1` or `Uuid4`. A field may carry its SQL column declaration after `=>`. `Default` is
/// derived by the macro, so do not list it in the derives.
///
/// ```rust
/// use sqlite_mapper::prelude::*;
///
/// storable! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Note: Autoincrement {
///         pub title: String => "TEXT NOT NULL",
///         pub body: String,
///     }
/// }
///
/// let note = Note::make(|n| n.title = Some("hello".into()));
/// assert_eq!(note.id, None);
/// assert_eq!(note.body, None);
/// assert_eq!(Note::fields().len(), 3);
/// ```
#[macro_export]
macro_rules! storable {
    (@pk Autoincrement) => {
        $crate::PrimaryKey::Autoincrement
    };
    (@pk Assigned) => {
        $crate::PrimaryKey::Assigned
    };
    (@pk Uuid1) => {
        $crate::PrimaryKey::Uuid($crate::UuidVersion::V1)
    };
    (@pk Uuid4) => {
        $crate::PrimaryKey::Uuid($crate::UuidVersion::V4)
    };
    (@field $field:ident) => {
        $crate::Field::new(stringify!($field))
    };
    (@field $field:ident, $decl:literal) => {
        $crate::Field::declared(stringify!($field), $decl)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $pk:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> $decl:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            pub id: ::core::option::Option<$crate::Id>,
            $(
                $(#[$fmeta])*
                $fvis $field: ::core::option::Option<$ty>,
            )*
        }

        impl $crate::Storable for $name {
            const PRIMARY_KEY: $crate::PrimaryKey = $crate::storable!(@pk $pk);

            fn declare_fields(fields: &mut $crate::FieldSet) {
                $(
                    fields.add($crate::storable!(@field $field $(, $decl)?));
                )*
                let _ = fields;
            }

            fn id(&self) -> ::core::option::Option<&$crate::Id> {
                self.id.as_ref()
            }

            fn id_mut(&mut self) -> &mut ::core::option::Option<$crate::Id> {
                &mut self.id
            }

            fn field_value(&self, field: &str) -> ::core::option::Option<$crate::RowValues> {
                match field {
                    $(
                        stringify!($field) => ::core::option::Option::Some(
                            $crate::RowValues::from(::core::clone::Clone::clone(&self.$field)),
                        ),
                    )*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_field_value(
                &mut self,
                field: &str,
                value: $crate::RowValues,
            ) -> ::core::result::Result<(), $crate::SqlMapperError> {
                match field {
                    $(
                        stringify!($field) => {
                            self.$field = <::core::option::Option<$ty> as $crate::FromRowValues>::from_row_values(value)?;
                            ::core::result::Result::Ok(())
                        }
                    )*
                    _ => {
                        let _ = value;
                        ::core::result::Result::Err($crate::SqlMapperError::UnknownField {
                            type_name: stringify!($name),
                            field: field.to_owned(),
                        })
                    }
                }
            }

            fn type_name() -> &'static str {
                stringify!($name)
            }
        }
    };
}
