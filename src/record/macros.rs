//! Declarative descriptors for source rows and destination records

/// Declares a source row struct and implements `SourceRow` for it.
///
/// Mapped fields carry a `#[tag = "..."]` attribute; untagged fields are
/// listed in the descriptor but ignored by the schema builder.
///
/// ```
/// rowshape::source_row! {
///     #[derive(Debug, Clone)]
///     pub struct ClassUserRow {
///         #[tag = "id, pk"]
///         pub id: i64,
///         #[tag = "users__id, pk"]
///         pub user_id: i64,
///         #[tag = "users__name"]
///         pub user_name: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! source_row {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[tag = $tag:literal])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($fvis $field: $ty,)*
        }

        impl $crate::record::SourceRow for $name {
            fn fields() -> ::std::vec::Vec<$crate::record::SourceField> {
                ::std::vec![
                    $(
                        $crate::record::SourceField::new(
                            ::std::stringify!($field),
                            ::std::option::Option::<&'static str>::None
                                $(.or(::std::option::Option::Some($tag)))?,
                            $crate::record::ScalarType::of::<$ty>(),
                        ),
                    )*
                ]
            }

            #[allow(unused_mut, unused_assignments)]
            fn value(&self, index: usize) -> ::std::option::Option<$crate::record::Value> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return ::std::option::Option::Some(
                            <$ty as $crate::record::Scalar>::into_value(
                                ::std::clone::Clone::clone(&self.$field),
                            ),
                        );
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }
        }
    };
}

/// Declares a destination record struct and implements `Record` for it.
///
/// Scalar fields go in the struct body. Relations go in a trailing
/// `relations { .. }` block naming the element type; each becomes a
/// `Vec<Element>` field. `Default` is derived by the macro.
///
/// ```
/// rowshape::record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct User {
///         pub id: i64,
///         pub name: String,
///     }
/// }
///
/// rowshape::record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Class {
///         pub id: i64,
///     }
///     relations {
///         pub users: User,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($fvis:vis $field:ident : $ty:ty),* $(,)?
        }
        $(relations {
            $($rvis:vis $rel:ident : $child:ty),* $(,)?
        })?
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $($fvis $field: $ty,)*
            $($($rvis $rel: ::std::vec::Vec<$child>,)*)?
        }

        impl $crate::record::Record for $name {
            fn name() -> &'static str {
                ::std::stringify!($name)
            }

            fn fields() -> ::std::vec::Vec<$crate::record::RecordField> {
                ::std::vec![
                    $(
                        $crate::record::RecordField::scalar(
                            ::std::stringify!($field),
                            $crate::record::ScalarType::of::<$ty>(),
                        ),
                    )*
                    $($(
                        $crate::record::RecordField::relation(
                            ::std::stringify!($rel),
                            $crate::record::record_type::<$child>,
                        ),
                    )*)?
                ]
            }

            fn set_field(
                &mut self,
                field: &str,
                data: $crate::record::FieldData,
            ) -> $crate::MapResult<()> {
                match field {
                    $(
                        ::std::stringify!($field) => {
                            self.$field = $crate::record::take_scalar::<$ty>(
                                ::std::stringify!($name),
                                field,
                                data,
                            )?;
                            ::std::result::Result::Ok(())
                        }
                    )*
                    $($(
                        ::std::stringify!($rel) => {
                            self.$rel = $crate::record::take_records::<$child>(
                                ::std::stringify!($name),
                                field,
                                data,
                            )?;
                            ::std::result::Result::Ok(())
                        }
                    )*)?
                    _ => ::std::result::Result::Err($crate::MapError::field_not_found(
                        ::std::stringify!($name),
                        field,
                    )),
                }
            }
        }
    };
}
