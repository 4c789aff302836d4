//! Macros for reducing boilerplate when defining records
//!
//! These macros generate the struct and the [`Record`](crate::core::record::Record)
//! implementation, injecting the store-owned fields (`id`, `created_at`,
//! `updated_at`) so record definitions only list their own fields.

/// Complete macro to create a record type with its descriptor table
///
/// # Example
///
/// ```rust,ignore
/// use crudkit::prelude::*;
///
/// impl_record!(
///     User,
///     "user",
///     "users",
///     {
///         username: String,
///         email: String,
///         password: String,
///     },
///     schema: [
///         FieldDescriptor::new("username").required().min_length(4).unique(),
///         FieldDescriptor::new("email").required().format(FieldFormat::Email).unique(),
///         FieldDescriptor::new("password").required().min_length(6).hashed(),
///     ]
/// );
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident,
        $type_name:expr,
        $resource_name:expr,
        {
            $( $(#[$field_meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        },
        schema: [ $( $descriptor:expr ),* $(,)? ]
    ) => {
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Unique identifier, assigned by the store on insert
            pub id: ::uuid::Uuid,

            $( $(#[$field_meta])* pub $field : $field_type, )*

            /// When this record was created
            pub created_at: Option<::chrono::DateTime<::chrono::Utc>>,

            /// When this record was last updated
            pub updated_at: Option<::chrono::DateTime<::chrono::Utc>>,
        }

        impl $crate::core::record::Record for $type {
            fn record_type() -> &'static str {
                $type_name
            }

            fn resource_name() -> &'static str {
                $resource_name
            }

            fn schema() -> &'static $crate::core::field::RecordSchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::core::field::RecordSchema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::core::field::RecordSchema::new(::std::vec![ $( $descriptor ),* ])
                })
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.created_at
            }

            fn updated_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.updated_at
            }

            fn assign_identity(
                &mut self,
                id: ::uuid::Uuid,
                at: ::chrono::DateTime<::chrono::Utc>,
            ) {
                self.id = id;
                self.created_at = Some(at);
                self.updated_at = Some(at);
            }

            fn touch(&mut self, at: ::chrono::DateTime<::chrono::Utc>) {
                self.updated_at = Some(at);
            }
        }
    };
}
