//! User record: the reference record type, also used for login

use crate::auth::credentials::Authenticatable;
use crate::auth::token::Identity;
use crate::core::field::{FieldDescriptor, FieldFormat};
use crate::impl_record;

impl_record!(
    User,
    "user",
    "users",
    {
        username: String,
        email: String,
        password: String,
    },
    schema: [
        FieldDescriptor::new("username").required().min_length(4).max_length(150).unique(),
        FieldDescriptor::new("email").required().format(FieldFormat::Email).unique(),
        FieldDescriptor::new("password").required().min_length(6).hashed(),
    ]
);

impl Authenticatable for User {
    fn credential_field() -> &'static str {
        "email"
    }

    fn secret_field() -> &'static str {
        "password"
    }

    fn secret_hash(&self) -> &str {
        &self.password
    }

    fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email.clone(),
        }
    }
}
