//! Record definitions and the macro that generates them

pub mod macros;
pub mod user;

pub use user::User;
