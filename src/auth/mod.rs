//! Bearer-token authentication
//!
//! - [`token`]: stateless JWT issuance and verification
//! - [`middleware`]: request gate for protected routes
//! - [`credentials`]: password hashing and the login capability of records

pub mod credentials;
pub mod middleware;
pub mod token;

pub use credentials::{Authenticatable, SecretHasher};
pub use middleware::{CurrentIdentity, require_bearer};
pub use token::{Claims, Identity, TokenError, TokenGate};
