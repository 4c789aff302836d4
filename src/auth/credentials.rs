//! Password hashing and the login capability of a record type

use super::token::Identity;
use crate::core::error::CrudError;
use crate::core::record::Record;

/// bcrypt hashing with a configurable cost
#[derive(Debug, Clone, Copy)]
pub struct SecretHasher {
    cost: u32,
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl SecretHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, secret: &str) -> Result<String, CrudError> {
        bcrypt::hash(secret, self.cost)
            .map_err(|e| CrudError::Internal(format!("password hashing failed: {}", e)))
    }

    /// Check `secret` against a stored hash
    ///
    /// A stored value that is not a bcrypt hash never matches.
    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        bcrypt::verify(secret, hash).unwrap_or(false)
    }
}

/// A record type users can log in as
pub trait Authenticatable: Record {
    /// Field holding the login credential (e.g. "email")
    fn credential_field() -> &'static str;

    /// Field holding the hashed secret (e.g. "password")
    fn secret_field() -> &'static str;

    /// The stored hash of the secret
    fn secret_hash(&self) -> &str;

    /// Identity claims put into issued tokens
    fn identity(&self) -> Identity;
}
