//! Persistence collaborator contract
//!
//! The core never owns records: every component receives an
//! `Arc<dyn RecordStore<R>>` at construction and delegates storage to it.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::core::record::Record;

/// Errors surfaced by a store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this identity exists
    #[error("{record_type} with id '{id}' not found")]
    NotFound { record_type: String, id: Uuid },

    /// A write collided with the store's own uniqueness constraint
    #[error("unique constraint violated on field '{field}'")]
    Conflict { field: String },

    /// Any other backend failure
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Storage operations for one record type
///
/// Reads must be side-effect free. `insert` assigns the identity and
/// timestamps; `update` refreshes `updated_at`.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Get a record by identity
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<R>, StoreError>;

    /// Get the first record whose `field` equals `value`
    async fn find_by_field(&self, field: &str, value: &Value) -> Result<Option<R>, StoreError>;

    /// All records, in insertion order
    async fn find_all(&self) -> Result<Vec<R>, StoreError>;

    /// Persist a new record and return it with its assigned identity
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// Replace an existing record
    async fn update(&self, record: R) -> Result<R, StoreError>;

    /// Delete a record; fails with `NotFound` if absent
    async fn remove(&self, id: &Uuid) -> Result<(), StoreError>;
}
