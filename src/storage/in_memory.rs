//! In-memory implementation of RecordStore for testing and development

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::record::Record;
use crate::core::store::{RecordStore, StoreError};

/// In-memory record store
///
/// Useful for testing and development. Uses RwLock for thread-safe access and
/// keeps records in insertion order. Fields marked unique in the record's
/// schema are enforced at write time and reported as [`StoreError::Conflict`].
pub struct InMemoryStore<R: Record> {
    records: Arc<RwLock<IndexMap<Uuid, R>>>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> InMemoryStore<R> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
            _marker: PhantomData,
        }
    }
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Clone for InMemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            _marker: PhantomData,
        }
    }
}

fn field_value<R: Record>(record: &R, field: &str) -> Result<Value, StoreError> {
    let value = serde_json::to_value(record)
        .map_err(|e| StoreError::Backend(format!("Failed to encode {}: {}", R::record_type(), e)))?;
    Ok(value.get(field).cloned().unwrap_or(Value::Null))
}

/// Reject `candidate` if another stored record shares a unique field value
fn check_unique<R: Record>(
    records: &IndexMap<Uuid, R>,
    candidate: &R,
) -> Result<(), StoreError> {
    for descriptor in R::schema().unique_fields() {
        let field = descriptor.name();
        let value = field_value(candidate, field)?;
        if value.is_null() {
            continue;
        }

        for (id, existing) in records {
            if *id != candidate.id() && field_value(existing, field)? == value {
                return Err(StoreError::Conflict {
                    field: field.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<R>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.get(id).cloned())
    }

    async fn find_by_field(&self, field: &str, value: &Value) -> Result<Option<R>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire read lock: {}", e)))?;

        for record in records.values() {
            if field_value(record, field)? == *value {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn find_all(&self) -> Result<Vec<R>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.values().cloned().collect())
    }

    async fn insert(&self, mut record: R) -> Result<R, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire write lock: {}", e)))?;

        record.assign_identity(Uuid::new_v4(), Utc::now());
        check_unique(&records, &record)?;

        records.insert(record.id(), record.clone());

        Ok(record)
    }

    async fn update(&self, mut record: R) -> Result<R, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire write lock: {}", e)))?;

        let id = record.id();
        if !records.contains_key(&id) {
            return Err(StoreError::NotFound {
                record_type: R::record_type().to_string(),
                id,
            });
        }
        check_unique(&records, &record)?;

        record.touch(Utc::now());
        records.insert(id, record.clone());

        Ok(record)
    }

    async fn remove(&self, id: &Uuid) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire write lock: {}", e)))?;

        records
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                record_type: R::record_type().to_string(),
                id: *id,
            })
    }
}
