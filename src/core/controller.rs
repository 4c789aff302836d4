//! Generic resource controller
//!
//! One controller per record type, holding only its store handle and its
//! serializer. Every write is preceded by complete validation, so a failed
//! request never leaves a partial record behind.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::credentials::SecretHasher;
use crate::core::error::CrudError;
use crate::core::projection::Representation;
use crate::core::record::Record;
use crate::core::serializer::RecordSerializer;
use crate::core::store::RecordStore;

/// List/retrieve/create/update/delete over one collection
pub struct ResourceController<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    serializer: RecordSerializer<R>,
}

impl<R: Record> Clone for ResourceController<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            serializer: self.serializer.clone(),
        }
    }
}

impl<R: Record> ResourceController<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>, hasher: SecretHasher) -> Self {
        Self {
            serializer: RecordSerializer::new(Arc::clone(&store), hasher),
            store,
        }
    }

    pub fn serializer(&self) -> &RecordSerializer<R> {
        &self.serializer
    }

    /// All records, presented
    pub async fn list(&self) -> Result<Vec<Representation>, CrudError> {
        let records = self.store.find_all().await?;
        records
            .iter()
            .map(|record| self.serializer.present(record, None))
            .collect()
    }

    pub async fn retrieve(&self, id: Uuid) -> Result<Representation, CrudError> {
        let record = self.find(id).await?;
        self.serializer.present(&record, None)
    }

    /// Validate, persist and present a new record
    ///
    /// A uniqueness conflict detected by the store at write time is reported
    /// like any other duplicate.
    pub async fn create(&self, input: &Representation) -> Result<Representation, CrudError> {
        let record = self.serializer.prepare_create(input).await?.into_result()?;
        let created = self.store.insert(record).await?;

        tracing::debug!(record_type = R::record_type(), id = %created.id(), "created record");
        self.serializer.present(&created, None)
    }

    /// Partially update an existing record
    pub async fn update(&self, id: Uuid, input: &Representation) -> Result<Representation, CrudError> {
        let existing = self.find(id).await?;
        let record = self
            .serializer
            .prepare_update(&existing, input)
            .await?
            .into_result()?;
        let updated = self.store.update(record).await?;

        tracing::debug!(record_type = R::record_type(), %id, "updated record");
        self.serializer.present(&updated, None)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), CrudError> {
        self.store.remove(&id).await?;

        tracing::debug!(record_type = R::record_type(), %id, "deleted record");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<R, CrudError> {
        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| CrudError::NotFound {
                record_type: R::record_type().to_string(),
                id,
            })
    }
}
