//! Validation system
//!
//! Structural checks run against a record's descriptor table and never touch
//! storage. Uniqueness checks issue one read-only store query per field.

pub mod report;
pub mod validators;

pub use report::{ValidationReport, Violation};

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::CrudError;
use crate::core::field::RecordSchema;
use crate::core::projection::Representation;
use crate::core::record::Record;
use crate::core::store::RecordStore;

/// Runs structural and uniqueness checks for one record type
pub struct Validator<R: Record> {
    store: Arc<dyn RecordStore<R>>,
}

impl<R: Record> Clone for Validator<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Record> Validator<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }

    /// Check presence, format and length of every described field
    ///
    /// All fields are checked; an empty representation reports every
    /// required field.
    pub fn validate_structure(
        representation: &Representation,
        schema: &RecordSchema,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();
        for descriptor in schema.fields() {
            if let Err(violation) =
                validators::check_field(descriptor, representation.get(descriptor.name()))
            {
                report.add(descriptor.name(), violation);
            }
        }
        report
    }

    /// Flag `field` as duplicate if another record already holds `value`
    ///
    /// `exclude` is the identity of the record being updated, so a record
    /// never collides with itself.
    pub async fn validate_uniqueness(
        &self,
        field: &str,
        value: &Value,
        exclude: Option<Uuid>,
    ) -> Result<ValidationReport, CrudError> {
        let mut report = ValidationReport::new();
        if value.is_null() {
            return Ok(report);
        }

        if let Some(existing) = self.store.find_by_field(field, value).await?
            && Some(existing.id()) != exclude
        {
            report.add(field, Violation::Duplicate);
        }
        Ok(report)
    }
}
