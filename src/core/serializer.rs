//! Data binding for one record type: validate, then project
//!
//! The serializer owns the policies that sit between raw input and a record:
//! read-only keys are ignored, validation runs to completion before any
//! record is produced, hashed fields are hashed after validation, and
//! sensitive fields never leave through [`RecordSerializer::present`].

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::credentials::SecretHasher;
use crate::core::error::CrudError;
use crate::core::projection::{Representation, to_record, to_representation};
use crate::core::record::Record;
use crate::core::store::RecordStore;
use crate::core::validation::{ValidationReport, Validator};

/// Outcome of binding input to a record
///
/// A record is only produced when validation passed.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound<R> {
    Valid(R),
    Invalid(ValidationReport),
}

impl<R> Bound<R> {
    pub fn record(&self) -> Option<&R> {
        match self {
            Bound::Valid(record) => Some(record),
            Bound::Invalid(_) => None,
        }
    }

    pub fn violations(&self) -> Option<&ValidationReport> {
        match self {
            Bound::Valid(_) => None,
            Bound::Invalid(report) => Some(report),
        }
    }

    /// Turn a failed binding into [`CrudError::ValidationFailed`]
    pub fn into_result(self) -> Result<R, CrudError> {
        match self {
            Bound::Valid(record) => Ok(record),
            Bound::Invalid(report) => Err(CrudError::ValidationFailed(report)),
        }
    }
}

/// Binds representations to records of type `R`
pub struct RecordSerializer<R: Record> {
    validator: Validator<R>,
    hasher: SecretHasher,
}

impl<R: Record> Clone for RecordSerializer<R> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            hasher: self.hasher,
        }
    }
}

impl<R: Record> RecordSerializer<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>, hasher: SecretHasher) -> Self {
        Self {
            validator: Validator::new(store),
            hasher,
        }
    }

    /// Validate input for a new record and project it
    pub async fn prepare_create(&self, input: &Representation) -> Result<Bound<R>, CrudError> {
        let input = writable::<R>(input);

        let mut report = Validator::<R>::validate_structure(&input, R::schema());
        self.check_uniqueness(&input, None, &mut report).await?;
        if !report.is_empty() {
            return Ok(Bound::Invalid(report));
        }

        let input = self.hash_supplied(input, |_| true)?;
        Ok(Bound::Valid(to_record(&input)?))
    }

    /// Merge input over an existing record, validate the result and project it
    ///
    /// Fields absent from `input` keep their current values. Identity and
    /// creation time always come from `existing`.
    pub async fn prepare_update(
        &self,
        existing: &R,
        input: &Representation,
    ) -> Result<Bound<R>, CrudError> {
        let input = writable::<R>(input);
        let schema = R::schema();

        let mut merged = to_representation(existing, None)?;
        for (key, value) in &input {
            merged.insert(key.clone(), value.clone());
        }

        let mut report = Validator::<R>::validate_structure(&merged, schema);
        // stored hashes are not subject to the plain-text constraints
        report.retain(|field, _| !schema.is_hashed(field) || input.contains_key(field));
        self.check_uniqueness(&merged, Some(existing.id()), &mut report)
            .await?;
        if !report.is_empty() {
            return Ok(Bound::Invalid(report));
        }

        let merged = self.hash_supplied(merged, |field| input.contains_key(field))?;
        Ok(Bound::Valid(to_record(&merged)?))
    }

    /// Outbound representation of a record, without sensitive fields
    pub fn present(&self, record: &R, subset: Option<&[&str]>) -> Result<Representation, CrudError> {
        let schema = R::schema();
        let mut representation = to_representation(record, subset)?;
        representation.retain(|key, _| !schema.is_sensitive(key));
        Ok(representation)
    }

    /// Check every unique field that carries a value and passed structural checks
    async fn check_uniqueness(
        &self,
        representation: &Representation,
        exclude: Option<Uuid>,
        report: &mut ValidationReport,
    ) -> Result<(), CrudError> {
        for descriptor in R::schema().unique_fields() {
            let field = descriptor.name();
            if report.contains(field) {
                continue;
            }
            if let Some(value) = representation.get(field) {
                report.merge(
                    self.validator
                        .validate_uniqueness(field, value, exclude)
                        .await?,
                );
            }
        }
        Ok(())
    }

    /// Replace the plain-text value of hashed fields selected by `supplied`
    fn hash_supplied(
        &self,
        mut representation: Representation,
        supplied: impl Fn(&str) -> bool,
    ) -> Result<Representation, CrudError> {
        for descriptor in R::schema().hashed_fields() {
            let field = descriptor.name();
            if !supplied(field) {
                continue;
            }
            if let Some(Value::String(secret)) = representation.get(field) {
                let hashed = self.hasher.hash(secret)?;
                representation.insert(field.to_string(), Value::String(hashed));
            }
        }
        Ok(representation)
    }
}

/// Drop keys clients may not set
fn writable<R: Record>(input: &Representation) -> Representation {
    let schema = R::schema();
    input
        .iter()
        .filter(|(key, _)| !schema.is_read_only(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
