//! Core module containing the record model and the resource pipeline

pub mod controller;
pub mod error;
pub mod field;
pub mod projection;
pub mod record;
pub mod serializer;
pub mod store;
pub mod validation;

pub use controller::ResourceController;
pub use error::{AuthFailure, CrudError, ErrorResponse};
pub use field::{FieldDescriptor, FieldFormat, RecordSchema};
pub use projection::{Representation, to_record, to_representation};
pub use record::Record;
pub use serializer::{Bound, RecordSerializer};
pub use store::{RecordStore, StoreError};
pub use validation::{ValidationReport, Validator, Violation};
