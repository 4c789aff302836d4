//! Reusable field validators
//!
//! Each validator is a closure over one value. [`check_field`] composes them
//! for a single descriptor with precedence required > format > length.

use serde_json::Value;

use super::report::Violation;
use crate::core::field::{FieldDescriptor, FieldFormat};

/// Validator: field is required (not null)
pub fn required() -> impl Fn(&Value) -> Result<(), Violation> + Send + Sync + Clone {
    |value: &Value| {
        if value.is_null() {
            Err(Violation::Required)
        } else {
            Ok(())
        }
    }
}

/// Validator: value must match a declared format
pub fn matches_format(
    format: &FieldFormat,
) -> impl Fn(&Value) -> Result<(), Violation> + Send + Sync + Clone + '_ {
    move |value: &Value| {
        if format.validate(value) {
            Ok(())
        } else {
            Err(Violation::InvalidFormat(format.code()))
        }
    }
}

/// Validator: string length must be within range
///
/// Counts characters, not bytes. Non-string values are left to other checks.
pub fn string_length(
    min: Option<usize>,
    max: Option<usize>,
) -> impl Fn(&Value) -> Result<(), Violation> + Send + Sync + Clone {
    move |value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if min.is_some_and(|min| len < min) {
            Err(Violation::MinLength)
        } else if max.is_some_and(|max| len > max) {
            Err(Violation::MaxLength)
        } else {
            Ok(())
        }
    }
}

/// Run every structural check of one descriptor against a field value
///
/// A missing value and `null` are treated alike. Optional fields that are
/// absent skip the remaining checks.
pub fn check_field(descriptor: &FieldDescriptor, value: Option<&Value>) -> Result<(), Violation> {
    let value = value.unwrap_or(&Value::Null);

    if value.is_null() {
        return if descriptor.is_required() {
            required()(value)
        } else {
            Ok(())
        };
    }

    if let Some(format) = descriptor.field_format() {
        matches_format(format)(value)?;
    }

    let (min, max) = descriptor.length_bounds();
    string_length(min, max)(value)
}
