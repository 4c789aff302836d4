//! Per-field violation report

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// One field-level violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The field is absent or null
    Required,

    /// The value does not match the declared format (carries the format code)
    InvalidFormat(&'static str),

    /// The string value is shorter than the declared minimum
    MinLength,

    /// The string value is longer than the declared maximum
    MaxLength,

    /// Another record already holds this value
    Duplicate,
}

impl Violation {
    /// Code rendered in reports and error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Violation::Required => "required",
            Violation::InvalidFormat(format) => format,
            Violation::MinLength => "min_length",
            Violation::MaxLength => "max_length",
            Violation::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Mapping from field name to violation; an empty report means valid
///
/// Fields keep the order in which they were first reported, and only the
/// first violation of a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    violations: IndexMap<String, Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a violation for `field` unless one is already recorded
    pub fn add(&mut self, field: impl Into<String>, violation: Violation) {
        self.violations.entry(field.into()).or_insert(violation);
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        for (field, violation) in other.violations {
            self.add(field, violation);
        }
    }

    /// Keep only the violations matching the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Violation) -> bool) {
        self.violations.retain(|field, violation| keep(field, violation));
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn get(&self, field: &str) -> Option<&Violation> {
        self.violations.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.violations.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Violation)> {
        self.violations.iter().map(|(field, v)| (field.as_str(), v))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .iter()
            .map(|(field, violation)| format!("{}: {}", field, violation))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}
