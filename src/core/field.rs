//! Field descriptors and format checks
//!
//! Every record type registers a fixed table of [`FieldDescriptor`]s (its
//! [`RecordSchema`]). The projector, the validator and the serializer consult
//! that table instead of inspecting record types at runtime.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::core::record::SYSTEM_FIELDS;

/// Field format validators for automatic validation
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Uuid,
    Url,
    Phone,
    Custom(Regex),
}

impl FieldFormat {
    /// Validate a field value against this format
    ///
    /// Non-string values never match a format.
    pub fn validate(&self, value: &Value) -> bool {
        let Some(string_value) = value.as_str() else {
            return false;
        };

        match self {
            FieldFormat::Email => Self::is_valid_email(string_value),
            FieldFormat::Uuid => Uuid::parse_str(string_value).is_ok(),
            FieldFormat::Url => Self::is_valid_url(string_value),
            FieldFormat::Phone => Self::is_valid_phone(string_value),
            FieldFormat::Custom(regex) => regex.is_match(string_value),
        }
    }

    /// Violation code reported when a value does not match this format
    pub fn code(&self) -> &'static str {
        match self {
            FieldFormat::Email => "email",
            FieldFormat::Uuid => "uuid",
            FieldFormat::Url => "url",
            FieldFormat::Phone => "phone",
            FieldFormat::Custom(_) => "format",
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email pattern is a valid regex")
        });
        regex.is_match(email)
    }

    fn is_valid_url(url: &str) -> bool {
        static URL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = URL_REGEX.get_or_init(|| {
            Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern is a valid regex")
        });
        regex.is_match(url)
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PHONE_REGEX.get_or_init(|| {
            // At least 8 digits, max 15 (E.164 standard)
            Regex::new(r"^\+?[1-9]\d{7,14}$").expect("phone pattern is a valid regex")
        });
        regex.is_match(phone)
    }
}

/// Static metadata describing the constraints on one record field
///
/// Built once per record type with the builder methods below:
///
/// ```rust,ignore
/// FieldDescriptor::new("email").required().format(FieldFormat::Email).unique()
/// ```
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    required: bool,
    format: Option<FieldFormat>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    unique: bool,
    sensitive: bool,
    hashed: bool,
    read_only: bool,
}

impl FieldDescriptor {
    /// Describe a field with no constraints
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            format: None,
            min_length: None,
            max_length: None,
            unique: false,
            sensitive: false,
            hashed: false,
            read_only: false,
        }
    }

    /// The field must be present and non-null
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// String values must match `format`
    pub fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// String values must have at least `min` characters
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// String values must have at most `max` characters
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// No two records may share a value for this field
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The field never appears in outbound representations
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// The value is stored as a bcrypt hash; implies `sensitive`
    pub fn hashed(mut self) -> Self {
        self.hashed = true;
        self.sensitive = true;
        self
    }

    /// Client-submitted values for this field are ignored
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn field_format(&self) -> Option<&FieldFormat> {
        self.format.as_ref()
    }

    pub fn length_bounds(&self) -> (Option<usize>, Option<usize>) {
        (self.min_length, self.max_length)
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn is_hashed(&self) -> bool {
        self.hashed
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// The descriptor table of one record type
#[derive(Debug, Clone, Default)]
pub struct RecordSchema {
    fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    pub fn new(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// All descriptors in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up the descriptor of a field
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Descriptors carrying a uniqueness constraint
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.unique)
    }

    /// Descriptors whose values are stored hashed
    pub fn hashed_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.hashed)
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.field(name).is_some_and(FieldDescriptor::is_sensitive)
    }

    pub fn is_hashed(&self, name: &str) -> bool {
        self.field(name).is_some_and(FieldDescriptor::is_hashed)
    }

    /// Identity, timestamps and fields declared read-only
    pub fn is_read_only(&self, name: &str) -> bool {
        SYSTEM_FIELDS.contains(&name) || self.field(name).is_some_and(FieldDescriptor::is_read_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_validation() {
        let format = FieldFormat::Email;

        assert!(format.validate(&json!("test@example.com")));
        assert!(format.validate(&json!("user.name+tag@example.co.uk")));
        assert!(!format.validate(&json!("invalid-email")));
        assert!(!format.validate(&json!("@example.com")));
    }

    #[test]
    fn test_uuid_validation() {
        let format = FieldFormat::Uuid;

        assert!(format.validate(&json!(Uuid::new_v4().to_string())));
        assert!(!format.validate(&json!("not-a-uuid")));
    }

    #[test]
    fn test_url_validation() {
        let format = FieldFormat::Url;

        assert!(format.validate(&json!("https://example.com")));
        assert!(format.validate(&json!("http://test.com/path?query=1")));
        assert!(!format.validate(&json!("not a url")));
    }

    #[test]
    fn test_phone_validation() {
        let format = FieldFormat::Phone;

        assert!(format.validate(&json!("+33612345678")));
        assert!(!format.validate(&json!("123")));
    }

    #[test]
    fn test_custom_regex_validation() {
        let format = FieldFormat::Custom(Regex::new(r"^[A-Z]{3}\d{3}$").unwrap());

        assert!(format.validate(&json!("ABC123")));
        assert!(!format.validate(&json!("abc123")));
        assert_eq!(format.code(), "format");
    }

    #[test]
    fn test_format_validate_rejects_non_string() {
        let format = FieldFormat::Email;
        assert!(!format.validate(&json!(42)));
        assert!(!format.validate(&json!(true)));
        assert!(!format.validate(&Value::Null));
    }

    #[test]
    fn test_hashed_implies_sensitive() {
        let descriptor = FieldDescriptor::new("password").hashed();
        assert!(descriptor.is_hashed());
        assert!(descriptor.is_sensitive());
    }

    #[test]
    fn test_schema_lookups() {
        let schema = RecordSchema::new([
            FieldDescriptor::new("email").required().unique(),
            FieldDescriptor::new("password").hashed(),
            FieldDescriptor::new("slug").read_only(),
        ]);

        assert_eq!(schema.fields().len(), 3);
        assert!(schema.field("email").is_some_and(|f| f.is_required()));
        assert!(schema.field("missing").is_none());
        assert_eq!(schema.unique_fields().count(), 1);
        assert!(schema.is_sensitive("password"));
        assert!(!schema.is_sensitive("email"));
        assert!(schema.is_read_only("id"));
        assert!(schema.is_read_only("created_at"));
        assert!(schema.is_read_only("slug"));
        assert!(!schema.is_read_only("email"));
    }
}
