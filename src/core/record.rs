//! Record trait defining the capability set every managed type provides

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::field::RecordSchema;

/// Name of the identity field in every representation
pub const IDENTITY_FIELD: &str = "id";

/// Fields owned by the store: assigned at insert, never taken from clients
pub const SYSTEM_FIELDS: &[&str] = &[IDENTITY_FIELD, "created_at", "updated_at"];

/// Base trait for all records managed by a resource controller.
///
/// A record can be projected (through serde), validated (through its
/// [`RecordSchema`]) and identified (through [`Record::id`]). The
/// [`impl_record!`](crate::impl_record) macro generates the struct and this
/// implementation in one go.
///
/// `Default` provides the zero value used for fields missing from an
/// inbound representation. A nil `id` means the record was never persisted.
pub trait Record: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// The singular type name (e.g., "user")
    fn record_type() -> &'static str;

    /// The plural resource name used in URLs (e.g., "users")
    fn resource_name() -> &'static str;

    /// The descriptor table for this record type
    fn schema() -> &'static RecordSchema;

    /// Get the identity of this record
    fn id(&self) -> Uuid;

    /// Get the creation timestamp, once assigned by the store
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Get the last update timestamp, once assigned by the store
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    /// Set the identity and both timestamps; called by stores on insert
    fn assign_identity(&mut self, id: Uuid, at: DateTime<Utc>);

    /// Refresh the update timestamp; called by stores on update
    fn touch(&mut self, at: DateTime<Utc>);
}
