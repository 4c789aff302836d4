//! # crudkit
//!
//! A generic resource framework: declare a record type once and serve it as
//! an authenticated CRUD REST API.
//!
//! ## Features
//!
//! - **Descriptor tables**: required/format/length/unique constraints declared per field
//! - **Field projection**: records to ordered representations and back, through serde
//! - **Complete validation reports**: every violation of a request, never just the first
//! - **Partial updates**: input is merged over the stored record before validation
//! - **Sensitive fields**: hashed with bcrypt, never returned
//! - **Stateless auth**: HS256 bearer tokens with a strict expiry
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crudkit::prelude::*;
//!
//! impl_record!(
//!     Note,
//!     "note",
//!     "notes",
//!     {
//!         title: String,
//!         body: Option<String>,
//!     },
//!     schema: [
//!         FieldDescriptor::new("title").required().max_length(120),
//!     ]
//! );
//!
//! let users: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());
//! let notes: Arc<dyn RecordStore<Note>> = Arc::new(InMemoryStore::new());
//!
//! ServerBuilder::new(AppConfig::load(None)?)
//!     .register_resource::<User>(users.clone())
//!     .register_resource::<Note>(notes)
//!     .with_login::<User>(users)?
//!     .serve()
//!     .await?;
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod records;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Bound, CrudError, FieldDescriptor, FieldFormat, Record, RecordSchema, RecordSerializer,
        RecordStore, Representation, ResourceController, StoreError, ValidationReport, Validator,
        Violation,
    };

    // === Auth ===
    pub use crate::auth::{
        Authenticatable, CurrentIdentity, Identity, SecretHasher, TokenError, TokenGate,
    };

    // === Macros ===
    pub use crate::impl_record;

    // === Records ===
    pub use crate::records::User;

    // === Storage ===
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::{AppConfig, init_tracing};

    // === Server ===
    pub use crate::server::{ResourceDescriptor, ResourceRegistry, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
