//! Server module for building HTTP servers with auto-registered routes
//!
//! This module provides a `ServerBuilder` that registers:
//! - CRUD routes for every registered record type
//! - The public login route
//! - Health check routes

pub mod builder;
pub mod handlers;
pub mod login;
pub mod resource_registry;

pub use builder::ServerBuilder;
pub use login::{LoginState, TokenResponse};
pub use resource_registry::{RecordResource, ResourceDescriptor, ResourceRegistry};
