//! Typed error handling for crudkit
//!
//! Every operation of the resource pipeline returns [`CrudError`], which maps
//! itself onto an HTTP status and a structured JSON body.
//!
//! # Error Categories
//!
//! - `Decoding` / `Encoding`: the interchange data has the wrong shape
//! - `ValidationFailed`: the input is semantically invalid; always carries the
//!   complete per-field report
//! - `NotFound`: the identity does not resolve to a record
//! - `Unauthorized`: missing or rejected credentials; the reason is kept for
//!   diagnostics but never rendered to the client
//! - `Storage` / `Internal`: opaque server-side faults
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.retrieve(id).await {
//!     Ok(representation) => println!("{:?}", representation),
//!     Err(CrudError::NotFound { id, .. }) => println!("{} not found", id),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::auth::token::TokenError;
use crate::core::store::StoreError;
use crate::core::validation::{ValidationReport, Violation};

/// Message sent for every rejected credential, whatever the reason
const UNAUTHORIZED_MESSAGE: &str = "Authentication credentials were missing or invalid";

/// Message sent for every server-side fault
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// The main error type of the resource pipeline
#[derive(Debug)]
pub enum CrudError {
    /// Inbound data could not be turned into a record
    Decoding { record_type: String, message: String },

    /// A record could not be decomposed into a representation
    Encoding { record_type: String, message: String },

    /// The input failed validation
    ValidationFailed(ValidationReport),

    /// No record with this identity exists
    NotFound { record_type: String, id: Uuid },

    /// Credentials were missing or rejected
    Unauthorized(AuthFailure),

    /// Store backend failure
    Storage(StoreError),

    /// Internal failure (should not happen in normal operation)
    Internal(String),
}

/// Why a request was rejected as unauthorized
#[derive(Debug)]
pub enum AuthFailure {
    /// No Authorization header
    MissingHeader,

    /// Authorization header without the Bearer scheme or token
    MalformedHeader,

    /// The token was rejected by the token gate
    Token(TokenError),

    /// Login with an unknown credential or a wrong secret
    BadCredentials,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::MissingHeader => write!(f, "missing Authorization header"),
            AuthFailure::MalformedHeader => write!(f, "malformed Authorization header"),
            AuthFailure::Token(e) => write!(f, "{}", e),
            AuthFailure::BadCredentials => write!(f, "bad credentials"),
        }
    }
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrudError::Decoding {
                record_type,
                message,
            } => write!(f, "Failed to decode {}: {}", record_type, message),
            CrudError::Encoding {
                record_type,
                message,
            } => write!(f, "Failed to encode {}: {}", record_type, message),
            CrudError::ValidationFailed(report) => write!(f, "Validation failed: {}", report),
            CrudError::NotFound { record_type, id } => {
                write!(f, "{} with id '{}' not found", record_type, id)
            }
            CrudError::Unauthorized(reason) => write!(f, "Unauthorized: {}", reason),
            CrudError::Storage(e) => write!(f, "{}", e),
            CrudError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CrudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrudError::Storage(e) => Some(e),
            CrudError::Unauthorized(AuthFailure::Token(e)) => Some(e),
            _ => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CrudError {
    /// Validation failure flagging a single field
    pub fn field_violation(field: impl Into<String>, violation: Violation) -> Self {
        let mut report = ValidationReport::new();
        report.add(field, violation);
        CrudError::ValidationFailed(report)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrudError::Decoding { .. } => StatusCode::BAD_REQUEST,
            CrudError::Encoding { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CrudError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            CrudError::NotFound { .. } => StatusCode::NOT_FOUND,
            CrudError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CrudError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrudError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CrudError::Decoding { .. } => "DECODING_ERROR",
            CrudError::Encoding { .. } => "ENCODING_ERROR",
            CrudError::ValidationFailed(_) => "VALIDATION_FAILED",
            CrudError::NotFound { .. } => "RECORD_NOT_FOUND",
            CrudError::Unauthorized(_) => "UNAUTHORIZED",
            CrudError::Storage(_) | CrudError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    ///
    /// Unauthorized and server-side errors get a fixed message so the body
    /// never reveals which check failed.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            CrudError::Unauthorized(_) => UNAUTHORIZED_MESSAGE.to_string(),
            CrudError::Encoding { .. } | CrudError::Storage(_) | CrudError::Internal(_) => {
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CrudError::NotFound { record_type, id } => Some(serde_json::json!({
                "record_type": record_type,
                "id": id.to_string()
            })),
            CrudError::ValidationFailed(report) => Some(serde_json::json!({ "fields": report })),
            _ => None,
        }
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<StoreError> for CrudError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { record_type, id } => CrudError::NotFound { record_type, id },
            StoreError::Conflict { field } => CrudError::field_violation(field, Violation::Duplicate),
            other => CrudError::Storage(other),
        }
    }
}

impl From<TokenError> for CrudError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken | TokenError::ExpiredToken => {
                CrudError::Unauthorized(AuthFailure::Token(err))
            }
            other => CrudError::Internal(other.to_string()),
        }
    }
}

impl From<AuthFailure> for CrudError {
    fn from(reason: AuthFailure) -> Self {
        CrudError::Unauthorized(reason)
    }
}
