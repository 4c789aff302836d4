//! Public login endpoint issuing bearer tokens

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::handlers::decode_body;
use crate::auth::credentials::{Authenticatable, SecretHasher};
use crate::auth::token::TokenGate;
use crate::core::error::{AuthFailure, CrudError};
use crate::core::store::RecordStore;
use crate::core::validation::{ValidationReport, Violation};

/// Everything the login handler needs for one authenticatable record type
pub struct LoginState<R: Authenticatable> {
    store: Arc<dyn RecordStore<R>>,
    gate: Arc<TokenGate>,
    hasher: SecretHasher,
    /// Checked when no record matches, so both failures cost one bcrypt verify
    decoy_hash: Arc<str>,
}

impl<R: Authenticatable> Clone for LoginState<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gate: Arc::clone(&self.gate),
            hasher: self.hasher,
            decoy_hash: Arc::clone(&self.decoy_hash),
        }
    }
}

impl<R: Authenticatable> LoginState<R> {
    pub fn new(
        store: Arc<dyn RecordStore<R>>,
        gate: Arc<TokenGate>,
        hasher: SecretHasher,
    ) -> Result<Self, CrudError> {
        let decoy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            store,
            gate,
            hasher,
            decoy_hash: decoy_hash.into(),
        })
    }

    /// Verify `secret` against the record's hash, or against the decoy when
    /// there is no record
    fn authenticate(&self, record: Option<R>, secret: &str) -> Option<R> {
        match record {
            Some(record) => self
                .hasher
                .verify(secret, record.secret_hash())
                .then_some(record),
            None => {
                self.hasher.verify(secret, &self.decoy_hash);
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// `POST /login` with the credential and secret fields of `R`
///
/// Unknown credentials and wrong secrets are indistinguishable to the caller.
pub async fn login<R: Authenticatable>(
    State(state): State<LoginState<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TokenResponse>, CrudError> {
    let input = decode_body::<R>(payload)?;

    let mut report = ValidationReport::new();
    let credential = input.get(R::credential_field()).and_then(Value::as_str);
    let secret = input.get(R::secret_field()).and_then(Value::as_str);
    if credential.is_none() {
        report.add(R::credential_field(), Violation::Required);
    }
    if secret.is_none() {
        report.add(R::secret_field(), Violation::Required);
    }
    let (Some(credential), Some(secret)) = (credential, secret) else {
        return Err(CrudError::ValidationFailed(report));
    };

    let record = state
        .store
        .find_by_field(R::credential_field(), &Value::String(credential.to_string()))
        .await?;

    let Some(record) = state.authenticate(record, secret) else {
        tracing::debug!(record_type = R::record_type(), "login rejected");
        return Err(CrudError::Unauthorized(AuthFailure::BadCredentials));
    };

    let identity = record.identity();
    let token = state.gate.issue(&identity)?;
    tracing::info!(user_id = %identity.user_id, "login succeeded");

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: state.gate.ttl().num_seconds(),
    }))
}

/// Router serving `POST /login`
pub fn login_routes<R: Authenticatable>(state: LoginState<R>) -> Router {
    Router::new()
        .route("/login", post(login::<R>))
        .with_state(state)
}
