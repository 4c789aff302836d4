//! Bearer authentication for protected routes

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use super::token::{Identity, TokenGate};
use crate::core::error::{AuthFailure, CrudError};

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::MissingHeader)?;

    let value = header.to_str().map_err(|_| AuthFailure::MalformedHeader)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthFailure::MalformedHeader),
    }
}

/// Middleware verifying the bearer token of every request it wraps
///
/// On success the verified [`Identity`] is inserted into the request
/// extensions. Every rejection produces the same 401 body; the specific
/// reason is only logged.
pub async fn require_bearer(
    State(gate): State<Arc<TokenGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, CrudError> {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_string(),
        Err(reason) => {
            tracing::debug!(path = %request.uri().path(), %reason, "rejected request");
            return Err(reason.into());
        }
    };

    let identity = gate.verify(&token).map_err(|e| {
        tracing::debug!(path = %request.uri().path(), reason = %e, "rejected token");
        CrudError::from(e)
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extractor for the identity attached by [`require_bearer`]
///
/// Rejects with 401 when the route is not behind the middleware.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = CrudError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(CrudError::Unauthorized(AuthFailure::MissingHeader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthFailure::MissingHeader)
        ));
    }

    #[test]
    fn test_malformed_header() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   ", "abc.def.ghi"] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(AuthFailure::MalformedHeader)),
                "{value} should be malformed"
            );
        }
    }
}
