//! ServerBuilder for fluent API to build HTTP servers

use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::login::{LoginState, login_routes};
use super::resource_registry::{RecordResource, ResourceRegistry};
use crate::auth::credentials::{Authenticatable, SecretHasher};
use crate::auth::middleware::{CurrentIdentity, require_bearer};
use crate::auth::token::{Identity, TokenGate};
use crate::config::AppConfig;
use crate::core::controller::ResourceController;
use crate::core::record::Record;
use crate::core::store::RecordStore;

/// Builder for creating HTTP servers with auto-registered resource routes
///
/// # Example
///
/// ```ignore
/// let users: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());
///
/// let app = ServerBuilder::new(config)
///     .register_resource::<User>(users.clone())
///     .with_login::<User>(users)?
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    registry: ResourceRegistry,
    public_routes: Vec<Router>,
    gate: Option<Arc<TokenGate>>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            registry: ResourceRegistry::new(),
            public_routes: Vec::new(),
            gate: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve `R` under `/{plural}` backed by `store`
    pub fn register_resource<R: Record>(mut self, store: Arc<dyn RecordStore<R>>) -> Self {
        let controller = ResourceController::new(store, self.hasher());
        self.registry
            .register(Box::new(RecordResource::<R>::new(controller)));
        self
    }

    /// Add the public `POST /login` route, authenticating against `R`
    pub fn with_login<R: Authenticatable>(mut self, store: Arc<dyn RecordStore<R>>) -> Result<Self> {
        let state = LoginState::new(store, self.token_gate()?, self.hasher())?;
        self.public_routes.push(login_routes(state));
        Ok(self)
    }

    /// Build the final router
    ///
    /// This generates:
    /// - CRUD routes for all registered resources and `GET /whoami`, behind
    ///   bearer authentication when `auth.enabled`
    /// - Health check routes and `POST /login`, unauthenticated
    pub fn build(mut self) -> Result<Router> {
        self.config.validate()?;

        let mut protected = self
            .registry
            .build_routes()
            .route("/whoami", get(whoami));

        if self.config.auth.enabled {
            let gate = self.token_gate()?;
            protected = protected.route_layer(middleware::from_fn_with_state(gate, require_bearer));
        } else {
            tracing::warn!("authentication disabled, resource routes are public");
        }

        let mut app = health_routes().merge(protected);
        for routes in std::mem::take(&mut self.public_routes) {
            app = app.merge(routes);
        }

        if self.config.middleware.cors {
            app = app.layer(CorsLayer::permissive());
        }
        if self.config.middleware.logging {
            app = app.layer(TraceLayer::new_for_http());
        }

        tracing::info!(resources = ?self.registry.plurals(), "router built");
        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.addr();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn hasher(&self) -> SecretHasher {
        SecretHasher::new(self.config.auth.bcrypt_cost)
    }

    /// The token gate, created from the auth config on first use
    fn token_gate(&mut self) -> Result<Arc<TokenGate>> {
        if let Some(gate) = &self.gate {
            return Ok(Arc::clone(gate));
        }
        let gate = Arc::new(
            TokenGate::new(&self.config.auth.secret, self.config.auth.token_ttl()?)
                .context("auth.secret (or JWT_SECRET) must be set")?,
        );
        self.gate = Some(Arc::clone(&gate));
        Ok(gate)
    }
}

/// Build health check routes
fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "crudkit"
    }))
}

/// The identity attached to the current request
async fn whoami(CurrentIdentity(identity): CurrentIdentity) -> Json<Identity> {
    Json(identity)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::User;
    use crate::storage::InMemoryStore;

    fn config(secret: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.secret = secret.to_string();
        config.auth.bcrypt_cost = 4;
        config
    }

    #[test]
    fn test_build_requires_secret_when_auth_enabled() {
        let store: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());
        let result = ServerBuilder::new(config(""))
            .register_resource::<User>(store)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_without_auth_needs_no_secret() {
        let mut config = config("");
        config.auth.enabled = false;
        let store: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());

        assert!(ServerBuilder::new(config).register_resource::<User>(store).build().is_ok());
    }

    #[test]
    fn test_build_rejects_out_of_range_auth_settings() {
        let store: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());

        let mut bad_cost = config("secret");
        bad_cost.auth.bcrypt_cost = 2;
        let result = ServerBuilder::new(bad_cost)
            .register_resource::<User>(store.clone())
            .build();
        assert!(result.is_err());

        let mut bad_ttl = config("secret");
        bad_ttl.auth.token_ttl_secs = i64::MAX;
        assert!(ServerBuilder::new(bad_ttl).with_login::<User>(store).is_err());
    }

    #[test]
    fn test_login_and_resources_share_one_gate() {
        let store: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());
        let mut builder = ServerBuilder::new(config("secret"))
            .register_resource::<User>(store.clone())
            .with_login::<User>(store)
            .unwrap();

        let first = builder.token_gate().unwrap();
        let second = builder.token_gate().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
