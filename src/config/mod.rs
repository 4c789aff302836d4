//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file; every section has
//! defaults, and a few environment variables (`PORT`, `HOST`, `JWT_SECRET`)
//! override the file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidOverride { key: String, value: String },

    #[error("{key} {reason}")]
    OutOfRange { key: &'static str, reason: String },
}

/// Longest accepted token lifetime: one year
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Work factors bcrypt accepts
pub const BCRYPT_COSTS: RangeInclusive<u32> = 4..=31;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub middleware: MiddlewareConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Token and password settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Wrap resource routes with bearer authentication
    pub enabled: bool,

    /// HS256 signing secret; required when `enabled`
    pub secret: String,

    /// Lifetime of issued tokens, in seconds
    pub token_ttl_secs: i64,

    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: String::new(),
            token_ttl_secs: 3600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AuthConfig {
    /// Lifetime of issued tokens, rejected unless within 1s..=[`MAX_TOKEN_TTL_SECS`]
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(ConfigError::OutOfRange {
                key: "auth.token_ttl_secs",
                reason: format!(
                    "must be between 1 and {}, got {}",
                    MAX_TOKEN_TTL_SECS, self.token_ttl_secs
                ),
            });
        }
        Ok(chrono::Duration::seconds(self.token_ttl_secs))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.token_ttl()?;
        if !BCRYPT_COSTS.contains(&self.bcrypt_cost) {
            return Err(ConfigError::OutOfRange {
                key: "auth.bcrypt_cost",
                reason: format!(
                    "must be between {} and {}, got {}",
                    BCRYPT_COSTS.start(),
                    BCRYPT_COSTS.end(),
                    self.bcrypt_cost
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// HTTP request tracing
    pub logging: bool,

    /// Permissive CORS
    pub cors: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            logging: true,
            cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the types alone do not constrain
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()
    }

    /// Load the file if given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORT`, `HOST` and `JWT_SECRET` from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidOverride {
                key: "PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.secret = secret;
        }
        Ok(())
    }

    /// Socket address string, e.g. "127.0.0.1:3000"
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `default_level`. Calling this twice is harmless.
pub fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
