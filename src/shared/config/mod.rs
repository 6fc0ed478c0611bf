//! Application configuration module
//!
//! Configuration is assembled from three layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file named by `ACTIVITYHUB_CONFIG`
//! 3. environment variables (`SERVER_PORT`, `JWT_SECRET_KEY`, `AUTH_BACKEND`, ...)
//!
//! [`AppConfig::validate`] runs last and rejects combinations the server
//! cannot start with.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable naming an optional TOML configuration file
pub const CONFIG_PATH_ENV: &str = "ACTIVITYHUB_CONFIG";

/// Which identity backend issues and verifies tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthBackendKind {
    /// Salted password hashes and HS256 session tokens
    #[default]
    Local,
    /// Managed identity provider (Cognito-compatible) with JWKS verification
    Cognito,
}

impl FromStr for AuthBackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cognito" => Ok(Self::Cognito),
            _ => Err(ConfigError::InvalidValue {
                key: "AUTH_BACKEND",
                value: value.to_string(),
            }),
        }
    }
}

/// Which key-value store backs the user directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StoreBackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(ConfigError::InvalidValue {
                key: "STORE_BACKEND",
                value: value.to_string(),
            }),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Authentication settings shared by both identity backends
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub backend: AuthBackendKind,
    /// HS256 signing secret for locally issued session tokens
    pub jwt_secret: Option<String>,
    /// Session token lifetime in seconds
    pub token_ttl_secs: i64,
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend: AuthBackendKind::Local,
            jwt_secret: None,
            token_ttl_secs: 3600,
            password_min_length: 8,
        }
    }
}

/// External identity provider settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CognitoConfig {
    pub region: String,
    pub user_pool_id: String,
    pub app_client_id: String,
    /// Override for the provider API base URL
    pub endpoint: Option<String>,
    /// Override for the JWKS document URL
    pub jwks_url: Option<String>,
    pub jwks_cache_ttl_secs: i64,
}

impl Default for CognitoConfig {
    fn default() -> Self {
        Self {
            region: "eu-west-2".to_string(),
            user_pool_id: String::new(),
            app_client_id: String::new(),
            endpoint: None,
            jwks_url: None,
            jwks_cache_ttl_secs: 3600,
        }
    }
}

impl CognitoConfig {
    /// Provider API base URL
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com", self.region))
    }

    /// Public key set URL for the configured user pool
    pub fn jwks_url(&self) -> String {
        self.jwks_url.clone().unwrap_or_else(|| {
            format!(
                "https://cognito-idp.{}.amazonaws.com/{}/.well-known/jwks.json",
                self.region, self.user_pool_id
            )
        })
    }
}

/// Persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackendKind,
    /// `sqlite:` connection URL, required for the sqlite backend
    pub database_url: Option<String>,
    /// Logical table name
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::Memory,
            database_url: None,
            table: "ActivityHub-staging".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cognito: CognitoConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the optional TOML file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay values from an environment-like lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = parse_value("SERVER_PORT", &port)?;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(backend) = lookup("AUTH_BACKEND") {
            self.auth.backend = backend.parse()?;
        }
        if let Some(secret) = lookup("JWT_SECRET_KEY") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(ttl) = lookup("JWT_ACCESS_TOKEN_EXPIRES") {
            self.auth.token_ttl_secs = parse_value("JWT_ACCESS_TOKEN_EXPIRES", &ttl)?;
        }
        if let Some(length) = lookup("PASSWORD_MIN_LENGTH") {
            self.auth.password_min_length = parse_value("PASSWORD_MIN_LENGTH", &length)?;
        }
        if let Some(region) = lookup("COGNITO_REGION").or_else(|| lookup("AWS_REGION")) {
            self.cognito.region = region;
        }
        if let Some(pool) = lookup("COGNITO_USER_POOL_ID") {
            self.cognito.user_pool_id = pool;
        }
        if let Some(client) = lookup("COGNITO_APP_CLIENT_ID") {
            self.cognito.app_client_id = client;
        }
        if let Some(endpoint) = lookup("COGNITO_ENDPOINT") {
            self.cognito.endpoint = Some(endpoint);
        }
        if let Some(url) = lookup("COGNITO_JWKS_URL") {
            self.cognito.jwks_url = Some(url);
        }
        if let Some(ttl) = lookup("JWKS_CACHE_TTL") {
            self.cognito.jwks_cache_ttl_secs = parse_value("JWKS_CACHE_TTL", &ttl)?;
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.store.backend = backend.parse()?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.store.database_url = Some(url);
        }
        if let Some(table) = lookup("DYNAMODB_TABLE") {
            self.store.table = table;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_lifetime("JWT_ACCESS_TOKEN_EXPIRES", self.auth.token_ttl_secs)?;
        if self.auth.password_min_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PASSWORD_MIN_LENGTH",
                value: "0".to_string(),
            });
        }
        match self.auth.backend {
            AuthBackendKind::Local => {
                if self.auth.jwt_secret.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::MissingValue("JWT_SECRET_KEY"));
                }
            }
            AuthBackendKind::Cognito => {
                if self.cognito.user_pool_id.is_empty() && self.cognito.jwks_url.is_none() {
                    return Err(ConfigError::MissingValue("COGNITO_USER_POOL_ID"));
                }
                if self.cognito.app_client_id.is_empty() {
                    return Err(ConfigError::MissingValue("COGNITO_APP_CLIENT_ID"));
                }
                check_lifetime("JWKS_CACHE_TTL", self.cognito.jwks_cache_ttl_secs)?;
            }
        }
        if self.store.backend == StoreBackendKind::Sqlite && self.store.database_url.is_none() {
            return Err(ConfigError::MissingValue("DATABASE_URL"));
        }
        Ok(())
    }
}

/// Lifetimes must be positive and representable as a `chrono::TimeDelta`
fn check_lifetime(key: &'static str, secs: i64) -> Result<(), ConfigError> {
    if secs <= 0 || chrono::TimeDelta::try_seconds(secs).is_none() {
        return Err(ConfigError::InvalidValue {
            key,
            value: secs.to_string(),
        });
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn auth_backend(mut self, backend: AuthBackendKind) -> Self {
        self.config.auth.backend = backend;
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.jwt_secret = Some(secret.into());
        self
    }

    pub fn token_ttl_secs(mut self, ttl: i64) -> Self {
        self.config.auth.token_ttl_secs = ttl;
        self
    }

    pub fn password_min_length(mut self, length: usize) -> Self {
        self.config.auth.password_min_length = length;
        self
    }

    pub fn cognito(
        mut self,
        region: impl Into<String>,
        user_pool_id: impl Into<String>,
        app_client_id: impl Into<String>,
    ) -> Self {
        self.config.cognito.region = region.into();
        self.config.cognito.user_pool_id = user_pool_id.into();
        self.config.cognito.app_client_id = app_client_id.into();
        self
    }

    pub fn cognito_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.cognito.endpoint = Some(endpoint.into());
        self
    }

    pub fn jwks_url(mut self, url: impl Into<String>) -> Self {
        self.config.cognito.jwks_url = Some(url.into());
        self
    }

    pub fn jwks_cache_ttl_secs(mut self, ttl: i64) -> Self {
        self.config.cognito.jwks_cache_ttl_secs = ttl;
        self
    }

    pub fn sqlite(mut self, database_url: impl Into<String>) -> Self {
        self.config.store.backend = StoreBackendKind::Sqlite;
        self.config.store.database_url = Some(database_url.into());
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.config.store.table = table.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
