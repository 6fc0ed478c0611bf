/**
 * Server Initialization
 *
 * Builds the application from a validated `AppConfig`.
 *
 * # Initialization Process
 *
 * 1. Open the configured key-value store
 * 2. Wrap it in the user directory
 * 3. Build the configured identity backend (local or cognito)
 * 4. Create the router over the resulting `AppState`
 */

use axum::Router;
use chrono::TimeDelta;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::auth::external::{
    ExternalAuthError, ExternalTokenVerifier, HttpJwksFetcher, JwksCache, ProviderClient,
};
use crate::backend::auth::identity::{CognitoIdentity, IdentityBackend, LocalIdentity};
use crate::backend::auth::service::UserService;
use crate::backend::auth::sessions::{TokenError, TokenIssuer};
use crate::backend::directory::UserDirectory;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::{KeyValueStore, StoreError};
use crate::shared::config::{AppConfig, AuthBackendKind, ConfigError};
use crate::shared::{Clock, SystemClock};

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open the user store: {0}")]
    Store(#[from] StoreError),

    #[error("could not create the token issuer: {0}")]
    Token(#[from] TokenError),

    #[error("could not create the identity provider client: {0}")]
    External(#[from] ExternalAuthError),
}

/// Build the identity backend selected by `config.auth.backend`
pub fn build_identity(
    config: &AppConfig,
    directory: UserDirectory,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn IdentityBackend>, InitError> {
    match config.auth.backend {
        AuthBackendKind::Local => {
            let secret = config
                .auth
                .jwt_secret
                .as_deref()
                .ok_or(ConfigError::MissingValue("JWT_SECRET_KEY"))?;
            let issuer = TokenIssuer::new(secret, config.auth.token_ttl_secs, clock)?;
            Ok(Arc::new(LocalIdentity::new(UserService::new(directory, issuer))))
        }
        AuthBackendKind::Cognito => {
            let cognito = &config.cognito;
            let fetcher = HttpJwksFetcher::new(cognito.jwks_url())?;
            tracing::info!(jwks_url = %fetcher.url(), "Using external identity provider");
            let ttl = TimeDelta::try_seconds(cognito.jwks_cache_ttl_secs).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "JWKS_CACHE_TTL",
                    value: cognito.jwks_cache_ttl_secs.to_string(),
                }
            })?;
            let jwks = JwksCache::new(Arc::new(fetcher), Arc::clone(&clock), ttl);
            let verifier = ExternalTokenVerifier::new(jwks, cognito.app_client_id.clone(), clock);
            let provider = ProviderClient::new(cognito.endpoint(), cognito.app_client_id.clone())?;
            Ok(Arc::new(CognitoIdentity::new(provider, verifier, directory)))
        }
    }
}

/// Assemble the application state over an already opened store
pub fn build_state(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
) -> Result<AppState, InitError> {
    config.validate()?;
    let directory = UserDirectory::new(store, Arc::clone(&clock));
    let identity = build_identity(config, directory.clone(), clock)?;
    tracing::info!(backend = identity.name(), "Identity backend initialized");
    Ok(AppState::new(
        identity,
        directory,
        config.auth.password_min_length,
    ))
}

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails on invalid configuration, an unreachable store, or an HTTP client
/// that cannot be constructed. Nothing is retried.
pub async fn create_app(config: AppConfig) -> Result<Router<()>, InitError> {
    tracing::info!("Initializing ActivityHub backend server");
    config.validate()?;

    let store = load_store(&config.store).await?;
    let app_state = build_state(&config, store, Arc::new(SystemClock))?;

    let app = create_router(app_state);
    tracing::info!("Router configured");
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryStore;
    use crate::shared::ManualClock;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_local_backend() {
        let config = AppConfig::builder().jwt_secret("secret").build().unwrap();
        let state = build_state(
            &config,
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::default()),
        )
        .unwrap();
        assert_eq!(state.identity.name(), "local");
        assert_eq!(state.password_min_length, 8);
    }

    #[tokio::test]
    async fn test_cognito_backend() {
        let config = AppConfig::builder()
            .auth_backend(AuthBackendKind::Cognito)
            .cognito("eu-west-2", "eu-west-2_pool", "client")
            .build()
            .unwrap();
        let state = build_state(
            &config,
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::default()),
        )
        .unwrap();
        assert_eq!(state.identity.name(), "cognito");
    }

    #[tokio::test]
    async fn test_missing_secret_fails_startup() {
        let config = AppConfig::default();
        assert_matches!(create_app(config).await, Err(InitError::Config(_)));
    }

    #[tokio::test]
    async fn test_oversized_lifetimes_fail_startup() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("secret".into());
        config.auth.token_ttl_secs = 10_000_000_000_000_000;
        let result = build_state(
            &config,
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::default()),
        );
        assert_matches!(result, Err(InitError::Config(ConfigError::InvalidValue { .. })));

        let mut config = AppConfig::default();
        config.auth.backend = AuthBackendKind::Cognito;
        config.cognito.user_pool_id = "eu-west-2_pool".into();
        config.cognito.app_client_id = "client".into();
        config.cognito.jwks_cache_ttl_secs = i64::MAX;
        let result = build_state(
            &config,
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::default()),
        );
        assert_matches!(
            result,
            Err(InitError::Config(ConfigError::InvalidValue { key: "JWKS_CACHE_TTL", .. }))
        );
    }
}
