/**
 * Identity Backends
 *
 * The routes talk to one `IdentityBackend`; configuration decides whether it
 * is the local password/JWT scheme or the managed identity provider.
 *
 * - `LocalIdentity` hashes passwords into the directory and issues its own
 *   HS256 session tokens.
 * - `CognitoIdentity` delegates sign-up and login to the provider, verifies
 *   provider-issued tokens against its JWKS, and keeps a credential-free
 *   profile keyed by the provider subject.
 */

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::backend::auth::external::{
    ExternalAuthError, ExternalTokenVerifier, ProviderClient, ProviderTokens,
};
use crate::backend::auth::service::{
    ensure_email_available, ensure_parent_exists, Registration, UserService,
};
use crate::backend::directory::UserDirectory;
use crate::backend::error::ApiError;
use crate::shared::{NewUser, Role, UserProfile};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// The authenticated caller, as established by a valid bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub subject: String,
    pub role: Role,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: UserProfile,
    /// Bearer token for subsequent requests
    pub token: String,
    /// Full provider token set; external backend only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<ProviderTokens>,
}

#[async_trait]
pub trait IdentityBackend: Send + Sync + fmt::Debug {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    async fn register(&self, registration: Registration) -> Result<UserProfile, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError>;

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderTokens, ApiError>;

    /// Validate a bearer token; every failure is `Unauthorized`
    async fn verify_token(&self, token: &str) -> Result<IdentityContext, ApiError>;
}

/// Password hashes in the directory, HS256 session tokens
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    service: UserService,
}

impl LocalIdentity {
    pub fn new(service: UserService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl IdentityBackend for LocalIdentity {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn register(&self, registration: Registration) -> Result<UserProfile, ApiError> {
        self.service.register(registration).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        match self.service.authenticate(email, password).await? {
            Some((user, token)) => Ok(LoginOutcome {
                user,
                token,
                tokens: None,
            }),
            None => Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
        }
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<ProviderTokens, ApiError> {
        Err(ApiError::bad_request(
            "Token refresh is not supported by the local identity backend",
        ))
    }

    async fn verify_token(&self, token: &str) -> Result<IdentityContext, ApiError> {
        let claims = self.service.issuer().validate(token).map_err(|err| {
            tracing::debug!(error = %err, "session token rejected");
            ApiError::invalid_token()
        })?;
        Ok(IdentityContext {
            subject: claims.sub,
            role: claims.role,
        })
    }
}

/// Managed identity provider with JWKS-verified tokens
#[derive(Debug)]
pub struct CognitoIdentity {
    provider: ProviderClient,
    verifier: ExternalTokenVerifier,
    directory: UserDirectory,
}

impl CognitoIdentity {
    pub fn new(
        provider: ProviderClient,
        verifier: ExternalTokenVerifier,
        directory: UserDirectory,
    ) -> Self {
        Self {
            provider,
            verifier,
            directory,
        }
    }

    pub fn verifier(&self) -> &ExternalTokenVerifier {
        &self.verifier
    }
}

/// Map a provider failure onto the API taxonomy
fn provider_error(err: ExternalAuthError) -> ApiError {
    let (code, message) = match err {
        ExternalAuthError::Provider { code, message } => (code, message),
        other => return ApiError::server("Identity provider request failed", other),
    };
    match code.as_str() {
        "NotAuthorizedException" | "UserNotFoundException" => {
            ApiError::unauthorized(INVALID_CREDENTIALS)
        }
        "UsernameExistsException" => ApiError::bad_request("User with this email already exists"),
        "InvalidPasswordException" | "InvalidParameterException" => ApiError::bad_request(message),
        _ => ApiError::server(
            "Identity provider request failed",
            format!("{code}: {message}"),
        ),
    }
}

#[async_trait]
impl IdentityBackend for CognitoIdentity {
    fn name(&self) -> &'static str {
        "cognito"
    }

    async fn register(&self, registration: Registration) -> Result<UserProfile, ApiError> {
        ensure_email_available(&self.directory, &registration.email).await?;
        ensure_parent_exists(&self.directory, &registration).await?;

        let outcome = self
            .provider
            .sign_up(
                &registration.email,
                &registration.password,
                &registration.name,
                registration.role,
            )
            .await
            .map_err(provider_error)?;
        tracing::info!(
            user_sub = %outcome.user_sub,
            confirmed = outcome.confirmed,
            "provider sign-up accepted"
        );

        let profile = self
            .directory
            .create_user(NewUser {
                id: Some(outcome.user_sub),
                email: registration.email,
                name: registration.name,
                role: registration.role,
                password_hash: None,
                parent_id: registration.parent_id,
            })
            .await?;
        Ok(profile)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let tokens = self
            .provider
            .initiate_auth(email, password)
            .await
            .map_err(provider_error)?;

        let claims = self.verifier.verify(&tokens.id_token).await.map_err(|err| {
            ApiError::server("Identity provider returned an unusable token", err)
        })?;
        let Some(user) = self.directory.get_by_id(&claims.sub).await? else {
            tracing::warn!(sub = %claims.sub, "provider login for user without a profile");
            return Err(ApiError::not_found("User not found"));
        };

        tracing::info!(user_id = %user.user_id, "user logged in via identity provider");
        Ok(LoginOutcome {
            user,
            token: tokens.id_token.clone(),
            tokens: Some(tokens),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderTokens, ApiError> {
        self.provider
            .refresh(refresh_token)
            .await
            .map_err(provider_error)
    }

    async fn verify_token(&self, token: &str) -> Result<IdentityContext, ApiError> {
        match self.verifier.verify(token).await {
            Ok(claims) => Ok(IdentityContext {
                role: claims.role(),
                subject: claims.sub,
            }),
            Err(ExternalAuthError::Rejected(rejection)) => {
                tracing::debug!(%rejection, "provider token rejected");
                Err(ApiError::invalid_token())
            }
            Err(err) => {
                // Key set unavailable; the caller still only sees a token failure
                tracing::error!(error = %err, "could not verify provider token");
                Err(ApiError::invalid_token())
            }
        }
    }
}
