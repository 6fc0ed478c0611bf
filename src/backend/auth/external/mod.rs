//! External Identity Provider
//!
//! Verification of tokens issued by a managed identity provider
//! (Cognito-compatible) and the HTTP client for its sign-up, login and
//! refresh operations.
//!
//! # Module Structure
//!
//! ```text
//! external/
//! ├── mod.rs       - Error types
//! ├── jwks.rs      - JWKS fetcher and TTL cache
//! ├── verifier.rs  - Token verification and claim decoding
//! └── provider.rs  - Provider API client
//! ```

use thiserror::Error;

/// JWKS fetching and caching
pub mod jwks;

/// Token verification
pub mod verifier;

/// Provider API client
pub mod provider;

pub use jwks::{HttpJwksFetcher, JwksCache, JwksFetcher};
pub use provider::{ProviderClient, ProviderTokens, SignUpOutcome};
pub use verifier::{ExternalClaims, ExternalTokenVerifier};

/// Why an externally issued token was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("token is not three dot-separated segments")]
    Malformed,

    #[error("token header has no key id")]
    MissingKeyId,

    #[error("key id {0:?} is not in the key set")]
    UnknownKeyId(String),

    #[error("token claims could not be decoded: {0}")]
    InvalidClaims(String),

    #[error("token expired")]
    Expired,

    #[error("unexpected token_use {0:?}")]
    InvalidTokenUse(Option<String>),

    #[error("token audience does not match the app client")]
    AudienceMismatch,

    #[error("unsupported signing algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error("key {0} cannot be used for verification")]
    UnusableKey(String),

    #[error("signature verification failed")]
    BadSignature,
}

/// External identity errors
#[derive(Debug, Error)]
pub enum ExternalAuthError {
    #[error("token rejected: {0}")]
    Rejected(#[from] TokenRejection),

    #[error("failed to fetch JWKS from {url}: {source}")]
    JwksFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An error reported by the provider, e.g. `NotAuthorizedException`
    #[error("identity provider error {code}: {message}")]
    Provider { code: String, message: String },

    #[error("unexpected identity provider response: {0}")]
    UnexpectedResponse(String),
}

impl ExternalAuthError {
    /// Whether this is a provider error with the given exception name
    pub fn is_provider_code(&self, expected: &str) -> bool {
        matches!(self, Self::Provider { code, .. } if code == expected)
    }
}
