/**
 * Session Tokens
 *
 * HS256 tokens carrying `{sub, role, iat, exp}`. Expiry is checked against
 * an injected [`Clock`] rather than the system time so tests can move past
 * the TTL without sleeping.
 */

use chrono::TimeDelta;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::shared::{Clock, Role};

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration time (Unix seconds)
    pub exp: i64,
}

/// Why a token was rejected.
///
/// The distinction is for logs only; clients always see one "invalid"
/// outcome.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("bad token signature")]
    BadSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token lifetime out of range, got {0}s")]
    InvalidTtl(i64),

    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// Issues and validates session tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let ttl = TimeDelta::try_seconds(ttl_secs)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or(TokenError::InvalidTtl(ttl_secs))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        })
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Create a token for a user
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, TokenError> {
        let iat = self.clock.now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat,
            exp: iat + self.ttl.num_seconds(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)
    }

    /// Verify signature and expiry
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(err.to_string()),
            })?
            .claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ManualClock;
    use assert_matches::assert_matches;
    use chrono::DateTime;

    fn issuer_with_clock() -> (TokenIssuer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let issuer = TokenIssuer::new("test-secret", 3600, clock.clone()).unwrap();
        (issuer, clock)
    }

    #[test]
    fn test_issue_and_validate() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer.issue("user-1", Role::Parent).unwrap();
        assert!(!token.is_empty());

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Parent);
        assert_eq!(claims.iat, 1_700_000_000);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let (issuer, clock) = issuer_with_clock();
        let token = issuer.issue("user-1", Role::Child).unwrap();

        clock.advance(TimeDelta::seconds(3599));
        assert!(issuer.validate(&token).is_ok());

        clock.advance(TimeDelta::seconds(1));
        assert_matches!(issuer.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer.issue("user-1", Role::Admin).unwrap();

        for (index, original) in token.char_indices() {
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(index..index + 1, &replacement.to_string());
            assert!(
                issuer.validate(&tampered).is_err(),
                "tampering at {index} went unnoticed"
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let (issuer, clock) = issuer_with_clock();
        let other = TokenIssuer::new("other-secret", 3600, clock).unwrap();
        let token = other.issue("user-1", Role::Admin).unwrap();
        assert_matches!(issuer.validate(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (issuer, _) = issuer_with_clock();
        assert_matches!(issuer.validate("invalid.token.here"), Err(TokenError::Malformed(_)));
        assert_matches!(issuer.validate(""), Err(TokenError::Malformed(_)));
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        assert_matches!(
            TokenIssuer::new("secret", 0, clock.clone()),
            Err(TokenError::InvalidTtl(0))
        );
        assert_matches!(TokenIssuer::new("secret", -5, clock), Err(TokenError::InvalidTtl(-5)));
    }

    #[test]
    fn test_unrepresentable_ttl_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        assert_matches!(
            TokenIssuer::new("secret", i64::MAX, clock),
            Err(TokenError::InvalidTtl(i64::MAX))
        );
    }
}
