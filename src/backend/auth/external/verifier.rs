/**
 * External Token Verifier
 *
 * Checks, in order: token shape, header key id, key id present in the key
 * set, claims decodable, not expired, `token_use` is `access` or `id`,
 * audience matches the app client, and finally the RSA signature. Claims are
 * returned only when every check passes.
 */

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::jwks::JwksCache;
use super::{ExternalAuthError, TokenRejection};
use crate::shared::{Clock, Role};

/// Claims carried by provider-issued access and id tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalClaims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub token_use: Option<String>,
    /// Present on access tokens
    #[serde(default)]
    pub client_id: Option<String>,
    /// Present on id tokens; a string or an array of strings
    #[serde(default)]
    pub aud: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "cognito:groups", default)]
    pub groups: Vec<String>,
    #[serde(rename = "custom:role", default)]
    pub custom_role: Option<String>,
}

impl ExternalClaims {
    /// First group, else `custom:role`; anything unknown is `child`
    pub fn role(&self) -> Role {
        self.groups
            .first()
            .or(self.custom_role.as_ref())
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    fn audience_matches(&self, client_id: &str) -> bool {
        if self.client_id.as_deref() == Some(client_id) {
            return true;
        }
        match &self.aud {
            Some(Value::String(aud)) => aud == client_id,
            Some(Value::Array(values)) => values.iter().any(|aud| aud.as_str() == Some(client_id)),
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct ExternalTokenVerifier {
    jwks: JwksCache,
    client_id: String,
    clock: Arc<dyn Clock>,
}

impl ExternalTokenVerifier {
    pub fn new(jwks: JwksCache, client_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            jwks,
            client_id: client_id.into(),
            clock,
        }
    }

    pub fn jwks(&self) -> &JwksCache {
        &self.jwks
    }

    pub async fn verify(&self, token: &str) -> Result<ExternalClaims, ExternalAuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [_, payload, _] = segments.as_slice() else {
            return Err(TokenRejection::Malformed.into());
        };

        let header = decode_header(token).map_err(|_| TokenRejection::Malformed)?;
        let kid = header.kid.ok_or(TokenRejection::MissingKeyId)?;

        let key_set = self.jwks.get_key_set().await?;
        let jwk = key_set
            .find(&kid)
            .ok_or_else(|| TokenRejection::UnknownKeyId(kid.clone()))?;

        let claims = decode_unverified_claims(payload)?;

        if let Some(exp) = claims.exp {
            if self.clock.now().timestamp() > exp {
                return Err(TokenRejection::Expired.into());
            }
        }

        match claims.token_use.as_deref() {
            Some("access" | "id") => {}
            other => return Err(TokenRejection::InvalidTokenUse(other.map(str::to_string)).into()),
        }

        if !claims.audience_matches(&self.client_id) {
            return Err(TokenRejection::AudienceMismatch.into());
        }

        if !matches!(header.alg, Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512) {
            return Err(TokenRejection::UnsupportedAlgorithm(format!("{:?}", header.alg)).into());
        }
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|err| TokenRejection::UnusableKey(format!("{kid}: {err}")))?;

        // Every claim check above has already run; only the signature is left.
        let mut validation = Validation::new(header.alg);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        decode::<Value>(token, &key, &validation).map_err(|err| match err.kind() {
            ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            _ => TokenRejection::InvalidClaims(err.to_string()),
        })?;

        Ok(claims)
    }
}

fn decode_unverified_claims(payload: &str) -> Result<ExternalClaims, TokenRejection> {
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| TokenRejection::InvalidClaims(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| TokenRejection::InvalidClaims(err.to_string()))
}
