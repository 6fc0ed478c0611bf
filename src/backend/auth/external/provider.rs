/**
 * Identity Provider Client
 *
 * Minimal client for the Cognito user-pool JSON API: `SignUp` and
 * `InitiateAuth` (password and refresh-token flows). Requests are JSON
 * bodies POSTed to the endpoint root with an `X-Amz-Target` header naming
 * the operation.
 */

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::jwks::HTTP_TIMEOUT;
use super::ExternalAuthError;
use crate::shared::Role;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Tokens returned by a successful provider login or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTokens {
    pub access_token: String,
    pub id_token: String,
    /// Absent on refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    user_sub: String,
    #[serde(default)]
    user_confirmed: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: String,
}

/// The result of a provider sign-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Provider subject id
    pub user_sub: String,
    pub confirmed: bool,
}

#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

impl ProviderClient {
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Result<Self, ExternalAuthError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            client_id: client_id.into(),
        })
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<SignUpOutcome, ExternalAuthError> {
        let body = json!({
            "ClientId": self.client_id,
            "Username": email,
            "Password": password,
            "UserAttributes": [
                { "Name": "email", "Value": email },
                { "Name": "name", "Value": name },
                { "Name": "custom:role", "Value": role.as_str() },
            ],
        });
        let response: SignUpResponse = self.call("SignUp", body).await?;
        Ok(SignUpOutcome {
            user_sub: response.user_sub,
            confirmed: response.user_confirmed,
        })
    }

    /// `USER_PASSWORD_AUTH` login
    pub async fn initiate_auth(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderTokens, ExternalAuthError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "USERNAME": email, "PASSWORD": password },
        });
        self.authenticate(body).await
    }

    /// `REFRESH_TOKEN_AUTH` flow
    pub async fn refresh(&self, refresh_token: &str) -> Result<ProviderTokens, ExternalAuthError> {
        let body = json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "REFRESH_TOKEN": refresh_token },
        });
        self.authenticate(body).await
    }

    async fn authenticate(&self, body: Value) -> Result<ProviderTokens, ExternalAuthError> {
        let response: InitiateAuthResponse = self.call("InitiateAuth", body).await?;
        match (response.authentication_result, response.challenge_name) {
            (Some(result), _) => Ok(ProviderTokens {
                access_token: result.access_token,
                id_token: result.id_token,
                refresh_token: result.refresh_token,
                expires_in: result.expires_in,
                token_type: result.token_type.unwrap_or_else(|| "Bearer".to_string()),
            }),
            (None, Some(challenge)) => Err(ExternalAuthError::UnexpectedResponse(format!(
                "unsupported challenge {challenge}"
            ))),
            (None, None) => Err(ExternalAuthError::UnexpectedResponse(
                "no authentication result".to_string(),
            )),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: Value,
    ) -> Result<T, ExternalAuthError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let error: ProviderErrorBody = serde_json::from_str(&text).map_err(|_| {
                ExternalAuthError::UnexpectedResponse(format!("{operation} returned {status}"))
            })?;
            // `__type` may be namespaced, e.g. `com.amazonaws...#NotAuthorizedException`
            let code = error
                .kind
                .rsplit('#')
                .next()
                .unwrap_or_default()
                .to_string();
            tracing::warn!(operation, %code, "identity provider rejected request");
            return Err(ExternalAuthError::Provider {
                code,
                message: error.message,
            });
        }

        serde_json::from_str(&text)
            .map_err(|err| ExternalAuthError::UnexpectedResponse(format!("{operation}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> ProviderClient {
        ProviderClient::new(server.uri(), "client-123").unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_sends_attributes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", "AWSCognitoIdentityProviderService.SignUp"))
            .and(header("content-type", CONTENT_TYPE))
            .and(body_partial_json(json!({
                "ClientId": "client-123",
                "Username": "p@example.com",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "UserSub": "sub-1", "UserConfirmed": false })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client(&server)
            .await
            .sign_up("p@example.com", "password123", "P", Role::Parent)
            .await
            .unwrap();
        assert_eq!(outcome.user_sub, "sub-1");
        assert!(!outcome.confirmed);
    }

    #[tokio::test]
    async fn test_password_login_returns_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", "AWSCognitoIdentityProviderService.InitiateAuth"))
            .and(body_partial_json(json!({ "AuthFlow": "USER_PASSWORD_AUTH" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "AccessToken": "access",
                    "IdToken": "id",
                    "RefreshToken": "refresh",
                    "ExpiresIn": 3600,
                    "TokenType": "Bearer"
                }
            })))
            .mount(&server)
            .await;

        let tokens = client(&server)
            .await
            .initiate_auth("p@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(tokens.id_token, "id");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(tokens.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_provider_error_code_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "com.amazonaws.cognito#NotAuthorizedException",
                "message": "Incorrect username or password."
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .initiate_auth("p@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(err.is_provider_code("NotAuthorizedException"));
    }

    #[tokio::test]
    async fn test_challenge_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ChallengeName": "NEW_PASSWORD_REQUIRED",
                "Session": "abc"
            })))
            .mount(&server)
            .await;

        let err = client(&server).await.refresh("refresh").await.unwrap_err();
        assert_matches!(err, ExternalAuthError::UnexpectedResponse(_));
    }
}
