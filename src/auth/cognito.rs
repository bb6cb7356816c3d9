//! Cognito user pool client (Identity Provider JSON protocol).
//!
//! Only public-client operations are used, so requests are unsigned:
//! `InitiateAuth` with `USER_PASSWORD_AUTH` and `REFRESH_TOKEN_AUTH`,
//! `SignUp`, and `GlobalSignOut`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::{AuthError, IdentityProvider, LoginOutcome, Session, SignUpOutcome, SignUpRequest};
use crate::aws::regional_host;
use crate::config::AuthConfig;

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

pub struct CognitoProvider {
    http_client: Client,
    endpoint: Url,
    client_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    #[serde(default)]
    user_confirmed: bool,
    user_sub: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    error_type: String,
    #[serde(alias = "Message", default)]
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType<'a> {
    name: &'a str,
    value: &'a str,
}

impl CognitoProvider {
    pub fn new(endpoint: Url, client_id: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            endpoint,
            client_id: client_id.into(),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}/", regional_host("cognito-idp", &config.region)),
        };
        let endpoint = Url::parse(&endpoint).with_context(|| format!("Invalid auth endpoint '{}'", endpoint))?;
        Self::new(endpoint, &config.client_id)
    }

    async fn call<T: DeserializeOwned>(&self, operation: &str, body: serde_json::Value) -> Result<T, AuthError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AuthError::Network(e.to_string()))?;

        if !status.is_success() {
            debug!("{} answered {}: {}", operation, status, text);
            return Err(parse_error(&text, status.as_u16()));
        }

        serde_json::from_str(&text).map_err(|e| AuthError::Service {
            code: "InvalidResponse".to_string(),
            message: format!("{} response could not be read: {}", operation, e),
        })
    }

    fn session_from(username: &str, result: AuthenticationResult, previous_refresh: Option<&str>) -> Session {
        Session {
            username: username.to_string(),
            id_token: result.id_token,
            access_token: result.access_token,
            refresh_token: result.refresh_token.or_else(|| previous_refresh.map(str::to_string)),
            expires_at: Utc::now() + Duration::seconds(result.expires_in),
        }
    }
}

/// Map a Cognito error body to [`AuthError`]; `__type` may carry a namespace before `#`
fn parse_error(text: &str, status: u16) -> AuthError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or(ErrorBody {
        error_type: String::new(),
        message: String::new(),
    });
    let code = body.error_type.rsplit('#').next().unwrap_or_default().to_string();
    let message = body.message;

    match code.as_str() {
        "NotAuthorizedException" | "UserNotFoundException" => AuthError::InvalidCredentials(message),
        "UserNotConfirmedException" => AuthError::UserNotConfirmed(message),
        "UsernameExistsException" => AuthError::UsernameExists(message),
        "InvalidPasswordException" => AuthError::InvalidPassword(message),
        "InvalidParameterException" => AuthError::InvalidParameter(message),
        "" => AuthError::Service {
            code: format!("HTTP {}", status),
            message: if message.is_empty() { text.to_string() } else { message },
        },
        _ => AuthError::Service { code, message },
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError> {
        let attributes = [
            AttributeType {
                name: "email",
                value: &request.email,
            },
            AttributeType {
                name: "name",
                value: &request.name,
            },
        ];
        let body = json!({
            "ClientId": self.client_id,
            "Username": request.email,
            "Password": request.password,
            "UserAttributes": attributes,
        });

        let response: SignUpResponse = self.call("SignUp", body).await?;
        Ok(SignUpOutcome {
            user_confirmed: response.user_confirmed,
            user_sub: response.user_sub,
        })
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "USERNAME": username, "PASSWORD": password },
        });

        let response: InitiateAuthResponse = self.call("InitiateAuth", body).await?;
        match (response.authentication_result, response.challenge_name.as_deref()) {
            (Some(result), _) => Ok(LoginOutcome::Authenticated(Self::session_from(username, result, None))),
            (None, Some("NEW_PASSWORD_REQUIRED")) => Ok(LoginOutcome::NewPasswordRequired),
            (None, challenge) => Err(AuthError::Service {
                code: "UnsupportedChallenge".to_string(),
                message: format!("Unsupported sign-in challenge: {}", challenge.unwrap_or("none")),
            }),
        }
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let refresh_token = session.refresh_token.as_deref().ok_or(AuthError::SessionExpired)?;
        let body = json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "REFRESH_TOKEN": refresh_token },
        });

        let response: InitiateAuthResponse = self.call("InitiateAuth", body).await?;
        let result = response.authentication_result.ok_or(AuthError::SessionExpired)?;
        Ok(Self::session_from(&session.username, result, Some(refresh_token)))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let body = json!({ "AccessToken": session.access_token });
        let _: serde_json::Value = self.call("GlobalSignOut", body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_namespace_is_stripped() {
        let err = parse_error(
            r#"{"__type":"com.amazonaws.cognito#UsernameExistsException","message":"User already exists"}"#,
            400,
        );
        assert_eq!(err, AuthError::UsernameExists("User already exists".to_string()));
    }

    #[test]
    fn unknown_body_becomes_service_error() {
        let err = parse_error("gateway timeout", 504);
        assert!(matches!(err, AuthError::Service { ref code, .. } if code == "HTTP 504"));
    }
}
