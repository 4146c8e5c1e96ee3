// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity provider client.
//!
//! Wevo accounts live in a Cognito user pool. Both the password login and the
//! refresh-token exchange are `InitiateAuth` calls against the regional
//! endpoint, distinguished by the `AuthFlow` field.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuthError;
use crate::token::{TokenSet, unix_now};
use crate::types::Credentials;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// App client id of the Wevo mobile app.
pub const DEFAULT_CLIENT_ID: &str = "2amm11et52j39kubdekse641b6";

/// Prefix some provisioned accounts need in front of their e-mail address.
pub const NAMESPACE_PREFIX: &str = "wevo/";

const AMZ_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Auth flow discriminator of an `InitiateAuth` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthFlow {
    UserPassword,
    RefreshToken,
}

impl AuthFlow {
    fn as_str(self) -> &'static str {
        match self {
            Self::UserPassword => "USER_PASSWORD_AUTH",
            Self::RefreshToken => "REFRESH_TOKEN_AUTH",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Returns the namespaced form of a bare login identifier.
///
/// Returns `None` if the identifier already carries the namespace prefix.
#[must_use]
pub fn namespaced_variant(identifier: &str) -> Option<String> {
    if identifier.starts_with(NAMESPACE_PREFIX) {
        None
    } else {
        Some(format!("{NAMESPACE_PREFIX}{identifier}"))
    }
}

/// Client for the Cognito `InitiateAuth` endpoint.
///
/// # Examples
///
/// ```no_run
/// use wevo_lib::identity::IdentityClient;
/// use wevo_lib::types::Credentials;
///
/// # async fn example() -> Result<(), wevo_lib::error::AuthError> {
/// let identity = IdentityClient::new("eu-central-1", "my-client-id")?;
/// let tokens = identity
///     .login(Credentials::new("driver@example.com", "secret"))
///     .await?;
/// println!("logged in as {}", tokens.identity_username);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: Client,
    endpoint: String,
    client_id: String,
    timeout: Duration,
}

impl IdentityClient {
    /// Default timeout of one identity call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    /// Creates a client for the user pool in `region`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(region: &str, client_id: impl Into<String>) -> Result<Self, AuthError> {
        let http = Client::builder().build().map_err(AuthError::Client)?;
        Ok(Self {
            http,
            endpoint: format!("https://cognito-idp.{region}.amazonaws.com/"),
            client_id: client_id.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Overrides the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the timeout of one identity call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Logs in with a password.
    ///
    /// The identifier is tried as supplied first; if the provider rejects it
    /// and it has no namespace prefix, the [`namespaced_variant`] is tried
    /// once more. The accepted form is recorded as
    /// [`TokenSet::identity_username`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LoginFailed`] wrapping the last failure once
    /// every variant has been rejected.
    pub async fn login(&self, credentials: Credentials) -> Result<TokenSet, AuthError> {
        let username = credentials.username();
        let first_error = match self.password_login(username, &credentials).await {
            Ok(tokens) => return Ok(tokens),
            Err(err) => err,
        };

        let Some(namespaced) = namespaced_variant(username) else {
            return Err(AuthError::LoginFailed(Box::new(first_error)));
        };
        tracing::debug!(error = %first_error, "Bare username rejected, retrying with namespace");

        self.password_login(&namespaced, &credentials)
            .await
            .map_err(|err| AuthError::LoginFailed(Box::new(err)))
    }

    async fn password_login(
        &self,
        username: &str,
        credentials: &Credentials,
    ) -> Result<TokenSet, AuthError> {
        let parameters = AuthParameters {
            username: Some(username),
            password: Some(credentials.password()),
            ..AuthParameters::default()
        };
        let result = self
            .initiate_auth(AuthFlow::UserPassword, parameters)
            .await?;
        let tokens = tokens_from(result, None, username.to_string(), AuthFlow::UserPassword)?;
        tracing::info!(username = %tokens.identity_username, "Logged in");
        Ok(tokens)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The provider does not rotate refresh tokens; `refresh_token` is kept
    /// unless the response carries a new one.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the token or the call fails.
    pub async fn refresh(&self, refresh_token: &str, username: &str) -> Result<TokenSet, AuthError> {
        let parameters = AuthParameters {
            refresh_token: Some(refresh_token),
            ..AuthParameters::default()
        };
        let result = self
            .initiate_auth(AuthFlow::RefreshToken, parameters)
            .await?;
        let tokens = tokens_from(
            result,
            Some(refresh_token),
            username.to_string(),
            AuthFlow::RefreshToken,
        )?;
        tracing::info!(expires_at = tokens.expires_at, "Access token refreshed");
        Ok(tokens)
    }

    async fn initiate_auth(
        &self,
        flow: AuthFlow,
        auth_parameters: AuthParameters<'_>,
    ) -> Result<AuthenticationResult, AuthError> {
        let request = InitiateAuthRequest {
            auth_flow: flow.as_str(),
            client_id: &self.client_id,
            auth_parameters,
        };
        let body = serde_json::to_vec(&request)?;

        tracing::debug!(endpoint = %self.endpoint, flow = flow.as_str(), "Sending identity request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", AMZ_TARGET)
            .header(CONTENT_TYPE, AMZ_JSON)
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let text = response.text().await.map_err(|err| self.classify(err))?;

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) if status.is_client_error() || status.is_server_error() => {
                return Err(AuthError::Rejected {
                    status: status.as_u16(),
                    message: text.chars().take(200).collect(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        if status.as_u16() >= 400 || value.get("__type").is_some() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message: provider_message(&value),
            });
        }

        let parsed: InitiateAuthResponse = serde_json::from_value(value)?;
        Ok(parsed.authentication_result.unwrap_or_default())
    }

    fn classify(&self, err: reqwest::Error) -> AuthError {
        if err.is_timeout() {
            AuthError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            AuthError::Http(err)
        }
    }
}

fn provider_message(value: &Value) -> String {
    value
        .get("message")
        .or_else(|| value.get("Message"))
        .and_then(Value::as_str)
        .map_or_else(|| value.to_string(), str::to_string)
}

fn tokens_from(
    result: AuthenticationResult,
    previous_refresh_token: Option<&str>,
    identity_username: String,
    flow: AuthFlow,
) -> Result<TokenSet, AuthError> {
    let access_token = result
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAccessToken {
            flow: flow.as_str(),
        })?;
    let expires_in = result.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);

    Ok(TokenSet {
        access_token,
        refresh_token: result
            .refresh_token
            .or_else(|| previous_refresh_token.map(str::to_string)),
        expires_at: unix_now() + expires_in,
        identity_username,
    })
}
