// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! REST client for the Wevo mobile-app API.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::error::ApiError;
use crate::response::{ProfileRecord, TransactionRecord};

/// Base URL of the production mobile-app API.
pub const DEFAULT_BASE_URL: &str = "https://api.wevo.energy/mobileapp";

const PROFILE_PATH: &str = "/rest/user/details?refreshCognitoData=false";
const TRANSACTIONS_PATH: &str = "/rest/transactions";
const ERROR_BODY_LIMIT: usize = 200;

/// Bearer-authenticated GET client for profile and transaction resources.
///
/// The client holds no session state; the access token is passed per call.
///
/// # Examples
///
/// ```no_run
/// use wevo_lib::rest::RestClient;
///
/// # async fn example() -> Result<(), wevo_lib::error::ApiError> {
/// let rest = RestClient::new("https://api.wevo.energy/mobileapp")?;
/// let history = rest.get_transactions("access-token").await?;
/// if let Some(latest) = history.first() {
///     println!("last session: {:?} kWh", latest.total_energy_kwh);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl RestClient {
    /// Default timeout of one REST call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Creates a client for `base_url`; a trailing slash is ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder().build().map_err(ApiError::Client)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Sets the timeout of one REST call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the account profile.
    ///
    /// # Errors
    ///
    /// Returns error on a non-success status, timeout, or undecodable body.
    pub async fn get_profile(&self, access_token: &str) -> Result<ProfileRecord, ApiError> {
        let value = self.get_json(PROFILE_PATH, access_token).await?;
        serde_json::from_value(value).map_err(|source| ApiError::InvalidBody {
            path: PROFILE_PATH.to_string(),
            source,
        })
    }

    /// Fetches the transaction history, newest first.
    ///
    /// A body that is not a JSON array yields an empty history; entries that
    /// are not records are skipped.
    ///
    /// # Errors
    ///
    /// Returns error on a non-success status, timeout, or non-JSON body.
    pub async fn get_transactions(
        &self,
        access_token: &str,
    ) -> Result<Vec<TransactionRecord>, ApiError> {
        let value = self.get_json(TRANSACTIONS_PATH, access_token).await?;
        let Value::Array(entries) = value else {
            tracing::warn!("Transaction history is not a list, treating as empty");
            return Ok(Vec::new());
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping malformed transaction record");
                    None
                }
            })
            .collect())
    }

    async fn get_json(&self, path: &str, access_token: &str) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.base_url);

        tracing::debug!(url = %url, "Sending REST request");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.classify(path, err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.classify(path, err))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        tracing::debug!(path = %path, bytes = body.len(), "Received REST response");

        serde_json::from_str(&body).map_err(|source| ApiError::InvalidBody {
            path: path.to_string(),
            source,
        })
    }

    fn classify(&self, path: &str, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                path: path.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            ApiError::Http {
                path: path.to_string(),
                source: err,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = RestClient::new("https://api.wevo.energy/mobileapp/").unwrap();
        assert_eq!(client.base_url(), "https://api.wevo.energy/mobileapp");
    }

    #[test]
    fn default_timeout() {
        let client = RestClient::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(client.timeout, Duration::from_secs(15));
    }
}
