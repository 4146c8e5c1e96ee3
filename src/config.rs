// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration supplied by the host.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::{DEFAULT_CLIENT_ID, DEFAULT_REGION, IdentityClient};
use crate::realtime::RealtimeClient;
use crate::rest::{DEFAULT_BASE_URL, RestClient};
use crate::session::Poller;
use crate::types::{ChargerTarget, Connector};

/// Connection settings for one charger session.
///
/// Every field except the charger identifier has a default, so a stored
/// configuration only needs to carry what differs.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wevo_lib::config::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(
///     r#"{"charger_identifier": "WEVO-0042", "connector": "2"}"#,
/// ).unwrap();
/// assert_eq!(config.base_url, "https://api.wevo.energy/mobileapp");
/// assert_eq!(config.target().connector().value(), 2);
/// assert_eq!(config.poll_interval(), Duration::from_secs(15));
///
/// let config = SessionConfig::new("WEVO-0042")
///     .with_base_url("http://localhost:8080")
///     .with_poll_interval(Duration::from_secs(30));
/// assert_eq!(config.poll_interval_secs, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// REST base URL; the WebSocket URL is derived from it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Region of the identity user pool.
    #[serde(default = "default_region")]
    pub identity_region: String,
    /// App client id registered with the identity provider.
    #[serde(default = "default_client_id")]
    pub identity_client_id: String,
    /// Charger this session controls.
    pub charger_identifier: String,
    /// Connector on the charger.
    #[serde(default)]
    pub connector: Connector,
    /// Seconds between status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_poll_interval_secs() -> u64 {
    SessionConfig::DEFAULT_POLL_INTERVAL.as_secs()
}

impl SessionConfig {
    /// Default time between status polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

    /// Creates a configuration with defaults for `charger_identifier`.
    #[must_use]
    pub fn new(charger_identifier: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            identity_region: default_region(),
            identity_client_id: default_client_id(),
            charger_identifier: charger_identifier.into(),
            connector: Connector::default(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }

    /// Sets the REST base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the identity region and app client id.
    #[must_use]
    pub fn with_identity(mut self, region: impl Into<String>, client_id: impl Into<String>) -> Self {
        self.identity_region = region.into();
        self.identity_client_id = client_id.into();
        self
    }

    /// Sets the connector.
    #[must_use]
    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }

    /// Sets the poll interval, in whole seconds.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_secs = interval.as_secs();
        self
    }

    /// Returns the poll interval, never shorter than one second.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs).max(Poller::MIN_INTERVAL)
    }

    /// Returns the charger target.
    #[must_use]
    pub fn target(&self) -> ChargerTarget {
        ChargerTarget::new(self.charger_identifier.clone(), self.connector)
    }

    /// Builds the identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn identity_client(&self) -> Result<IdentityClient> {
        Ok(IdentityClient::new(
            &self.identity_region,
            self.identity_client_id.clone(),
        )?)
    }

    /// Builds the REST client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn rest_client(&self) -> Result<RestClient> {
        Ok(RestClient::new(self.base_url.clone())?)
    }

    /// Builds the realtime client.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL has no `http`/`https` scheme.
    pub fn realtime_client(&self) -> Result<RealtimeClient> {
        Ok(RealtimeClient::new(&self.base_url)?)
    }
}
