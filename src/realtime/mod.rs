// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Realtime command protocol over WebSocket.
//!
//! Every command opens its own connection to `<base>/ws` (scheme swapped to
//! `ws`/`wss`), sends a single JSON frame, reads the reply frames, and closes
//! the connection. The server keeps command context per connection, so
//! connections are never reused.
//!
//! The two commands read replies differently:
//!
//! - `getState` needs data: up to 5 frames with an 8 second timeout each,
//!   returning the first frame whose `chargerIdentifier` matches. Frames for
//!   other chargers are skipped.
//! - `authorize` only needs delivery: up to 6 frames with a 1 second timeout
//!   each are drained and discarded. Silence is success.

mod channel;

use std::time::Duration;

use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::ProtocolError;
use crate::response::StateResponse;
use crate::types::ChargerTarget;

use channel::CommandChannel;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WS_PATH: &str = "/ws";

/// How many reply frames to read and how long to wait for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPolicy {
    /// Maximum number of frames to read.
    pub attempts: usize,
    /// Timeout for each frame.
    pub frame_timeout: Duration,
}

impl ReadPolicy {
    /// Reply policy for `getState`.
    pub const STATE: Self = Self::new(5, Duration::from_secs(8));

    /// Reply policy for fire-and-forget commands such as `authorize`.
    pub const COMMAND: Self = Self::new(6, Duration::from_secs(1));

    /// Creates a policy.
    #[must_use]
    pub const fn new(attempts: usize, frame_timeout: Duration) -> Self {
        Self {
            attempts,
            frame_timeout,
        }
    }
}

/// Commands understood by the realtime endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealtimeCommand {
    /// Query live charger state.
    GetState,
    /// Authorize (start) a charging session.
    Authorize,
}

impl RealtimeCommand {
    /// Returns the wire name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetState => "getState",
            Self::Authorize => "authorize",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandFrame<'a> {
    command: &'static str,
    charger_identifier: &'a str,
    connector: String,
}

impl<'a> CommandFrame<'a> {
    fn new(command: RealtimeCommand, target: &'a ChargerTarget) -> Self {
        Self {
            command: command.as_str(),
            charger_identifier: target.charger_identifier(),
            connector: target.connector().to_string(),
        }
    }
}

/// Derives the WebSocket URL from the REST base URL.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidUrl`] if the base URL is not `http` or
/// `https`.
///
/// # Examples
///
/// ```
/// use wevo_lib::realtime::websocket_url;
///
/// assert_eq!(
///     websocket_url("https://api.wevo.energy/mobileapp/").unwrap(),
///     "wss://api.wevo.energy/mobileapp/ws"
/// );
/// ```
pub fn websocket_url(base_url: &str) -> Result<String, ProtocolError> {
    let base = base_url.trim_end_matches('/');
    let swapped = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(ProtocolError::InvalidUrl(base_url.to_string()));
    };
    Ok(format!("{swapped}{WS_PATH}"))
}

/// Client for the realtime command protocol.
///
/// Stateless: the access token and target are passed per call.
///
/// # Examples
///
/// ```no_run
/// use wevo_lib::realtime::RealtimeClient;
/// use wevo_lib::types::{ChargerTarget, Connector};
///
/// # async fn example() -> Result<(), wevo_lib::error::ProtocolError> {
/// let realtime = RealtimeClient::new("https://api.wevo.energy/mobileapp")?;
/// let target = ChargerTarget::new("WEVO-0042", Connector::default());
/// let state = realtime.get_state("access-token", &target).await?;
/// println!("charger is {:?}", state.state());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    ws_url: String,
    state_policy: ReadPolicy,
    command_policy: ReadPolicy,
    heartbeat: Duration,
    connect_timeout: Duration,
}

impl RealtimeClient {
    /// Default interval between keep-alive pings.
    pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(20);

    /// Default timeout for the WebSocket handshake.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Creates a client for the REST base URL `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if no WebSocket URL can be derived from `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ProtocolError> {
        Ok(Self {
            ws_url: websocket_url(base_url)?,
            state_policy: ReadPolicy::STATE,
            command_policy: ReadPolicy::COMMAND,
            heartbeat: Self::DEFAULT_HEARTBEAT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Sets the reply policy for `getState`.
    #[must_use]
    pub fn with_state_policy(mut self, policy: ReadPolicy) -> Self {
        self.state_policy = policy;
        self
    }

    /// Sets the reply policy for `authorize`.
    #[must_use]
    pub fn with_command_policy(mut self, policy: ReadPolicy) -> Self {
        self.command_policy = policy;
        self
    }

    /// Sets the keep-alive ping interval; zero disables the ping.
    #[must_use]
    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Sets the handshake timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the WebSocket URL.
    #[must_use]
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Queries the live state of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NoStateResponse`] if no frame for the charger
    /// arrives within the attempt budget, [`ProtocolError::Timeout`] if a
    /// frame wait or the handshake times out, or a transport error.
    pub async fn get_state(
        &self,
        access_token: &str,
        target: &ChargerTarget,
    ) -> Result<StateResponse, ProtocolError> {
        let mut channel = self.open(access_token).await?;

        let result = match channel
            .send_json(&CommandFrame::new(RealtimeCommand::GetState, target))
            .await
        {
            Ok(()) => {
                channel
                    .await_state(target.charger_identifier(), self.state_policy)
                    .await
            }
            Err(err) => Err(err),
        };

        channel.close().await;
        result
    }

    /// Sends the `authorize` command for `target`.
    ///
    /// Replies are drained but not required.
    ///
    /// # Errors
    ///
    /// Returns error only if the connection or the send fails.
    pub async fn authorize(
        &self,
        access_token: &str,
        target: &ChargerTarget,
    ) -> Result<(), ProtocolError> {
        let mut channel = self.open(access_token).await?;

        let result = channel
            .send_json(&CommandFrame::new(RealtimeCommand::Authorize, target))
            .await;
        if result.is_ok() {
            let received = channel.drain(self.command_policy).await;
            tracing::debug!(received, charger = %target, "Authorize command delivered");
        }

        channel.close().await;
        result
    }

    async fn open(&self, access_token: &str) -> Result<CommandChannel<Socket>, ProtocolError> {
        let mut request = self.ws_url.as_str().into_client_request()?;
        let bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|_| ProtocolError::InvalidToken)?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (stream, _response) = tokio::time::timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| ProtocolError::Timeout {
                operation: "websocket connect",
                timeout_ms: u64::try_from(self.connect_timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        tracing::debug!(url = %self.ws_url, "Realtime socket connected");
        Ok(CommandChannel::new(stream, self.heartbeat))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Connector;

    #[test]
    fn url_scheme_is_swapped() {
        assert_eq!(
            websocket_url("http://127.0.0.1:8080").unwrap(),
            "ws://127.0.0.1:8080/ws"
        );
        assert_eq!(
            websocket_url("https://api.wevo.energy/mobileapp").unwrap(),
            "wss://api.wevo.energy/mobileapp/ws"
        );
    }

    #[test]
    fn url_requires_http_scheme() {
        let err = websocket_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidUrl(_)));
    }

    #[test]
    fn command_frame_shape() {
        let target = ChargerTarget::new("WEVO-0042", Connector::new(2));
        let frame = CommandFrame::new(RealtimeCommand::Authorize, &target);
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({
                "command": "authorize",
                "chargerIdentifier": "WEVO-0042",
                "connector": "2"
            })
        );
    }

    #[test]
    fn zero_heartbeat_is_accepted() {
        let client = RealtimeClient::new("http://127.0.0.1:8080")
            .unwrap()
            .with_heartbeat(Duration::ZERO);
        assert_eq!(client.heartbeat, Duration::ZERO);
    }

    #[test]
    fn default_policies() {
        let client = RealtimeClient::new("https://api.wevo.energy/mobileapp").unwrap();
        assert_eq!(client.state_policy, ReadPolicy::new(5, Duration::from_secs(8)));
        assert_eq!(client.command_policy, ReadPolicy::new(6, Duration::from_secs(1)));
        assert_eq!(client.heartbeat, Duration::from_secs(20));
    }
}
