// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `wevo_lib` library.
//!
//! Every client-layer failure is one of three leaves: [`AuthError`] for the
//! identity provider, [`ApiError`] for the REST resources and
//! [`ProtocolError`] for the realtime WebSocket commands. They are wrapped by
//! [`Error`] so callers can handle the whole family at once. The session
//! translates all of them into a single [`SessionError`].

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Login or token refresh failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// A REST request failed or returned an unusable body.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// A realtime command got no usable response.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Neither the profile nor the transaction history names a charger.
    #[error("no chargers found for this account")]
    NoChargers,
}

impl Error {
    /// Returns true if the failure was caused by a network timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Auth(err) => err.is_timeout(),
            Self::Api(err) => err.is_timeout(),
            Self::Protocol(err) => err.is_timeout(),
            Self::NoChargers => false,
        }
    }
}

/// Errors raised while talking to the identity provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider answered with an error status or an error-type body.
    #[error("{message}")]
    Rejected {
        /// HTTP status of the response.
        status: u16,
        /// The provider's message text.
        message: String,
    },

    /// A successful response did not carry an access token.
    #[error("missing access token in {flow} response")]
    MissingAccessToken {
        /// The auth flow that was attempted.
        flow: &'static str,
    },

    /// Every username variant was rejected; holds the last failure.
    #[error("unable to login: {0}")]
    LoginFailed(#[source] Box<AuthError>),

    /// The session has no refresh token and must log in again.
    #[error("no refresh token available, login required")]
    NoRefreshToken,

    /// The identity request did not complete in time.
    #[error("identity request timed out after {0} ms")]
    Timeout(u64),

    /// Transport-level failure (DNS, connection refused, TLS).
    #[error("identity request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The HTTP client could not be created.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The identity payload could not be encoded or decoded.
    #[error("invalid identity payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Returns true if this error (or the wrapped login failure) is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::LoginFailed(inner) => inner.is_timeout(),
            _ => false,
        }
    }
}

/// Errors raised by the REST resources.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("GET {path} failed ({status}): {body}")]
    Status {
        /// Request path, including the query string.
        path: String,
        /// HTTP status code.
        status: u16,
        /// First 200 characters of the response body.
        body: String,
    },

    /// The request did not complete in time.
    #[error("GET {path} timed out after {timeout_ms} ms")]
    Timeout {
        /// Request path.
        path: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// Transport-level failure (DNS, connection refused, TLS).
    #[error("GET {path} failed: {source}")]
    Http {
        /// Request path.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The body was not valid JSON.
    #[error("GET {path} returned an invalid body: {source}")]
    InvalidBody {
        /// Request path.
        path: String,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be created.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Returns true if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors raised by the realtime WebSocket protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The REST base URL cannot be turned into a WebSocket URL.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// The access token cannot be sent as a header value.
    #[error("access token is not a valid header value")]
    InvalidToken,

    /// WebSocket handshake or transport failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The command frame could not be encoded.
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    /// Connecting or waiting for a frame exceeded its timeout.
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// What was being waited for.
        operation: &'static str,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// No frame for the requested charger arrived within the attempt budget.
    #[error("no state response")]
    NoStateResponse,
}

impl ProtocolError {
    /// Returns true if a connect or frame read timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Collaborator-facing failure of a [`ChargerSession`](crate::ChargerSession) operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A status poll failed.
    #[error("update failed: {0}")]
    UpdateFailed(#[source] Error),

    /// The authorize command failed.
    #[error("Authorize failed: {0}")]
    AuthorizeFailed(#[source] Error),
}

impl SessionError {
    /// Returns the underlying client error.
    #[must_use]
    pub fn cause(&self) -> &Error {
        match self {
            Self::UpdateFailed(err) | Self::AuthorizeFailed(err) => err,
        }
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
