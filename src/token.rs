// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access/refresh token state and the refresh policy.
//!
//! [`TokenSet`] is the value obtained from the identity provider. A
//! [`TokenStore`] owns the current set for one session and replaces it
//! wholesale, notifying a persistence listener under the same lock so the
//! in-memory value never runs ahead of what was last persisted.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Seconds before expiry at which a refresh becomes due.
pub const REFRESH_MARGIN_SECS: i64 = 120;

/// Returns the current wall-clock time in Unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Tokens issued by the identity provider.
///
/// `expires_at` is an absolute Unix timestamp in seconds. A value of `0`
/// means the expiry is unknown and the set is never refreshed proactively.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token for REST and WebSocket calls.
    pub access_token: String,
    /// Token used to renew the access token, if the provider issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Absolute expiry of `access_token` in Unix seconds.
    #[serde(default)]
    pub expires_at: i64,
    /// The username form the provider accepted at login.
    #[serde(default)]
    pub identity_username: String,
}

impl TokenSet {
    /// Returns true if the access token should be renewed at `now`.
    ///
    /// Requires a refresh token and a known expiry; without a refresh token
    /// the caller has to log in again instead.
    #[must_use]
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.refresh_token.is_some()
            && self.expires_at > 0
            && now >= self.expires_at - REFRESH_MARGIN_SECS
    }

    /// Returns true if a refresh token is available.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("identity_username", &self.identity_username)
            .finish()
    }
}

/// Callback invoked with the new token set after every replacement.
pub type TokenListener = Arc<dyn Fn(&TokenSet) + Send + Sync>;

/// Holder of the current [`TokenSet`] for one session.
///
/// Reads return clones so no lock is held across an `.await`.
pub struct TokenStore {
    current: RwLock<TokenSet>,
    listener: Option<TokenListener>,
}

impl TokenStore {
    /// Creates a store holding `tokens`, without a persistence listener.
    #[must_use]
    pub fn new(tokens: TokenSet) -> Self {
        Self {
            current: RwLock::new(tokens),
            listener: None,
        }
    }

    /// Registers the listener notified on every replacement.
    ///
    /// The listener runs while the store is write-locked and must not call
    /// back into the store.
    #[must_use]
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&TokenSet) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Returns a copy of the current token set.
    #[must_use]
    pub fn current(&self) -> TokenSet {
        self.current.read().clone()
    }

    /// Returns the current access token.
    #[must_use]
    pub fn access_token(&self) -> String {
        self.current.read().access_token.clone()
    }

    /// Returns true if the current set should be renewed at `now`.
    #[must_use]
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.current.read().needs_refresh(now)
    }

    /// Replaces the current set and notifies the listener.
    pub fn replace(&self, tokens: TokenSet) {
        let mut current = self.current.write();
        *current = tokens;
        if let Some(listener) = &self.listener {
            listener(&current);
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("current", &*self.current.read())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
