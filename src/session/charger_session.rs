// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The charger session orchestrator.

use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast};

use crate::config::SessionConfig;
use crate::error::{AuthError, Result, SessionError};
use crate::event::{EventBus, SessionEvent};
use crate::identity::IdentityClient;
use crate::realtime::RealtimeClient;
use crate::rest::RestClient;
use crate::state::StatusSnapshot;
use crate::token::{TokenSet, TokenStore, unix_now};
use crate::types::ChargerTarget;

/// Monitors and controls one charger connector.
///
/// The session owns the token store and the target; the three clients are
/// stateless collaborators handed in at construction. Before every remote
/// call the access token is renewed if it is within two minutes of expiry.
///
/// # Examples
///
/// ```no_run
/// use wevo_lib::config::SessionConfig;
/// use wevo_lib::token::{TokenSet, TokenStore};
/// use wevo_lib::ChargerSession;
///
/// # async fn example(stored: TokenSet) -> Result<(), Box<dyn std::error::Error>> {
/// let config = SessionConfig::new("WEVO-0042");
/// let tokens = TokenStore::new(stored).with_listener(|tokens| {
///     // persist tokens.access_token / tokens.expires_at here
///     let _ = tokens;
/// });
/// let session = ChargerSession::from_config(&config, tokens)?;
///
/// let snapshot = session.refresh_status().await?;
/// println!("{:?} at {:?} kW", snapshot.state(), snapshot.rate_kw_rounded());
///
/// session.authorize().await?;
/// # Ok(())
/// # }
/// ```
pub struct ChargerSession {
    identity: IdentityClient,
    rest: RestClient,
    realtime: RealtimeClient,
    tokens: TokenStore,
    target: ChargerTarget,
    latest: RwLock<Option<StatusSnapshot>>,
    events: EventBus,
    refresh_lock: Mutex<()>,
}

impl ChargerSession {
    /// Creates a session from its collaborators.
    #[must_use]
    pub fn new(
        identity: IdentityClient,
        rest: RestClient,
        realtime: RealtimeClient,
        tokens: TokenStore,
        target: ChargerTarget,
    ) -> Self {
        Self {
            identity,
            rest,
            realtime,
            tokens,
            target,
            latest: RwLock::new(None),
            events: EventBus::new(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Creates a session with clients built from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if a client cannot be built from the configuration.
    pub fn from_config(config: &SessionConfig, tokens: TokenStore) -> Result<Self> {
        Ok(Self::new(
            config.identity_client()?,
            config.rest_client()?,
            config.realtime_client()?,
            tokens,
            config.target(),
        ))
    }

    /// Returns the charger target.
    #[must_use]
    pub fn target(&self) -> &ChargerTarget {
        &self.target
    }

    /// Returns a copy of the current tokens.
    #[must_use]
    pub fn tokens(&self) -> TokenSet {
        self.tokens.current()
    }

    /// Returns the snapshot of the last successful poll.
    #[must_use]
    pub fn latest_snapshot(&self) -> Option<StatusSnapshot> {
        self.latest.read().clone()
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns a usable access token, renewing it first if it is due.
    ///
    /// Concurrent callers that all see a stale token wait for a single
    /// renewal. A failed renewal leaves the previous tokens in place.
    ///
    /// # Errors
    ///
    /// Returns error if the renewal is rejected or fails.
    pub async fn ensure_fresh_token(&self) -> std::result::Result<String, AuthError> {
        if !self.tokens.needs_refresh(unix_now()) {
            return Ok(self.tokens.access_token());
        }

        let _guard = self.refresh_lock.lock().await;
        let current = self.tokens.current();
        if !current.needs_refresh(unix_now()) {
            return Ok(current.access_token);
        }
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;

        tracing::debug!(expires_at = current.expires_at, "Access token due for refresh");
        let renewed = self
            .identity
            .refresh(refresh_token, &current.identity_username)
            .await?;

        let access_token = renewed.access_token.clone();
        let expires_at = renewed.expires_at;
        self.tokens.replace(renewed);
        self.events
            .publish(SessionEvent::TokensRefreshed { expires_at });

        Ok(access_token)
    }

    /// Polls the charger and returns a fresh snapshot.
    ///
    /// The snapshot is built from the realtime state frame, with zero or
    /// missing readings filled in from the newest transaction record. On
    /// success it replaces [`latest_snapshot`](Self::latest_snapshot).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UpdateFailed`] wrapping any client failure.
    pub async fn refresh_status(&self) -> std::result::Result<StatusSnapshot, SessionError> {
        match self.poll().await {
            Ok(snapshot) => {
                *self.latest.write() = Some(snapshot.clone());
                self.events.publish(SessionEvent::StatusUpdated {
                    snapshot: snapshot.clone(),
                });
                Ok(snapshot)
            }
            Err(err) => {
                tracing::debug!(charger = %self.target, error = %err, "Status poll failed");
                self.events.publish(SessionEvent::UpdateFailed {
                    error: err.to_string(),
                });
                Err(SessionError::UpdateFailed(err))
            }
        }
    }

    /// Sends the authorize command, then refreshes the status.
    ///
    /// A failure of the follow-up refresh is logged and reported on the
    /// event bus; it does not fail the command.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AuthorizeFailed`] if the token renewal or the
    /// command fails.
    pub async fn authorize(&self) -> std::result::Result<(), SessionError> {
        self.send_authorize()
            .await
            .map_err(SessionError::AuthorizeFailed)?;

        tracing::info!(charger = %self.target, "Charging authorized");
        self.events.publish(SessionEvent::AuthorizeSent);

        if let Err(err) = self.refresh_status().await {
            tracing::warn!(error = %err, "Status refresh after authorize failed");
        }
        Ok(())
    }

    async fn send_authorize(&self) -> Result<()> {
        let access_token = self.ensure_fresh_token().await?;
        self.realtime.authorize(&access_token, &self.target).await?;
        Ok(())
    }

    async fn poll(&self) -> Result<StatusSnapshot> {
        let access_token = self.ensure_fresh_token().await?;

        let state = self.realtime.get_state(&access_token, &self.target).await?;
        let transactions = self.rest.get_transactions(&access_token).await?;

        let snapshot = StatusSnapshot::merge(state, transactions.first());
        tracing::debug!(
            state = ?snapshot.state(),
            rate_kw = ?snapshot.rate_kw(),
            total_energy_kwh = ?snapshot.total_energy_kwh(),
            "Status updated"
        );
        Ok(snapshot)
    }
}

impl std::fmt::Debug for ChargerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChargerSession")
            .field("target", &self.target)
            .field("tokens", &self.tokens)
            .field("rest", &self.rest.base_url())
            .field("realtime", &self.realtime.ws_url())
            .finish_non_exhaustive()
    }
}
