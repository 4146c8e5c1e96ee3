// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `wevo_lib` - A Rust library to monitor and start Wevo Energy EV chargers.
//!
//! The library talks to three remote surfaces on behalf of one
//! charger/connector pair:
//!
//! - **Identity provider**: password login and refresh-token exchange
//!   ([`identity::IdentityClient`])
//! - **REST API**: account profile and transaction history
//!   ([`rest::RestClient`])
//! - **Realtime WebSocket**: live charger state and the authorize command
//!   ([`realtime::RealtimeClient`])
//!
//! A [`ChargerSession`] ties them together: it renews the access token
//! before it expires, merges the live state with the transaction history
//! into a [`StatusSnapshot`], and sends the authorize command. Persisting
//! tokens, scheduling polls and presenting results are left to the host.
//!
//! # Quick Start
//!
//! ## First login
//!
//! ```no_run
//! use wevo_lib::config::SessionConfig;
//! use wevo_lib::session::Onboarding;
//! use wevo_lib::types::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> wevo_lib::Result<()> {
//!     let defaults = SessionConfig::new("");
//!     let onboarding = Onboarding::new(defaults.identity_client()?, defaults.rest_client()?);
//!
//!     let enrollment = onboarding
//!         .enroll(Credentials::new("driver@example.com", "secret"))
//!         .await?;
//!     println!("chargers: {:?}", enrollment.chargers);
//!     Ok(())
//! }
//! ```
//!
//! ## Polling and starting a charge
//!
//! ```no_run
//! use std::sync::Arc;
//! use wevo_lib::config::SessionConfig;
//! use wevo_lib::session::{ChargerSession, Poller};
//! use wevo_lib::token::{TokenSet, TokenStore};
//!
//! # async fn example(stored: TokenSet) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new("WEVO-0042");
//! let tokens = TokenStore::new(stored).with_listener(|tokens| {
//!     // write tokens back to the host's settings store
//!     let _ = tokens;
//! });
//!
//! let session = Arc::new(ChargerSession::from_config(&config, tokens)?);
//! let mut events = session.subscribe();
//! let _poller = Poller::spawn(Arc::clone(&session), config.poll_interval());
//!
//! session.authorize().await?;
//! while let Ok(event) = events.recv().await {
//!     if let Some(snapshot) = event.snapshot() {
//!         println!("{:?}: {:?} kW", snapshot.state(), snapshot.rate_kw_rounded());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod realtime;
pub mod response;
pub mod rest;
pub mod session;
pub mod state;
pub mod token;
pub mod types;

pub use config::SessionConfig;
pub use error::{ApiError, AuthError, Error, ProtocolError, Result, SessionError};
pub use event::{EventBus, SessionEvent};
pub use identity::IdentityClient;
pub use realtime::{ReadPolicy, RealtimeClient, RealtimeCommand};
pub use response::{ProfileRecord, StateResponse, TransactionRecord};
pub use rest::RestClient;
pub use session::{ChargerSession, Enrollment, Onboarding, Poller};
pub use state::{ReadingSource, StatusSnapshot};
pub use token::{TokenSet, TokenStore};
pub use types::{ChargerTarget, Connector, Credentials};
