// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! First-time login and charger discovery.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::identity::IdentityClient;
use crate::response::{ProfileRecord, TransactionRecord};
use crate::rest::RestClient;
use crate::token::TokenSet;
use crate::types::Credentials;

/// Outcome of a successful [`Onboarding::enroll`].
#[derive(Debug, Clone)]
pub struct Enrollment {
    /// Tokens to persist and hand to a [`TokenStore`](crate::token::TokenStore).
    pub tokens: TokenSet,
    /// The account's driver id, if the profile carries one.
    pub user_id: Option<i64>,
    /// Chargers the account can control, sorted and de-duplicated.
    pub chargers: Vec<String>,
}

/// Logs a new account in and lists the chargers it can control.
#[derive(Debug, Clone)]
pub struct Onboarding {
    identity: IdentityClient,
    rest: RestClient,
}

impl Onboarding {
    /// Creates an onboarding flow from its clients.
    #[must_use]
    pub fn new(identity: IdentityClient, rest: RestClient) -> Self {
        Self { identity, rest }
    }

    /// Logs in and discovers the account's chargers.
    ///
    /// The credentials are consumed by the login and not kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChargers`] if neither the profile nor the
    /// transaction history names a charger, or any client failure.
    pub async fn enroll(&self, credentials: Credentials) -> Result<Enrollment> {
        let tokens = self.identity.login(credentials).await?;
        let profile = self.rest.get_profile(&tokens.access_token).await?;
        let transactions = self.rest.get_transactions(&tokens.access_token).await?;

        let chargers = discover_chargers(&profile, &transactions);
        if chargers.is_empty() {
            return Err(Error::NoChargers);
        }

        tracing::info!(count = chargers.len(), "Discovered chargers");
        Ok(Enrollment {
            tokens,
            user_id: profile.user_id,
            chargers,
        })
    }
}

/// Collects charger identifiers from the profile and the transaction history.
///
/// # Examples
///
/// ```
/// use wevo_lib::response::{ProfileRecord, TransactionRecord};
/// use wevo_lib::session::discover_chargers;
///
/// let profile = ProfileRecord {
///     charger_identifier: Some("B-2".to_string()),
///     ..Default::default()
/// };
/// let history = vec![
///     TransactionRecord { charger_identifier: Some("A-1".to_string()), ..Default::default() },
///     TransactionRecord { charger_identifier: Some("B-2".to_string()), ..Default::default() },
/// ];
/// assert_eq!(discover_chargers(&profile, &history), vec!["A-1", "B-2"]);
/// ```
#[must_use]
pub fn discover_chargers(profile: &ProfileRecord, transactions: &[TransactionRecord]) -> Vec<String> {
    profile
        .charger_identifier
        .iter()
        .chain(transactions.iter().filter_map(|tx| tx.charger_identifier.as_ref()))
        .filter(|id| !id.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
