// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event type published by a charger session.

use crate::state::StatusSnapshot;

/// Something that happened in a charger session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A poll succeeded and produced a new snapshot.
    StatusUpdated {
        /// The new snapshot.
        snapshot: StatusSnapshot,
    },

    /// A poll failed.
    UpdateFailed {
        /// Description of the failure.
        error: String,
    },

    /// The access token was renewed and handed to the token listener.
    TokensRefreshed {
        /// New expiry in Unix seconds.
        expires_at: i64,
    },

    /// The authorize command was delivered.
    AuthorizeSent,
}

impl SessionEvent {
    /// Returns the snapshot carried by a [`StatusUpdated`](Self::StatusUpdated) event.
    #[must_use]
    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match self {
            Self::StatusUpdated { snapshot } => Some(snapshot),
            _ => None,
        }
    }

    /// Returns true if this event reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. })
    }
}
