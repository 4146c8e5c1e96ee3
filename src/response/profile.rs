// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User profile record.

use serde::Deserialize;
use serde_json::{Map, Value};

/// The account profile from `GET /rest/user/details`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileRecord {
    /// Numeric driver id.
    #[serde(rename = "userId", default, deserialize_with = "super::lenient_i64")]
    pub user_id: Option<i64>,

    /// Charger assigned to the account, if any.
    #[serde(
        rename = "chargerIdentifier",
        default,
        deserialize_with = "super::lenient_string"
    )]
    pub charger_identifier: Option<String>,

    /// Every other field of the profile.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
