// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transaction history record.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One charging transaction from `GET /rest/transactions`.
///
/// The endpoint returns the newest transaction first.
///
/// # Examples
///
/// ```
/// use wevo_lib::response::TransactionRecord;
///
/// let json = r#"{"chargerIdentifier": "WEVO-0042", "avgRateKW": 7.2, "totalEnergyKwh": 3.4}"#;
/// let record: TransactionRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.avg_rate_kw, Some(7.2));
/// assert_eq!(record.total_energy_kwh, Some(3.4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionRecord {
    /// Charger the transaction ran on.
    #[serde(
        rename = "chargerIdentifier",
        default,
        deserialize_with = "super::lenient_string"
    )]
    pub charger_identifier: Option<String>,

    /// Average charging rate over the transaction in kW.
    #[serde(rename = "avgRateKW", default, deserialize_with = "super::lenient_f64")]
    pub avg_rate_kw: Option<f64>,

    /// Energy delivered in the transaction in kWh.
    #[serde(
        rename = "totalEnergyKwh",
        default,
        deserialize_with = "super::lenient_f64"
    )]
    pub total_energy_kwh: Option<f64>,

    /// Every other field of the record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
