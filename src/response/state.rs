// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Realtime `getState` frame.

use serde_json::Value;

use super::{value_as_f64, value_as_string};

/// A `getState` frame received over the realtime socket.
///
/// The frame is kept whole in [`raw`](Self::raw); the accessors pick out the
/// fields the session uses.
///
/// # Examples
///
/// ```
/// use wevo_lib::response::StateResponse;
///
/// let frame = serde_json::json!({
///     "chargerIdentifier": "WEVO-0042",
///     "state": "Charging",
///     "transactionData": { "rateKw": 7.4, "totalEnergyKwh": 2.1 }
/// });
/// let state = StateResponse::from_value(frame);
/// assert_eq!(state.state(), Some("Charging"));
/// assert_eq!(state.rate_kw(), Some(7.4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StateResponse {
    raw: Value,
}

impl StateResponse {
    /// Wraps a decoded frame.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Returns the charger the frame belongs to.
    #[must_use]
    pub fn charger_identifier(&self) -> Option<String> {
        self.raw.get("chargerIdentifier").and_then(value_as_string)
    }

    /// Returns true if the frame belongs to `charger_identifier`.
    #[must_use]
    pub fn is_for(&self, charger_identifier: &str) -> bool {
        self.charger_identifier().as_deref() == Some(charger_identifier)
    }

    /// Returns the charger state label.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.raw.get("state").and_then(Value::as_str)
    }

    /// Returns the live charging rate in kW.
    #[must_use]
    pub fn rate_kw(&self) -> Option<f64> {
        self.transaction_field("rateKw")
    }

    /// Returns the energy delivered in the running session in kWh.
    #[must_use]
    pub fn total_energy_kwh(&self) -> Option<f64> {
        self.transaction_field("totalEnergyKwh")
    }

    /// Returns the whole frame.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consumes the response and returns the whole frame.
    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }

    fn transaction_field(&self, key: &str) -> Option<f64> {
        self.raw
            .get("transactionData")
            .and_then(|tx| tx.get(key))
            .and_then(value_as_f64)
    }
}
