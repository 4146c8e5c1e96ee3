// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot type and the realtime/transaction merge rule.

use serde_json::Value;

use crate::response::{StateResponse, TransactionRecord};

/// Where a merged reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingSource {
    /// The live `getState` frame.
    Realtime,
    /// The newest transaction record.
    Transaction,
    /// Neither source had a value.
    Missing,
}

/// Merges one reading from the realtime frame with its transaction fallback.
///
/// | realtime      | latest record | result                    |
/// |---------------|---------------|---------------------------|
/// | non-zero      | any           | realtime                  |
/// | zero or none  | present       | record value (maybe none) |
/// | zero          | absent        | realtime zero             |
/// | none          | absent        | none                      |
///
/// `fallback` is `None` when there is no transaction record at all and
/// `Some(None)` when the record exists but lacks the field.
#[must_use]
pub fn merge_reading(
    realtime: Option<f64>,
    fallback: Option<Option<f64>>,
) -> (Option<f64>, ReadingSource) {
    match (realtime, fallback) {
        (Some(value), _) if value != 0.0 => (Some(value), ReadingSource::Realtime),
        (_, Some(Some(value))) => (Some(value), ReadingSource::Transaction),
        (_, Some(None)) | (None, None) => (None, ReadingSource::Missing),
        (Some(zero), None) => (Some(zero), ReadingSource::Realtime),
    }
}

/// Point-in-time charger status returned by each poll.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    state: Option<String>,
    rate_kw: Option<f64>,
    rate_source: ReadingSource,
    total_energy_kwh: Option<f64>,
    energy_source: ReadingSource,
    raw: Value,
}

impl StatusSnapshot {
    /// Builds a snapshot from a state frame and the newest transaction record.
    #[must_use]
    pub fn merge(state: StateResponse, latest: Option<&TransactionRecord>) -> Self {
        let (rate_kw, rate_source) =
            merge_reading(state.rate_kw(), latest.map(|tx| tx.avg_rate_kw));
        let (total_energy_kwh, energy_source) = merge_reading(
            state.total_energy_kwh(),
            latest.map(|tx| tx.total_energy_kwh),
        );

        Self {
            state: state.state().map(str::to_string),
            rate_kw,
            rate_source,
            total_energy_kwh,
            energy_source,
            raw: state.into_raw(),
        }
    }

    /// Returns the charger state label (e.g. `Charging`), if reported.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Returns the charging rate in kW.
    #[must_use]
    pub fn rate_kw(&self) -> Option<f64> {
        self.rate_kw
    }

    /// Returns the charging rate in kW rounded to three decimals.
    #[must_use]
    pub fn rate_kw_rounded(&self) -> Option<f64> {
        self.rate_kw.map(round3)
    }

    /// Returns where the rate came from.
    #[must_use]
    pub fn rate_source(&self) -> ReadingSource {
        self.rate_source
    }

    /// Returns the session energy in kWh.
    #[must_use]
    pub fn total_energy_kwh(&self) -> Option<f64> {
        self.total_energy_kwh
    }

    /// Returns the session energy in kWh rounded to three decimals.
    #[must_use]
    pub fn total_energy_kwh_rounded(&self) -> Option<f64> {
        self.total_energy_kwh.map(round3)
    }

    /// Returns where the session energy came from.
    #[must_use]
    pub fn energy_source(&self) -> ReadingSource {
        self.energy_source
    }

    /// Returns the unmodified `getState` frame.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
