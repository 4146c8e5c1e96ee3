// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Charger status snapshots.
//!
//! A [`StatusSnapshot`] is rebuilt from scratch on every poll by merging the
//! realtime `getState` frame with the newest transaction record. The merge
//! rule for each reading lives in [`merge_reading`].
//!
//! # Examples
//!
//! ```
//! use wevo_lib::response::{StateResponse, TransactionRecord};
//! use wevo_lib::state::{ReadingSource, StatusSnapshot};
//!
//! let frame = StateResponse::from_value(serde_json::json!({
//!     "chargerIdentifier": "WEVO-0042",
//!     "state": "Charging",
//!     "transactionData": { "rateKw": 0, "totalEnergyKwh": null }
//! }));
//! let latest = TransactionRecord {
//!     avg_rate_kw: Some(7.2),
//!     total_energy_kwh: Some(3.4),
//!     ..Default::default()
//! };
//!
//! let snapshot = StatusSnapshot::merge(frame, Some(&latest));
//! assert_eq!(snapshot.rate_kw(), Some(7.2));
//! assert_eq!(snapshot.rate_source(), ReadingSource::Transaction);
//! ```

mod snapshot;

pub use snapshot::{ReadingSource, StatusSnapshot, merge_reading};
