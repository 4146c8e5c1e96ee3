// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the clients and the session.
//!
//! - [`ChargerTarget`] - The charger and connector a session controls
//! - [`Connector`] - Connector number on a charger (1-based)
//! - [`Credentials`] - Login identifier and password, consumed by login

mod credentials;
mod target;

pub use credentials::Credentials;
pub use target::{ChargerTarget, Connector};
