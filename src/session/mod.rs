// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session orchestration.
//!
//! - [`ChargerSession`]: token freshness, status polls and the authorize command
//! - [`Poller`]: optional interval driver for [`ChargerSession::refresh_status`]
//! - [`Onboarding`]: first login and charger discovery

mod charger_session;
mod onboarding;
mod poller;

pub use charger_session::ChargerSession;
pub use onboarding::{Enrollment, Onboarding, discover_chargers};
pub use poller::Poller;
