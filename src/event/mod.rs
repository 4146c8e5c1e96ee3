// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session events.
//!
//! A [`ChargerSession`](crate::ChargerSession) publishes a [`SessionEvent`]
//! after every poll, token refresh and command on its [`EventBus`].
//!
//! # Examples
//!
//! ```
//! use wevo_lib::event::{EventBus, SessionEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(SessionEvent::AuthorizeSent);
//! assert!(matches!(rx.try_recv(), Ok(SessionEvent::AuthorizeSent)));
//! ```

mod event_bus;
mod session_event;

pub use event_bus::EventBus;
pub use session_event::SessionEvent;
