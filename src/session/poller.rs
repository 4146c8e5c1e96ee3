// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interval-driven status polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ChargerSession;

/// Background task that calls [`ChargerSession::refresh_status`] on a fixed
/// interval.
///
/// Polls run one after another; a slow poll delays the next tick instead of
/// overlapping it. Failures are logged and published on the session's event
/// bus, and polling continues. The task stops when the poller is dropped;
/// an in-flight poll is cancelled and its socket released.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use wevo_lib::session::{ChargerSession, Poller};
///
/// # fn example(session: ChargerSession) {
/// let session = Arc::new(session);
/// let poller = Poller::spawn(Arc::clone(&session), std::time::Duration::from_secs(15));
/// // ...
/// poller.stop();
/// # }
/// ```
#[derive(Debug)]
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Shortest accepted poll interval.
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// Starts polling immediately and then every `interval`.
    ///
    /// Intervals shorter than [`MIN_INTERVAL`](Self::MIN_INTERVAL) are raised
    /// to it.
    #[must_use]
    pub fn spawn(session: Arc<ChargerSession>, interval: Duration) -> Self {
        let interval = interval.max(Self::MIN_INTERVAL);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(err) = session.refresh_status().await {
                    tracing::warn!(charger = %session.target(), error = %err, "Scheduled poll failed");
                }
            }
        });

        Self { handle }
    }

    /// Returns true while the polling task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops polling.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
