// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for session events.

use tokio::sync::broadcast;

use super::SessionEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fan-out of [`SessionEvent`]s to any number of subscribers.
///
/// Backed by a tokio broadcast channel: a subscriber that falls more than
/// the capacity behind loses the oldest events (`RecvError::Lagged`).
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event; dropped silently when nobody listens.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_count_tracks_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();

        bus.publish(SessionEvent::TokensRefreshed { expires_at: 42 });

        assert_eq!(
            rx1.recv().await.unwrap(),
            SessionEvent::TokensRefreshed { expires_at: 42 }
        );
        assert_eq!(
            rx2.recv().await.unwrap(),
            SessionEvent::TokensRefreshed { expires_at: 42 }
        );
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::with_capacity(4);
        bus.publish(SessionEvent::AuthorizeSent);
    }
}
