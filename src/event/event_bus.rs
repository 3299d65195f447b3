// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting coordinator events.

use tokio::sync::broadcast;

use super::CoordinatorEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Broadcasts coordinator events to any number of subscribers.
///
/// A slow subscriber that falls more than the channel capacity behind gets
/// `RecvError::Lagged` and misses the oldest events. The snapshot itself is
/// never lost this way: it is always available from the coordinator.
///
/// # Examples
///
/// ```
/// use prana_lib::event::{CoordinatorEvent, EventBus};
/// use prana_lib::ErrorKind;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(CoordinatorEvent::UpdateFailed {
///     kind: ErrorKind::Connection,
///     message: "connection refused".to_string(),
/// });
///
/// assert!(rx.try_recv().unwrap().is_failure());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus with the specified capacity (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to all subscribers.
    ///
    /// Without subscribers the event is discarded.
    pub fn publish(&self, event: CoordinatorEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }

    /// Publishes the event built by `make`, calling it only when someone
    /// is subscribed.
    pub fn publish_with(&self, make: impl FnOnce() -> CoordinatorEvent) {
        if self.subscriber_count() > 0 {
            self.publish(make());
        }
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
    use crate::ErrorKind;
    use crate::command::Command;
    use crate::types::{Brightness, Subsystem};

    fn skipped() -> CoordinatorEvent {
        CoordinatorEvent::CommandSkipped {
            command: Command::SetBrightness(Brightness::MAX),
        }
    }

    #[test]
    fn new_bus_has_no_subscribers() {
        assert_eq!(EventBus::new().subscriber_count(), 0);
    }

    #[test]
    fn subscribe_and_drop_track_count() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(CoordinatorEvent::CommandFailed {
            command: Command::SetOn {
                on: false,
                subsystem: Subsystem::Extract,
            },
            kind: ErrorKind::Connection,
            message: "timeout".to_string(),
        });

        assert_eq!(
            rx1.recv().await.unwrap().error_kind(),
            Some(ErrorKind::Connection)
        );
        assert_eq!(
            rx2.recv().await.unwrap().error_kind(),
            Some(ErrorKind::Connection)
        );
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        EventBus::new().publish(skipped());
    }

    #[test]
    fn publish_with_builds_only_for_subscribers() {
        let bus = EventBus::new();
        let mut built = 0;
        bus.publish_with(|| {
            built += 1;
            skipped()
        });
        assert_eq!(built, 0);

        let mut rx = bus.subscribe();
        bus.publish_with(|| {
            built += 1;
            skipped()
        });
        assert_eq!(built, 1);
        assert!(rx.try_recv().unwrap().command().is_some());
    }

    #[test]
    fn slow_subscriber_lags() {
        let bus = EventBus::with_capacity(1);
        let mut rx = bus.subscribe();

        bus.publish(skipped());
        bus.publish(skipped());

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }

    #[test]
    fn clone_shares_same_channel() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();
        let _rx = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);
    }
}
