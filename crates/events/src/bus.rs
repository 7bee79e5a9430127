//! In-process realtime event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the workflow layer
//! (publisher) and the realtime gateway (subscriber).

use agency_core::channels::{Channel, EventName};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RealtimeEvent
// ---------------------------------------------------------------------------

/// One event addressed to a realtime channel.
///
/// Serializes to the wire frame pushed to clients:
/// `{"event": "task:assigned", "channel": "user:4", "payload": {...}, "timestamp": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEvent {
    pub event: EventName,
    pub channel: Channel,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl RealtimeEvent {
    /// Create an event with an empty object payload.
    pub fn new(channel: Channel, event: EventName) -> Self {
        Self {
            event,
            channel,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped: realtime delivery is
    /// best-effort and clients re-fetch state after reconnecting.
    pub fn publish(&self, event: RealtimeEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            RealtimeEvent::new(Channel::Project(3), EventName::ProjectUpdated)
                .with_payload(serde_json::json!({"status": "REVIEW"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.channel, Channel::Project(3));
        assert_eq!(received.event, EventName::ProjectUpdated);
        assert_eq!(received.payload["status"], "REVIEW");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(RealtimeEvent::new(Channel::User(1), EventName::TaskAssigned));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event, EventName::TaskAssigned);
        assert_eq!(e2.event, EventName::TaskAssigned);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(RealtimeEvent::new(Channel::User(9), EventName::ChatMessage));
    }

    #[test]
    fn wire_frame_uses_protocol_names() {
        let frame = serde_json::to_value(
            RealtimeEvent::new(Channel::User(4), EventName::NotificationNew),
        )
        .unwrap();
        assert_eq!(frame["event"], "notification:new");
        assert_eq!(frame["channel"], "user:4");
        assert!(frame["payload"].is_object());
        assert!(frame["timestamp"].is_string());
    }
}
