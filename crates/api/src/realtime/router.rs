//! Event-to-connection routing.
//!
//! [`RealtimeRouter`] subscribes to the [`EventBus`](agency_events::EventBus)
//! and pushes every [`RealtimeEvent`] to the connections behind its channel.
//! Delivery is best-effort: events for users who are offline, or projects
//! nobody has joined, are dropped.

use std::sync::Arc;

use agency_events::RealtimeEvent;
use axum::extract::ws::Message;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct RealtimeRouter {
    ws_manager: Arc<WsManager>,
}

impl RealtimeRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus closes (every `EventBus` handle dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<RealtimeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.deliver(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Realtime router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, realtime router shutting down");
                    break;
                }
            }
        }
    }

    /// Push one event as a JSON text frame. Returns the number of
    /// connections it was queued for.
    pub async fn deliver(&self, event: &RealtimeEvent) -> usize {
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, event = %event.event, "Failed to serialize realtime event");
                return 0;
            }
        };
        let sent = self
            .ws_manager
            .send_to_channel(event.channel, Message::Text(frame.into()))
            .await;
        tracing::trace!(channel = %event.channel, event = %event.event, sent, "Realtime event routed");
        sent
    }
}
