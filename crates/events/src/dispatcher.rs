//! Executes the post-commit effect list returned by a transition.

use std::sync::Arc;

use agency_core::effects::Effect;
use serde::Serialize;

use crate::bus::{EventBus, RealtimeEvent};
use crate::fanout::NotificationFanout;

/// Tally of what a dispatch did. Failures are already logged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub notifications: usize,
    pub failed_notifications: usize,
    pub published: usize,
}

/// Runs effects in order, never failing the caller.
pub struct EffectDispatcher {
    fanout: NotificationFanout,
    bus: Arc<EventBus>,
}

impl EffectDispatcher {
    pub fn new(fanout: NotificationFanout, bus: Arc<EventBus>) -> Self {
        Self { fanout, bus }
    }

    pub async fn dispatch(&self, effects: Vec<Effect>) -> DispatchReport {
        let mut report = DispatchReport::default();
        for effect in effects {
            match effect {
                Effect::Notify { recipients, draft } => {
                    let outcome = self.fanout.send(&recipients, &draft).await;
                    report.notifications += outcome.delivered.len();
                    report.failed_notifications += outcome.failed.len();
                }
                Effect::Publish {
                    channel,
                    event,
                    payload,
                } => {
                    self.bus
                        .publish(RealtimeEvent::new(channel, event).with_payload(payload));
                    report.published += 1;
                }
            }
        }
        if report.failed_notifications > 0 {
            tracing::warn!(
                failed = report.failed_notifications,
                delivered = report.notifications,
                "Some notifications could not be created"
            );
        }
        report
    }
}
