// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured delivery events.
//!
//! The orchestrator publishes these on a broadcast channel so a
//! presentation layer can render progress without the decision logic
//! producing any user-facing text. Publishing never blocks and never fails
//! a dispatch: with no subscribers the event is dropped.

use courier_core::{Channel, DeliveryId, DeliveryOutcome, FailureKind, SidDefect};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::route::RouteReason;

/// Buffered events per subscriber before the oldest are dropped.
pub const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryEvent {
    RouteChosen {
        delivery_id: DeliveryId,
        channels: Vec<Channel>,
        reason: RouteReason,
    },
    AttemptFinished {
        delivery_id: DeliveryId,
        channel: Channel,
        /// `None` on success.
        failure: Option<FailureKind>,
    },
    IdentifierAnomaly {
        delivery_id: DeliveryId,
        channel: Channel,
        reason: Option<SidDefect>,
    },
    Sealed {
        delivery_id: DeliveryId,
        outcome: DeliveryOutcome,
        final_channel: Option<Channel>,
    },
}

impl DeliveryEvent {
    pub fn delivery_id(&self) -> &DeliveryId {
        match self {
            DeliveryEvent::RouteChosen { delivery_id, .. }
            | DeliveryEvent::AttemptFinished { delivery_id, .. }
            | DeliveryEvent::IdentifierAnomaly { delivery_id, .. }
            | DeliveryEvent::Sealed { delivery_id, .. } => delivery_id,
        }
    }
}

/// Fan-out of [`DeliveryEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DeliveryEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: DeliveryEvent) {
        // Err only means nobody is listening.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
        self.tx.subscribe()
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
    fn publish_without_subscribers_is_silent() {
        EventBus::new().publish(DeliveryEvent::Sealed {
            delivery_id: DeliveryId("d1".into()),
            outcome: DeliveryOutcome::Failed,
            final_channel: None,
        });
    }

    #[tokio::test]
    async fn subscribers_receive_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let id = DeliveryId("d1".into());
        bus.publish(DeliveryEvent::AttemptFinished {
            delivery_id: id.clone(),
            channel: Channel::WhatsApp,
            failure: Some(FailureKind::Timeout),
        });
        bus.publish(DeliveryEvent::Sealed {
            delivery_id: id.clone(),
            outcome: DeliveryOutcome::Delivered,
            final_channel: Some(Channel::Sms),
        });

        assert!(matches!(rx.recv().await.unwrap(), DeliveryEvent::AttemptFinished { .. }));
        let sealed = rx.recv().await.unwrap();
        assert_eq!(sealed.delivery_id(), &id);
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_value(DeliveryEvent::RouteChosen {
            delivery_id: DeliveryId("d1".into()),
            channels: vec![Channel::Sms],
            reason: RouteReason::OfflineOverride,
        })
        .unwrap();
        assert_eq!(json["type"], "route_chosen");
        assert_eq!(json["reason"], "offline_override");
        assert_eq!(json["channels"][0], "sms");
    }
}
