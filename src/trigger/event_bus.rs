use serde::Serialize;
use tokio::sync::broadcast;

use crate::trigger::state::TriggerReport;

/// Diagnostic signals emitted by a controller. Nothing in the engine consumes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerEvent {
    Started { trigger_id: String },
    /// A trigger key arrived while another trigger was processing.
    Dropped,
    Completed { report: TriggerReport },
    MutationObserved { added_subtrees: usize, added_elements: usize },
}

pub struct EventBus {
    tx: broadcast::Sender<TriggerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TriggerEvent> {
        self.tx.subscribe()
    }

    /// Delivers to current subscribers; without any the event is discarded.
    pub fn send(&self, event: TriggerEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("trigger event had no subscribers");
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

    #[test]
    fn subscribers_receive_events_sent_after_subscribing() {
        let bus = EventBus::new();
        bus.send(TriggerEvent::Dropped);

        let mut rx = bus.subscribe();
        bus.send(TriggerEvent::Started {
            trigger_id: "t-1".into(),
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            TriggerEvent::Started {
                trigger_id: "t-1".into()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(TriggerEvent::MutationObserved {
            added_subtrees: 1,
            added_elements: 3,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "mutation_observed", "added_subtrees": 1, "added_elements": 3})
        );
    }
}
