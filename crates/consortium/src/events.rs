use rimp_models::Organization;
use serde::Serialize;
use tokio::sync::broadcast;

/// Capacity of the event channel; slow subscribers see `Lagged` past this
const EVENT_CAPACITY: usize = 64;

/// Notifications published by a consortium sync
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsortiumEvent {
    /// Confirmed consortium after a mutation, drafts filtered out
    Changed { organizations: Vec<Organization> },
    /// Failure that should be shown to the user
    Alert { message: String },
    /// A copy between years started or finished
    Propagation { running: bool },
}

/// Fan-out of [`ConsortiumEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConsortiumEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsortiumEvent> {
        self.tx.subscribe()
    }

    pub fn changed(&self, organizations: Vec<Organization>) {
        // No subscribers is fine
        let _ = self.tx.send(ConsortiumEvent::Changed { organizations });
    }

    pub fn propagation(&self, running: bool) {
        let _ = self.tx.send(ConsortiumEvent::Propagation { running });
    }

    pub fn alert(&self, message: impl Into<String>) {
        let _ = self.tx.send(ConsortiumEvent::Alert {
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_receives_events() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.alert("boom");

        for rx in [&mut first, &mut second] {
            assert_eq!(
                rx.recv().await.unwrap(),
                ConsortiumEvent::Alert {
                    message: "boom".to_string()
                }
            );
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.changed(Vec::new());
    }
}
