//! Mock notification sink: append-only log of outbound client
//! communications. Every successful append also emits a `notification`
//! event on the Event Bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::events::{EventBus, EventType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub client_id: String,
    pub notification_type: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct NotificationSinkBackend {
    log: RwLock<Vec<NotificationRecord>>,
}

impl NotificationSinkBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn send(&self, event_bus: &EventBus, client_id: &str, notification_type: &str, content: &str) -> NotificationRecord {
        let record = NotificationRecord {
            client_id: client_id.to_string(),
            notification_type: notification_type.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        self.log.write().await.push(record.clone());
        event_bus
            .publish(
                EventType::Notification,
                None,
                serde_json::json!({
                    "client_id": record.client_id,
                    "type": record.notification_type,
                    "content": record.content,
                }),
            )
            .await;
        record
    }

    pub async fn history(&self, client_id: &str) -> Vec<NotificationRecord> {
        self.log.read().await.iter().filter(|n| n.client_id == client_id).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn send_appends_and_emits_an_event() {
        let bus = EventBus::new(Uuid::new_v4(), 8);
        let mut sub = bus.subscribe(true);
        let sink = NotificationSinkBackend::new();
        sink.send(&bus, "C1", "account_opened", "Your account is ready").await;

        assert_eq!(sink.history("C1").await.len(), 1);
        let event = sub.receiver.recv().await.unwrap();
        assert_eq!(event.payload["client_id"], "C1");
    }
}
