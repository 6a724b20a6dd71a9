//! The real-time event bus: a typed publish/subscribe fabric that lets zero
//! or more observers watch a workflow's progress without being able to
//! influence it.
//!
//! Ordering is total with respect to a single publisher: everything a
//! workflow's executor task publishes is delivered to every subscriber in
//! publication order, matching the rest of this crate's one-task-per-workflow
//! concurrency model. Back-pressure is handled per event criticality --
//! `log` events may be dropped under a full buffer, everything else blocks
//! the publisher until there is room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

/// The closed set of event types this engine ever emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    WorkflowStart,
    AgentMessage,
    LlmCall,
    ToolExecution,
    Routing,
    TaskUpdate,
    Success,
    Notification,
    Log,
    Error,
    WorkflowComplete,
}

impl EventType {
    /// Critical events are never dropped under back-pressure.
    pub fn is_critical(&self) -> bool {
        !matches!(self, EventType::Log)
    }
}

/// A single event on the bus. JSON-serializable by convention for
/// out-of-crate transports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub workflow_id: Uuid,
    pub agent: Option<String>,
    pub payload: Value,
    pub timestamp_ms: i64,
}

impl Event {
    pub fn new(workflow_id: Uuid, event_type: EventType, agent: Option<String>, payload: Value) -> Self {
        Self {
            event_type,
            workflow_id,
            agent,
            payload,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }
}

/// A clock abstraction so tests can control timestamps without sleeping.
/// Defaults to the system clock in production.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One subscriber's bounded channel plus the policy applied when it is full.
struct Subscriber {
    sender: mpsc::Sender<Event>,
    drop_log_events_under_backpressure: bool,
}

/// The publish side of the bus. Cheap to clone -- all subscribers are
/// reference-counted via `parking_lot::Mutex` around a `Vec`, matching the
/// lighter-weight synchronous-section pattern this workspace uses for
/// frequently-touched shared state (see `AccountSystem`).
#[derive(Clone)]
pub struct EventBus {
    workflow_id: Uuid,
    subscribers: std::sync::Arc<parking_lot::Mutex<Vec<Subscriber>>>,
    buffer_size: usize,
}

/// A handle returned to a new subscriber: the receiving half of its channel.
pub struct EventSubscription {
    pub receiver: mpsc::Receiver<Event>,
}

impl EventBus {
    pub fn new(workflow_id: Uuid, buffer_size: usize) -> Self {
        Self {
            workflow_id,
            subscribers: std::sync::Arc::new(parking_lot::Mutex::new(Vec::new())),
            buffer_size,
        }
    }

    /// Subscribe to this workflow's stream. Legal at any point before the
    /// workflow reaches a terminal state; publishing with no subscribers at
    /// all is also legal (events are simply discarded).
    pub fn subscribe(&self, drop_log_events_under_backpressure: bool) -> EventSubscription {
        let (tx, rx) = mpsc::channel(self.buffer_size.max(1));
        self.subscribers.lock().push(Subscriber {
            sender: tx,
            drop_log_events_under_backpressure,
        });
        EventSubscription { receiver: rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Publish one event to every live subscriber, in order. Critical
    /// events apply back-pressure onto the caller (awaiting channel
    /// capacity); `log` events are dropped for subscribers configured to
    /// shed them under a full buffer.
    pub async fn publish(&self, event_type: EventType, agent: Option<String>, payload: Value) {
        let event = Event::new(self.workflow_id, event_type, agent, payload);
        // Snapshot the sender list so we never hold the lock across an await.
        let senders: Vec<(mpsc::Sender<Event>, bool)> = self
            .subscribers
            .lock()
            .iter()
            .map(|s| (s.sender.clone(), s.drop_log_events_under_backpressure))
            .collect();

        for (sender, drop_logs) in senders {
            if event_type.is_critical() {
                if sender.send(event.clone()).await.is_err() {
                    tracing::warn!(workflow_id = %self.workflow_id, "event subscriber dropped, event undelivered");
                }
            } else if drop_logs {
                if sender.try_send(event.clone()).is_err() {
                    tracing::trace!(workflow_id = %self.workflow_id, "log event dropped under back-pressure");
                }
            } else if sender.send(event.clone()).await.is_err() {
                tracing::warn!(workflow_id = %self.workflow_id, "event subscriber dropped, event undelivered");
            }
        }
    }

    /// Close the stream: every subscriber observes end-of-stream once their
    /// buffered events are drained. Called once, at workflow termination.
    pub fn close(&self) {
        self.subscribers.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_with_no_subscribers_is_legal() {
        let bus = EventBus::new(Uuid::new_v4(), 8);
        bus.publish(EventType::Log, None, serde_json::json!({"msg": "noop"})).await;
    }

    #[tokio::test]
    async fn subscribers_observe_events_in_publication_order() {
        let bus = EventBus::new(Uuid::new_v4(), 8);
        let mut sub = bus.subscribe(true);
        bus.publish(EventType::WorkflowStart, None, serde_json::json!({"n": 1})).await;
        bus.publish(EventType::TaskUpdate, None, serde_json::json!({"n": 2})).await;
        bus.publish(EventType::WorkflowComplete, None, serde_json::json!({"n": 3})).await;
        bus.close();

        let mut seen = Vec::new();
        while let Some(event) = sub.receiver.recv().await {
            seen.push(event.payload["n"].as_i64().unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn close_ends_the_stream() {
        let bus = EventBus::new(Uuid::new_v4(), 8);
        let mut sub = bus.subscribe(true);
        bus.close();
        assert!(sub.receiver.recv().await.is_none());
    }
}
