//! In-crate transport double for unit tests.

use parking_lot::Mutex;
use serde_json::Value;
use shared_bus::{MessageHandler, Transport};
use shared_types::{SenderEnvelope, WidgetId, WireBody};
use std::collections::HashMap;
use std::sync::Arc;

/// Records publishes and calls handlers synchronously on demand.
pub(crate) struct MockTransport {
    id: WidgetId,
    published: Mutex<Vec<(String, String)>>,
    handlers: Mutex<HashMap<String, Vec<MessageHandler>>>,
}

impl MockTransport {
    pub(crate) fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            published: Mutex::new(Vec::new()),
            handlers: Mutex::new(HashMap::new()),
        })
    }

    /// Decoded bodies published on a topic, oldest first.
    pub(crate) fn published_on(&self, topic: &str) -> Vec<Value> {
        self.published
            .lock()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, body)| serde_json::from_str(body).unwrap())
            .collect()
    }

    /// Hand a message to every handler on a topic.
    pub(crate) fn deliver(&self, topic: &str, sender: &str, body: WireBody) {
        let handlers = self.handlers.lock().get(topic).cloned().unwrap_or_default();
        for handler in handlers {
            handler(sender, &body);
        }
    }

    /// Feed everything published on a topic back to its handlers.
    pub(crate) fn redeliver_all(&self, topic: &str) {
        let sender = serde_json::to_string(&SenderEnvelope::new(self.id.clone())).unwrap();
        let bodies: Vec<String> = self
            .published
            .lock()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, body)| body.clone())
            .collect();
        for body in bodies {
            self.deliver(topic, &sender, WireBody::Text(body));
        }
    }
}

impl Transport for MockTransport {
    fn publish(&self, topic: &str, payload: String) {
        self.published.lock().push((topic.to_string(), payload));
    }

    fn subscribe(&self, topic: &str, handler: MessageHandler) {
        self.handlers
            .lock()
            .entry(topic.to_string())
            .or_default()
            .push(handler);
    }

    fn unsubscribe(&self, topic: &str) {
        self.handlers.lock().remove(topic);
    }

    fn instance_id(&self) -> WidgetId {
        self.id.clone()
    }
}
