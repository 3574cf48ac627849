//! # Subscription Table
//!
//! Tracks which widget registered which handler on which topic.

use crate::transport::MessageHandler;
use shared_types::WidgetId;
use std::collections::HashMap;

struct Subscriber {
    widget_id: WidgetId,
    handler: MessageHandler,
}

/// Handlers registered on the bus, grouped by topic.
#[derive(Default)]
pub struct SubscriptionTable {
    by_topic: HashMap<String, Vec<Subscriber>>,
}

impl SubscriptionTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a widget on a topic.
    pub fn add(&mut self, topic: &str, widget_id: &str, handler: MessageHandler) {
        self.by_topic
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber {
                widget_id: widget_id.to_string(),
                handler,
            });
    }

    /// Remove all of a widget's handlers on a topic.
    ///
    /// Returns the number of handlers removed.
    pub fn remove(&mut self, topic: &str, widget_id: &str) -> usize {
        let Some(subscribers) = self.by_topic.get_mut(topic) else {
            return 0;
        };

        let before = subscribers.len();
        subscribers.retain(|s| s.widget_id != widget_id);
        let removed = before - subscribers.len();

        if subscribers.is_empty() {
            self.by_topic.remove(topic);
        }
        removed
    }

    /// Snapshot of the handlers for a topic, in registration order.
    #[must_use]
    pub fn handlers_for(&self, topic: &str) -> Vec<MessageHandler> {
        self.by_topic
            .get(topic)
            .map(|subs| subs.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of handlers registered on a topic.
    #[must_use]
    pub fn count(&self, topic: &str) -> usize {
        self.by_topic.get(topic).map_or(0, Vec::len)
    }

    /// Number of handlers registered across all topics.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_topic.values().map(Vec::len).sum()
    }
}
