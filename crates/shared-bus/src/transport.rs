//! # Transport Contract
//!
//! The only view of the host messaging runtime the channel layer depends on.

use shared_types::{WidgetId, WireBody};
use std::sync::Arc;

/// Callback invoked for each message on a subscribed topic.
///
/// Arguments are the serialized sender envelope and the message body.
pub type MessageHandler = Arc<dyn Fn(&str, &WireBody) + Send + Sync>;

/// Publish/subscribe primitives of the host runtime.
///
/// Implementations never fail loudly: a message that cannot be delivered is
/// logged and dropped, matching the fire-and-forget semantics of the bus.
pub trait Transport: Send + Sync {
    /// Publish a serialized payload on a topic.
    fn publish(&self, topic: &str, payload: String);

    /// Register a handler for a topic.
    fn subscribe(&self, topic: &str, handler: MessageHandler);

    /// Remove every handler this widget registered on a topic.
    ///
    /// Unsubscribing from a topic with no handlers is a no-op.
    fn unsubscribe(&self, topic: &str);

    /// The calling widget's own instance id.
    fn instance_id(&self) -> WidgetId;
}
