//! # Error Channel
//!
//! Sink for every rejected payload and every runtime error a map reports.
//! Publishes `{sender, type, msg, error}` on `map.error` with no defaulting.

use crate::channel::Channel;
use crate::messages::ErrorMessage;
use crate::metrics::ChannelMetrics;
use crate::payload::Payload;
use crate::topics::ERROR;
use serde_json::{json, Value};
use shared_bus::{MessageHandler, Transport};
use shared_types::WireCodec;
use std::sync::Arc;

/// The `map.error` channel.
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    channel: Channel,
}

impl ErrorChannel {
    pub fn new(
        transport: Arc<dyn Transport>,
        codec: Arc<dyn WireCodec>,
        metrics: Arc<ChannelMetrics>,
    ) -> Self {
        Self {
            channel: Channel::new(&ERROR, transport, codec, None, metrics),
        }
    }

    #[must_use]
    pub fn topic(&self) -> &'static str {
        self.channel.topic()
    }

    /// Publish an error report.
    ///
    /// `error_type` is the topic or operation that failed, `error` the
    /// offending payload or a structured description.
    pub fn send_error(&self, sender: &str, error_type: &str, msg: &str, error: Value) {
        self.channel.send_value(json!({
            "sender": sender,
            "type": error_type,
            "msg": msg,
            "error": error,
        }));
    }

    pub fn send(&self, message: &ErrorMessage) {
        self.channel.send(message);
    }

    /// Listen for error reports.
    pub fn add_handler<F>(&self, listener: F) -> MessageHandler
    where
        F: Fn(&str, Payload<ErrorMessage>) + Send + Sync + 'static,
    {
        self.channel.add_typed_handler(listener)
    }

    pub fn remove_handlers(&self) {
        self.channel.remove_handlers();
    }
}
