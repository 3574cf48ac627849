//! # Generic Channel
//!
//! One `Channel` per topic. The topic's rule table decides which fields get
//! defaulted and checked; the channel itself is the same for every topic.
//!
//! ## Send path
//!
//! payload → shape check → rules (keyed off our own instance id) → encode →
//! publish. Failures go to the error channel and the message is dropped.
//!
//! ## Receive path
//!
//! sender envelope → body decode → shape check → rules (keyed off the
//! decoded sender id) → listener. A listener never sees a record that did not
//! pass every step.

use crate::error::ChannelError;
use crate::error_channel::ErrorChannel;
use crate::metrics::ChannelMetrics;
use crate::payload::Payload;
use crate::rules::apply_rules;
use crate::topics::TopicSpec;
use crate::validator::valid_object_or_array;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_bus::{MessageHandler, Transport};
use shared_types::{Record, SenderEnvelope, WidgetId, WireBody, WireCodec};
use std::sync::Arc;
use tracing::{debug, warn};

/// A validated, defaulted view of one bus topic.
#[derive(Clone)]
pub struct Channel {
    spec: &'static TopicSpec,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn WireCodec>,
    /// Where failures are reported. `None` only for the error channel itself.
    errors: Option<Arc<ErrorChannel>>,
    metrics: Arc<ChannelMetrics>,
}

impl Channel {
    pub fn new(
        spec: &'static TopicSpec,
        transport: Arc<dyn Transport>,
        codec: Arc<dyn WireCodec>,
        errors: Option<Arc<ErrorChannel>>,
        metrics: Arc<ChannelMetrics>,
    ) -> Self {
        Self {
            spec,
            transport,
            codec,
            errors,
            metrics,
        }
    }

    /// Wire name of the topic.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        self.spec.name
    }

    #[must_use]
    pub fn spec(&self) -> &'static TopicSpec {
        self.spec
    }

    /// Id of the widget this channel publishes as.
    #[must_use]
    pub fn instance_id(&self) -> WidgetId {
        self.transport.instance_id()
    }

    // =========================================================================
    // SEND
    // =========================================================================

    /// Publish a typed payload.
    ///
    /// The payload must serialize to an object or an array of objects.
    pub fn send<D: Serialize + ?Sized>(&self, data: &D) {
        match serde_json::to_value(data) {
            Ok(value) => self.send_value(value),
            Err(e) => {
                let sender = self.transport.instance_id();
                self.metrics.record_send_rejected();
                self.report(
                    &sender,
                    &ChannelError::Encode(shared_types::CodecError::Encode(e.to_string())),
                    Value::Null,
                );
            }
        }
    }

    /// Publish with no payload; every field comes from the rule table.
    pub fn send_default(&self) {
        self.send_payload(None);
    }

    /// Publish a raw payload.
    pub fn send_value(&self, data: Value) {
        self.send_payload(Some(&data));
    }

    fn send_payload(&self, data: Option<&Value>) {
        let sender = self.transport.instance_id();

        let outcome = self
            .prepare(data, &sender)
            .and_then(|records| self.encode(records));

        match outcome {
            Ok(payload) => {
                debug!(topic = self.spec.name, sender = %sender, "Publishing message");
                self.transport.publish(self.spec.name, payload);
                self.metrics.record_sent();
            }
            Err(e) => {
                self.metrics.record_send_rejected();
                self.report(&sender, &e, data.cloned().unwrap_or(Value::Null));
            }
        }
    }

    /// Normalize a payload and run the rule table over every record.
    fn prepare(&self, data: Option<&Value>, sender_id: &str) -> Result<Vec<Record>, ChannelError> {
        let mut records = valid_object_or_array(data)?;
        for record in &mut records {
            apply_rules(record, sender_id, self.spec.rules)?;
        }
        Ok(records)
    }

    /// One record goes out as a bare object, several as an array.
    fn encode(&self, mut records: Vec<Record>) -> Result<String, ChannelError> {
        let body = if records.len() == 1 {
            records.pop().map(Value::Object).unwrap_or(Value::Null)
        } else {
            Value::Array(records.into_iter().map(Value::Object).collect())
        };
        self.codec.encode(&body).map_err(ChannelError::Encode)
    }

    // =========================================================================
    // RECEIVE
    // =========================================================================

    /// Subscribe a listener and return the wrapper that was registered.
    ///
    /// The wrapper can be invoked directly or subscribed again elsewhere.
    pub fn add_handler<F>(&self, listener: F) -> MessageHandler
    where
        F: Fn(&str, Payload) + Send + Sync + 'static,
    {
        self.wrap(move |sender, records| {
            listener(sender, Payload::from_vec(records));
            Ok(())
        })
    }

    /// Like [`Channel::add_handler`], but every record is deserialized into
    /// `M` first. A record that does not fit `M` rejects the whole message.
    pub fn add_typed_handler<M, F>(&self, listener: F) -> MessageHandler
    where
        M: DeserializeOwned + 'static,
        F: Fn(&str, Payload<M>) + Send + Sync + 'static,
    {
        self.wrap(move |sender, records| {
            let typed = records
                .into_iter()
                .enumerate()
                .map(|(index, record)| {
                    serde_json::from_value::<M>(Value::Object(record)).map_err(|e| {
                        ChannelError::Typed {
                            index,
                            reason: e.to_string(),
                        }
                    })
                })
                .collect::<Result<Vec<M>, _>>()?;
            listener(sender, Payload::from_vec(typed));
            Ok(())
        })
    }

    /// Unsubscribe every handler on this topic. Safe to call repeatedly.
    pub fn remove_handlers(&self) {
        debug!(topic = self.spec.name, "Removing handlers");
        self.transport.unsubscribe(self.spec.name);
    }

    fn wrap<D>(&self, deliver: D) -> MessageHandler
    where
        D: Fn(&str, Vec<Record>) -> Result<(), ChannelError> + Send + Sync + 'static,
    {
        let channel = self.clone();
        let handler: MessageHandler = Arc::new(move |raw_sender: &str, body: &WireBody| {
            channel.receive(raw_sender, body, &deliver);
        });
        self.transport.subscribe(self.spec.name, Arc::clone(&handler));
        handler
    }

    fn receive<D>(&self, raw_sender: &str, body: &WireBody, deliver: &D)
    where
        D: Fn(&str, Vec<Record>) -> Result<(), ChannelError>,
    {
        self.metrics.record_received();

        let sender_id = match SenderEnvelope::decode(raw_sender, self.codec.as_ref()) {
            Ok(envelope) => envelope.id,
            Err(e) => {
                self.reject(&self.transport.instance_id(), &ChannelError::InvalidSender(e), body);
                return;
            }
        };

        let records = body
            .to_value(self.codec.as_ref())
            .map_err(ChannelError::Undecodable)
            .and_then(|value| self.prepare(Some(&value), &sender_id));

        let outcome = records.and_then(|records| {
            debug!(
                topic = self.spec.name,
                sender = %sender_id,
                records = records.len(),
                "Delivering message"
            );
            deliver(&sender_id, records)
        });

        match outcome {
            Ok(()) => self.metrics.record_listener_call(),
            Err(e) => self.reject(&sender_id, &e, body),
        }
    }

    fn reject(&self, sender_id: &str, error: &ChannelError, body: &WireBody) {
        self.metrics.record_receive_rejected();
        self.report(sender_id, error, body.to_report_value(self.codec.as_ref()));
    }

    fn report(&self, sender_id: &str, error: &ChannelError, raw: Value) {
        warn!(
            topic = self.spec.name,
            sender = sender_id,
            error = %error,
            "Payload rejected"
        );
        if let Some(errors) = &self.errors {
            errors.send_error(sender_id, self.spec.name, &error.to_string(), raw);
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("topic", &self.spec.name)
            .field("reports_errors", &self.errors.is_some())
            .finish()
    }
}
