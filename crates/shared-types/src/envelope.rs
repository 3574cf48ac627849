//! # Message Envelope
//!
//! What a transport hands to a subscriber: the serialized sender envelope and a
//! message body.
//!
//! ## Security Properties
//!
//! - **Envelope Authority**: `SenderEnvelope::id` is assigned by the transport,
//!   never by the payload, and is the sole source of sender identity.
//! - **No Trust In Bodies**: a body is decoded lazily and may be malformed; the
//!   channel layer validates it before any listener observes it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::WireCodec;
use crate::entities::WidgetId;
use crate::errors::CodecError;

/// Identity of the widget that published a message.
///
/// Serialized onto the wire as `{"id": "<widget id>"}`. Transports are free to
/// attach more fields; they are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderEnvelope {
    /// Instance id of the publishing widget.
    pub id: WidgetId,
}

impl SenderEnvelope {
    /// Create an envelope for the given widget.
    pub fn new(id: impl Into<WidgetId>) -> Self {
        Self { id: id.into() }
    }

    /// Render the envelope as a wire string.
    pub fn encode(&self, codec: &dyn WireCodec) -> Result<String, CodecError> {
        let value =
            serde_json::to_value(self).map_err(|e| CodecError::Encode(e.to_string()))?;
        codec.encode(&value)
    }

    /// Parse a wire string into an envelope.
    ///
    /// An envelope without a non-empty string `id` is rejected.
    pub fn decode(raw: &str, codec: &dyn WireCodec) -> Result<Self, CodecError> {
        let value = codec.decode(raw)?;
        let envelope: SenderEnvelope = serde_json::from_value(value)
            .map_err(|e| CodecError::InvalidSender(e.to_string()))?;
        if envelope.id.is_empty() {
            return Err(CodecError::InvalidSender("empty sender id".to_string()));
        }
        Ok(envelope)
    }
}

/// A message body as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum WireBody {
    /// Serialized text, to be parsed with the channel's codec.
    Text(String),
    /// An already-structured value, passed through untouched.
    Structured(Value),
}

impl WireBody {
    /// Resolve the body into a structured value.
    pub fn to_value(&self, codec: &dyn WireCodec) -> Result<Value, CodecError> {
        match self {
            WireBody::Text(raw) => codec.decode(raw),
            WireBody::Structured(value) => Ok(value.clone()),
        }
    }

    /// Best-effort view of the body for error reports.
    ///
    /// Text that fails to parse is carried as a JSON string.
    pub fn to_report_value(&self, codec: &dyn WireCodec) -> Value {
        self.to_value(codec).unwrap_or_else(|_| match self {
            WireBody::Text(raw) => Value::String(raw.clone()),
            WireBody::Structured(value) => value.clone(),
        })
    }
}

impl From<String> for WireBody {
    fn from(raw: String) -> Self {
        WireBody::Text(raw)
    }
}

impl From<Value> for WireBody {
    fn from(value: Value) -> Self {
        WireBody::Structured(value)
    }
}

/// A queued message on its way to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Topic the message was published on.
    pub topic: String,
    /// Serialized [`SenderEnvelope`].
    pub sender: String,
    /// The message body.
    pub body: WireBody,
}
