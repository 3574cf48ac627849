//! # Serialization Boundary
//!
//! Every component that turns payloads into wire strings is handed a
//! [`WireCodec`] explicitly. The core relies on one property only:
//! `decode(encode(x))` is structurally equal to `x` for every payload it
//! produces.

use serde_json::Value;

use crate::errors::CodecError;

/// Converts structured values to and from wire strings.
pub trait WireCodec: Send + Sync {
    /// Render a value as a wire string.
    fn encode(&self, value: &Value) -> Result<String, CodecError>;

    /// Parse a wire string into a value.
    fn decode(&self, raw: &str) -> Result<Value, CodecError>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl WireCodec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, raw: &str) -> Result<Value, CodecError> {
        serde_json::from_str(raw).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
