//! Error types for the channel layer

use shared_types::CodecError;
use thiserror::Error;

/// Reasons a payload fails validation.
///
/// The `Display` text is what ends up in the `msg` field of an error report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Payload must be an object or an array of objects; received {found}")]
    NotObjectOrArray { found: &'static str },

    #[error("Payload array element {index} must be an object; received {found}")]
    ElementNotObject { index: usize, found: &'static str },

    #[error("Payload array must contain at least one object")]
    EmptyArray,

    #[error("Missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("Field '{field}' must be {expected}")]
    WrongFieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid request type '{value}'; expected one of about, format, view")]
    InvalidRequestType { value: String },

    #[error("Invalid map type '{value}'; expected one of 2-D, 3-D, other")]
    InvalidMapType { value: String },

    #[error("Unsupported format '{value}'")]
    InvalidFormat { value: String },
}

/// Failures while sending or receiving on a channel.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChannelError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Sender could not be decoded: {0}")]
    InvalidSender(CodecError),

    #[error("Message could not be decoded: {0}")]
    Undecodable(CodecError),

    #[error("Message could not be encoded: {0}")]
    Encode(CodecError),

    #[error("Record {index} does not match the message type: {reason}")]
    Typed { index: usize, reason: String },
}
