//! # Error Types
//!
//! Errors raised at the wire boundary.

use thiserror::Error;

/// Errors from encoding or decoding wire strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The value could not be rendered as a wire string.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// The wire string is not a valid document.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// The sender envelope did not carry a usable widget id.
    #[error("Invalid sender envelope: {0}")]
    InvalidSender(String),
}
