//! # Shared Types Crate
//!
//! Wire-level types used by every widget on the map bus.
//!
//! ## Design Principles
//!
//! - **Envelope Authority**: the sender envelope's `id` is the only source of
//!   sender identity. Payload fields such as `overlayId` merely *default* to it.
//! - **Explicit Serialization**: nothing reaches for an ambient serializer; every
//!   component is handed a [`WireCodec`].
//! - **Untrusted Bodies**: a [`WireBody`] is whatever the transport delivered,
//!   either raw text or an already-structured value.

pub mod codec;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod format;

pub use codec::{JsonCodec, WireCodec};
pub use entities::*;
pub use envelope::{Delivery, SenderEnvelope, WireBody};
pub use errors::*;
pub use format::{FeatureFormat, UnsupportedFormat};
