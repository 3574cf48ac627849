//! # CMWAPI 1.1 Channels
//!
//! Turns an untyped, string-serialized publish/subscribe bus into validated,
//! defaulted message channels for map widgets.
//!
//! ## Layout
//!
//! - [`validator`]: pure payload shape and enumeration checks
//! - [`rules`] / [`topics`]: per-topic default and check tables, as data
//! - [`Channel`]: the one generic channel every topic uses
//! - [`ErrorChannel`]: where rejected payloads and runtime errors go
//! - [`messages`]: typed records for listeners
//! - [`MapApi`]: the full channel set for one widget
//!
//! ## Guarantees
//!
//! - Outbound payloads are fully defaulted before they are serialized.
//! - Inbound payloads are fully defaulted and validated before a listener
//!   sees them. `overlayId`/`featureId` default to the *decoded sender* id.
//! - Nothing here panics on bad input; failures are published on `map.error`.

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod api;
pub mod channel;
pub mod error;
pub mod error_channel;
pub mod messages;
pub mod metrics;
pub mod payload;
pub mod rules;
pub mod topics;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use api::{FeatureChannels, MapApi, OverlayChannels, StatusChannels};
pub use channel::Channel;
pub use error::{ChannelError, ValidationError};
pub use error_channel::ErrorChannel;
pub use metrics::{ChannelMetrics, MetricsSnapshot};
pub use payload::Payload;
pub use topics::TopicSpec;
pub use validator::{
    valid_formats, valid_map_type, valid_object_or_array, valid_request_types, MapType,
    RequestType,
};
