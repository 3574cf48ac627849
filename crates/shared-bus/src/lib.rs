//! # Shared Bus - Publish/Subscribe Transport for Map Widgets
//!
//! Provides the four-operation transport contract the channel layer is built
//! on, plus an in-process implementation for hosting several widgets in one
//! runtime.
//!
//! ## Transport Contract
//!
//! - `publish(topic, payload)`: deliver a serialized payload to every subscriber
//! - `subscribe(topic, handler)`: register a handler for a topic
//! - `unsubscribe(topic)`: drop every handler the caller registered on a topic
//! - `instance_id()`: the calling widget's own id
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Widget A   │                    │   Widget B   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ InMemoryBus  │          │
//!                  │  (ordered)   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Ordering
//!
//! Messages are queued and delivered strictly in publish order. A message
//! published from inside a handler is queued behind the current delivery
//! rather than delivered reentrantly.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod publisher;
pub mod subscriber;
pub mod transport;

// Re-export main types
pub use publisher::{BusConfig, InMemoryBus, WidgetTransport};
pub use subscriber::SubscriptionTable;
pub use transport::{MessageHandler, Transport};

/// Prefix for instance ids handed to widgets that connect without one.
pub const DEFAULT_INSTANCE_PREFIX: &str = "widget";
