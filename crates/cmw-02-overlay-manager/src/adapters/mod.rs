//! Adapters Layer
//!
//! - `MapAdapter`: binds the CMWAPI channels to the overlay manager and turns
//!   engine events into outbound messages
//! - `StatusSubscriptions`: which feature fields report value changes
//! - `ErrorReporter` for `ErrorChannel`: manager failures onto `map.error`
//! - `UiRelay`: outbound helpers for widget UIs

mod channel_adapter;
mod error_reporter;
mod feature_status;
mod relay;

pub use channel_adapter::{MapAdapter, SharedManager};
pub use relay::UiRelay;
