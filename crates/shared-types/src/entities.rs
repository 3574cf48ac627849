//! # Core Identifiers
//!
//! Identity types shared by the channel layer and the overlay manager.

use serde_json::{Map, Value};

/// Instance id of a widget connected to the bus.
pub type WidgetId = String;

/// Widget-assigned overlay identifier.
pub type OverlayId = String;

/// Feature identifier, unique within its owning overlay.
pub type FeatureId = String;

/// One JSON object from a message body.
///
/// Channel payloads are always normalized to a list of records before any
/// defaulting or validation takes place.
pub type Record = Map<String, Value>;
