//! Typed CMWAPI 1.1 message records
//!
//! Records as listeners see them once defaults are filled. Optional fields
//! that have no default stay `Option`.

use crate::validator::{MapType, RequestType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{FeatureFormat, FeatureId, OverlayId, WidgetId};

// =============================================================================
// OVERLAYS
// =============================================================================

/// `map.overlay.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayCreate {
    pub overlay_id: OverlayId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<OverlayId>,
}

/// `map.overlay.remove`, `map.overlay.hide` and `map.overlay.show`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRef {
    pub overlay_id: OverlayId,
}

/// `map.overlay.update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayUpdate {
    pub overlay_id: OverlayId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<OverlayId>,
}

// =============================================================================
// FEATURES
// =============================================================================

/// `map.feature.plot`: feature data carried inline.
///
/// `format` stays a string here so an unsupported value can be reported by
/// the overlay manager rather than rejected as a malformed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePlot {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    pub name: String,
    pub format: String,
    pub feature: Value,
    pub zoom: bool,
}

/// `map.feature.plot.url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePlotUrl {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    pub name: String,
    pub format: String,
    pub url: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub zoom: bool,
}

/// `map.feature.unplot` and `map.feature.hide`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRef {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
}

/// `map.feature.show`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureShow {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    pub zoom: bool,
}

/// `map.feature.update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUpdate {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_overlay_id: Option<OverlayId>,
}

/// `map.feature.selected`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSelected {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_name: Option<String>,
}

/// `map.feature.status.report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStatusReport {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    pub subfeature_id: String,
    #[serde(default)]
    pub feature_value: Value,
}

/// `map.feature.status.request`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatusRequest {}

/// `map.feature.status.start` and `map.feature.status.stop`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStatusSubscription {
    pub overlay_id: OverlayId,
    pub feature_id: FeatureId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfeature_id: Option<String>,
}

/// One entry of `map.feature.status.sublayers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSublayer {
    pub overlay_id: OverlayId,
    pub overlay_name: String,
    pub feature_id: FeatureId,
    pub feature_name: String,
    pub sublayer_id: String,
}

// =============================================================================
// STATUS
// =============================================================================

/// `map.status.request`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub types: Vec<RequestType>,
}

impl StatusRequest {
    #[must_use]
    pub fn wants(&self, request_type: RequestType) -> bool {
        self.types.contains(&request_type)
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Axis-aligned geographic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

/// `map.status.view`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<WidgetId>,
    pub bounds: Bounds,
    pub center: LatLon,
    pub range: f64,
}

/// `map.status.about`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusAbout {
    pub version: String,
    #[serde(rename = "type")]
    pub map_type: MapType,
    pub widget_name: String,
}

/// `map.status.format`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFormat {
    pub formats: Vec<FeatureFormat>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// `map.error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Widget whose message or action caused the error.
    pub sender: WidgetId,
    /// Topic or operation tag, e.g. `map.overlay.update`.
    #[serde(rename = "type")]
    pub error_type: String,
    pub msg: String,
    #[serde(default)]
    pub error: Value,
}
