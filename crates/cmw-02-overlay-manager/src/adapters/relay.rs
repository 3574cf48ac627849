//! # UI Relay
//!
//! Outbound helpers for widget UIs (layer lists, drawing tools) that change
//! the map by publishing CMWAPI messages rather than touching the tree.

use cmw_01_channels::MapApi;
use serde_json::{json, Value};

/// Publishes overlay and feature requests as one widget.
#[derive(Debug, Clone)]
pub struct UiRelay {
    api: MapApi,
}

impl UiRelay {
    pub fn new(api: MapApi) -> Self {
        Self { api }
    }

    pub fn send_overlay_create(&self, overlay_id: &str, name: &str, parent_id: Option<&str>) {
        self.api.overlay.create.send_value(json!({
            "overlayId": overlay_id,
            "name": name,
            "parentId": parent_id,
        }));
    }

    pub fn send_overlay_remove(&self, overlay_id: &str) {
        self.api
            .overlay
            .remove
            .send_value(json!({ "overlayId": overlay_id }));
    }

    pub fn send_overlay_hide(&self, overlay_id: &str) {
        self.api
            .overlay
            .hide
            .send_value(json!({ "overlayId": overlay_id }));
    }

    pub fn send_overlay_show(&self, overlay_id: &str) {
        self.api
            .overlay
            .show
            .send_value(json!({ "overlayId": overlay_id }));
    }

    pub fn send_overlay_update(&self, overlay_id: &str, name: Option<&str>, parent_id: Option<&str>) {
        self.api.overlay.update.send_value(json!({
            "overlayId": overlay_id,
            "name": name,
            "parentId": parent_id,
        }));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn send_feature_plot_url(
        &self,
        overlay_id: &str,
        feature_id: &str,
        name: &str,
        format: &str,
        url: &str,
        params: Option<Value>,
        zoom: bool,
    ) {
        self.api.feature.plot_url.send_value(json!({
            "overlayId": overlay_id,
            "featureId": feature_id,
            "name": name,
            "format": format,
            "url": url,
            "params": params,
            "zoom": zoom,
        }));
    }

    pub fn send_feature_unplot(&self, overlay_id: &str, feature_id: &str) {
        self.api.feature.unplot.send_value(json!({
            "overlayId": overlay_id,
            "featureId": feature_id,
        }));
    }

    pub fn send_feature_update(
        &self,
        overlay_id: &str,
        feature_id: &str,
        name: Option<&str>,
        new_overlay_id: Option<&str>,
    ) {
        self.api.feature.update.send_value(json!({
            "overlayId": overlay_id,
            "featureId": feature_id,
            "name": name,
            "newOverlayId": new_overlay_id,
        }));
    }

    pub fn send_feature_hide(&self, overlay_id: &str, feature_id: &str) {
        self.api.feature.hide.send_value(json!({
            "overlayId": overlay_id,
            "featureId": feature_id,
        }));
    }

    pub fn send_feature_show(&self, overlay_id: &str, feature_id: &str) {
        self.api.feature.show.send_value(json!({
            "overlayId": overlay_id,
            "featureId": feature_id,
            "zoom": false,
        }));
    }

    /// Ask the map to report value changes of one field, or of every field
    /// when `subfeature_id` is `None`.
    pub fn send_feature_status_start(
        &self,
        overlay_id: &str,
        feature_id: &str,
        subfeature_id: Option<&str>,
    ) {
        self.api
            .feature
            .status_start
            .send_value(status_subscription(overlay_id, feature_id, subfeature_id));
    }

    pub fn send_feature_status_stop(
        &self,
        overlay_id: &str,
        feature_id: &str,
        subfeature_id: Option<&str>,
    ) {
        self.api
            .feature
            .status_stop
            .send_value(status_subscription(overlay_id, feature_id, subfeature_id));
    }
}

fn status_subscription(overlay_id: &str, feature_id: &str, subfeature_id: Option<&str>) -> Value {
    let mut message = json!({
        "overlayId": overlay_id,
        "featureId": feature_id,
    });
    if let Some(subfeature_id) = subfeature_id {
        message["subfeatureId"] = Value::from(subfeature_id);
    }
    message
}
